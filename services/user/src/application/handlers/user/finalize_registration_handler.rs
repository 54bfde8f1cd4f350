//! 完成注册处理器
//!
//! 注册编排：消费验证码 → 创建用户 → 播种默认关系，同一事务；
//! 提交后签发长期鉴权令牌。

use std::sync::Arc;

use async_trait::async_trait;
use campus_auth_core::TokenIssuer;
use campus_cqrs_core::CommandHandler;
use campus_errors::{AppError, AppResult};
use tracing::{info, warn};

use crate::application::commands::user::{FinalizeRegistrationCommand, FinalizeRegistrationResult};
use crate::domain::services::{RegistrationService, SocialGraphService};
use crate::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use crate::domain::user::User;

/// 完成注册处理器
pub struct FinalizeRegistrationHandler {
    registration_service: Arc<RegistrationService>,
    social_graph_service: Arc<SocialGraphService>,
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    token_issuer: Arc<dyn TokenIssuer>,
    token_lifetime_seconds: i64,
}

impl FinalizeRegistrationHandler {
    pub fn new(
        registration_service: Arc<RegistrationService>,
        social_graph_service: Arc<SocialGraphService>,
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        token_issuer: Arc<dyn TokenIssuer>,
        token_lifetime_seconds: i64,
    ) -> Self {
        Self {
            registration_service,
            social_graph_service,
            uow_factory,
            token_issuer,
            token_lifetime_seconds,
        }
    }

    async fn promote(
        &self,
        uow: &dyn UnitOfWork,
        command: &FinalizeRegistrationCommand,
    ) -> AppResult<User> {
        let user = self
            .registration_service
            .finalize(uow, &command.email, &command.code)
            .await?;

        self.social_graph_service
            .seed_bootstrap_edges(uow, &user.id)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl CommandHandler<FinalizeRegistrationCommand> for FinalizeRegistrationHandler {
    async fn handle(
        &self,
        command: FinalizeRegistrationCommand,
    ) -> AppResult<FinalizeRegistrationResult> {
        info!(email = %command.email, "Handling FinalizeRegistrationCommand");

        let uow = self.uow_factory.begin().await?;

        let user = match self.promote(uow.as_ref(), &command).await {
            Ok(user) => user,
            Err(e) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed after finalize error");
                }
                return Err(e);
            }
        };

        uow.commit().await?;

        let token = self
            .token_issuer
            .issue(&user.id, self.token_lifetime_seconds)
            .await
            .map_err(|e| AppError::internal(format!("Token issuance failed: {}", e)))?;

        info!(user_id = %user.id, "Registration finalized, auth token issued");

        Ok(FinalizeRegistrationResult {
            user: user.profile(),
            token,
            expiration: self.token_lifetime_seconds,
        })
    }
}

//! 受理注册申请处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_errors::AppResult;
use tracing::info;

use crate::application::commands::user::{BeginRegistrationCommand, BeginRegistrationResult};
use crate::domain::services::RegistrationService;

/// 受理注册申请处理器
pub struct BeginRegistrationHandler {
    registration_service: Arc<RegistrationService>,
}

impl BeginRegistrationHandler {
    pub fn new(registration_service: Arc<RegistrationService>) -> Self {
        Self {
            registration_service,
        }
    }
}

#[async_trait]
impl CommandHandler<BeginRegistrationCommand> for BeginRegistrationHandler {
    async fn handle(&self, command: BeginRegistrationCommand) -> AppResult<BeginRegistrationResult> {
        info!(email = %command.email, "Handling BeginRegistrationCommand");

        let expires_in_seconds = self
            .registration_service
            .begin_registration(&command.email, &command.password)
            .await?;

        Ok(BeginRegistrationResult {
            message: "email success".to_string(),
            expires_in_seconds,
        })
    }
}

//! 关注处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::user::FollowUserCommand;
use crate::domain::services::{FollowOutcome, SocialGraphService};
use crate::infrastructure::cache::UserLookupCache;

/// 关注处理器
pub struct FollowUserHandler {
    social_graph_service: Arc<SocialGraphService>,
    user_cache: Arc<dyn UserLookupCache>,
}

impl FollowUserHandler {
    pub fn new(
        social_graph_service: Arc<SocialGraphService>,
        user_cache: Arc<dyn UserLookupCache>,
    ) -> Self {
        Self {
            social_graph_service,
            user_cache,
        }
    }
}

#[async_trait]
impl CommandHandler<FollowUserCommand> for FollowUserHandler {
    async fn handle(&self, command: FollowUserCommand) -> AppResult<FollowOutcome> {
        info!(follower = %command.follower, target = %command.target, "Handling FollowUserCommand");

        // 目标用户须存在
        if self.user_cache.get_user(&command.target).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        self.social_graph_service
            .follow(&command.follower, &command.target)
            .await
    }
}

//! 取关处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_errors::{AppError, AppResult};
use tracing::info;

use crate::application::commands::user::UnfollowUserCommand;
use crate::domain::services::{SocialGraphService, UnfollowOutcome};
use crate::infrastructure::cache::UserLookupCache;

/// 取关处理器
pub struct UnfollowUserHandler {
    social_graph_service: Arc<SocialGraphService>,
    user_cache: Arc<dyn UserLookupCache>,
}

impl UnfollowUserHandler {
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
impl CommandHandler<UnfollowUserCommand> for UnfollowUserHandler {
    async fn handle(&self, command: UnfollowUserCommand) -> AppResult<UnfollowOutcome> {
        info!(follower = %command.follower, target = %command.target, "Handling UnfollowUserCommand");

        if self.user_cache.get_user(&command.target).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }

        self.social_graph_service
            .unfollow(&command.follower, &command.target)
            .await
    }
}

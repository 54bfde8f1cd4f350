//! 资料变更处理器

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::CommandHandler;
use campus_errors::AppResult;
use tracing::info;

use crate::application::commands::user::UpdateProfileCommand;
use crate::domain::services::ProfileService;
use crate::domain::user::UserProfile;
use crate::infrastructure::cache::UserLookupCache;

/// 资料变更处理器
pub struct UpdateProfileHandler {
    profile_service: Arc<ProfileService>,
    user_cache: Arc<dyn UserLookupCache>,
}

impl UpdateProfileHandler {
    pub fn new(profile_service: Arc<ProfileService>, user_cache: Arc<dyn UserLookupCache>) -> Self {
        Self {
            profile_service,
            user_cache,
        }
    }
}

#[async_trait]
impl CommandHandler<UpdateProfileCommand> for UpdateProfileHandler {
    async fn handle(&self, command: UpdateProfileCommand) -> AppResult<UserProfile> {
        info!(user_id = %command.user_id, "Handling UpdateProfileCommand");

        let profile = self
            .profile_service
            .update_profile(&command.user_id, command.change)
            .await?;

        // 资料已变更，缓存条目失效
        self.user_cache.invalidate(&command.user_id).await?;

        Ok(profile)
    }
}

//! REST 共享状态

use std::sync::Arc;

use campus_auth_core::TokenIssuer;
use sqlx::PgPool;

use crate::application::handlers::user::{
    BeginRegistrationHandler, FinalizeRegistrationHandler, FollowUserHandler,
    UnfollowUserHandler, UpdateProfileHandler, UserQueryHandler,
};
use crate::infrastructure::cache::UserLookupCache;

/// 路由共享状态：已组装好的处理器与横切协作方
#[derive(Clone)]
pub struct AppState {
    pub begin_registration: Arc<BeginRegistrationHandler>,
    pub finalize_registration: Arc<FinalizeRegistrationHandler>,
    pub update_profile: Arc<UpdateProfileHandler>,
    pub follow_user: Arc<FollowUserHandler>,
    pub unfollow_user: Arc<UnfollowUserHandler>,
    pub queries: Arc<UserQueryHandler>,
    pub token_issuer: Arc<dyn TokenIssuer>,
    pub user_cache: Arc<dyn UserLookupCache>,
    pub pool: PgPool,
}

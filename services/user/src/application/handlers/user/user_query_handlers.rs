//! 用户查询处理器
//!
//! 身份查找走读穿缓存；名单类查询先经缓存确认用户存在，再走图谱服务。

use std::sync::Arc;

use async_trait::async_trait;
use campus_cqrs_core::QueryHandler;
use campus_errors::{AppError, AppResult};
use tracing::debug;

use crate::application::queries::user::{
    GetUserByIdQuery, GetUserByUsernameQuery, ListFollowedQuery, ListFollowersQuery,
    ListGroupsQuery, SearchUsersQuery,
};
use crate::domain::group::GroupMembership;
use crate::domain::repositories::UserRepository;
use crate::domain::services::SocialGraphService;
use crate::domain::user::UserProfile;
use crate::domain::value_objects::Username;
use crate::infrastructure::cache::UserLookupCache;

/// 用户查询处理器
pub struct UserQueryHandler {
    user_cache: Arc<dyn UserLookupCache>,
    user_repo: Arc<dyn UserRepository>,
    social_graph_service: Arc<SocialGraphService>,
}

impl UserQueryHandler {
    pub fn new(
        user_cache: Arc<dyn UserLookupCache>,
        user_repo: Arc<dyn UserRepository>,
        social_graph_service: Arc<SocialGraphService>,
    ) -> Self {
        Self {
            user_cache,
            user_repo,
            social_graph_service,
        }
    }

    async fn require_user(&self, query_id: &campus_common::UserId) -> AppResult<()> {
        if self.user_cache.get_user(query_id).await?.is_none() {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryHandler<GetUserByIdQuery> for UserQueryHandler {
    async fn handle(&self, query: GetUserByIdQuery) -> AppResult<UserProfile> {
        debug!(user_id = %query.id, "Handling GetUserByIdQuery");

        self.user_cache
            .get_user(&query.id)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

#[async_trait]
impl QueryHandler<GetUserByUsernameQuery> for UserQueryHandler {
    async fn handle(&self, query: GetUserByUsernameQuery) -> AppResult<UserProfile> {
        debug!(username = %query.username, "Handling GetUserByUsernameQuery");

        // 不合法的用户名不可能属于任何用户
        let username =
            Username::new(query.username).map_err(|_| AppError::not_found("User not found"))?;

        self.user_repo
            .find_by_username(&username)
            .await?
            .map(|u| u.profile())
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}

#[async_trait]
impl QueryHandler<SearchUsersQuery> for UserQueryHandler {
    async fn handle(&self, query: SearchUsersQuery) -> AppResult<Vec<UserProfile>> {
        debug!(keyword = %query.keyword, "Handling SearchUsersQuery");

        let users = self
            .user_repo
            .search_by_username(&query.keyword, &query.page.normalized())
            .await?;

        Ok(users.iter().map(|u| u.profile()).collect())
    }
}

#[async_trait]
impl QueryHandler<ListFollowersQuery> for UserQueryHandler {
    async fn handle(&self, query: ListFollowersQuery) -> AppResult<Vec<UserProfile>> {
        self.require_user(&query.user_id).await?;

        self.social_graph_service
            .list_followers(&query.user_id, &query.page.normalized())
            .await
    }
}

#[async_trait]
impl QueryHandler<ListFollowedQuery> for UserQueryHandler {
    async fn handle(&self, query: ListFollowedQuery) -> AppResult<Vec<UserProfile>> {
        self.require_user(&query.user_id).await?;

        self.social_graph_service
            .list_followed(&query.user_id, &query.page.normalized())
            .await
    }
}

#[async_trait]
impl QueryHandler<ListGroupsQuery> for UserQueryHandler {
    async fn handle(&self, query: ListGroupsQuery) -> AppResult<Vec<GroupMembership>> {
        self.require_user(&query.user_id).await?;

        self.social_graph_service
            .list_groups(&query.user_id, &query.page.normalized())
            .await
    }
}

//! PostgreSQL 社交图谱 Repository 实现

use async_trait::async_trait;
use campus_common::{OfficialAccountId, Pagination, UserId};
use campus_errors::AppResult;
use sqlx::PgPool;

use super::queries;
use crate::domain::group::GroupMembership;
use crate::domain::repositories::SocialGraphRepository;
use crate::domain::user::User;

pub struct PostgresSocialGraphRepository {
    pool: PgPool,
}

impl PostgresSocialGraphRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialGraphRepository for PostgresSocialGraphRepository {
    async fn add_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool> {
        queries::add_follow(&self.pool, follower, followed).await
    }

    async fn remove_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool> {
        queries::remove_follow(&self.pool, follower, followed).await
    }

    async fn list_followers(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>> {
        queries::list_followers(&self.pool, user, page).await
    }

    async fn list_followed(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>> {
        queries::list_followed(&self.pool, user, page).await
    }

    async fn list_groups(
        &self,
        user: &UserId,
        page: &Pagination,
    ) -> AppResult<Vec<GroupMembership>> {
        queries::list_groups(&self.pool, user, page).await
    }

    async fn list_official_account_ids(&self) -> AppResult<Vec<OfficialAccountId>> {
        queries::list_official_account_ids(&self.pool).await
    }

    async fn add_subscriber(&self, account: &OfficialAccountId, user: &UserId) -> AppResult<()> {
        queries::add_subscriber(&self.pool, account, user).await
    }
}

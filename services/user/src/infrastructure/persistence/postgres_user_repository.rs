//! PostgreSQL 用户 Repository 实现

use async_trait::async_trait;
use campus_common::{Pagination, UserId};
use campus_errors::AppResult;
use sqlx::PgPool;

use super::queries;
use crate::domain::repositories::UserRepository;
use crate::domain::user::User;
use crate::domain::value_objects::{Email, HashedPassword, Username};

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        queries::find_user_by_id(&self.pool, id).await
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        queries::find_user_by_email(&self.pool, email).await
    }

    async fn find_by_username(&self, username: &Username) -> AppResult<Option<User>> {
        queries::find_user_by_username(&self.pool, username).await
    }

    async fn search_by_username(&self, keyword: &str, page: &Pagination) -> AppResult<Vec<User>> {
        queries::search_users_by_username(&self.pool, keyword, page).await
    }

    async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AppResult<User> {
        queries::create_user(&self.pool, email, password_hash).await
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        queries::update_user(&self.pool, user).await
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        queries::user_exists_by_email(&self.pool, email).await
    }

    async fn exists_by_username(&self, username: &Username) -> AppResult<bool> {
        queries::user_exists_by_username(&self.pool, username).await
    }
}

//! PostgreSQL 待验证注册记录 Repository 实现

use async_trait::async_trait;
use campus_errors::AppResult;
use sqlx::PgPool;

use super::queries;
use crate::domain::pending_registration::PendingRegistration;
use crate::domain::repositories::PendingRegistrationRepository;
use crate::domain::value_objects::Email;

pub struct PostgresPendingRegistrationRepository {
    pool: PgPool,
}

impl PostgresPendingRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingRegistrationRepository for PostgresPendingRegistrationRepository {
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<PendingRegistration>> {
        queries::find_pending_by_email(&self.pool, email).await
    }

    async fn upsert(&self, pending: &PendingRegistration) -> AppResult<()> {
        queries::upsert_pending(&self.pool, pending).await
    }

    async fn delete(&self, email: &Email) -> AppResult<bool> {
        queries::delete_pending(&self.pool, email).await
    }
}

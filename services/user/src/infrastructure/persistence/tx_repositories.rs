//! 事务感知的 Repository 实现
//!
//! 这些 Repository 使用共享的 Transaction 而非 PgPool，由
//! `PostgresUnitOfWork` 统一持有与提交。

use async_trait::async_trait;
use campus_common::{OfficialAccountId, Pagination, UserId};
use campus_errors::{AppError, AppResult};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::queries;
use crate::domain::group::GroupMembership;
use crate::domain::pending_registration::PendingRegistration;
use crate::domain::repositories::{
    PendingRegistrationRepository, SocialGraphRepository, UserRepository,
};
use crate::domain::user::User;
use crate::domain::value_objects::{Email, HashedPassword, Username};

/// 共享事务类型
pub(crate) type SharedTx = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

/// 宏：定义一个简单的 TxRepository 结构体
macro_rules! define_tx_repo {
    ($name:ident) => {
        pub struct $name {
            tx: SharedTx,
        }

        impl $name {
            pub(crate) fn new(tx: SharedTx) -> Self {
                Self { tx }
            }
        }
    };
}

define_tx_repo!(TxUserRepository);
define_tx_repo!(TxPendingRegistrationRepository);
define_tx_repo!(TxSocialGraphRepository);

/// 宏：锁定共享事务并在其上执行一个 queries 调用
macro_rules! with_tx {
    ($self:ident, $query:ident ( $($arg:expr),* )) => {{
        let mut guard = $self.tx.lock().await;
        let tx = guard
            .as_mut()
            .ok_or_else(|| AppError::internal("Transaction already consumed"))?;
        queries::$query(&mut **tx $(, $arg)*).await
    }};
}

// =============================================================================
// UserRepository 实现
// =============================================================================

#[async_trait]
impl UserRepository for TxUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        with_tx!(self, find_user_by_id(id))
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        with_tx!(self, find_user_by_email(email))
    }

    async fn find_by_username(&self, username: &Username) -> AppResult<Option<User>> {
        with_tx!(self, find_user_by_username(username))
    }

    async fn search_by_username(&self, keyword: &str, page: &Pagination) -> AppResult<Vec<User>> {
        with_tx!(self, search_users_by_username(keyword, page))
    }

    async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AppResult<User> {
        with_tx!(self, create_user(email, password_hash))
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        with_tx!(self, update_user(user))
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        with_tx!(self, user_exists_by_email(email))
    }

    async fn exists_by_username(&self, username: &Username) -> AppResult<bool> {
        with_tx!(self, user_exists_by_username(username))
    }
}

// =============================================================================
// PendingRegistrationRepository 实现
// =============================================================================

#[async_trait]
impl PendingRegistrationRepository for TxPendingRegistrationRepository {
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<PendingRegistration>> {
        with_tx!(self, find_pending_by_email(email))
    }

    async fn upsert(&self, pending: &PendingRegistration) -> AppResult<()> {
        with_tx!(self, upsert_pending(pending))
    }

    async fn delete(&self, email: &Email) -> AppResult<bool> {
        with_tx!(self, delete_pending(email))
    }
}

// =============================================================================
// SocialGraphRepository 实现
// =============================================================================

#[async_trait]
impl SocialGraphRepository for TxSocialGraphRepository {
    async fn add_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool> {
        with_tx!(self, add_follow(follower, followed))
    }

    async fn remove_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool> {
        with_tx!(self, remove_follow(follower, followed))
    }

    async fn list_followers(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>> {
        with_tx!(self, list_followers(user, page))
    }

    async fn list_followed(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>> {
        with_tx!(self, list_followed(user, page))
    }

    async fn list_groups(
        &self,
        user: &UserId,
        page: &Pagination,
    ) -> AppResult<Vec<GroupMembership>> {
        with_tx!(self, list_groups(user, page))
    }

    async fn list_official_account_ids(&self) -> AppResult<Vec<OfficialAccountId>> {
        with_tx!(self, list_official_account_ids())
    }

    async fn add_subscriber(&self, account: &OfficialAccountId, user: &UserId) -> AppResult<()> {
        with_tx!(self, add_subscriber(account, user))
    }
}

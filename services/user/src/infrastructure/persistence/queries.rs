//! 共享 SQL 查询
//!
//! 池上仓库与事务内仓库复用同一份查询逻辑：每个查询是一个
//! Executor 泛型函数，两种仓库只负责提供执行器。

use campus_common::{OfficialAccountId, Pagination, UserId};
use campus_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::domain::group::{Group, GroupMembership};
use crate::domain::pending_registration::PendingRegistration;
use crate::domain::user::{Gender, User};
use crate::domain::value_objects::{Email, HashedPassword, Username};

/// users 表行
#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    email: String,
    username: Option<String>,
    password_hash: String,
    avatar: Option<String>,
    self_intro: Option<String>,
    gender: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, String> {
        let email = Email::new(&self.email).map_err(|e| e.to_string())?;
        let username = match self.username {
            Some(name) => Some(Username::new(name).map_err(|e| e.to_string())?),
            None => None,
        };
        let gender = Gender::try_from(self.gender).map_err(|e| e.to_string())?;

        Ok(User {
            id: UserId::new(self.id),
            email,
            username,
            password_hash: HashedPassword::from_hash(self.password_hash),
            avatar: self.avatar,
            self_intro: self.self_intro,
            gender,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// pending_registrations 表行
#[derive(sqlx::FromRow)]
pub(crate) struct PendingRegistrationRow {
    email: String,
    password_hash: String,
    code: String,
    issued_at: DateTime<Utc>,
}

impl PendingRegistrationRow {
    fn into_pending(self) -> Result<PendingRegistration, String> {
        let email = Email::new(&self.email).map_err(|e| e.to_string())?;

        Ok(PendingRegistration {
            email,
            password_hash: HashedPassword::from_hash(self.password_hash),
            code: self.code,
            issued_at: self.issued_at,
        })
    }
}

/// 群组成员关系行（群组字段加边上的头衔）
#[derive(sqlx::FromRow)]
pub(crate) struct GroupMembershipRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    title: Option<String>,
}

impl GroupMembershipRow {
    fn into_membership(self) -> GroupMembership {
        GroupMembership {
            group: Group {
                id: campus_common::GroupId::new(self.id),
                name: self.name,
                description: self.description,
                created_at: self.created_at,
            },
            title: self.title,
        }
    }
}

fn map_unique_violation(
    e: sqlx::Error,
    constraint: &str,
    conflict_msg: &str,
    context: &str,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some(constraint) {
            return AppError::conflict(conflict_msg);
        }
    }
    AppError::database(format!("{}: {}", context, e))
}

fn rows_to_users(rows: Vec<UserRow>) -> AppResult<Vec<User>> {
    rows.into_iter()
        .map(|r| r.into_user().map_err(AppError::database))
        .collect()
}

// =============================================================================
// users
// =============================================================================

pub(crate) async fn find_user_by_id<'e, E>(executor: E, id: &UserId) -> AppResult<Option<User>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, username, password_hash, avatar, self_intro, gender,
               created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id.value())
    .fetch_optional(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to find user: {}", e)))?;

    row.map(|r| r.into_user().map_err(AppError::database))
        .transpose()
}

pub(crate) async fn find_user_by_email<'e, E>(
    executor: E,
    email: &Email,
) -> AppResult<Option<User>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, username, password_hash, avatar, self_intro, gender,
               created_at, updated_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email.as_str())
    .fetch_optional(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to find user: {}", e)))?;

    row.map(|r| r.into_user().map_err(AppError::database))
        .transpose()
}

pub(crate) async fn find_user_by_username<'e, E>(
    executor: E,
    username: &Username,
) -> AppResult<Option<User>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, username, password_hash, avatar, self_intro, gender,
               created_at, updated_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username.as_str())
    .fetch_optional(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to find user: {}", e)))?;

    row.map(|r| r.into_user().map_err(AppError::database))
        .transpose()
}

/// 用户名子串检索：越短的用户名视为越相关，排在前面
pub(crate) async fn search_users_by_username<'e, E>(
    executor: E,
    keyword: &str,
    page: &Pagination,
) -> AppResult<Vec<User>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, email, username, password_hash, avatar, self_intro, gender,
               created_at, updated_at
        FROM users
        WHERE username LIKE '%' || $1 || '%'
        ORDER BY char_length(username) ASC, id ASC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(keyword)
    .bind(page.offset)
    .bind(page.limit)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to search users: {}", e)))?;

    rows_to_users(rows)
}

pub(crate) async fn create_user<'e, E>(
    executor: E,
    email: &Email,
    password_hash: &HashedPassword,
) -> AppResult<User>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING id, email, username, password_hash, avatar, self_intro, gender,
                  created_at, updated_at
        "#,
    )
    .bind(email.as_str())
    .bind(password_hash.as_str())
    .fetch_one(executor)
    .await
    .map_err(|e| {
        map_unique_violation(
            e,
            "users_email_key",
            "Email already registered",
            "Failed to create user",
        )
    })?;

    row.into_user().map_err(AppError::database)
}

pub(crate) async fn update_user<'e, E>(executor: E, user: &User) -> AppResult<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        UPDATE users
        SET username = $2, password_hash = $3, avatar = $4, self_intro = $5,
            gender = $6, updated_at = $7
        WHERE id = $1
        "#,
    )
    .bind(user.id.value())
    .bind(user.username.as_ref().map(|u| u.as_str()))
    .bind(user.password_hash.as_str())
    .bind(&user.avatar)
    .bind(&user.self_intro)
    .bind(i16::from(user.gender))
    .bind(user.updated_at)
    .execute(executor)
    .await
    .map_err(|e| {
        map_unique_violation(
            e,
            "users_username_key",
            "Username already taken",
            "Failed to update user",
        )
    })?;

    Ok(())
}

pub(crate) async fn user_exists_by_email<'e, E>(executor: E, email: &Email) -> AppResult<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email.as_str())
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to check email existence: {}", e)))
}

pub(crate) async fn user_exists_by_username<'e, E>(
    executor: E,
    username: &Username,
) -> AppResult<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username.as_str())
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to check username existence: {}", e)))
}

// =============================================================================
// pending_registrations
// =============================================================================

pub(crate) async fn find_pending_by_email<'e, E>(
    executor: E,
    email: &Email,
) -> AppResult<Option<PendingRegistration>>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = sqlx::query_as::<_, PendingRegistrationRow>(
        r#"
        SELECT email, password_hash, code, issued_at
        FROM pending_registrations
        WHERE email = $1
        "#,
    )
    .bind(email.as_str())
    .fetch_optional(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to find pending registration: {}", e)))?;

    row.map(|r| r.into_pending().map_err(AppError::database))
        .transpose()
}

/// 原子替换：同邮箱旧记录被覆盖，旧验证码随之作废
pub(crate) async fn upsert_pending<'e, E>(
    executor: E,
    pending: &PendingRegistration,
) -> AppResult<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO pending_registrations (email, password_hash, code, issued_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET password_hash = EXCLUDED.password_hash,
            code = EXCLUDED.code,
            issued_at = EXCLUDED.issued_at
        "#,
    )
    .bind(pending.email.as_str())
    .bind(pending.password_hash.as_str())
    .bind(&pending.code)
    .bind(pending.issued_at)
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to upsert pending registration: {}", e)))?;

    Ok(())
}

pub(crate) async fn delete_pending<'e, E>(executor: E, email: &Email) -> AppResult<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM pending_registrations WHERE email = $1")
        .bind(email.as_str())
        .execute(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to delete pending registration: {}", e)))?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// follows / groups / official accounts
// =============================================================================

pub(crate) async fn add_follow<'e, E>(
    executor: E,
    follower: &UserId,
    followed: &UserId,
) -> AppResult<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO follows (follower_id, followed_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(follower.value())
    .bind(followed.value())
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to add follow edge: {}", e)))?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn remove_follow<'e, E>(
    executor: E,
    follower: &UserId,
    followed: &UserId,
) -> AppResult<bool>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
        .bind(follower.value())
        .bind(followed.value())
        .execute(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove follow edge: {}", e)))?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_followers<'e, E>(
    executor: E,
    user: &UserId,
    page: &Pagination,
) -> AppResult<Vec<User>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT u.id, u.email, u.username, u.password_hash, u.avatar, u.self_intro,
               u.gender, u.created_at, u.updated_at
        FROM users u
        INNER JOIN follows f ON f.follower_id = u.id
        WHERE f.followed_id = $1
        ORDER BY f.created_at ASC, u.id ASC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(user.value())
    .bind(page.offset)
    .bind(page.limit)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to list followers: {}", e)))?;

    rows_to_users(rows)
}

pub(crate) async fn list_followed<'e, E>(
    executor: E,
    user: &UserId,
    page: &Pagination,
) -> AppResult<Vec<User>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT u.id, u.email, u.username, u.password_hash, u.avatar, u.self_intro,
               u.gender, u.created_at, u.updated_at
        FROM users u
        INNER JOIN follows f ON f.followed_id = u.id
        WHERE f.follower_id = $1
        ORDER BY f.created_at ASC, u.id ASC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(user.value())
    .bind(page.offset)
    .bind(page.limit)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to list followed users: {}", e)))?;

    rows_to_users(rows)
}

pub(crate) async fn list_groups<'e, E>(
    executor: E,
    user: &UserId,
    page: &Pagination,
) -> AppResult<Vec<GroupMembership>>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, GroupMembershipRow>(
        r#"
        SELECT g.id, g.name, g.description, g.created_at, m.title
        FROM groups g
        INNER JOIN group_members m ON m.group_id = g.id
        WHERE m.user_id = $1
        ORDER BY m.created_at ASC, g.id ASC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(user.value())
    .bind(page.offset)
    .bind(page.limit)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to list groups: {}", e)))?;

    Ok(rows.into_iter().map(|r| r.into_membership()).collect())
}

pub(crate) async fn list_official_account_ids<'e, E>(
    executor: E,
) -> AppResult<Vec<OfficialAccountId>>
where
    E: Executor<'e, Database = Postgres>,
{
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM official_accounts ORDER BY id ASC")
        .fetch_all(executor)
        .await
        .map_err(|e| AppError::database(format!("Failed to list official accounts: {}", e)))?;

    Ok(ids.into_iter().map(OfficialAccountId::new).collect())
}

pub(crate) async fn add_subscriber<'e, E>(
    executor: E,
    account: &OfficialAccountId,
    user: &UserId,
) -> AppResult<()>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO official_account_subscribers (account_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(account.value())
    .bind(user.value())
    .execute(executor)
    .await
    .map_err(|e| AppError::database(format!("Failed to add subscriber: {}", e)))?;

    Ok(())
}

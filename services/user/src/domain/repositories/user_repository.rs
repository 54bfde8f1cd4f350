//! 用户 Repository trait

use async_trait::async_trait;
use campus_common::{Pagination, UserId};
use campus_errors::AppResult;

use crate::domain::user::User;
use crate::domain::value_objects::{Email, HashedPassword, Username};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>>;

    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>>;

    /// 根据用户名精确查找用户
    async fn find_by_username(&self, username: &Username) -> AppResult<Option<User>>;

    /// 用户名子串模糊检索，按用户名长度升序（越短越靠前）分页
    async fn search_by_username(&self, keyword: &str, page: &Pagination) -> AppResult<Vec<User>>;

    /// 创建用户；数字身份由存储层序列分配
    ///
    /// 邮箱唯一约束冲突映射为 `Conflict`（编排层已检查过，这里兜底）。
    async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AppResult<User>;

    /// 更新用户
    async fn update(&self, user: &User) -> AppResult<()>;

    /// 检查邮箱是否已属于正式用户
    async fn exists_by_email(&self, email: &Email) -> AppResult<bool>;

    /// 检查用户名是否已被占用
    async fn exists_by_username(&self, username: &Username) -> AppResult<bool>;
}

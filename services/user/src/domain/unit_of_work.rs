//! Unit of Work 模式
//!
//! 提供跨多个 Repository 的事务协调能力。账号创建、待验证记录删除与
//! 默认关系播种必须是同一个原子单元，靠它来保证。

use async_trait::async_trait;
use campus_errors::AppResult;

use crate::domain::repositories::{
    PendingRegistrationRepository, SocialGraphRepository, UserRepository,
};

/// Unit of Work trait
///
/// 协调多个 Repository 在同一事务中的操作。
///
/// # 使用示例
///
/// ```ignore
/// let uow = uow_factory.begin().await?;
///
/// let user = uow.users().create(&email, &hash).await?;
/// uow.pending_registrations().delete(&email).await?;
///
/// uow.commit().await?;
/// ```
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 获取用户 Repository
    fn users(&self) -> &dyn UserRepository;

    /// 获取待验证注册记录 Repository
    fn pending_registrations(&self) -> &dyn PendingRegistrationRepository;

    /// 获取社交图谱 Repository
    fn social_graph(&self) -> &dyn SocialGraphRepository;

    /// 提交事务
    ///
    /// 成功时所有更改持久化，失败时自动回滚。
    async fn commit(self: Box<Self>) -> AppResult<()>;

    /// 回滚事务
    async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// Unit of Work 工厂 trait
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开始新的事务
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;
}

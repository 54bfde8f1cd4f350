//! 待验证注册记录 Repository trait

use async_trait::async_trait;
use campus_errors::AppResult;

use crate::domain::pending_registration::PendingRegistration;
use crate::domain::value_objects::Email;

#[async_trait]
pub trait PendingRegistrationRepository: Send + Sync {
    /// 根据邮箱查找在途记录
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<PendingRegistration>>;

    /// 原子替换：同邮箱已有记录被无条件覆盖（后提交者胜，旧验证码作废）
    async fn upsert(&self, pending: &PendingRegistration) -> AppResult<()>;

    /// 删除记录；返回是否确实删除了一行
    ///
    /// 并发消费的判定依据：删到行的调用者独占这次晋升。
    async fn delete(&self, email: &Email) -> AppResult<bool>;
}

//! 社交图谱 Repository trait
//!
//! 关注关系与群组/公众号成员关系都建模为 (from, to) 键控的边集，
//! 幂等检查 O(1)，不使用双向对象引用。

use async_trait::async_trait;
use campus_common::{OfficialAccountId, Pagination, UserId};
use campus_errors::AppResult;

use crate::domain::group::GroupMembership;
use crate::domain::user::User;

#[async_trait]
pub trait SocialGraphRepository: Send + Sync {
    /// 幂等新增关注边；返回是否新建（false 表示边已存在）
    async fn add_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool>;

    /// 幂等删除关注边；返回是否确有删除（false 表示边本就不存在）
    async fn remove_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool>;

    /// 关注该用户的人，按边创建时间稳定分页
    async fn list_followers(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>>;

    /// 该用户关注的人，按边创建时间稳定分页
    async fn list_followed(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>>;

    /// 该用户所在的群组，附带其在群内的头衔
    async fn list_groups(&self, user: &UserId, page: &Pagination)
    -> AppResult<Vec<GroupMembership>>;

    /// 全部公众号 ID
    async fn list_official_account_ids(&self) -> AppResult<Vec<OfficialAccountId>>;

    /// 将用户加入公众号订阅名单（幂等）
    async fn add_subscriber(&self, account: &OfficialAccountId, user: &UserId) -> AppResult<()>;
}

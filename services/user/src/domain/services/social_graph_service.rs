//! 社交图谱服务
//!
//! 关注/取关、名单列举与新账号默认关系播种。关注与取关都是幂等的：
//! 重复请求报告空操作而不是报错。目标用户的存在性由调用方通过
//! 缓存查找协作方先行确认。

use std::sync::Arc;

use campus_common::{Pagination, UserId};
use campus_errors::{AppError, AppResult};
use tracing::{debug, info};

use crate::domain::group::GroupMembership;
use crate::domain::repositories::SocialGraphRepository;
use crate::domain::unit_of_work::UnitOfWork;
use crate::domain::user::UserProfile;

/// 关注操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    AlreadyFollowed,
}

/// 取关操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnfollowOutcome {
    Unfollowed,
    AlreadyUnfollowed,
}

/// 社交图谱服务
pub struct SocialGraphService {
    graph_repo: Arc<dyn SocialGraphRepository>,
    bootstrap_account_id: UserId,
}

impl SocialGraphService {
    pub fn new(graph_repo: Arc<dyn SocialGraphRepository>, bootstrap_account_id: UserId) -> Self {
        Self {
            graph_repo,
            bootstrap_account_id,
        }
    }

    /// 关注目标用户
    pub async fn follow(&self, follower: &UserId, target: &UserId) -> AppResult<FollowOutcome> {
        if follower == target {
            return Err(AppError::conflict("Cannot follow yourself"));
        }

        let created = self.graph_repo.add_follow(follower, target).await?;
        if created {
            info!(follower = %follower, target = %target, "Follow edge created");
            Ok(FollowOutcome::Followed)
        } else {
            debug!(follower = %follower, target = %target, "Follow edge already present");
            Ok(FollowOutcome::AlreadyFollowed)
        }
    }

    /// 取消关注目标用户
    pub async fn unfollow(&self, follower: &UserId, target: &UserId) -> AppResult<UnfollowOutcome> {
        let removed = self.graph_repo.remove_follow(follower, target).await?;
        if removed {
            info!(follower = %follower, target = %target, "Follow edge removed");
            Ok(UnfollowOutcome::Unfollowed)
        } else {
            debug!(follower = %follower, target = %target, "Follow edge already absent");
            Ok(UnfollowOutcome::AlreadyUnfollowed)
        }
    }

    /// 关注该用户的人，按边创建时间稳定分页
    pub async fn list_followers(
        &self,
        user: &UserId,
        page: &Pagination,
    ) -> AppResult<Vec<UserProfile>> {
        let users = self.graph_repo.list_followers(user, page).await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    /// 该用户关注的人，按边创建时间稳定分页
    pub async fn list_followed(
        &self,
        user: &UserId,
        page: &Pagination,
    ) -> AppResult<Vec<UserProfile>> {
        let users = self.graph_repo.list_followed(user, page).await?;
        Ok(users.iter().map(|u| u.profile()).collect())
    }

    /// 该用户所在的群组（附成员头衔）
    pub async fn list_groups(
        &self,
        user: &UserId,
        page: &Pagination,
    ) -> AppResult<Vec<GroupMembership>> {
        self.graph_repo.list_groups(user, page).await
    }

    /// 新账号默认关系播种：被引导账号关注、订阅全部公众号
    ///
    /// 在账号创建的同一个工作单元内执行，保证不存在没有默认订阅的用户。
    pub async fn seed_bootstrap_edges(
        &self,
        uow: &dyn UnitOfWork,
        new_user: &UserId,
    ) -> AppResult<()> {
        let graph = uow.social_graph();

        // 引导账号即平台首个账号：它自己注册时既不存在也不自我关注
        let bootstrap_exists = uow
            .users()
            .find_by_id(&self.bootstrap_account_id)
            .await?
            .is_some();
        if bootstrap_exists && &self.bootstrap_account_id != new_user {
            graph
                .add_follow(&self.bootstrap_account_id, new_user)
                .await?;
        }

        let accounts = graph.list_official_account_ids().await?;
        for account in &accounts {
            graph.add_subscriber(account, new_user).await?;
        }

        info!(
            user_id = %new_user,
            subscriptions = accounts.len(),
            "Bootstrap edges seeded for new user"
        );
        Ok(())
    }
}

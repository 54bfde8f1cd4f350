//! 用户查询定义

use campus_common::{Pagination, UserId};
use campus_cqrs_core::Query;

use crate::domain::group::GroupMembership;
use crate::domain::user::UserProfile;

/// 按 ID 查询用户
#[derive(Debug, Clone)]
pub struct GetUserByIdQuery {
    pub id: UserId,
}

impl Query for GetUserByIdQuery {
    type Result = UserProfile;
}

/// 按用户名精确查询用户
#[derive(Debug, Clone)]
pub struct GetUserByUsernameQuery {
    pub username: String,
}

impl Query for GetUserByUsernameQuery {
    type Result = UserProfile;
}

/// 用户名子串检索，按用户名长度升序分页
#[derive(Debug, Clone)]
pub struct SearchUsersQuery {
    pub keyword: String,
    pub page: Pagination,
}

impl Query for SearchUsersQuery {
    type Result = Vec<UserProfile>;
}

/// 查询关注该用户的人
#[derive(Debug, Clone)]
pub struct ListFollowersQuery {
    pub user_id: UserId,
    pub page: Pagination,
}

impl Query for ListFollowersQuery {
    type Result = Vec<UserProfile>;
}

/// 查询该用户关注的人
#[derive(Debug, Clone)]
pub struct ListFollowedQuery {
    pub user_id: UserId,
    pub page: Pagination,
}

impl Query for ListFollowedQuery {
    type Result = Vec<UserProfile>;
}

/// 查询该用户所在群组（附成员头衔）
#[derive(Debug, Clone)]
pub struct ListGroupsQuery {
    pub user_id: UserId,
    pub page: Pagination,
}

impl Query for ListGroupsQuery {
    type Result = Vec<GroupMembership>;
}

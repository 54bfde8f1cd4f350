//! 用户命令定义

use campus_common::UserId;
use campus_cqrs_core::Command;
use serde::Serialize;

use crate::domain::services::{FollowOutcome, ProfileChange, UnfollowOutcome};
use crate::domain::user::UserProfile;

/// 受理注册申请命令
#[derive(Debug, Clone)]
pub struct BeginRegistrationCommand {
    pub email: String,
    pub password: String,
}

/// 受理注册申请结果
#[derive(Debug, Clone, Serialize)]
pub struct BeginRegistrationResult {
    pub message: String,
    pub expires_in_seconds: i64,
}

impl Command for BeginRegistrationCommand {
    type Result = BeginRegistrationResult;
}

/// 完成注册命令（已持有验证码）
#[derive(Debug, Clone)]
pub struct FinalizeRegistrationCommand {
    pub email: String,
    pub code: String,
}

/// 完成注册结果：用户投影、鉴权令牌与有效期（秒）
#[derive(Debug, Clone, Serialize)]
pub struct FinalizeRegistrationResult {
    pub user: UserProfile,
    pub token: String,
    pub expiration: i64,
}

impl Command for FinalizeRegistrationCommand {
    type Result = FinalizeRegistrationResult;
}

/// 资料变更命令：一次恰好一类字段
#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub user_id: UserId,
    pub change: ProfileChange,
}

impl Command for UpdateProfileCommand {
    type Result = UserProfile;
}

/// 关注命令
#[derive(Debug, Clone)]
pub struct FollowUserCommand {
    pub follower: UserId,
    pub target: UserId,
}

impl Command for FollowUserCommand {
    type Result = FollowOutcome;
}

/// 取关命令
#[derive(Debug, Clone)]
pub struct UnfollowUserCommand {
    pub follower: UserId,
    pub target: UserId,
}

impl Command for UnfollowUserCommand {
    type Result = UnfollowOutcome;
}

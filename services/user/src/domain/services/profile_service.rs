//! 资料服务
//!
//! 用户资料的单类目变更。变更集建模为带标签的枚举：一次调用恰好
//! 改一类字段，多字段更新拆成多次调用。

use std::sync::Arc;

use campus_auth_core::TokenIssuer;
use campus_common::UserId;
use campus_errors::{AppError, AppResult};
use tracing::{debug, info, warn};

use crate::domain::repositories::UserRepository;
use crate::domain::user::{Gender, UserProfile};
use crate::domain::value_objects::{HashedPassword, Username, validate_new_password};

/// 资料变更（一次调用仅一类）
#[derive(Debug, Clone)]
pub enum ProfileChange {
    /// 修改密码：需提供当前密码
    Password { old: String, new: String },
    /// 更换头像（不做格式校验）
    Avatar(String),
    /// 修改用户名
    Username(String),
    /// 修改自我介绍（不做格式校验）
    SelfIntro(String),
    /// 修改性别（0 未知 / 1 男 / 2 女）
    Gender(i16),
}

/// 资料服务
pub struct ProfileService {
    user_repo: Arc<dyn UserRepository>,
    token_issuer: Arc<dyn TokenIssuer>,
}

impl ProfileService {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_issuer: Arc<dyn TokenIssuer>) -> Self {
        Self {
            user_repo,
            token_issuer,
        }
    }

    /// 应用一次资料变更并返回更新后的投影
    ///
    /// 所有校验先于写入；校验失败不产生任何持久化副作用。
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        change: ProfileChange,
    ) -> AppResult<UserProfile> {
        debug!(user_id = %user_id, "Applying profile change");

        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        match change {
            ProfileChange::Password { old, new } => {
                if !user.password_hash.verify(&old)? {
                    warn!(user_id = %user_id, "Password change rejected, old password mismatch");
                    return Err(AppError::unauthenticated("Old password does not match"));
                }
                validate_new_password(&new)?;

                user.change_password(HashedPassword::from_plain(&new)?);
                self.user_repo.update(&user).await?;

                // 此前签发的所有令牌强制失效
                self.token_issuer.invalidate_all(user_id).await?;

                info!(user_id = %user_id, "Password changed, all prior tokens invalidated");
            }
            ProfileChange::Avatar(avatar) => {
                user.set_avatar(avatar);
                self.user_repo.update(&user).await?;
            }
            ProfileChange::Username(username) => {
                let username =
                    Username::new(username).map_err(|e| AppError::validation(e.to_string()))?;

                if user.username.as_ref() == Some(&username) {
                    return Err(AppError::validation("Username unchanged"));
                }
                if self.user_repo.exists_by_username(&username).await? {
                    return Err(AppError::conflict("Username already taken"));
                }

                user.change_username(username);
                self.user_repo.update(&user).await?;

                info!(user_id = %user_id, username = %user.username.as_ref().map(|u| u.as_str()).unwrap_or_default(), "Username changed");
            }
            ProfileChange::SelfIntro(self_intro) => {
                user.set_self_intro(self_intro);
                self.user_repo.update(&user).await?;
            }
            ProfileChange::Gender(code) => {
                let gender = Gender::try_from(code)?;
                user.set_gender(gender);
                self.user_repo.update(&user).await?;
            }
        }

        Ok(user.profile())
    }
}

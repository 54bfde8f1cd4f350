//! 鉴权提取器

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use campus_errors::AppError;

use super::error::ApiError;
use super::state::AppState;
use crate::domain::user::User;

/// 已认证用户提取器
///
/// Bearer 令牌校验（含失效下限检查）后经读穿缓存加载当前用户。
pub struct AuthUser(pub User);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError(AppError::unauthenticated("Missing bearer token")))?;

        let claims = state.token_issuer.validate(token).await.map_err(ApiError)?;
        let user_id = claims.user_id().map_err(ApiError)?;

        let user = state
            .user_cache
            .get_user(&user_id)
            .await
            .map_err(ApiError)?
            .ok_or_else(|| ApiError(AppError::unauthenticated("User no longer exists")))?;

        Ok(Self(user))
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        if bearer_token(parts).is_none() {
            return Ok(None);
        }

        <Self as FromRequestParts<AppState>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

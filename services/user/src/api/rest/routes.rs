//! REST 路由

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, extract::Query, extract::State};
use campus_common::{Pagination, UserId};
use campus_cqrs_core::{CommandHandler, QueryHandler};
use campus_errors::AppError;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use super::error::ApiResult;
use super::extractors::AuthUser;
use super::state::AppState;
use crate::application::commands::user::{
    BeginRegistrationCommand, FinalizeRegistrationCommand, FollowUserCommand,
    UnfollowUserCommand, UpdateProfileCommand,
};
use crate::application::queries::user::{
    GetUserByIdQuery, GetUserByUsernameQuery, ListFollowedQuery, ListFollowersQuery,
    ListGroupsQuery, SearchUsersQuery,
};
use crate::domain::services::{FollowOutcome, ProfileChange, UnfollowOutcome};

/// 组装完整路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/user",
            get(get_user).patch(change_user).post(create_user),
        )
        .route("/api/user/waiting", axum::routing::post(create_pending_registration))
        .route("/api/user/follower", get(get_user_followers))
        .route(
            "/api/user/followed",
            get(get_user_followed)
                .post(create_user_followed)
                .delete(delete_user_followed),
        )
        .route("/api/user/group", get(get_user_groups))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    campus_adapter_postgres::check_connection(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}

// =============================================================================
// 查询
// =============================================================================

#[derive(Debug, Deserialize)]
struct GetUserParams {
    id: Option<i64>,
    username: Option<String>,
    keyword: Option<String>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl GetUserParams {
    fn pagination(&self) -> Pagination {
        Pagination::new(self.offset.unwrap_or(0), self.limit.unwrap_or(10))
    }
}

/// 按 id / 用户名 / 关键词获取用户；无参数时返回当前登录用户
async fn get_user(
    State(state): State<AppState>,
    Query(params): Query<GetUserParams>,
    current: Option<AuthUser>,
) -> ApiResult<Response> {
    if let Some(id) = params.id {
        let profile = state
            .queries
            .handle(GetUserByIdQuery {
                id: UserId::new(id),
            })
            .await?;
        return Ok(Json(profile).into_response());
    }

    if let Some(username) = params.username.clone().filter(|u| !u.is_empty()) {
        let profile = state
            .queries
            .handle(GetUserByUsernameQuery { username })
            .await?;
        return Ok(Json(profile).into_response());
    }

    if let Some(keyword) = params.keyword.clone().filter(|k| !k.is_empty()) {
        let page = params.pagination();
        let profiles = state
            .queries
            .handle(SearchUsersQuery { keyword, page })
            .await?;
        return Ok(Json(profiles).into_response());
    }

    let AuthUser(user) =
        current.ok_or_else(|| AppError::unauthenticated("Authentication required"))?;
    Ok(Json(user.profile()).into_response())
}

#[derive(Debug, Deserialize)]
struct ListParams {
    id: Option<i64>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl ListParams {
    fn user_id(&self) -> ApiResult<UserId> {
        self.id
            .map(UserId::new)
            .ok_or_else(|| AppError::not_found("User not found").into())
    }

    fn pagination(&self) -> Pagination {
        Pagination::new(self.offset.unwrap_or(0), self.limit.unwrap_or(10))
    }
}

async fn get_user_followers(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let profiles = state
        .queries
        .handle(ListFollowersQuery {
            user_id: params.user_id()?,
            page: params.pagination(),
        })
        .await?;
    Ok(Json(profiles).into_response())
}

async fn get_user_followed(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let profiles = state
        .queries
        .handle(ListFollowedQuery {
            user_id: params.user_id()?,
            page: params.pagination(),
        })
        .await?;
    Ok(Json(profiles).into_response())
}

async fn get_user_groups(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let memberships = state
        .queries
        .handle(ListGroupsQuery {
            user_id: params.user_id()?,
            page: params.pagination(),
        })
        .await?;
    Ok(Json(memberships).into_response())
}

// =============================================================================
// 资料变更
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct ChangeUserBody {
    password_old: Option<String>,
    password_new: Option<String>,
    avatar: Option<String>,
    self_intro: Option<String>,
    username: Option<String>,
    gender: Option<i16>,
}

impl ChangeUserBody {
    /// 一次请求只能更改其中的一项
    fn into_change(self) -> Result<ProfileChange, AppError> {
        let mut changes = Vec::new();

        match (self.password_old, self.password_new) {
            (Some(old), Some(new)) => changes.push(ProfileChange::Password { old, new }),
            (None, None) => {}
            _ => {
                return Err(AppError::validation(
                    "Password change requires both password_old and password_new",
                ));
            }
        }
        if let Some(avatar) = self.avatar {
            changes.push(ProfileChange::Avatar(avatar));
        }
        if let Some(username) = self.username {
            changes.push(ProfileChange::Username(username));
        }
        if let Some(self_intro) = self.self_intro {
            changes.push(ProfileChange::SelfIntro(self_intro));
        }
        if let Some(gender) = self.gender {
            changes.push(ProfileChange::Gender(gender));
        }

        let mut iter = changes.into_iter();
        match (iter.next(), iter.next()) {
            (Some(change), None) => Ok(change),
            (None, _) => Err(AppError::validation("No profile change supplied")),
            (Some(_), Some(_)) => Err(AppError::validation(
                "Exactly one profile field category per request",
            )),
        }
    }
}

async fn change_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ChangeUserBody>,
) -> ApiResult<Response> {
    let change = body.into_change()?;

    let profile = state
        .update_profile
        .handle(UpdateProfileCommand {
            user_id: user.id,
            change,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

// =============================================================================
// 关注关系
// =============================================================================

#[derive(Debug, Deserialize)]
struct FollowBody {
    id: i64,
}

async fn create_user_followed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(body): Json<FollowBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let outcome = state
        .follow_user
        .handle(FollowUserCommand {
            follower: user.id,
            target: UserId::new(body.id),
        })
        .await?;

    let message = match outcome {
        FollowOutcome::Followed => "followed success",
        FollowOutcome::AlreadyFollowed => "already followed",
    };
    Ok(Json(json!({ "message": message })))
}

#[derive(Debug, Deserialize)]
struct UnfollowParams {
    id: i64,
}

async fn delete_user_followed(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<UnfollowParams>,
) -> ApiResult<Json<serde_json::Value>> {
    let outcome = state
        .unfollow_user
        .handle(UnfollowUserCommand {
            follower: user.id,
            target: UserId::new(params.id),
        })
        .await?;

    let message = match outcome {
        UnfollowOutcome::Unfollowed => "unfollow success",
        UnfollowOutcome::AlreadyUnfollowed => "already unfollowed",
    };
    Ok(Json(json!({ "message": message })))
}

// =============================================================================
// 注册
// =============================================================================

#[derive(Debug, Deserialize)]
struct CreatePendingBody {
    email: String,
    password: String,
}

/// 受理注册申请并发送验证码邮件
async fn create_pending_registration(
    State(state): State<AppState>,
    Json(body): Json<CreatePendingBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let result = state
        .begin_registration
        .handle(BeginRegistrationCommand {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(json!({
        "message": result.message,
        "expires_in_seconds": result.expires_in_seconds,
    })))
}

/// 验证码既接受字符串也接受数字（数字补齐前导零到 6 位）
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CodeValue {
    Str(String),
    Num(i64),
}

impl CodeValue {
    fn into_string(self) -> String {
        match self {
            Self::Str(s) => s,
            Self::Num(n) => format!("{:06}", n),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateUserBody {
    email: String,
    verification_code: CodeValue,
}

/// 完成注册（已持有验证码）
async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserBody>,
) -> ApiResult<Response> {
    let result = state
        .finalize_registration
        .handle(FinalizeRegistrationCommand {
            email: body.email,
            code: body.verification_code.into_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(result)).into_response())
}

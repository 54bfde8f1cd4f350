//! REST 错误映射

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use campus_errors::AppError;
use tracing::error;

/// REST 层错误包装：`AppError` 映射为 Problem Details 响应
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = self.0.to_problem_details();
        let status = StatusCode::from_u16(details.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed with server error");
        }

        (status, Json(details)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

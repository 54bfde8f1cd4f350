//! REST 接口
//!
//! 线级契约不是规范性的：路由存在是为了端到端驱动核心逻辑，
//! 字段形态沿用上游客户端的习惯。

mod error;
mod extractors;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use extractors::AuthUser;
pub use routes::router;
pub use state::AppState;

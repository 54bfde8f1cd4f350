//! 用户服务
//!
//! 注册验证、账号目录与社交图谱。

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

//! PostgreSQL 适配器
//!
//! 连接池构建与健康检查

mod connection;

pub use connection::*;

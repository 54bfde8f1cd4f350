//! Redis 适配器
//!
//! `CachePort` 的 Redis 实现

mod cache;
mod connection;

pub use cache::RedisCache;
pub use connection::{check_connection, create_connection_manager};

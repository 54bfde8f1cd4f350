//! Cache trait 定义

use async_trait::async_trait;
use campus_errors::AppResult;
use std::time::Duration;

/// 缓存 trait
#[async_trait]
pub trait CachePort: Send + Sync {
    /// 获取缓存值
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// 设置缓存值
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()>;

    /// 删除缓存
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// 检查是否存在
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// 设置过期时间
    async fn expire(&self, key: &str, ttl: Duration) -> AppResult<()>;

    /// 原子性递增计数器；键不存在时创建并设置 TTL，返回递增后的值
    async fn incr_with_ttl(&self, key: &str, ttl_secs: u64) -> AppResult<i64>;
}

//! 用户读穿缓存
//!
//! 身份查找的间接层：命中返回缓存投影，未命中回源用户目录并回填。
//! 缓存语义不承担目录自身的一致性保证，资料变更后由调用方失效条目。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use campus_common::UserId;
use campus_errors::AppResult;
use campus_ports::CachePort;
use tracing::{debug, warn};

use crate::domain::repositories::UserRepository;
use crate::domain::user::User;

/// 用户查找缓存接口
///
/// 约定：不存在或不可加载的 ID 一律返回 `None`。
#[async_trait]
pub trait UserLookupCache: Send + Sync {
    /// 按 ID 获取用户
    async fn get_user(&self, id: &UserId) -> AppResult<Option<User>>;

    /// 失效缓存条目（资料变更后调用）
    async fn invalidate(&self, id: &UserId) -> AppResult<()>;
}

/// Redis 读穿缓存实现
pub struct RedisUserCache {
    cache: Arc<dyn CachePort>,
    user_repo: Arc<dyn UserRepository>,
    ttl: Duration,
}

impl RedisUserCache {
    pub fn new(
        cache: Arc<dyn CachePort>,
        user_repo: Arc<dyn UserRepository>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            user_repo,
            ttl,
        }
    }

    fn cache_key(id: &UserId) -> String {
        format!("user:{}", id)
    }
}

#[async_trait]
impl UserLookupCache for RedisUserCache {
    async fn get_user(&self, id: &UserId) -> AppResult<Option<User>> {
        let key = Self::cache_key(id);

        if let Some(raw) = self.cache.get(&key).await? {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    debug!(user_id = %id, "User cache hit");
                    return Ok(Some(user));
                }
                Err(e) => {
                    // 损坏条目丢弃后回源
                    warn!(user_id = %id, error = %e, "Dropping corrupt user cache entry");
                    self.cache.delete(&key).await?;
                }
            }
        }

        let user = self.user_repo.find_by_id(id).await?;

        if let Some(user) = &user {
            let raw = serde_json::to_string(user)
                .map_err(|e| campus_errors::AppError::internal(e.to_string()))?;
            self.cache.set(&key, &raw, Some(self.ttl)).await?;
            debug!(user_id = %id, "User cache filled");
        }

        Ok(user)
    }

    async fn invalidate(&self, id: &UserId) -> AppResult<()> {
        self.cache.delete(&Self::cache_key(id)).await
    }
}

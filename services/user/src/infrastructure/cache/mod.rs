//! 缓存层

mod user_cache;

pub use user_cache::{RedisUserCache, UserLookupCache};

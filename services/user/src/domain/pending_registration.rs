//! 待验证注册记录
//!
//! 以邮箱为主键的临时实体：同一邮箱最多一条在途记录，新提交无条件
//! 覆盖旧记录。消费是破坏性的，并且必须与用户创建同处一个事务。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Email, HashedPassword};

/// 待验证注册记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// 邮箱（主键）
    pub email: Email,
    /// 口令散列
    pub password_hash: HashedPassword,
    /// 一次性验证码（6 位数字）
    pub code: String,
    /// 签发时间
    pub issued_at: DateTime<Utc>,
}

impl PendingRegistration {
    /// 创建新记录并生成验证码
    pub fn new(email: Email, password_hash: HashedPassword) -> Self {
        Self {
            email,
            password_hash,
            code: Self::generate_code(),
            issued_at: Utc::now(),
        }
    }

    /// 生成 6 位数字验证码
    fn generate_code() -> String {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        format!("{:06}", rng.gen_range(0..1_000_000))
    }

    /// 验证码完全一致且在有效期内才可消费
    pub fn is_consumable(&self, code: &str, ttl: Duration) -> bool {
        self.code == code && !self.is_expired(ttl)
    }

    /// 检查是否过期
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() > self.issued_at + ttl
    }

    /// 获取剩余有效时间（秒）
    pub fn remaining_seconds(&self, ttl: Duration) -> i64 {
        let expires_at = self.issued_at + ttl;
        (expires_at.timestamp() - Utc::now().timestamp()).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::minutes(15)
    }

    fn create_pending() -> PendingRegistration {
        let email = Email::new("new@example.com").unwrap();
        let password_hash = HashedPassword::from_hash("$argon2id$test_hash".to_string());
        PendingRegistration::new(email, password_hash)
    }

    #[test]
    fn test_code_is_six_digits() {
        let pending = create_pending();

        assert_eq!(pending.code.len(), 6);
        assert!(pending.code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_fresh_record_is_consumable_with_exact_code() {
        let pending = create_pending();

        assert!(pending.is_consumable(&pending.code.clone(), ttl()));
        assert!(!pending.is_consumable("000000x", ttl()));
    }

    #[test]
    fn test_wrong_code_is_not_consumable() {
        let mut pending = create_pending();
        pending.code = "123456".to_string();

        assert!(!pending.is_consumable("654321", ttl()));
        // 前缀或空串都不算匹配
        assert!(!pending.is_consumable("12345", ttl()));
        assert!(!pending.is_consumable("", ttl()));
    }

    #[test]
    fn test_expired_record_is_not_consumable() {
        let mut pending = create_pending();
        pending.issued_at = Utc::now() - Duration::minutes(16);

        assert!(pending.is_expired(ttl()));
        assert!(!pending.is_consumable(&pending.code.clone(), ttl()));
        assert_eq!(pending.remaining_seconds(ttl()), 0);
    }

    #[test]
    fn test_remaining_seconds_counts_down() {
        let pending = create_pending();

        let remaining = pending.remaining_seconds(ttl());
        assert!(remaining > 0);
        assert!(remaining <= 15 * 60);
    }
}

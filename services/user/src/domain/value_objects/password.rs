//! 密码值对象与密码策略
//!
//! 两套策略并存：
//! - 注册策略：至少 8 位，仅限字母和数字，且至少各含一个字母和数字。
//! - 改密策略：长度大于 5 且小于 17（两端排除）。
//!
//! 两者的不一致来自上游业务规则，按原样保留，不做统一。

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use std::fmt;

const REGISTRATION_MIN_LEN: usize = 8;
const CHANGE_MIN_EXCLUSIVE: usize = 5;
const CHANGE_MAX_EXCLUSIVE: usize = 17;

/// 注册密码策略
pub fn validate_registration_password(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < REGISTRATION_MIN_LEN {
        return Err(PasswordError::TooShort(REGISTRATION_MIN_LEN));
    }

    if !password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(PasswordError::InvalidCharacters);
    }

    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(PasswordError::MissingLetterOrDigit);
    }

    Ok(())
}

/// 改密策略
pub fn validate_new_password(password: &str) -> Result<(), PasswordError> {
    let len = password.chars().count();
    if len <= CHANGE_MIN_EXCLUSIVE || len >= CHANGE_MAX_EXCLUSIVE {
        return Err(PasswordError::LengthOutOfRange {
            min_exclusive: CHANGE_MIN_EXCLUSIVE,
            max_exclusive: CHANGE_MAX_EXCLUSIVE,
        });
    }
    Ok(())
}

/// 哈希后的密码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashedPassword(pub String);

impl HashedPassword {
    /// 从明文密码创建哈希密码
    ///
    /// 不做策略校验；调用方按场景选择注册策略或改密策略先行校验。
    pub fn from_plain(plain_password: &str) -> Result<Self, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(plain_password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
            .to_string();

        Ok(Self(password_hash))
    }

    /// 验证明文密码是否匹配
    pub fn verify(&self, plain_password: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(&self.0).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(plain_password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// 从已有的哈希字符串创建
    pub fn from_hash(hash: String) -> Self {
        Self(hash)
    }

    /// 获取字符串引用
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Password 错误
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password is too short (minimum {0} characters)")]
    TooShort(usize),

    #[error("Password may only contain letters and digits")]
    InvalidCharacters,

    #[error("Password must contain at least one letter and one digit")]
    MissingLetterOrDigit,

    #[error(
        "Password length must be greater than {min_exclusive} and less than {max_exclusive} characters"
    )]
    LengthOutOfRange {
        min_exclusive: usize,
        max_exclusive: usize,
    },

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

impl From<PasswordError> for campus_errors::AppError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::HashingFailed(_) | PasswordError::InvalidHash(_) => {
                campus_errors::AppError::internal(err.to_string())
            }
            _ => campus_errors::AppError::validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_policy() {
        assert!(validate_registration_password("pass1234").is_ok());
        assert!(validate_registration_password("A1b2C3d4e5").is_ok());

        // 不足 8 位
        assert!(validate_registration_password("pass123").is_err());

        // 缺字母或缺数字
        assert!(matches!(
            validate_registration_password("12345678"),
            Err(PasswordError::MissingLetterOrDigit)
        ));
        assert!(matches!(
            validate_registration_password("abcdefgh"),
            Err(PasswordError::MissingLetterOrDigit)
        ));

        // 仅限字母和数字
        assert!(matches!(
            validate_registration_password("pass 1234"),
            Err(PasswordError::InvalidCharacters)
        ));
        assert!(validate_registration_password("pass!1234").is_err());
    }

    #[test]
    fn test_change_policy_exclusive_bounds() {
        // 长度 6 到 16 可用
        assert!(validate_new_password("abc123").is_ok());
        assert!(validate_new_password("a".repeat(16).as_str()).is_ok());

        // 5 与 17 都被排除
        assert!(validate_new_password("abc12").is_err());
        assert!(validate_new_password("a".repeat(17).as_str()).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = HashedPassword::from_plain("pass1234").unwrap();

        assert!(hashed.verify("pass1234").unwrap());
        assert!(!hashed.verify("wrongpass1").unwrap());
        assert_ne!(hashed.as_str(), "pass1234");
    }

    #[test]
    fn test_display_redacts_hash() {
        let hashed = HashedPassword::from_plain("pass1234").unwrap();
        assert_eq!(format!("{}", hashed), "[REDACTED]");
    }

    #[test]
    fn test_verify_rejects_corrupt_hash() {
        let hashed = HashedPassword::from_hash("not-a-phc-string".to_string());
        assert!(hashed.verify("pass1234").is_err());
    }
}

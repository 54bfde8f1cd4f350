//! Username 值对象
//!
//! 计算宽度 4-30：一个宽字符（中文等全角字符）按两个字符计。

use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_WIDTH: usize = 4;
const MAX_WIDTH: usize = 30;

/// Username 值对象
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(pub String);

impl Username {
    /// 创建新的 Username
    pub fn new(username: impl Into<String>) -> Result<Self, UsernameError> {
        let username = username.into();

        Self::validate(&username)?;

        Ok(Self(username))
    }

    /// 验证用户名格式
    fn validate(username: &str) -> Result<(), UsernameError> {
        // 只允许字母、数字、下划线、连字符和宽字符
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || Self::is_wide(c))
        {
            return Err(UsernameError::InvalidCharacters);
        }

        let width = Self::display_width(username);
        if width < MIN_WIDTH {
            return Err(UsernameError::TooShort(width));
        }
        if width > MAX_WIDTH {
            return Err(UsernameError::TooLong(width));
        }

        Ok(())
    }

    /// 宽字符判定（CJK 统一表意文字）
    fn is_wide(c: char) -> bool {
        ('\u{4e00}'..='\u{9fa5}').contains(&c)
    }

    /// 计算宽度：字符数加宽字符数
    pub fn display_width(username: &str) -> usize {
        username
            .chars()
            .map(|c| if Self::is_wide(c) { 2 } else { 1 })
            .sum()
    }

    /// 获取字符串引用
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username 错误
#[derive(Debug, thiserror::Error)]
pub enum UsernameError {
    #[error("Username is too short (computed width {0}, minimum 4)")]
    TooShort(usize),

    #[error("Username is too long (computed width {0}, maximum 30)")]
    TooLong(usize),

    #[error(
        "Username contains invalid characters (only letters, digits, underscore, hyphen and CJK characters allowed)"
    )]
    InvalidCharacters,
}

//! 用户实体

use campus_common::UserId;
use campus_domain_core::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Email, HashedPassword, Username};

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum Gender {
    Unknown,
    Male,
    Female,
}

impl Default for Gender {
    fn default() -> Self {
        Self::Unknown
    }
}

impl From<Gender> for i16 {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Unknown => 0,
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }
}

impl TryFrom<i16> for Gender {
    type Error = GenderError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Male),
            2 => Ok(Self::Female),
            other => Err(GenderError::InvalidCode(other)),
        }
    }
}

/// 性别错误
#[derive(Debug, thiserror::Error)]
pub enum GenderError {
    #[error("Gender must be 0 (unknown), 1 (male) or 2 (female), got {0}")]
    InvalidCode(i16),
}

impl From<GenderError> for campus_errors::AppError {
    fn from(err: GenderError) -> Self {
        campus_errors::AppError::validation(err.to_string())
    }
}

/// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub username: Option<Username>,
    pub password_hash: HashedPassword,
    pub avatar: Option<String>,
    pub self_intro: Option<String>,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 新建用户：身份由存储层分配，邮箱与口令散列来自待验证记录
    pub fn new(id: UserId, email: Email, password_hash: HashedPassword) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            username: None,
            password_hash,
            avatar: None,
            self_intro: None,
            gender: Gender::Unknown,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn change_password(&mut self, password_hash: HashedPassword) {
        self.password_hash = password_hash;
        self.touch();
    }

    pub fn change_username(&mut self, username: Username) {
        self.username = Some(username);
        self.touch();
    }

    pub fn set_avatar(&mut self, avatar: String) {
        self.avatar = Some(avatar);
        self.touch();
    }

    pub fn set_self_intro(&mut self, self_intro: String) {
        self.self_intro = Some(self_intro);
        self.touch();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// 对外投影（不含口令散列）
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.as_str().to_string(),
            username: self.username.as_ref().map(|u| u.as_str().to_string()),
            avatar: self.avatar.clone(),
            self_intro: self.self_intro.clone(),
            gender: self.gender,
        }
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 用户对外投影
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub self_intro: Option<String>,
    pub gender: Gender,
}

//! campus-auth-core - 认证核心库
//!
//! JWT 签发、校验与全量失效（签发时间下限）

use std::sync::Arc;

use async_trait::async_trait;
use campus_common::UserId;
use campus_errors::{AppError, AppResult};
use campus_ports::CachePort;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    /// Issuer
    #[serde(default)]
    pub iss: String,
    /// Audience
    #[serde(default)]
    pub aud: String,
}

impl Claims {
    pub fn new(user_id: &UserId, expires_in_secs: i64, issuer: &str, audience: &str) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.value().to_string(),
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
        }
    }

    pub fn user_id(&self) -> AppResult<UserId> {
        self.sub
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| AppError::unauthenticated("Invalid user ID in token"))
    }
}

/// Token 服务：无状态的 JWT 编解码
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, audience: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
        }
    }

    /// 签发令牌
    pub fn issue_token(&self, user_id: &UserId, expires_in_secs: i64) -> AppResult<String> {
        let claims = Claims::new(user_id, expires_in_secs, &self.issuer, &self.audience);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    /// 验证令牌
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::unauthenticated(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;

        if claims.jti.is_empty() {
            return Err(AppError::unauthenticated("Token ID (jti) missing"));
        }

        Ok(claims)
    }
}

/// 令牌签发接口
///
/// `invalidate_all` 用于密码修改后强制所有已签发令牌失效。
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// 为用户签发一个定长有效期的令牌
    async fn issue(&self, user_id: &UserId, lifetime_secs: i64) -> AppResult<String>;

    /// 使该用户此前签发的全部令牌失效
    async fn invalidate_all(&self, user_id: &UserId) -> AppResult<()>;

    /// 验证令牌并返回 Claims（包含失效下限检查）
    async fn validate(&self, token: &str) -> AppResult<Claims>;
}

/// 基于 JWT 的令牌签发实现
///
/// 全量失效通过缓存中按用户记录的"签发时间下限"实现：
/// iat 早于下限的令牌一律拒绝。
pub struct JwtTokenIssuer {
    tokens: TokenService,
    cache: Arc<dyn CachePort>,
}

impl JwtTokenIssuer {
    pub fn new(tokens: TokenService, cache: Arc<dyn CachePort>) -> Self {
        Self { tokens, cache }
    }

    fn floor_key(user_id: &UserId) -> String {
        format!("auth:token_floor:{}", user_id)
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn issue(&self, user_id: &UserId, lifetime_secs: i64) -> AppResult<String> {
        self.tokens.issue_token(user_id, lifetime_secs)
    }

    async fn invalidate_all(&self, user_id: &UserId) -> AppResult<()> {
        let now = Utc::now().timestamp();
        self.cache
            .set(&Self::floor_key(user_id), &now.to_string(), None)
            .await
    }

    async fn validate(&self, token: &str) -> AppResult<Claims> {
        let claims = self.tokens.validate_token(token)?;
        let user_id = claims.user_id()?;

        if let Some(floor) = self.cache.get(&Self::floor_key(&user_id)).await? {
            let floor: i64 = floor
                .parse()
                .map_err(|_| AppError::internal("Corrupt token floor entry"))?;
            if claims.iat < floor {
                return Err(AppError::unauthenticated("Token has been revoked"));
            }
        }

        Ok(claims)
    }
}

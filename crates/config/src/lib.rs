//! campus-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
    #[serde(default = "default_user_cache_ttl_secs")]
    pub user_cache_ttl_secs: u64,
}

fn default_user_cache_ttl_secs() -> u64 {
    300
}

/// JWT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_issuer() -> String {
    "campus-user-service".to_string()
}

fn default_audience() -> String {
    "campus".to_string()
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 注册配置
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// 验证码有效期（分钟）
    #[serde(default = "default_code_ttl_minutes")]
    pub code_ttl_minutes: i64,
    /// 同一邮箱每日验证码发送上限
    #[serde(default = "default_daily_send_limit")]
    pub daily_send_limit: i64,
    /// 注册成功后签发的令牌有效期（秒）
    #[serde(default = "default_token_lifetime_seconds")]
    pub token_lifetime_seconds: i64,
    /// 引导账号 ID：平台首个账号，新用户自动被其关注
    #[serde(default = "default_bootstrap_account_id")]
    pub bootstrap_account_id: i64,
}

fn default_code_ttl_minutes() -> i64 {
    15
}

fn default_daily_send_limit() -> i64 {
    5
}

fn default_token_lifetime_seconds() -> i64 {
    3600 * 24 * 365
}

fn default_bootstrap_account_id() -> i64 {
    1
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            code_ttl_minutes: default_code_ttl_minutes(),
            daily_send_limit: default_daily_send_limit(),
            token_lifetime_seconds: default_token_lifetime_seconds(),
            bootstrap_account_id: default_bootstrap_account_id(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub registration: RegistrationConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("").split("_"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::Serialized;

    #[test]
    fn test_registration_defaults() {
        let reg = RegistrationConfig::default();
        assert_eq!(reg.code_ttl_minutes, 15);
        assert_eq!(reg.daily_send_limit, 5);
        assert_eq!(reg.token_lifetime_seconds, 31_536_000);
        assert_eq!(reg.bootstrap_account_id, 1);
    }

    #[test]
    fn test_load_from_toml_string() {
        let toml = r#"
            app_name = "campus"
            app_env = "test"

            [database]
            url = "postgres://localhost/campus"

            [redis]
            url = "redis://localhost"

            [jwt]
            secret = "test-secret"

            [server]
            host = "127.0.0.1"
            port = 8080

            [telemetry]

            [email]
            smtp_host = "smtp.example.com"
            smtp_port = 587
            username = "noreply"
            password = "secret"
            from_email = "noreply@example.com"
            from_name = "Campus"
        "#;

        let config: AppConfig = Figment::new()
            .merge(Toml::string(toml))
            .extract()
            .expect("config should parse");

        assert_eq!(config.app_name, "campus");
        assert!(!config.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.registration.bootstrap_account_id, 1);
        assert_eq!(config.jwt.issuer, "campus-user-service");
    }

    #[test]
    fn test_registration_overrides() {
        let reg: RegistrationConfig = Figment::new()
            .merge(Serialized::defaults(RegistrationConfig::default()))
            .merge(Toml::string("code_ttl_minutes = 30\nbootstrap_account_id = 7"))
            .extract()
            .expect("registration config should parse");

        assert_eq!(reg.code_ttl_minutes, 30);
        assert_eq!(reg.bootstrap_account_id, 7);
        assert_eq!(reg.daily_send_limit, 5);
    }
}

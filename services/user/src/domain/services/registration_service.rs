//! 注册服务
//!
//! 注册申请的受理（验证码签发与邮件发送）和消费（晋升为正式用户）。
//! 每个邮箱的状态机：无记录 → 在途（验证码已签发）→ 已消费/过期/被覆盖。

use std::sync::Arc;

use campus_adapter_email::EmailSender;
use campus_config::RegistrationConfig;
use campus_errors::{AppError, AppResult};
use campus_ports::CachePort;
use chrono::Duration;
use tracing::{debug, info, warn};

use crate::domain::pending_registration::PendingRegistration;
use crate::domain::repositories::{PendingRegistrationRepository, UserRepository};
use crate::domain::unit_of_work::UnitOfWork;
use crate::domain::user::User;
use crate::domain::value_objects::{Email, HashedPassword, validate_registration_password};

/// 同一邮箱每日发送计数的保留时长
const SEND_COUNT_TTL_SECS: u64 = 24 * 3600;

/// 注册服务
pub struct RegistrationService {
    user_repo: Arc<dyn UserRepository>,
    pending_repo: Arc<dyn PendingRegistrationRepository>,
    email_sender: Arc<dyn EmailSender>,
    cache: Arc<dyn CachePort>,
    config: RegistrationConfig,
}

impl RegistrationService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        pending_repo: Arc<dyn PendingRegistrationRepository>,
        email_sender: Arc<dyn EmailSender>,
        cache: Arc<dyn CachePort>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            user_repo,
            pending_repo,
            email_sender,
            cache,
            config,
        }
    }

    fn code_ttl(&self) -> Duration {
        Duration::minutes(self.config.code_ttl_minutes)
    }

    /// 受理注册申请
    ///
    /// 校验邮箱与密码、生成验证码、落库并发送验证邮件。
    /// 同邮箱的旧在途记录被无条件覆盖，旧验证码随之作废。
    ///
    /// # 返回
    /// - 验证码剩余有效期（秒）
    pub async fn begin_registration(&self, email: &str, password: &str) -> AppResult<i64> {
        debug!(email = %email, "Handling registration request");

        // 1. 邮箱与密码先行校验，不合法不产生任何写入
        let email = Email::new(email).map_err(|e| AppError::validation(e.to_string()))?;
        validate_registration_password(password)
            .map_err(|e| AppError::validation(e.to_string()))?;

        // 2. 已是正式用户的邮箱直接拒绝
        if self.user_repo.exists_by_email(&email).await? {
            warn!(email = %email, "Registration rejected, email already belongs to a user");
            return Err(AppError::conflict("Email already registered"));
        }

        // 3. 每日发送上限
        let sent = self
            .cache
            .incr_with_ttl(
                &format!("registration:sends:{}", email),
                SEND_COUNT_TTL_SECS,
            )
            .await?;
        if sent > self.config.daily_send_limit {
            warn!(email = %email, sent = sent, "Too many verification codes sent today");
            return Err(AppError::too_many_requests(
                "Too many verification codes sent today. Please try again tomorrow.",
            ));
        }

        // 4. 生成在途记录并原子覆盖旧记录
        let password_hash = HashedPassword::from_plain(password)?;
        let pending = PendingRegistration::new(email.clone(), password_hash);
        self.pending_repo.upsert(&pending).await?;

        // 5. 发送验证邮件；失败时保留在途记录，重试会重新签发验证码
        let subject = "欢迎注册，请验证您的邮箱";
        let body = format!(
            "尊敬的用户，您好！\n\n\
             验证码：{code}\n\
             ({minutes}分钟内有效)\n\n\
             您正在使用该邮箱注册校园社交平台，我们需要验证这是您的邮箱，\
             如果这不是您的操作，请忽略该邮件。\n\n\
             系统发信，请勿回复\n\
             服务邮箱：service@fondoger.cn\n",
            code = pending.code,
            minutes = self.config.code_ttl_minutes,
        );

        if let Err(e) = self
            .email_sender
            .send_text_email(email.as_str(), subject, &body)
            .await
        {
            warn!(email = %email, error = %e, "Verification email dispatch failed");
            return Err(AppError::external_service("Failed to send verification email"));
        }

        info!(email = %email, "Verification code issued and dispatched");
        Ok(pending.remaining_seconds(self.code_ttl()))
    }

    /// 消费验证码并创建正式用户
    ///
    /// 必须运行在调用方提供的工作单元内；提交由调用方负责，用户创建、
    /// 在途记录删除与默认关系播种因此同处一个事务。
    ///
    /// 验证失败统一返回粗粒度的验证码错误：调用方无法区分错码、
    /// 过期与已被消费。
    pub async fn finalize(&self, uow: &dyn UnitOfWork, email: &str, code: &str) -> AppResult<User> {
        debug!(email = %email, "Finalizing registration");

        let email = Email::new(email).map_err(|_| Self::invalid_code())?;

        // 1. 查找在途记录
        let pending = uow
            .pending_registrations()
            .find_by_email(&email)
            .await?
            .ok_or_else(Self::invalid_code)?;

        // 2. 验证码须完全一致且在有效期内
        if !pending.is_consumable(code, self.code_ttl()) {
            warn!(email = %email, "Verification code rejected");
            return Err(Self::invalid_code());
        }

        // 3. 消费是破坏性的：并发的重复提交至多一个能删到行
        if !uow.pending_registrations().delete(&email).await? {
            warn!(email = %email, "Pending registration already consumed");
            return Err(Self::invalid_code());
        }

        // 4. 晋升为正式用户
        let user = uow
            .users()
            .create(&pending.email, &pending.password_hash)
            .await?;

        info!(user_id = %user.id, email = %email, "User promoted from pending registration");
        Ok(user)
    }

    fn invalid_code() -> AppError {
        AppError::unauthenticated("Invalid verification code")
    }
}

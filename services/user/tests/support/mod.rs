//! 测试支撑：内存版协作方
//!
//! 事务语义由 PostgreSQL 实现承担；这里的工作单元直接落在共享的
//! 内存仓库上，测试关注业务规则本身。

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use campus_adapter_email::EmailSender;
use campus_auth_core::{Claims, TokenIssuer};
use campus_common::{OfficialAccountId, Pagination, UserId};
use campus_config::RegistrationConfig;
use campus_errors::{AppError, AppResult};
use campus_ports::CachePort;
use chrono::Utc;

use user_service::application::handlers::user::{
    BeginRegistrationHandler, FinalizeRegistrationHandler, FollowUserHandler,
    UnfollowUserHandler, UpdateProfileHandler, UserQueryHandler,
};
use user_service::domain::group::{Group, GroupMembership};
use user_service::domain::pending_registration::PendingRegistration;
use user_service::domain::repositories::{
    PendingRegistrationRepository, SocialGraphRepository, UserRepository,
};
use user_service::domain::services::{ProfileService, RegistrationService, SocialGraphService};
use user_service::domain::unit_of_work::{UnitOfWork, UnitOfWorkFactory};
use user_service::domain::user::User;
use user_service::domain::value_objects::{Email, HashedPassword, Username};
use user_service::infrastructure::cache::UserLookupCache;

// =============================================================================
// 用户仓库
// =============================================================================

pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == *id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn find_by_username(&self, username: &Username) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username.as_ref() == Some(username))
            .cloned())
    }

    async fn search_by_username(&self, keyword: &str, page: &Pagination) -> AppResult<Vec<User>> {
        let mut matches: Vec<User> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| {
                u.username
                    .as_ref()
                    .is_some_and(|name| name.as_str().contains(keyword))
            })
            .cloned()
            .collect();

        matches.sort_by_key(|u| {
            u.username
                .as_ref()
                .map(|name| name.as_str().chars().count())
                .unwrap_or(usize::MAX)
        });

        Ok(matches
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|u| u.email == *email) {
            return Err(AppError::conflict("Email already registered"));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let user = User::new(UserId::new(id), email.clone(), password_hash.clone());
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.lock().unwrap();

        if let Some(username) = &user.username {
            if users
                .iter()
                .any(|u| u.id != user.id && u.username.as_ref() == Some(username))
            {
                return Err(AppError::conflict("Username already taken"));
            }
        }

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(())
            }
            None => Err(AppError::not_found("User not found")),
        }
    }

    async fn exists_by_email(&self, email: &Email) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.email == *email))
    }

    async fn exists_by_username(&self, username: &Username) -> AppResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username.as_ref() == Some(username)))
    }
}

// =============================================================================
// 待验证注册记录仓库
// =============================================================================

pub struct InMemoryPendingRegistrationRepository {
    records: Mutex<Vec<PendingRegistration>>,
}

impl InMemoryPendingRegistrationRepository {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// 测试用：直接改写签发时间（模拟过期）
    pub fn backdate(&self, email: &str, minutes: i64) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.iter_mut().find(|r| r.email.as_str() == email) {
            record.issued_at = Utc::now() - chrono::Duration::minutes(minutes);
        }
    }
}

#[async_trait]
impl PendingRegistrationRepository for InMemoryPendingRegistrationRepository {
    async fn find_by_email(&self, email: &Email) -> AppResult<Option<PendingRegistration>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.email == *email)
            .cloned())
    }

    async fn upsert(&self, pending: &PendingRegistration) -> AppResult<()> {
        let mut records = self.records.lock().unwrap();
        records.retain(|r| r.email != pending.email);
        records.push(pending.clone());
        Ok(())
    }

    async fn delete(&self, email: &Email) -> AppResult<bool> {
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.email != *email);
        Ok(records.len() < before)
    }
}

// =============================================================================
// 社交图谱仓库
// =============================================================================

pub struct GroupRecord {
    pub group: Group,
    pub members: Vec<(i64, Option<String>)>,
}

pub struct InMemorySocialGraphRepository {
    user_repo: Arc<InMemoryUserRepository>,
    follows: Mutex<Vec<(i64, i64)>>,
    groups: Mutex<Vec<GroupRecord>>,
    official_accounts: Mutex<Vec<i64>>,
    subscriptions: Mutex<Vec<(i64, i64)>>,
}

impl InMemorySocialGraphRepository {
    pub fn new(user_repo: Arc<InMemoryUserRepository>) -> Self {
        Self {
            user_repo,
            follows: Mutex::new(Vec::new()),
            groups: Mutex::new(Vec::new()),
            official_accounts: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    pub fn follow_count(&self) -> usize {
        self.follows.lock().unwrap().len()
    }

    pub fn has_follow(&self, follower: i64, followed: i64) -> bool {
        self.follows
            .lock()
            .unwrap()
            .contains(&(follower, followed))
    }

    pub fn has_subscription(&self, account: i64, user: i64) -> bool {
        self.subscriptions.lock().unwrap().contains(&(account, user))
    }

    pub fn add_official_account(&self, id: i64) {
        self.official_accounts.lock().unwrap().push(id);
    }

    pub fn add_group(&self, id: i64, name: &str, members: &[(i64, Option<&str>)]) {
        self.groups.lock().unwrap().push(GroupRecord {
            group: Group {
                id: campus_common::GroupId::new(id),
                name: name.to_string(),
                description: None,
                created_at: Utc::now(),
            },
            members: members
                .iter()
                .map(|(user, title)| (*user, title.map(str::to_string)))
                .collect(),
        });
    }

    async fn resolve_users(&self, ids: Vec<i64>, page: &Pagination) -> AppResult<Vec<User>> {
        let mut users = Vec::new();
        for id in ids
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
        {
            if let Some(user) = self.user_repo.find_by_id(&UserId::new(id)).await? {
                users.push(user);
            }
        }
        Ok(users)
    }
}

#[async_trait]
impl SocialGraphRepository for InMemorySocialGraphRepository {
    async fn add_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool> {
        let edge = (follower.value(), followed.value());
        let mut follows = self.follows.lock().unwrap();
        if follows.contains(&edge) {
            Ok(false)
        } else {
            follows.push(edge);
            Ok(true)
        }
    }

    async fn remove_follow(&self, follower: &UserId, followed: &UserId) -> AppResult<bool> {
        let edge = (follower.value(), followed.value());
        let mut follows = self.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|e| *e != edge);
        Ok(follows.len() < before)
    }

    async fn list_followers(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>> {
        let ids: Vec<i64> = self
            .follows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, followed)| *followed == user.value())
            .map(|(follower, _)| *follower)
            .collect();
        self.resolve_users(ids, page).await
    }

    async fn list_followed(&self, user: &UserId, page: &Pagination) -> AppResult<Vec<User>> {
        let ids: Vec<i64> = self
            .follows
            .lock()
            .unwrap()
            .iter()
            .filter(|(follower, _)| *follower == user.value())
            .map(|(_, followed)| *followed)
            .collect();
        self.resolve_users(ids, page).await
    }

    async fn list_groups(
        &self,
        user: &UserId,
        page: &Pagination,
    ) -> AppResult<Vec<GroupMembership>> {
        let memberships: Vec<GroupMembership> = self
            .groups
            .lock()
            .unwrap()
            .iter()
            .filter_map(|record| {
                record
                    .members
                    .iter()
                    .find(|(member, _)| *member == user.value())
                    .map(|(_, title)| GroupMembership {
                        group: record.group.clone(),
                        title: title.clone(),
                    })
            })
            .collect();

        Ok(memberships
            .into_iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn list_official_account_ids(&self) -> AppResult<Vec<OfficialAccountId>> {
        Ok(self
            .official_accounts
            .lock()
            .unwrap()
            .iter()
            .map(|id| OfficialAccountId::new(*id))
            .collect())
    }

    async fn add_subscriber(&self, account: &OfficialAccountId, user: &UserId) -> AppResult<()> {
        let edge = (account.value(), user.value());
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if !subscriptions.contains(&edge) {
            subscriptions.push(edge);
        }
        Ok(())
    }
}

// =============================================================================
// 缓存
// =============================================================================

pub struct InMemoryCache {
    entries: Mutex<std::collections::HashMap<String, String>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[async_trait]
impl CachePort for InMemoryCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl: Option<StdDuration>) -> AppResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.lock().unwrap().contains_key(key))
    }

    async fn expire(&self, _key: &str, _ttl: StdDuration) -> AppResult<()> {
        Ok(())
    }

    async fn incr_with_ttl(&self, key: &str, _ttl_secs: u64) -> AppResult<i64> {
        let mut entries = self.entries.lock().unwrap();
        let next = entries
            .get(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        entries.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}

// =============================================================================
// 邮件
// =============================================================================

pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<SentEmail>>,
    fail_next: AtomicBool,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// 下一次发送失败（模拟 SMTP 故障）
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn last_body(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|m| m.body.clone())
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_text_email(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::external_service("smtp down"));
        }

        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// 令牌
// =============================================================================

pub struct FakeTokenIssuer {
    pub issued: Mutex<Vec<(i64, i64)>>,
    pub invalidated: Mutex<Vec<i64>>,
}

impl FakeTokenIssuer {
    pub fn new() -> Self {
        Self {
            issued: Mutex::new(Vec::new()),
            invalidated: Mutex::new(Vec::new()),
        }
    }

    pub fn invalidated_for(&self, user_id: i64) -> bool {
        self.invalidated.lock().unwrap().contains(&user_id)
    }
}

#[async_trait]
impl TokenIssuer for FakeTokenIssuer {
    async fn issue(&self, user_id: &UserId, lifetime_secs: i64) -> AppResult<String> {
        self.issued
            .lock()
            .unwrap()
            .push((user_id.value(), lifetime_secs));
        Ok(format!("token-{}", user_id.value()))
    }

    async fn invalidate_all(&self, user_id: &UserId) -> AppResult<()> {
        self.invalidated.lock().unwrap().push(user_id.value());
        Ok(())
    }

    async fn validate(&self, token: &str) -> AppResult<Claims> {
        let id = token
            .strip_prefix("token-")
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or_else(|| AppError::unauthenticated("Invalid token"))?;
        Ok(Claims::new(&UserId::new(id), 3600, "test", "test"))
    }
}

// =============================================================================
// 用户查找缓存（直通）
// =============================================================================

pub struct PassThroughUserCache {
    user_repo: Arc<InMemoryUserRepository>,
    pub invalidated: Mutex<Vec<i64>>,
}

impl PassThroughUserCache {
    pub fn new(user_repo: Arc<InMemoryUserRepository>) -> Self {
        Self {
            user_repo,
            invalidated: Mutex::new(Vec::new()),
        }
    }

    pub fn invalidated_for(&self, user_id: i64) -> bool {
        self.invalidated.lock().unwrap().contains(&user_id)
    }
}

#[async_trait]
impl UserLookupCache for PassThroughUserCache {
    async fn get_user(&self, id: &UserId) -> AppResult<Option<User>> {
        self.user_repo.find_by_id(id).await
    }

    async fn invalidate(&self, id: &UserId) -> AppResult<()> {
        self.invalidated.lock().unwrap().push(id.value());
        Ok(())
    }
}

// =============================================================================
// 工作单元
// =============================================================================

pub struct FakeUnitOfWork {
    users: Arc<InMemoryUserRepository>,
    pendings: Arc<InMemoryPendingRegistrationRepository>,
    graph: Arc<InMemorySocialGraphRepository>,
}

#[async_trait]
impl UnitOfWork for FakeUnitOfWork {
    fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    fn pending_registrations(&self) -> &dyn PendingRegistrationRepository {
        self.pendings.as_ref()
    }

    fn social_graph(&self) -> &dyn SocialGraphRepository {
        self.graph.as_ref()
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> AppResult<()> {
        Ok(())
    }
}

pub struct FakeUnitOfWorkFactory {
    users: Arc<InMemoryUserRepository>,
    pendings: Arc<InMemoryPendingRegistrationRepository>,
    graph: Arc<InMemorySocialGraphRepository>,
}

#[async_trait]
impl UnitOfWorkFactory for FakeUnitOfWorkFactory {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(FakeUnitOfWork {
            users: self.users.clone(),
            pendings: self.pendings.clone(),
            graph: self.graph.clone(),
        }))
    }
}

// =============================================================================
// 组装
// =============================================================================

pub struct TestContext {
    pub users: Arc<InMemoryUserRepository>,
    pub pendings: Arc<InMemoryPendingRegistrationRepository>,
    pub graph: Arc<InMemorySocialGraphRepository>,
    pub cache: Arc<InMemoryCache>,
    pub email: Arc<RecordingEmailSender>,
    pub tokens: Arc<FakeTokenIssuer>,
    pub user_cache: Arc<PassThroughUserCache>,
    pub registration: Arc<RegistrationService>,
    pub social: Arc<SocialGraphService>,
    pub profiles: Arc<ProfileService>,
    pub uow_factory: Arc<FakeUnitOfWorkFactory>,
    pub config: RegistrationConfig,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(RegistrationConfig::default())
    }

    pub fn with_config(config: RegistrationConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let pendings = Arc::new(InMemoryPendingRegistrationRepository::new());
        let graph = Arc::new(InMemorySocialGraphRepository::new(users.clone()));
        let cache = Arc::new(InMemoryCache::new());
        let email = Arc::new(RecordingEmailSender::new());
        let tokens = Arc::new(FakeTokenIssuer::new());
        let user_cache = Arc::new(PassThroughUserCache::new(users.clone()));

        let registration = Arc::new(RegistrationService::new(
            users.clone(),
            pendings.clone(),
            email.clone(),
            cache.clone(),
            config.clone(),
        ));
        let social = Arc::new(SocialGraphService::new(
            graph.clone(),
            UserId::new(config.bootstrap_account_id),
        ));
        let profiles = Arc::new(ProfileService::new(users.clone(), tokens.clone()));

        let uow_factory = Arc::new(FakeUnitOfWorkFactory {
            users: users.clone(),
            pendings: pendings.clone(),
            graph: graph.clone(),
        });

        Self {
            users,
            pendings,
            graph,
            cache,
            email,
            tokens,
            user_cache,
            registration,
            social,
            profiles,
            uow_factory,
            config,
        }
    }

    pub fn begin_registration_handler(&self) -> BeginRegistrationHandler {
        BeginRegistrationHandler::new(self.registration.clone())
    }

    pub fn finalize_registration_handler(&self) -> FinalizeRegistrationHandler {
        FinalizeRegistrationHandler::new(
            self.registration.clone(),
            self.social.clone(),
            self.uow_factory.clone(),
            self.tokens.clone(),
            self.config.token_lifetime_seconds,
        )
    }

    pub fn update_profile_handler(&self) -> UpdateProfileHandler {
        UpdateProfileHandler::new(self.profiles.clone(), self.user_cache.clone())
    }

    pub fn follow_handler(&self) -> FollowUserHandler {
        FollowUserHandler::new(self.social.clone(), self.user_cache.clone())
    }

    pub fn unfollow_handler(&self) -> UnfollowUserHandler {
        UnfollowUserHandler::new(self.social.clone(), self.user_cache.clone())
    }

    pub fn query_handler(&self) -> UserQueryHandler {
        UserQueryHandler::new(self.user_cache.clone(), self.users.clone(), self.social.clone())
    }

    /// 直接落库一个正式用户（绕过注册流程）
    pub async fn seed_user(&self, email: &str, password: &str) -> User {
        let email = Email::new(email).unwrap();
        let hash = HashedPassword::from_plain(password).unwrap();
        self.users.create(&email, &hash).await.unwrap()
    }

    /// 取出某邮箱在途记录的验证码
    pub async fn pending_code(&self, email: &str) -> String {
        self.pendings
            .find_by_email(&Email::new(email).unwrap())
            .await
            .unwrap()
            .expect("pending registration should exist")
            .code
    }
}

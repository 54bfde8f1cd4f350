//! 用户服务入口

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use campus_adapter_email::{EmailClient, EmailSender};
use campus_adapter_postgres::{PostgresConfig, create_pool};
use campus_adapter_redis::{RedisCache, create_connection_manager};
use campus_auth_core::{JwtTokenIssuer, TokenIssuer, TokenService};
use campus_common::UserId;
use campus_config::AppConfig;
use campus_ports::CachePort;
use secrecy::ExposeSecret;
use tracing::info;

use user_service::api::rest::{AppState, router};
use user_service::application::handlers::user::{
    BeginRegistrationHandler, FinalizeRegistrationHandler, FollowUserHandler,
    UnfollowUserHandler, UpdateProfileHandler, UserQueryHandler,
};
use user_service::domain::repositories::{
    PendingRegistrationRepository, SocialGraphRepository, UserRepository,
};
use user_service::domain::services::{ProfileService, RegistrationService, SocialGraphService};
use user_service::domain::unit_of_work::UnitOfWorkFactory;
use user_service::infrastructure::cache::{RedisUserCache, UserLookupCache};
use user_service::infrastructure::persistence::{
    PostgresPendingRegistrationRepository, PostgresSocialGraphRepository,
    PostgresUnitOfWorkFactory, PostgresUserRepository,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("config").context("failed to load configuration")?;

    if config.is_production() {
        campus_telemetry::init_tracing_json(&config.telemetry.log_level);
    } else {
        campus_telemetry::init_tracing(&config.telemetry.log_level);
    }

    info!(app = %config.app_name, env = %config.app_env, "Starting user service");

    // 基础设施
    let pg_config = PostgresConfig::new(config.database.url.expose_secret())
        .with_max_connections(config.database.max_connections);
    let pool = create_pool(&pg_config).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let redis_conn = create_connection_manager(config.redis.url.expose_secret()).await?;
    let cache: Arc<dyn CachePort> = Arc::new(RedisCache::new(redis_conn));

    let token_service = TokenService::new(
        config.jwt.secret.expose_secret(),
        config.jwt.issuer.clone(),
        config.jwt.audience.clone(),
    );
    let token_issuer: Arc<dyn TokenIssuer> =
        Arc::new(JwtTokenIssuer::new(token_service, cache.clone()));

    let email_config = campus_adapter_email::EmailConfig {
        smtp_host: config.email.smtp_host.clone(),
        smtp_port: config.email.smtp_port,
        username: config.email.username.clone(),
        password: config.email.password.clone(),
        from_email: config.email.from_email.clone(),
        from_name: config.email.from_name.clone(),
        use_tls: config.email.use_tls,
        timeout_secs: config.email.timeout_secs,
    };
    let email_sender: Arc<dyn EmailSender> = Arc::new(EmailClient::new(email_config));

    // Repositories
    let user_repo: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let pending_repo: Arc<dyn PendingRegistrationRepository> =
        Arc::new(PostgresPendingRegistrationRepository::new(pool.clone()));
    let graph_repo: Arc<dyn SocialGraphRepository> =
        Arc::new(PostgresSocialGraphRepository::new(pool.clone()));
    let uow_factory: Arc<dyn UnitOfWorkFactory> =
        Arc::new(PostgresUnitOfWorkFactory::new(pool.clone()));

    // 读穿缓存
    let user_cache: Arc<dyn UserLookupCache> = Arc::new(RedisUserCache::new(
        cache.clone(),
        user_repo.clone(),
        Duration::from_secs(config.redis.user_cache_ttl_secs),
    ));

    // 领域服务
    let registration_service = Arc::new(RegistrationService::new(
        user_repo.clone(),
        pending_repo,
        email_sender,
        cache.clone(),
        config.registration.clone(),
    ));
    let social_graph_service = Arc::new(SocialGraphService::new(
        graph_repo,
        UserId::new(config.registration.bootstrap_account_id),
    ));
    let profile_service = Arc::new(ProfileService::new(user_repo.clone(), token_issuer.clone()));

    // 处理器
    let state = AppState {
        begin_registration: Arc::new(BeginRegistrationHandler::new(registration_service.clone())),
        finalize_registration: Arc::new(FinalizeRegistrationHandler::new(
            registration_service,
            social_graph_service.clone(),
            uow_factory,
            token_issuer.clone(),
            config.registration.token_lifetime_seconds,
        )),
        update_profile: Arc::new(UpdateProfileHandler::new(
            profile_service,
            user_cache.clone(),
        )),
        follow_user: Arc::new(FollowUserHandler::new(
            social_graph_service.clone(),
            user_cache.clone(),
        )),
        unfollow_user: Arc::new(UnfollowUserHandler::new(
            social_graph_service.clone(),
            user_cache.clone(),
        )),
        queries: Arc::new(UserQueryHandler::new(
            user_cache.clone(),
            user_repo,
            social_graph_service,
        )),
        token_issuer,
        user_cache,
        pool,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %addr, "User service listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}

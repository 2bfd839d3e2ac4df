//! Task API Service

mod api;
mod application;
mod domain;
mod infrastructure;
mod state;

use std::sync::Arc;

use secrecy::ExposeSecret;
use tado_adapter_postgres::PostgresConfig;
use tado_adapter_redis::RedisCache;
use tado_auth_core::TokenService;
use tado_config::AppConfig;
use tado_telemetry::{init_tracing, init_tracing_json};
use tracing::info;

use application::{TaskService, UserService};
use infrastructure::cache::TaskCache;
use infrastructure::persistence::{PostgresTaskRepository, PostgresUserRepository};
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // 加载配置
    let config = AppConfig::load("config")?;

    // 初始化 tracing
    if config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }

    info!(app = config.app_name, env = config.app_env, "Starting task API");

    // 数据库连接池
    let pg_config = PostgresConfig::new(config.database.url.expose_secret())
        .with_max_connections(config.database.max_connections);
    let pool = tado_adapter_postgres::create_pool(&pg_config).await?;

    // Redis 连接
    let redis_conn =
        tado_adapter_redis::create_connection_manager(config.redis.url.expose_secret()).await?;

    // 组装服务
    let cache = TaskCache::new(
        Arc::new(RedisCache::new(redis_conn.clone())),
        &config.cache,
    );
    let tokens = TokenService::new(
        config.jwt.secret.expose_secret(),
        config.jwt.expires_in as i64,
        config.app_name.clone(),
    );

    let tasks = TaskService::new(
        Arc::new(PostgresTaskRepository::new(pool.clone())),
        cache,
        config.cache.list_safety_cap,
    );
    let users = UserService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        tokens.clone(),
    );

    let state = AppState {
        tasks,
        users,
        tokens,
        db: pool,
        redis: redis_conn,
    };

    let app = api::routes::app_router(state);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(%addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! 路由构建

use axum::routing::{get, patch, post, put};
use axum::{Json, Router, extract::State, middleware};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::middleware::auth_middleware;
use super::{tasks, users};

pub fn app_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login));

    let protected = Router::new()
        .route("/api/users/me", get(users::me))
        .route("/api/users/all", get(users::list_all))
        .route(
            "/api/users/{id}",
            put(users::update).delete(users::delete_user),
        )
        .route("/api/tasks", post(tasks::create).get(tasks::list))
        .route(
            "/api/tasks/{id}",
            get(tasks::get).put(tasks::update).delete(tasks::delete),
        )
        .route("/api/tasks/{id}/archive", patch(tasks::archive))
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 健康检查：数据库是硬依赖，缓存不可用只降级不报障
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = tado_adapter_postgres::check_connection(&state.db).await.is_ok();

    let mut conn = state.redis.clone();
    let cache = tado_adapter_redis::check_connection(&mut conn).await.is_ok();

    Json(json!({
        "status": if database { "ok" } else { "unavailable" },
        "database": database,
        "cache": cache,
    }))
}

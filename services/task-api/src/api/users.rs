//! 用户路由处理器

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tado_common::UserId;
use tado_errors::AppResult;
use uuid::Uuid;

use crate::domain::{User, UserUpdate};
use crate::state::AppState;

use super::middleware::AuthClaims;

/// 对外的用户表示（不含密码哈希）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name.as_str().to_string(),
            email: user.email.as_str().to_string(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let user = state
        .users
        .register(&req.name, &req.email, &req.password)
        .await?;

    let body = json!({
        "message": "User registered",
        "user": UserResponse::from(user),
    });
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    #[serde(flatten)]
    pub user: UserResponse,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (user, token) = state.users.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        user: user.into(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> AppResult<Json<UserResponse>> {
    let user = state.users.get(&claims.user_id()?).await?;
    Ok(Json(user.into()))
}

pub async fn update(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<Uuid>,
    Json(input): Json<UserUpdate>,
) -> AppResult<Json<UserResponse>> {
    let target = UserId::from_uuid(id);
    let user = state.users.update_profile(&claims, &target, input).await?;
    Ok(Json(user.into()))
}

pub async fn list_all(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.users.list_all(&claims).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let target = UserId::from_uuid(id);
    state.users.delete(&claims, &target).await?;
    Ok(Json(json!({ "message": "Deleted" })).into_response())
}

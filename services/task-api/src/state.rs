//! 应用状态

use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tado_auth_core::TokenService;

use crate::application::{TaskService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskService,
    pub users: UserService,
    pub tokens: TokenService,
    pub db: PgPool,
    pub redis: ConnectionManager,
}

//! 认证中间件

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use tado_auth_core::{Claims, TokenService};
use tado_errors::AppError;
use tracing::{debug, warn};

/// 认证 Claims 提取器
///
/// 从请求扩展中取出已验证的 Claims，必须在 auth_middleware 之后使用
pub struct AuthClaims(pub Claims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| AppError::unauthenticated("Not authorized"))
    }
}

/// JWT 认证中间件
///
/// 验证 Bearer token 并将 claims 注入请求扩展
pub async fn auth_middleware(
    State(tokens): State<TokenService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            warn!("Missing or invalid authorization header");
            return Err(AppError::unauthenticated("Not authorized"));
        }
    };

    match tokens.validate_token(token) {
        Ok(claims) => {
            debug!(user_id = %claims.sub, "Token validated");
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(error = %e, "Token validation failed");
            Err(AppError::unauthenticated("Not authorized"))
        }
    }
}

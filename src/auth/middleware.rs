//! JWT 认证中间件
//! 先读 Cookie，再读 Authorization 头；验证通过后把账户 ID 放进请求扩展

use crate::{
    auth::{cookie::read_cookie, error::AuthError, jwt::TokenService},
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i64,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
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
            .get::<AuthContext>()
            .copied()
            .ok_or(AppError::Auth(AuthError::MissingToken))
    }
}

/// 认证中间件的状态
#[derive(Clone)]
pub struct AuthGate {
    pub tokens: Arc<TokenService>,
    pub cookie_name: String,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>, cookie_name: impl Into<String>) -> Self {
        Self {
            tokens,
            cookie_name: cookie_name.into(),
        }
    }

    /// 解析请求携带的令牌并返回账户 ID
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = extract_token(headers, &self.cookie_name)?;
        let user_id = self.tokens.verify(&token)?;
        Ok(AuthContext { user_id })
    }
}

/// 提取令牌：Cookie 优先，其次 `Authorization: Bearer <token>`
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, AuthError> {
    if let Some(token) = read_cookie(headers, cookie_name) {
        return Ok(token);
    }

    let value = match headers.get(header::AUTHORIZATION) {
        None => return Err(AuthError::MissingToken),
        Some(v) if v.is_empty() => return Err(AuthError::MissingToken),
        Some(v) => v.to_str().map_err(|_| AuthError::MalformedHeader)?,
    };

    // 必须恰好是两段：scheme 和 token
    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => {
            Ok(token.to_string())
        }
        _ => Err(AuthError::MalformedHeader),
    }
}

/// JWT 认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = gate.authenticate(req.headers()).map_err(|e| {
        tracing::debug!(reason = %e, uri = %req.uri(), "Request rejected by auth gate");
        AppError::Auth(e)
    })?;

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use secrecy::Secret;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn gate() -> AuthGate {
        let secret = Secret::new("test_secret_key_32_characters_long!".to_string());
        AuthGate::new(Arc::new(TokenService::new(Some(&secret))), "token")
    }

    #[test]
    fn test_extract_token_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        assert_eq!(extract_token(&headers, "token").unwrap(), "test_token_123");
    }

    #[test]
    fn test_extract_token_cookie_first() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "token=from_cookie".parse().unwrap());
        headers.insert("authorization", "Bearer from_header".parse().unwrap());

        assert_eq!(extract_token(&headers, "token").unwrap(), "from_cookie");
    }

    #[test]
    fn test_extract_token_empty_cookie_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "token=".parse().unwrap());
        headers.insert("authorization", "Bearer from_header".parse().unwrap());

        assert_eq!(extract_token(&headers, "token").unwrap(), "from_header");
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers, "token"), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_extract_token_invalid_format() {
        for value in ["InvalidFormat", "Basic abc", "Bearer", "Bearer ", "bearer abc", "Bearer a b"] {
            let mut headers = HeaderMap::new();
            headers.insert("authorization", value.parse().unwrap());

            assert_eq!(
                extract_token(&headers, "token"),
                Err(AuthError::MalformedHeader),
                "header {:?} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_authenticate() {
        let gate = gate();
        let token = gate.tokens.issue(5, 1).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {}", token).parse().unwrap());

        assert_eq!(gate.authenticate(&headers).unwrap(), AuthContext { user_id: 5 });
    }

    #[tokio::test]
    async fn test_rejected_request_never_reaches_handler() {
        let reached = Arc::new(AtomicBool::new(false));
        let flag = reached.clone();

        let app = Router::new()
            .route(
                "/protected",
                get(move || {
                    let flag = flag.clone();
                    async move {
                        flag.store(true, Ordering::SeqCst);
                        "ok"
                    }
                }),
            )
            .layer(axum::middleware::from_fn_with_state(gate(), jwt_auth_middleware));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/protected")
                    .header("authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_context_attached_for_valid_token() {
        let gate = gate();
        let token = gate.tokens.issue(9, 1).unwrap();

        let app = Router::new()
            .route(
                "/whoami",
                get(|ctx: AuthContext| async move { ctx.user_id.to_string() }),
            )
            .layer(axum::middleware::from_fn_with_state(gate, jwt_auth_middleware));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/whoami")
                    .header("cookie", format!("token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}

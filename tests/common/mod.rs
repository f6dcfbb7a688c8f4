//! 测试公共模块
//! 基于内存存储构建完整路由，不依赖数据库

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use contacts_service::{
    config::{AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig},
    middleware::AppState,
    repository::InMemoryStore,
    routes,
};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";
pub const TEST_PASSWORD: &str = "secret1";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost/contacts_test".to_string()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Some(Secret::new(TEST_SECRET.to_string())),
            token_ttl_hours: 24,
            cookie_name: "token".to_string(),
            cookie_secure: false,
        },
    }
}

/// 测试应用：路由 + 底层存储（用于直接操作数据，例如软删除账户）
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with_config(create_test_config())
}

pub fn create_test_app_with_config(config: AppConfig) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(config, store.clone(), store.clone());

    TestApp {
        router: routes::create_router(Arc::new(state)),
        store,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(json_request("POST", uri, body)).await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// 注册账户，返回响应中的 user 对象
    pub async fn register(&self, username: &str, email: &str) -> Value {
        let response = self
            .post_json(
                "/api/auth/register",
                json!({
                    "username": username,
                    "password": TEST_PASSWORD,
                    "email": email,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["user"].clone()
    }

    /// 登录并返回令牌
    pub async fn login(&self, username: &str) -> String {
        let response = self
            .post_json(
                "/api/auth/login",
                json!({"username": username, "password": TEST_PASSWORD}),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header")
        .to_str()
        .unwrap()
        .to_string()
}

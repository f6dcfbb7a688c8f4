//! 应用状态与请求追踪中间件

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{AuthGate, TokenService},
    config::AppConfig,
    repository::{AccountRepository, ContactRepository},
    services::AccountService,
};

const TRACE_ID_HEADER: HeaderName = HeaderName::from_static("x-trace-id");
const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id。不在追踪中间件内时生成新的
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// 应用状态
///
/// 存储以 trait 对象注入：`main` 传入 PostgreSQL 实现，测试传入内存实现。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub contacts: Arc<dyn ContactRepository>,
    pub token_service: Arc<TokenService>,
    pub account_service: Arc<AccountService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        accounts: Arc<dyn AccountRepository>,
        contacts: Arc<dyn ContactRepository>,
    ) -> Self {
        let token_service = Arc::new(TokenService::from_config(&config.security));
        let account_service = Arc::new(AccountService::new(
            accounts,
            token_service.clone(),
            config.security.token_ttl_hours,
        ));

        Self {
            config,
            contacts,
            token_service,
            account_service,
        }
    }

    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(self.token_service.clone(), self.config.security.cookie_name.clone())
    }
}

/// 请求追踪
///
/// 每个请求一个 `http_request` span；完成时记录日志和指标，
/// 并在响应头回写 `x-trace-id` / `x-request-id`。
/// request_id 在处理期间可通过 [`current_request_id`] 读取，错误响应体里用的是同一个值。
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();
    let scoped_id = request_id.clone();

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    // 指标按路由模板聚合，避免 /api/contacts/1、/api/contacts/2 各占一个标签
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let handled = async move {
        let start = Instant::now();
        let mut response = next.run(req).await;
        let elapsed = start.elapsed();
        let status = response.status();

        metrics::counter!(
            "http_requests_total",
            "method" => method_label(&method),
            "route" => route.clone(),
            "status" => status_class(status)
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds", "route" => route)
            .record(elapsed.as_secs_f64());

        tracing::info!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            headers.insert(TRACE_ID_HEADER, value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }

        response
    }
    .instrument(span);

    REQUEST_ID.scope(scoped_id, handled).await
}

/// 沿用调用方传入的 trace_id，没有则生成
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        _ => "OTHER",
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

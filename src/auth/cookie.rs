//! 认证 Cookie 的读取与构造

use axum::http::{header, HeaderMap, HeaderValue};

/// 从 `Cookie` 请求头中读取指定名称的值，空值视为不存在
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 登录时下发的 Cookie：HttpOnly，页面脚本无法读取
pub fn create_auth_cookie(
    name: &str,
    token: &str,
    max_age_secs: i64,
    secure: bool,
) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// 登出时下发的 Cookie：立即过期
pub fn create_logout_cookie(name: &str, secure: bool) -> Option<HeaderValue> {
    create_auth_cookie(name, "", 0, secure)
}

//! 配置系统
//! 启动时从环境变量一次性加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use url::Url;

/// JWT 密钥的最小长度（HS256）
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8080"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥。没有默认值：缺失时启动失败
    pub jwt_secret: Option<Secret<String>>,
    /// 令牌有效期（小时）
    pub token_ttl_hours: i64,
    /// 存放令牌的 Cookie 名称
    pub cookie_name: String,
    /// Cookie 是否只在 HTTPS 下发送
    pub cookie_secure: bool,
}

impl SecurityConfig {
    /// 与令牌有效期一致的 Cookie 生命周期（秒）
    pub fn cookie_max_age_secs(&self) -> i64 {
        self.token_ttl_hours * 3600
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    ///
    /// 主来源是 `APP_` 前缀、`__` 分隔的变量（如 `APP_SECURITY__JWT_SECRET`）。
    /// 部署脚本里常见的 `JWT_SECRET`、`DATABASE_URL`、`PORT` 以及
    /// `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` 会作为覆盖值生效。
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.token_ttl_hours", 24)?
            .set_default("security.cookie_name", "token")?
            .set_default("security.cookie_secure", false)?;

        settings = settings.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings = settings
            .set_override_option("security.jwt_secret", non_empty_env("JWT_SECRET"))?
            .set_override_option("database.url", database_url_from_env()?)?
            .set_override_option(
                "server.addr",
                non_empty_env("PORT").map(|port| format!("0.0.0.0:{}", port)),
            )?;

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        // 验证端口范围
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 缺少签名密钥时绝不能继续签发令牌
        let secret = self.security.jwt_secret.as_ref().ok_or_else(|| {
            ConfigError::Message(
                "JWT secret is not configured (set JWT_SECRET or APP_SECURITY__JWT_SECRET)"
                    .to_string(),
            )
        })?;

        if secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            )));
        }

        if self.security.token_ttl_hours < 1 || self.security.token_ttl_hours > 168 {
            return Err(ConfigError::Message(
                "token_ttl_hours must be between 1 and 168 (1 hour to 7 days)".to_string(),
            ));
        }

        if self.security.cookie_name.is_empty() {
            return Err(ConfigError::Message("cookie_name must not be empty".to_string()));
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `DATABASE_URL`，或由 `DB_*` 分项变量拼出的连接串
///
/// 用户名和密码按 userinfo 规则百分号编码，密码里的 `@`、`/` 不会破坏 URL。
fn database_url_from_env() -> Result<Option<String>, ConfigError> {
    if let Some(url) = non_empty_env("DATABASE_URL") {
        return Ok(Some(url));
    }

    let (Some(host), Some(user), Some(name)) = (
        non_empty_env("DB_HOST"),
        non_empty_env("DB_USER"),
        non_empty_env("DB_NAME"),
    ) else {
        return Ok(None);
    };
    let port = non_empty_env("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let password = std::env::var("DB_PASSWORD").unwrap_or_default();

    build_database_url(&host, &port, &user, &password, &name).map(Some)
}

fn build_database_url(
    host: &str,
    port: &str,
    user: &str,
    password: &str,
    name: &str,
) -> Result<String, ConfigError> {
    let invalid = |what: &str| ConfigError::Message(format!("Invalid {} for database URL", what));

    let port: u16 = port.parse().map_err(|_| invalid("DB_PORT"))?;

    let mut url = Url::parse("postgres://localhost").map_err(|_| invalid("base URL"))?;
    url.set_host(Some(host)).map_err(|_| invalid("DB_HOST"))?;
    url.set_port(Some(port)).map_err(|_| invalid("DB_PORT"))?;
    url.set_username(user).map_err(|_| invalid("DB_USER"))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| invalid("DB_PASSWORD"))?;
    }
    url.set_path(name);
    url.query_pairs_mut().append_pair("sslmode", "disable");

    Ok(url.to_string())
}

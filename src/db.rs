//! PostgreSQL 连接池与迁移

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 编译期嵌入 `migrations/` 目录
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// 首次连接的最大尝试次数（数据库容器可能晚于服务启动）
const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INITIAL_DELAY: Duration = Duration::from_millis(500);
const CONNECT_MAX_DELAY: Duration = Duration::from_secs(8);

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Failed to connect to database after {attempts} attempts: {source}")]
    ConnectionFailed {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Migration failed: {0}")]
    MigrationFailed(#[from] sqlx::migrate::MigrateError),
}

/// 连接池参数
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
}

/// 创建连接池，连接失败时按指数退避重试
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let mut delay = CONNECT_INITIAL_DELAY;
    let mut attempt = 1;

    loop {
        match pool_options(config)
            .connect(config.url.expose_secret())
            .await
        {
            Ok(pool) => {
                tracing::info!(
                    attempt,
                    max_connections = config.max_connections,
                    min_connections = config.min_connections,
                    "Database pool created"
                );
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_ATTEMPTS => {
                tracing::warn!(
                    attempt,
                    max_attempts = CONNECT_ATTEMPTS,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %e,
                    "Database connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(CONNECT_MAX_DELAY);
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempts = attempt, error = %e, "Giving up on database connection");
                return Err(DbError::ConnectionFailed {
                    attempts: attempt,
                    source: e,
                });
            }
        }
    }
}

/// 执行尚未应用的迁移
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!(available = MIGRATOR.iter().count(), "Running database migrations");

    MIGRATOR.run(pool).await?;

    tracing::info!("Migrations completed");
    Ok(())
}

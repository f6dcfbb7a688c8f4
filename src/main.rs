//! 联系人服务主入口

use contacts_service::{
    auth,
    config::AppConfig,
    db,
    handlers::health,
    middleware::AppState,
    repository::{PgAccountRepository, PgContactRepository},
    routes, telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("contacts-service {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--generate-secret" => {
                println!("{}", auth::generate_secret());
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                std::process::exit(2);
            }
        }
    }

    // .env.<APP_ENV> > .env.local > .env，已存在的环境变量不会被覆盖
    if let Ok(env) = std::env::var("APP_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    }
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    health::set_start_time();

    // 1. 配置：缺少 JWT 密钥等必需项时直接退出
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 日志
    telemetry::init_telemetry(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "contacts-service starting");

    // 3. 数据库连接池 + 迁移
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    tracing::info!("Database initialized");

    // 4. 应用状态与路由
    let addr = config.server.addr.clone();
    let shutdown_timeout = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);

    let state = AppState::new(
        config,
        Arc::new(PgAccountRepository::new(pool.clone())),
        Arc::new(PgContactRepository::new(pool.clone())),
    );
    let app = routes::create_router(Arc::new(state));

    // 5. 启动服务器
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    pool.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 等待 Ctrl+C 或 SIGTERM
///
/// 收到信号后开始优雅关闭；超过时限仍未结束的连接会被强制终止。
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!(
            timeout_secs = timeout.as_secs(),
            "Graceful shutdown timeout reached, forcing exit"
        );
        std::process::exit(1);
    });
}

fn print_help() {
    println!("contacts-service {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: contacts-service [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --generate-secret  Print a random hex secret for JWT_SECRET and exit");
    println!("  -V, --version      Print version and exit");
    println!("  -h, --help         Print this help and exit");
    println!();
    println!("Environment:");
    println!("  JWT_SECRET                  token signing secret (required, >= 32 chars)");
    println!("  DATABASE_URL                PostgreSQL connection string");
    println!("  DB_HOST/DB_PORT/DB_USER/DB_PASSWORD/DB_NAME");
    println!("                              used when DATABASE_URL is not set");
    println!("  PORT                        listen port (default 8080)");
    println!("  APP_<SECTION>__<KEY>        any other setting, e.g. APP_LOGGING__FORMAT=json");
}

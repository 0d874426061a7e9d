use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use user_product::biz::{UserMapper, UserUseCase};
use user_product::config::{MapperBackend, ServerConfig};
use user_product::data::{Database, InMemoryUserMapper, SqlUserMapper};
use user_product::metric::{self, AppMetrics};
use user_product::server::HttpServer;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 初始化环境变量
    user_product::init_env();

    // 2. 初始化 tracing
    let tracing_cleanup = metric::init_tracing()?;

    // 3. 加载配置，第一个参数可指定配置文件
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = Arc::new(
        ServerConfig::load(config_path.as_deref()).context("failed to load configuration")?,
    );
    info!(addr = %cfg.bind_addr(), backend = ?cfg.lookup.backend, "User HTTP Server starting...");

    // 4. 设置优雅关闭
    let cancel_token = CancellationToken::new();
    let signal_cancel_token = cancel_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, initiating graceful shutdown...");
        signal_cancel_token.cancel();
    });
    let shutdown_future = cancel_token.cancelled_owned();

    let metrics = Arc::new(AppMetrics::new());
    let delay = cfg.lookup.delay();

    // 5. 按配置选择 mapper 并启动
    let server_result = match cfg.lookup.backend {
        MapperBackend::Sql => {
            let db = Database::connect(&cfg.database)
                .await
                .context("failed to connect database")?;
            db.migrate().await.context("failed to migrate database")?;

            let mapper = Arc::new(SqlUserMapper::new(&db));
            let uuc = Arc::new(UserUseCase::with_delay(mapper, delay));
            let result = serve(cfg.clone(), uuc, metrics, shutdown_future).await;

            db.close().await;
            result
        }
        MapperBackend::Memory => {
            let mapper = Arc::new(InMemoryUserMapper::with_users(cfg.lookup.seed_users()));
            info!(users = mapper.len(), "In-memory user store seeded");
            let uuc = Arc::new(UserUseCase::with_delay(mapper, delay));
            serve(cfg.clone(), uuc, metrics, shutdown_future).await
        }
    };

    // 6. 清理资源
    info!("Cleaning up resources...");
    tracing_cleanup.cleanup();

    if let Err(e) = server_result {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("User HTTP Server shutdown complete");
    Ok(())
}

async fn serve<M: UserMapper + 'static>(
    cfg: Arc<ServerConfig>,
    uuc: Arc<UserUseCase<M>>,
    metrics: Arc<AppMetrics>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> user_product::Result<()> {
    let server = HttpServer::new(cfg, uuc, metrics);
    server.run_with_shutdown(shutdown).await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                _ => {
                    error!("Failed to install signal handlers, falling back to CTRL+C");
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            _ = sigint.recv() => info!("Received SIGINT, shutting down..."),
            _ = tokio::signal::ctrl_c() => info!("Received CTRL+C, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for CTRL+C: {}", e);
        }
        info!("Received CTRL+C, shutting down...");
    }
}

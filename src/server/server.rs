/*
 * HTTP server: 把按 id 查询用户的用例挂到 axum 上，支持优雅关闭
 */

use std::sync::Arc;

use tracing::info;

use crate::biz::{UserMapper, UserUseCase};
use crate::metric::AppMetrics;
use crate::{config::ServerConfig, error::UserProductError, service::UserServiceImpl, Result};

pub struct HttpServer<M: UserMapper> {
    pub cfg: Arc<ServerConfig>,
    pub user_service: Arc<UserServiceImpl<M>>,
    pub metrics: Arc<AppMetrics>,
}

impl<M: UserMapper + 'static> HttpServer<M> {
    pub fn new(cfg: Arc<ServerConfig>, uuc: Arc<UserUseCase<M>>, metrics: Arc<AppMetrics>) -> Self {
        let user_service = Arc::new(UserServiceImpl::new(uuc, Arc::clone(&metrics)));
        Self {
            cfg,
            user_service,
            metrics,
        }
    }

    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.cfg.bind_addr()).await?;
        info!("Server is running on {}", listener.local_addr()?);

        let app = self.create_router();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| UserProductError::ServerError(e.to_string()))?;

        Ok(())
    }
}

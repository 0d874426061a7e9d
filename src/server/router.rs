use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Path, http::StatusCode, response::Json, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info_span, Span};

use super::middleware::{tracing_middleware, RequestTracingConfig};
use super::server::HttpServer;
use crate::biz::{UserId, UserMapper};

/// 请求 ID 生成器
#[derive(Clone, Default)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let request_id = uuid::Uuid::new_v4().to_string();
        Some(RequestId::new(request_id.parse().ok()?))
    }
}

impl<M: UserMapper + 'static> HttpServer<M> {
    pub fn create_router(&self) -> Router {
        self.create_router_with_config(RequestTracingConfig::default())
    }

    pub fn create_router_with_config(&self, tracing_config: RequestTracingConfig) -> Router {
        let user_service = Arc::clone(&self.user_service);
        let metrics = Arc::clone(&self.metrics);
        let timeout = Duration::from_secs(self.cfg.server.request_timeout_secs);

        Router::new()
            .route("/ping", get(|| async { "ok" }))
            .route("/health", get(health_check))
            .route(
                "/metrics",
                get(move || async move { Json(metrics.snapshot()) }),
            )
            .route(
                "/users/{id}",
                get(move |path: Path<UserId>| async move { user_service.get_user(path).await }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(tracing_config),
                tracing_middleware,
            ))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                timeout,
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<_>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("")
                            .to_string();
                        info_span!(
                            "http",
                            "http.method" = %request.method(),
                            "http.url" = %request.uri(),
                            "request.id" = %request_id,
                        )
                    })
                    .on_response(
                        |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                            tracing::debug!(
                                "http.response.status_code" = %response.status(),
                                duration_ms = %latency.as_millis(),
                                "HTTP request completed"
                            );
                        },
                    ),
            )
    }
}

/// 健康检查端点
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "service": "user-product",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::biz::{LookupDelay, User, UserUseCase};
    use crate::config::{DatabaseConfig, ServerConfig};
    use crate::data::{Database, InMemoryUserMapper, SqlUserMapper};
    use crate::metric::{init_logs, AppMetrics};

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn memory_router() -> Router {
        let mapper = InMemoryUserMapper::with_users([User::new(1, "Alice", "alice@example.com", 30)]);
        let server = HttpServer::new(
            Arc::new(ServerConfig::default_for_test()),
            Arc::new(UserUseCase::new(Arc::new(mapper))),
            Arc::new(AppMetrics::new()),
        );
        server.create_router()
    }

    #[tokio::test]
    async fn test_get_user_routes() {
        init_logs();
        let router = memory_router();

        let (status, body) = get(router.clone(), "/users/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"]["name"], "Alice");

        let (status, body) = get(router.clone(), "/users/2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);

        let (status, _) = get(router.clone(), "/users/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(router, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], 1);
        assert_eq!(body["not_found"], 1);
    }

    #[tokio::test]
    async fn test_ping_and_health() {
        let router = memory_router();

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (status, body) = get(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_sql_backend_failure_maps_to_500() {
        init_logs();
        let db = Database::connect(&DatabaseConfig::default()).await.unwrap();
        db.migrate().await.unwrap();
        let mapper = SqlUserMapper::new(&db);
        mapper
            .insert(&User::new(1, "Alice", "alice@example.com", 30))
            .await
            .unwrap();

        let server = HttpServer::new(
            Arc::new(ServerConfig::default_for_test()),
            Arc::new(UserUseCase::new(Arc::new(mapper))),
            Arc::new(AppMetrics::new()),
        );
        let router = server.create_router();

        let (status, body) = get(router.clone(), "/users/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "alice@example.com");

        db.close().await;
        let (status, body) = get(router, "/users/1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 1002);
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_with_408() {
        init_logs();
        let mapper = InMemoryUserMapper::with_users([User::new(1, "Alice", "alice@example.com", 30)]);
        let mut cfg = ServerConfig::default_for_test();
        cfg.server.request_timeout_secs = 1;
        let server = HttpServer::new(
            Arc::new(cfg),
            Arc::new(UserUseCase::with_delay(
                Arc::new(mapper),
                LookupDelay::from_millis(5_000),
            )),
            Arc::new(AppMetrics::new()),
        );

        let started = std::time::Instant::now();
        let (status, _) = get(server.create_router(), "/users/1").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName},
    middleware::Next,
    response::Response,
};
use opentelemetry::{
    propagation::{Extractor, Injector},
    trace::{Status, TraceContextExt},
    KeyValue,
};
use tracing::{error, info, warn, Instrument};
use tracing_opentelemetry::OpenTelemetrySpanExt;

const HTTP_STATUS_CODE: &str = "http.status_code";

/// HTTP Headers 作为 Extractor，用于从请求头中提取 trace context
struct HeaderExtractor<'a>(&'a HeaderMap);

impl<'a> Extractor for HeaderExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

/// HTTP Headers 作为 Injector，用于向响应头中注入 trace context
struct HeaderInjector<'a>(&'a mut HeaderMap);

impl<'a> Injector for HeaderInjector<'a> {
    fn set(&mut self, key: &str, value: String) {
        if let Ok(header_name) = HeaderName::try_from(key) {
            if let Ok(header_value) = value.parse() {
                self.0.insert(header_name, header_value);
            }
        }
    }
}

/// 请求链路中间件配置
#[derive(Debug, Clone)]
pub struct RequestTracingConfig {
    /// 慢请求阈值（毫秒）
    pub slow_request_threshold_ms: u64,
    /// 是否在响应头中包含 trace_id
    pub include_trace_id_header: bool,
    /// trace_id 响应头名称
    pub trace_id_header_name: String,
}

impl Default for RequestTracingConfig {
    fn default() -> Self {
        Self {
            slow_request_threshold_ms: 1000,
            include_trace_id_header: true,
            trace_id_header_name: "x-trace-id".to_string(),
        }
    }
}

/// 从请求头恢复上游 trace context，按状态码记录日志，并把 trace context 写回响应头
pub async fn tracing_middleware(
    State(config): State<Arc<RequestTracingConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let parent_cx = opentelemetry::global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    });

    let span = tracing::info_span!("http_request", method = %method, path = %path);
    span.set_parent(parent_cx);

    let mut response = next.run(request).instrument(span.clone()).await;

    let duration_ms = start_time.elapsed().as_millis() as u64;
    let status_code = response.status();

    let otel_ctx = span.context();
    otel_ctx
        .span()
        .set_attribute(KeyValue::new(HTTP_STATUS_CODE, status_code.as_u16() as i64));

    let _enter = span.enter();
    if status_code.is_server_error() {
        otel_ctx
            .span()
            .set_status(Status::error("Internal server error"));
        error!(status_code = %status_code.as_u16(), duration_ms, "Server error occurred");
    } else if status_code.is_client_error() {
        otel_ctx.span().set_status(Status::error("Client error"));
        warn!(status_code = %status_code.as_u16(), duration_ms, "Client error occurred");
    } else if duration_ms >= config.slow_request_threshold_ms {
        otel_ctx.span().set_status(Status::Ok);
        warn!(status_code = %status_code.as_u16(), duration_ms, "Slow request completed");
    } else {
        otel_ctx.span().set_status(Status::Ok);
        info!(status_code = %status_code.as_u16(), duration_ms, "Request completed");
    }

    let response_headers = response.headers_mut();
    opentelemetry::global::get_text_map_propagator(|propagator| {
        propagator.inject_context(&otel_ctx, &mut HeaderInjector(response_headers))
    });

    // 没有装 OTel layer 时 span context 无效，不输出全零 trace_id
    let span_context = otel_ctx.span().span_context().clone();
    if config.include_trace_id_header && span_context.is_valid() {
        let trace_id = span_context.trace_id().to_string();
        if let (Ok(header_name), Ok(header_value)) = (
            HeaderName::try_from(config.trace_id_header_name.as_str()),
            trace_id.parse(),
        ) {
            response_headers.insert(header_name, header_value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::{body::Body, routing::get, Router};
    use opentelemetry::trace::TracerProvider;
    use opentelemetry_sdk::trace::SdkTracerProvider;
    use tower::ServiceExt;
    use tracing_subscriber::layer::SubscriberExt;

    fn app(config: RequestTracingConfig) -> Router {
        Router::new()
            .route("/test", get(|| async { "test response" }))
            .route(
                "/boom",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(config),
                tracing_middleware,
            ))
    }

    const UPSTREAM_TRACE_ID: &str = "4bf92f3577b34da6a3ce929d0e0e4736";
    const UPSTREAM_TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    #[tokio::test]
    async fn test_no_trace_id_header_without_otel_layer() {
        crate::metric::init_logs();

        let request = axum::http::Request::builder()
            .uri("/test")
            .header("user-agent", "test-agent")
            .body(Body::empty())
            .unwrap();
        let response = app(RequestTracingConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key("x-trace-id"));
    }

    #[tokio::test]
    async fn test_continues_upstream_trace() {
        crate::metric::init_propagator();

        // current_thread 运行时，线程局部 subscriber 覆盖整个请求
        let provider = SdkTracerProvider::builder().build();
        let subscriber = tracing_subscriber::registry()
            .with(tracing_opentelemetry::layer().with_tracer(provider.tracer("middleware-test")));
        let _guard = tracing::subscriber::set_default(subscriber);

        let request = axum::http::Request::builder()
            .uri("/test")
            .header("traceparent", UPSTREAM_TRACEPARENT)
            .body(Body::empty())
            .unwrap();
        let response = app(RequestTracingConfig::default())
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let trace_id = response.headers().get("x-trace-id").unwrap().to_str().unwrap();
        assert_eq!(trace_id, UPSTREAM_TRACE_ID);
        let traceparent = response.headers().get("traceparent").unwrap().to_str().unwrap();
        assert!(traceparent.starts_with(&format!("00-{}-", UPSTREAM_TRACE_ID)));
        // 下游 span 是新的 span id
        assert!(!traceparent.contains("00f067aa0ba902b7"));
    }

    #[tokio::test]
    async fn test_tracing_middleware_passes_through_errors() {
        crate::metric::init_logs();

        let config = RequestTracingConfig {
            include_trace_id_header: false,
            ..Default::default()
        };
        let request = axum::http::Request::builder()
            .uri("/boom")
            .body(Body::empty())
            .unwrap();
        let response = app(config).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!response.headers().contains_key("x-trace-id"));
    }
}

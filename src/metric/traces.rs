use std::env;
use std::sync::Once;

use anyhow::Result;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::SpanExporter;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing::{error, info};
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Registry,
};

static INIT: Once = Once::new();

/// Tracing 配置结构
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// 服务名称
    pub service_name: String,
    /// 服务版本
    pub service_version: String,
    /// 服务环境 (dev, staging, prod)
    pub environment: String,
    /// OTLP collector endpoint (支持 Jaeger, DataDog, New Relic 等)
    pub otlp_endpoint: Option<String>,
    /// 没有 OTLP endpoint 时是否把 span 打到 stdout
    pub stdout_spans: bool,
    /// 日志级别
    pub log_level: String,
    /// 是否启用控制台输出
    pub console_output: bool,
    /// 是否启用JSON格式
    pub json_format: bool,
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: env::var("SERVICE_NAME").unwrap_or_else(|_| "user-product".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            stdout_spans: env_flag("STDOUT_SPANS", false),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            console_output: env_flag("CONSOLE_OUTPUT", true),
            json_format: env_flag("JSON_FORMAT", true),
        }
    }
}

/// 初始化 OpenTelemetry tracer，不需要导出时返回 None
fn init_opentelemetry(config: &TracingConfig) -> Result<Option<SdkTracerProvider>> {
    use opentelemetry_otlp::WithExportConfig;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", config.service_version.clone()),
            KeyValue::new("service.environment", config.environment.clone()),
            KeyValue::new("service.instance.id", uuid::Uuid::new_v4().to_string()),
        ])
        .build();

    let builder = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::AlwaysOn);

    let provider = if let Some(otlp_endpoint) = &config.otlp_endpoint {
        let exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(otlp_endpoint)
            .build()?;
        builder.with_batch_exporter(exporter).build()
    } else if config.stdout_spans {
        // 开发环境下使用 stdout exporter
        builder
            .with_batch_exporter(opentelemetry_stdout::SpanExporter::default())
            .build()
    } else {
        return Ok(None);
    };

    Ok(Some(provider))
}

/// 安装 W3C traceparent 传播器，HTTP 中间件靠它提取/注入上游 trace context
pub fn init_propagator() {
    global::set_text_map_propagator(TraceContextPropagator::new());
}

/// 统一的 tracing 初始化入口
pub fn init_tracing() -> Result<TracingCleanup> {
    init_tracing_with_config(TracingConfig::default())
}

/// 使用自定义配置初始化 tracing
pub fn init_tracing_with_config(config: TracingConfig) -> Result<TracingCleanup> {
    init_propagator();
    let tracer_provider = init_opentelemetry(&config)?;

    let trace_layer = tracer_provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer()
            .with_error_records_to_exceptions(true)
            .with_tracer(provider.tracer("user-product"))
    });

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_level))?;
    let registry = Registry::default().with(env_filter).with(trace_layer);

    if config.console_output {
        if config.json_format {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(false)
                .with_level(true)
                .with_thread_ids(true);

            registry.with(fmt_layer).try_init()?;
        } else {
            let fmt_layer = fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(false)
                .with_level(true)
                .with_thread_ids(true);

            registry.with(fmt_layer).try_init()?;
        }
    } else {
        registry.try_init()?;
    }

    info!(
        service_name = %config.service_name,
        service_version = %config.service_version,
        environment = %config.environment,
        otlp_endpoint = ?config.otlp_endpoint,
        "Tracing initialized successfully"
    );

    if let Some(provider) = &tracer_provider {
        global::set_tracer_provider(provider.clone());
    }

    Ok(TracingCleanup { tracer_provider })
}

/// 清理资源的结构体
#[derive(Default)]
pub struct TracingCleanup {
    tracer_provider: Option<SdkTracerProvider>,
}

impl TracingCleanup {
    pub fn cleanup(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                error!("Failed to shutdown tracer provider: {:?}", e);
            } else {
                info!("Tracer provider shutdown successfully");
            }
        }
    }
}

/// 仅控制台日志，可重复调用（测试用）
pub fn init_logs() {
    INIT.call_once(|| {
        init_propagator();
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}

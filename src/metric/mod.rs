pub mod metrics;
pub mod traces;

// 导出 metrics 功能
pub use metrics::{AppMetrics, MetricsSnapshot};

pub use traces::{
    init_logs, init_propagator, init_tracing, init_tracing_with_config, TracingCleanup,
    TracingConfig,
};

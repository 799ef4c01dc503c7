pub mod metrics;

pub use metrics::{
    cache_hit_ratio, connection_usage_percent, DatabaseMetrics, MetricsCollector, MetricsError,
};

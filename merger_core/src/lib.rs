pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod query;
pub mod source;

pub use config::{GatewayConfig, MergerConfig, SourceConfig};
pub use error::{MergerError, Result};
pub use model::{
    AggregatedSeries, Histogram, LatencySeries, Mesh, Percentile, RequestedRate, Resolution, Run,
    RunSet,
};
pub use parser::{parse_config_from_file, parse_config_from_str};
pub use source::{DynSource, MetricSource, PrometheusSource, Sample};

// Re-export commonly used types
pub use async_trait::async_trait;

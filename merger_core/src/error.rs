use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergerError {
    #[error("Metric source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("No requested rate for run '{run}' of mesh '{mesh}'")]
    MissingRate { mesh: String, run: String },

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("Push gateway unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Metrics registry error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MergerError>;

use async_trait::async_trait;
use merger_core::{GatewayConfig, MergerError, Result};
use prometheus::proto::MetricFamily;
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;
use tracing::{debug, info};

/// Destination for gathered summary series
#[async_trait]
pub trait SummarySink: Send + Sync {
    /// Replace everything stored for `job` with `families`
    async fn push(&self, job: &str, families: &[MetricFamily]) -> Result<()>;
}

pub type DynSink = Arc<dyn SummarySink>;

pub fn encode_text(families: &[MetricFamily]) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MergerError::Other(e.into()))
}

/// Prometheus push gateway client
pub struct PushGateway {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl PushGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| MergerError::SinkUnavailable(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// `<gateway>/metrics/job/<job>/instance/<instance>`; bare `host:port` addresses get `http://`.
    pub fn push_url(&self, job: &str) -> Result<reqwest::Url> {
        let address = if self.config.address.contains("://") {
            self.config.address.clone()
        } else {
            format!("http://{}", self.config.address)
        };

        let mut url = reqwest::Url::parse(&address).map_err(|e| {
            MergerError::InvalidConfig(format!("push gateway '{}': {}", self.config.address, e))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                MergerError::InvalidConfig(format!(
                    "push gateway '{}' cannot be a base URL",
                    self.config.address
                ))
            })?;
            segments.pop_if_empty().extend([
                "metrics",
                "job",
                job,
                "instance",
                self.config.instance.as_str(),
            ]);
        }
        Ok(url)
    }
}

#[async_trait]
impl SummarySink for PushGateway {
    async fn push(&self, job: &str, families: &[MetricFamily]) -> Result<()> {
        let url = self.push_url(job)?;
        let body = encode_text(families)?;
        debug!("Pushing {} bytes to {}", body.len(), url);

        let response = self
            .http_client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, TextEncoder::new().format_type())
            .body(body)
            .send()
            .await
            .map_err(|e| MergerError::SinkUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(MergerError::SinkUnavailable(format!(
                "push gateway returned status {}: {}",
                status,
                reason.trim()
            )));
        }

        info!("Pushed {} metric families for job '{}'", families.len(), job);
        Ok(())
    }
}

/// Dry-run sink printing the exposition text instead of pushing it
pub struct StdoutSink {
    instance: String,
}

impl StdoutSink {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }
}

#[async_trait]
impl SummarySink for StdoutSink {
    async fn push(&self, job: &str, families: &[MetricFamily]) -> Result<()> {
        let text = encode_text(families)?;
        println!("# job=\"{}\" instance=\"{}\"", job, self.instance);
        print!("{}", text);
        Ok(())
    }
}

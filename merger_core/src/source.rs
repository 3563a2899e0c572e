use crate::{
    config::SourceConfig,
    error::{MergerError, Result},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Pull-based read access to a metrics backend
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Evaluate an instant query and return the resulting samples
    async fn query(&self, expr: &str) -> Result<Vec<Sample>>;
}

pub type DynSource = Arc<dyn MetricSource>;

/// One element of an instant-vector result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    pub value: (f64, String),
}

impl Sample {
    pub fn new(labels: &[(&str, &str)], value: impl Into<String>) -> Self {
        Self {
            metric: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            value: (0.0, value.into()),
        }
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.metric.get(name).map(String::as_str)
    }

    pub fn require_label(&self, name: &str) -> Result<&str> {
        self.label(name).ok_or_else(|| {
            MergerError::InvalidSample(format!("sample has no '{}' label: {:?}", name, self.metric))
        })
    }

    pub fn raw_value(&self) -> &str {
        &self.value.1
    }

    pub fn value(&self) -> Result<f64> {
        self.value.1.trim().parse::<f64>().map_err(|e| {
            MergerError::InvalidSample(format!("sample value '{}': {}", self.value.1, e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Vec<Sample>,
}

/// Decode a `/api/v1/query` response body into its samples.
pub fn parse_response(body: &str) -> Result<Vec<Sample>> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| MergerError::SourceUnavailable(format!("malformed query response: {}", e)))?;

    if response.status != "success" {
        return Err(MergerError::SourceUnavailable(
            response
                .error
                .unwrap_or_else(|| format!("query status '{}'", response.status)),
        ));
    }

    Ok(response.data.map(|d| d.result).unwrap_or_default())
}

/// Prometheus HTTP API client
pub struct PrometheusSource {
    config: SourceConfig,
    http_client: reqwest::Client,
}

impl PrometheusSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| MergerError::SourceUnavailable(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    pub fn query_url(&self) -> String {
        format!("{}/api/v1/query", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl MetricSource for PrometheusSource {
    async fn query(&self, expr: &str) -> Result<Vec<Sample>> {
        debug!("Querying {}", expr);

        let response = self
            .http_client
            .get(self.query_url())
            .query(&[("query", expr)])
            .send()
            .await
            .map_err(|e| MergerError::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MergerError::SourceUnavailable(e.to_string()))?;

        if !status.is_success() {
            // error responses still carry a JSON body with the reason
            return Err(match parse_response(&body) {
                Err(e) => e,
                Ok(_) => MergerError::SourceUnavailable(format!(
                    "server returned status: {}",
                    status
                )),
            });
        }

        let samples = parse_response(&body)?;
        debug!("Query returned {} samples", samples.len());
        Ok(samples)
    }
}

use crate::ui;
use anyhow::Result;
use merger_core::{parse_config_from_file, MergerConfig, Mesh, PrometheusSource};
use merger_metrics::{DynSink, MeshMerger, PushGateway, StdoutSink};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct RunOptions {
    pub prometheus_url: String,
    pub pushgateway: String,
    pub config: Option<PathBuf>,
    pub meshes: Vec<String>,
    pub instance: Option<String>,
    pub timeout: Option<Duration>,
    pub keep_going: bool,
    pub dry_run: bool,
}

pub async fn execute(options: RunOptions) -> Result<()> {
    let mut config = match &options.config {
        Some(path) => {
            info!("Loading config: {}", path.display());
            parse_config_from_file(path).await?
        }
        None => MergerConfig::default(),
    };

    // Command-line flags win over the config file
    if !options.meshes.is_empty() {
        config.meshes = options.meshes.iter().map(|m| Mesh::from(m.as_str())).collect();
    }
    if let Some(instance) = options.instance {
        config.instance = instance;
    }
    if let Some(timeout) = options.timeout {
        config.query_timeout = Some(timeout);
        config.push_timeout = Some(timeout);
    }
    config.keep_going |= options.keep_going;
    config.validate().map_err(anyhow::Error::msg)?;

    let source = PrometheusSource::new(config.source_config(&options.prometheus_url))?;
    let sink: DynSink = if options.dry_run {
        info!("Dry run: summary series are printed, not pushed");
        Arc::new(StdoutSink::new(config.instance.clone()))
    } else {
        Arc::new(PushGateway::new(config.gateway_config(&options.pushgateway))?)
    };

    let merger = MeshMerger::new(Arc::new(source), sink);
    let outcomes = merger
        .merge_all(&config.meshes, config.keep_going, ui::print_outcome)
        .await?;

    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| o.is_failed())
        .map(|o| o.mesh().to_string())
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("{} mesh(es) failed: {}", failed.len(), failed.join(", "));
    }

    Ok(())
}

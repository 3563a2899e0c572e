use crate::{
    aggregator::HistogramAggregator,
    publisher::{PublishedSummary, SummaryPublisher},
    rate::RateLookup,
    sink::DynSink,
};
use merger_core::{DynSource, MergerError, Mesh, Resolution, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionReport {
    pub resolution: Resolution,
    pub percentiles: usize,
    pub runs: usize,
    pub observations: usize,
}

impl From<&PublishedSummary> for ResolutionReport {
    fn from(summary: &PublishedSummary) -> Self {
        Self {
            resolution: summary.resolution,
            percentiles: summary.percentiles,
            runs: summary.runs,
            observations: summary.observations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshReport {
    pub mesh: Mesh,
    pub resolutions: Vec<ResolutionReport>,
}

impl MeshReport {
    pub fn resolution(&self, resolution: Resolution) -> Option<&ResolutionReport> {
        self.resolutions.iter().find(|r| r.resolution == resolution)
    }
}

#[derive(Debug)]
pub enum MeshOutcome {
    Merged(MeshReport),
    Failed { mesh: Mesh, error: MergerError },
}

impl MeshOutcome {
    pub fn mesh(&self) -> &Mesh {
        match self {
            MeshOutcome::Merged(report) => &report.mesh,
            MeshOutcome::Failed { mesh, .. } => mesh,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MeshOutcome::Failed { .. })
    }
}

/// Aggregates, publishes and pushes the summary series of each mesh, one at a time.
pub struct MeshMerger {
    source: DynSource,
    aggregator: HistogramAggregator,
    sink: DynSink,
}

impl MeshMerger {
    pub fn new(source: DynSource, sink: DynSink) -> Self {
        Self {
            aggregator: HistogramAggregator::new(source.clone()),
            source,
            sink,
        }
    }

    /// Publishes both resolutions of `mesh` and pushes them together, or nothing on failure.
    pub async fn merge_mesh(&self, mesh: &Mesh) -> Result<MeshReport> {
        info!("Merging latency histograms of mesh '{}'", mesh);

        let mut families = Vec::new();
        let mut resolutions = Vec::with_capacity(Resolution::ALL.len());

        for resolution in Resolution::ALL {
            let series = self.aggregator.aggregate(mesh, resolution).await?;
            let mut rates = RateLookup::new(self.source.clone());
            let summary = SummaryPublisher::publish(mesh, resolution, &series, &mut rates).await?;

            info!(
                "Mesh '{}' ({}): {} observations over {} percentiles",
                mesh, resolution, summary.observations, summary.percentiles
            );
            families.extend(summary.registry.gather());
            resolutions.push(ResolutionReport::from(&summary));
        }

        self.sink.push(mesh.as_str(), &families).await?;

        Ok(MeshReport {
            mesh: mesh.clone(),
            resolutions,
        })
    }

    /// Merges every mesh in order. Without `keep_going` the first failure is returned
    /// and later meshes are left untouched; with it, failures are recorded and skipped.
    pub async fn merge_all<F>(
        &self,
        meshes: &[Mesh],
        keep_going: bool,
        mut on_outcome: F,
    ) -> Result<Vec<MeshOutcome>>
    where
        F: FnMut(&MeshOutcome),
    {
        let mut outcomes = Vec::with_capacity(meshes.len());

        for mesh in meshes {
            let outcome = match self.merge_mesh(mesh).await {
                Ok(report) => MeshOutcome::Merged(report),
                Err(error) if keep_going => {
                    warn!("Skipping mesh '{}': {}", mesh, error);
                    MeshOutcome::Failed {
                        mesh: mesh.clone(),
                        error,
                    }
                }
                Err(error) => return Err(error),
            };
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

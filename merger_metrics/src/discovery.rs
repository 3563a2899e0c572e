use merger_core::{query, DynSource, Mesh, Result, Run, RunSet};
use tracing::debug;

/// Finds the runs of a mesh that reported `status="done"`.
pub struct RunDiscovery {
    source: DynSource,
}

impl RunDiscovery {
    pub fn new(source: DynSource) -> Self {
        Self { source }
    }

    pub async fn completed_runs(&self, mesh: &Mesh) -> Result<RunSet> {
        let samples = self.source.query(&query::completed_runs(mesh)).await?;

        let mut runs = RunSet::with_capacity(samples.len());
        for sample in &samples {
            let run = Run::new(sample.require_label(query::RUN_LABEL)?);
            if !runs.insert(run) {
                debug!("Run reported more than once for mesh '{}'", mesh);
            }
        }

        debug!("Mesh '{}' has {} completed runs", mesh, runs.len());
        Ok(runs)
    }
}

use merger_core::{query, DynSource, MergerError, Mesh, RequestedRate, Result, Run};
use std::collections::HashMap;
use tracing::debug;

/// Requested rates already resolved during one publish pass.
///
/// Keyed by mesh and run together: run identifiers are only unique within a mesh.
#[derive(Debug, Default)]
pub struct RateCache {
    rates: HashMap<(Mesh, Run), RequestedRate>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mesh: &Mesh, run: &Run) -> Option<&RequestedRate> {
        self.rates.get(&(mesh.clone(), run.clone()))
    }

    pub fn insert(&mut self, mesh: Mesh, run: Run, rate: RequestedRate) {
        self.rates.insert((mesh, run), rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Resolves the requested rate of a run, querying the source at most once per (mesh, run).
pub struct RateLookup {
    source: DynSource,
    cache: RateCache,
}

impl RateLookup {
    pub fn new(source: DynSource) -> Self {
        Self {
            source,
            cache: RateCache::new(),
        }
    }

    pub async fn requested_rate(&mut self, mesh: &Mesh, run: &Run) -> Result<RequestedRate> {
        if let Some(rate) = self.cache.get(mesh, run) {
            return Ok(rate.clone());
        }

        let samples = self.source.query(&query::requested_rps(mesh, run)).await?;
        let sample = samples.first().ok_or_else(|| MergerError::MissingRate {
            mesh: mesh.to_string(),
            run: run.to_string(),
        })?;
        let rate = RequestedRate::parse(sample.raw_value())?;

        debug!("Run '{}' of mesh '{}' requested {} rps", run, mesh, rate);
        self.cache.insert(mesh.clone(), run.clone(), rate.clone());
        Ok(rate)
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }
}

pub mod aggregator;
pub mod collector;
pub mod discovery;
pub mod pipeline;
pub mod publisher;
pub mod rate;
pub mod sink;

pub use aggregator::{observation_count, HistogramAggregator};
pub use collector::HistogramCollector;
pub use discovery::RunDiscovery;
pub use pipeline::{MeshMerger, MeshOutcome, MeshReport, ResolutionReport};
pub use publisher::{PublishedSummary, SummaryPublisher};
pub use rate::{RateCache, RateLookup};
pub use sink::{DynSink, PushGateway, StdoutSink, SummarySink};

#[cfg(test)]
pub(crate) mod testing;

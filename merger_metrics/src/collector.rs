use merger_core::{query, DynSource, Histogram, Percentile, Resolution, Result, Run};
use tracing::debug;

/// Reads the latency histogram of a single run.
pub struct HistogramCollector {
    source: DynSource,
}

impl HistogramCollector {
    pub fn new(source: DynSource) -> Self {
        Self { source }
    }

    pub async fn histogram(&self, run: &Run, resolution: Resolution) -> Result<Histogram> {
        let samples = self
            .source
            .query(&query::latency_histogram(run, resolution))
            .await?;

        let mut histogram = Histogram::with_capacity(samples.len());
        for sample in &samples {
            let percentile = Percentile::parse(sample.require_label(query::PERCENTILE_LABEL)?)?;
            histogram.insert(percentile, sample.value()?);
        }

        if histogram.is_empty() {
            debug!("Run '{}' has no {} latency data", run, resolution);
        }

        Ok(histogram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSource;
    use merger_core::{MergerError, Sample};
    use std::sync::Arc;

    fn p(value: f64) -> Percentile {
        Percentile::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_coarse_histogram() {
        let source = StaticSource::new()
            .histogram("r1", Resolution::Coarse, &[("50.0", "10"), ("99.0", "50")])
            .histogram("r1", Resolution::Detailed, &[("50.0", "10.2")]);
        let collector = HistogramCollector::new(Arc::new(source));

        let histogram = collector.histogram(&Run::from("r1"), Resolution::Coarse).await.unwrap();
        assert_eq!(histogram.len(), 2);
        assert_eq!(histogram[&p(50.0)], 10.0);
        assert_eq!(histogram[&p(99.0)], 50.0);
    }

    #[tokio::test]
    async fn test_detailed_uses_its_own_metric() {
        let source = Arc::new(
            StaticSource::new()
                .histogram("r1", Resolution::Detailed, &[("99.9", "61.3"), ("99.99", "75")]),
        );
        let collector = HistogramCollector::new(source.clone());

        let histogram = collector.histogram(&Run::from("r1"), Resolution::Detailed).await.unwrap();
        assert_eq!(histogram[&p(99.9)], 61.3);
        assert_eq!(
            source.queries(),
            vec![r#"wrk2_benchmark_latency_detailed_ms{run="r1"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_histogram() {
        let collector = HistogramCollector::new(Arc::new(StaticSource::new()));
        let histogram = collector.histogram(&Run::from("r1"), Resolution::Coarse).await.unwrap();
        assert!(histogram.is_empty());
    }

    #[tokio::test]
    async fn test_zero_latency_is_kept() {
        let source = StaticSource::new().histogram("r1", Resolution::Coarse, &[("0.0", "0")]);
        let collector = HistogramCollector::new(Arc::new(source));

        let histogram = collector.histogram(&Run::from("r1"), Resolution::Coarse).await.unwrap();
        assert_eq!(histogram.get(&p(0.0)), Some(&0.0));
    }

    #[tokio::test]
    async fn test_repeated_percentile_keeps_last() {
        let source = StaticSource::new()
            .histogram("r1", Resolution::Coarse, &[("50", "10"), ("50.0", "11")]);
        let collector = HistogramCollector::new(Arc::new(source));

        let histogram = collector.histogram(&Run::from("r1"), Resolution::Coarse).await.unwrap();
        assert_eq!(histogram.len(), 1);
        assert_eq!(histogram[&p(50.0)], 11.0);
    }

    #[tokio::test]
    async fn test_sample_without_percentile() {
        let run = Run::from("r1");
        let source = StaticSource::new().with(
            query::latency_histogram(&run, Resolution::Coarse),
            vec![Sample::new(&[("run", "r1")], "10")],
        );
        let collector = HistogramCollector::new(Arc::new(source));

        let err = collector.histogram(&run, Resolution::Coarse).await.unwrap_err();
        assert!(matches!(err, MergerError::InvalidSample(_)));
    }
}

//! Prometheus exposition of scraped samples.
//!
//! [`ExtfilterCollector`] implements [`prometheus::core::Collector`]: the
//! registry asks for the ten descriptors once at registration and calls
//! `collect` on every gather, which runs one scrape of the stats file.

use std::collections::{BTreeMap, HashMap};
use std::string::FromUtf8Error;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};
use thiserror::Error;
use tracing::{error, warn};

use crate::collector::{FileSystem, StatsCollector};
use crate::metrics::{Catalogue, MetricId, Sample};

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
    #[error("encoded metrics are not UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

/// Adapter exposing a [`StatsCollector`] to a `prometheus` registry.
pub struct ExtfilterCollector<F: FileSystem> {
    stats: StatsCollector<F>,
    descs: Vec<Desc>,
}

impl<F: FileSystem> ExtfilterCollector<F> {
    pub fn new(stats: StatsCollector<F>) -> Result<Self, ExpositionError> {
        let descs = stats
            .catalogue()
            .iter()
            .map(|d| {
                Desc::new(
                    d.name.clone(),
                    d.help.to_string(),
                    d.label_names.iter().map(|l| l.to_string()).collect(),
                    HashMap::new(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { stats, descs })
    }
}

impl<F: FileSystem> Collector for ExtfilterCollector<F> {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let scrape = self.stats.scrape();
        match build_families(self.stats.catalogue(), &scrape.samples) {
            Ok(families) => families,
            Err(e) => {
                error!(error = %e, "failed to build metric families");
                Vec::new()
            }
        }
    }
}

/// Groups samples into one counter family per metric.
///
/// Metrics without samples produce no family. Each line is a snapshot of
/// the counter, so when a metric and label values repeat the last line
/// wins. Negative and NaN values cannot be counter values and are skipped
/// with a warning.
pub fn build_families(
    catalogue: &Catalogue,
    samples: &[Sample],
) -> Result<Vec<MetricFamily>, ExpositionError> {
    let mut counters: BTreeMap<MetricId, CounterVec> = BTreeMap::new();

    for sample in samples {
        let descriptor = catalogue.get(sample.metric);
        if sample.value.is_nan() || sample.value < 0.0 {
            warn!(
                metric = %descriptor.name,
                labels = ?sample.labels,
                value = sample.value,
                "skipping invalid counter value"
            );
            continue;
        }

        if !counters.contains_key(&sample.metric) {
            let counter = CounterVec::new(
                Opts::new(descriptor.name.clone(), descriptor.help),
                descriptor.label_names,
            )?;
            counters.insert(sample.metric, counter);
        }

        let labels: Vec<&str> = sample.labels.iter().map(String::as_str).collect();
        let counter = counters[&sample.metric].get_metric_with_label_values(&labels)?;
        counter.reset();
        counter.inc_by(sample.value);
    }

    Ok(counters.values().flat_map(|c| c.collect()).collect())
}

/// Creates a registry with `collector` as its only collector.
pub fn registry_for<F>(collector: ExtfilterCollector<F>) -> Result<Registry, ExpositionError>
where
    F: FileSystem + 'static,
{
    let registry = Registry::new();
    registry.register(Box::new(collector))?;
    Ok(registry)
}

/// Gathers `registry` (running one scrape) and encodes the text format.
pub fn encode_text(registry: &Registry) -> Result<String, ExpositionError> {
    let families = registry.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::MockFs;
    use crate::collector::mock::TYPICAL_STATS_PATH;

    fn registry(fs: MockFs) -> Registry {
        let stats = StatsCollector::new(fs, TYPICAL_STATS_PATH);
        registry_for(ExtfilterCollector::new(stats).unwrap()).unwrap()
    }

    fn sample(metric: MetricId, labels: &[&str], value: f64) -> Sample {
        Sample {
            metric,
            value,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_describes_ten_metrics() {
        let stats = StatsCollector::new(MockFs::new(), TYPICAL_STATS_PATH);
        let collector = ExtfilterCollector::new(stats).unwrap();
        let descs = collector.desc();
        assert_eq!(descs.len(), 10);
        assert_eq!(descs[0].fq_name, "extfilter_worker_packets_total");
        assert_eq!(descs[1].variable_labels, vec!["core", "ip_version"]);
    }

    #[test]
    fn test_encode_typical() {
        let text = encode_text(&registry(MockFs::typical_extfilter())).unwrap();

        assert!(text.contains("# HELP extfilter_worker_packets_total Total packets processed by the worker"));
        assert!(text.contains("# TYPE extfilter_worker_packets_total counter"));
        assert!(text.contains("extfilter_worker_packets_total{core=\"1\"} 1048576"));
        assert!(text.contains("extfilter_ip_packets_total{core=\"2\",ip_version=\"6\"} 24000"));
        assert!(text.contains("extfilter_matches_total{core=\"1\",type=\"http_bl_ipv4\"} 870"));
        assert!(text.contains("extfilter_short_packets{core=\"1\",ip_version=\"4\"} 2"));
        assert!(text.contains("extfilter_packets_received_total 1572900"));
        assert!(text.contains("extfilter_rx_no_buffer_total 0"));
        assert!(!text.contains("allworkers"));
    }

    #[test]
    fn test_encode_missing_file_is_empty() {
        let text = encode_text(&registry(MockFs::missing_extfilter())).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_encode_noisy() {
        let text = encode_text(&registry(MockFs::noisy_extfilter())).unwrap();
        assert!(text.contains("extfilter_worker_packets_total{core=\"3\"} 42"));
        assert!(text.contains("extfilter_ip_packets_total{core=\"3\",ip_version=\"6\"} 7"));
        assert!(text.contains("extfilter_packets_received_total 1000"));
        assert!(!text.contains("extfilter_matches_total"));
    }

    #[test]
    fn test_gather_is_idempotent() {
        let registry = registry(MockFs::typical_extfilter());
        assert_eq!(encode_text(&registry).unwrap(), encode_text(&registry).unwrap());
    }

    #[test]
    fn test_families_skip_metrics_without_samples() {
        let catalogue = Catalogue::new();
        let families = build_families(
            &catalogue,
            &[sample(MetricId::InputErrors, &[], 3.0)],
        )
        .unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "extfilter_input_errors_total");
        assert_eq!(families[0].get_metric()[0].get_counter().get_value(), 3.0);
    }

    #[test]
    fn test_families_keep_last_duplicate_series() {
        let catalogue = Catalogue::new();
        let families = build_families(
            &catalogue,
            &[
                sample(MetricId::WorkerPackets, &["3"], 10.0),
                sample(MetricId::WorkerPackets, &["3"], 5.0),
                sample(MetricId::WorkerPackets, &["4"], 1.0),
            ],
        )
        .unwrap();
        assert_eq!(families.len(), 1);
        let metrics = families[0].get_metric();
        assert_eq!(metrics.len(), 2);
        let mut values: Vec<f64> = metrics.iter().map(|m| m.get_counter().get_value()).collect();
        values.sort_by(f64::total_cmp);
        assert_eq!(values, vec![1.0, 5.0]);
    }

    #[test]
    fn test_encode_repeated_key_reports_last_value() {
        let fs = MockFs::new();
        fs.add_file(TYPICAL_STATS_PATH, "allports.ierrors=5
allports.ierrors=5
");
        let text = encode_text(&registry(fs)).unwrap();
        assert!(text.contains("extfilter_input_errors_total 5\n"));
        assert!(!text.contains("extfilter_input_errors_total 10"));
    }

    #[test]
    fn test_families_skip_invalid_values() {
        let catalogue = Catalogue::new();
        let families = build_families(
            &catalogue,
            &[
                sample(MetricId::InputErrors, &[], -1.0),
                sample(MetricId::RxNoBuffer, &[], f64::NAN),
            ],
        )
        .unwrap();
        assert!(families.is_empty());
    }

    #[test]
    fn test_families_reject_label_mismatch() {
        let catalogue = Catalogue::new();
        let result = build_families(&catalogue, &[sample(MetricId::WorkerPackets, &[], 1.0)]);
        assert!(matches!(result, Err(ExpositionError::Prometheus(_))));
    }
}

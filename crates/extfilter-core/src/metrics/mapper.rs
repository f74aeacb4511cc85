//! Maps dotted stats keys to catalogue metrics.
//!
//! Keys are positional: `worker.<id>.<core>.<name>`, `allports.<name>` and
//! `allworkers.<name>`. The meaning of every recognized name lives in the
//! static tables below; adding a metric is a new table row.

use thiserror::Error;

use super::catalogue::MetricId;

/// One emitted counter value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric: MetricId,
    pub value: f64,
    /// Label values, in `metric.label_names()` order.
    pub labels: Vec<String>,
}

/// Outcome of mapping one stats key.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    Sample(Sample),
    /// A known key that is intentionally not exported.
    Dropped,
    Unknown(UnknownKey),
}

/// Why a key was not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownKey {
    #[error("unknown metric type: {0}")]
    Category(String),
    #[error("unknown worker metric name: {0}")]
    WorkerMetric(String),
    #[error("unknown allports metric name: {0}")]
    AllportsMetric(String),
    #[error("truncated {category} key {key:?}: expected at least {expected} segments")]
    Truncated {
        category: &'static str,
        key: String,
        expected: usize,
    },
}

#[derive(Debug, Clone, Copy)]
enum Category {
    Worker,
    Allports,
    Allworkers,
}

/// How label values are derived from a worker key.
#[derive(Debug, Clone, Copy)]
enum LabelRule {
    /// `[core]`
    Core,
    /// `[core, ip_version]` with a fixed version.
    CoreIpVersion(&'static str),
    /// `[core, type]` where type is the name without `matched_`.
    CoreMatchType,
}

#[derive(Debug, Clone, Copy)]
enum WorkerRule {
    Emit(MetricId, LabelRule),
    Drop,
}

const WORKER_SEGMENTS: usize = 4;
const ALLPORTS_SEGMENTS: usize = 2;
const MATCHED_PREFIX: &str = "matched_";

static CATEGORIES: &[(&str, Category)] = &[
    ("worker", Category::Worker),
    ("allports", Category::Allports),
    ("allworkers", Category::Allworkers),
];

static WORKER_METRICS: &[(&str, WorkerRule)] = &[
    ("total_packets", WorkerRule::Emit(MetricId::WorkerPackets, LabelRule::Core)),
    ("ip_packets", WorkerRule::Drop),
    ("ipv4_packets", WorkerRule::Emit(MetricId::WorkerIpPackets, LabelRule::CoreIpVersion("4"))),
    ("ipv6_packets", WorkerRule::Emit(MetricId::WorkerIpPackets, LabelRule::CoreIpVersion("6"))),
    ("total_bytes", WorkerRule::Emit(MetricId::WorkerBytes, LabelRule::Core)),
    ("matched_ip_port", WorkerRule::Emit(MetricId::WorkerMatches, LabelRule::CoreMatchType)),
    ("matched_ssl_sni", WorkerRule::Emit(MetricId::WorkerMatches, LabelRule::CoreMatchType)),
    ("matched_ssl_ip", WorkerRule::Emit(MetricId::WorkerMatches, LabelRule::CoreMatchType)),
    ("matched_http_bl_ipv4", WorkerRule::Emit(MetricId::WorkerMatches, LabelRule::CoreMatchType)),
    ("matched_http_bl_ipv6", WorkerRule::Emit(MetricId::WorkerMatches, LabelRule::CoreMatchType)),
    ("ipv4_fragments", WorkerRule::Emit(MetricId::WorkerFragments, LabelRule::CoreIpVersion("4"))),
    ("ipv6_fragments", WorkerRule::Emit(MetricId::WorkerFragments, LabelRule::CoreIpVersion("6"))),
    // extfilter reports no IPv6 short packet counter.
    ("ipv4_short_packets", WorkerRule::Emit(MetricId::WorkerShortPackets, LabelRule::CoreIpVersion("4"))),
];

static ALLPORTS_METRICS: &[(&str, MetricId)] = &[
    ("received_packets", MetricId::ReceivedPackets),
    ("missed_packets", MetricId::MissedPackets),
    ("ierrors", MetricId::InputErrors),
    ("rx_nombuf", MetricId::RxNoBuffer),
];

fn lookup<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// Maps one stats key and its value.
///
/// Pure: the result depends only on the arguments.
pub fn map_stat(key: &str, value: f64) -> Mapping {
    let segments: Vec<&str> = key.split('.').collect();
    let category = segments[0];

    match lookup(CATEGORIES, category) {
        Some(Category::Worker) => map_worker(key, &segments, value),
        Some(Category::Allports) => map_allports(key, &segments, value),
        Some(Category::Allworkers) => Mapping::Dropped,
        None => Mapping::Unknown(UnknownKey::Category(category.to_string())),
    }
}

fn map_worker(key: &str, segments: &[&str], value: f64) -> Mapping {
    if segments.len() < WORKER_SEGMENTS {
        return Mapping::Unknown(UnknownKey::Truncated {
            category: "worker",
            key: key.to_string(),
            expected: WORKER_SEGMENTS,
        });
    }
    let core = segments[2];
    let name = segments[3];

    let (metric, rule) = match lookup(WORKER_METRICS, name) {
        Some(WorkerRule::Emit(metric, rule)) => (metric, rule),
        Some(WorkerRule::Drop) => return Mapping::Dropped,
        None => return Mapping::Unknown(UnknownKey::WorkerMetric(name.to_string())),
    };

    let labels = match rule {
        LabelRule::Core => vec![core.to_string()],
        LabelRule::CoreIpVersion(version) => vec![core.to_string(), version.to_string()],
        LabelRule::CoreMatchType => {
            let kind = name.strip_prefix(MATCHED_PREFIX).unwrap_or(name);
            vec![core.to_string(), kind.to_string()]
        }
    };

    Mapping::Sample(Sample {
        metric,
        value,
        labels,
    })
}

fn map_allports(key: &str, segments: &[&str], value: f64) -> Mapping {
    if segments.len() < ALLPORTS_SEGMENTS {
        return Mapping::Unknown(UnknownKey::Truncated {
            category: "allports",
            key: key.to_string(),
            expected: ALLPORTS_SEGMENTS,
        });
    }
    let name = segments[1];

    match lookup(ALLPORTS_METRICS, name) {
        Some(metric) => Mapping::Sample(Sample {
            metric,
            value,
            labels: Vec::new(),
        }),
        None => Mapping::Unknown(UnknownKey::AllportsMetric(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(key: &str, value: f64) -> Sample {
        match map_stat(key, value) {
            Mapping::Sample(s) => s,
            other => panic!("expected sample for {key}, got {other:?}"),
        }
    }

    #[test]
    fn test_total_packets() {
        let s = sample("worker.0.3.total_packets", 42.0);
        assert_eq!(s.metric, MetricId::WorkerPackets);
        assert_eq!(s.labels, vec!["3"]);
        assert_eq!(s.value, 42.0);
    }

    #[test]
    fn test_ip_packets_by_version() {
        let s = sample("worker.0.3.ipv6_packets", 7.0);
        assert_eq!(s.metric, MetricId::WorkerIpPackets);
        assert_eq!(s.labels, vec!["3", "6"]);
        assert_eq!(s.value, 7.0);

        let s = sample("worker.1.5.ipv4_packets", 8.0);
        assert_eq!(s.labels, vec!["5", "4"]);
    }

    #[test]
    fn test_legacy_ip_packets_is_dropped() {
        assert_eq!(map_stat("worker.0.3.ip_packets", 99.0), Mapping::Dropped);
    }

    #[test]
    fn test_total_bytes() {
        let s = sample("worker.2.11.total_bytes", 1.0e9);
        assert_eq!(s.metric, MetricId::WorkerBytes);
        assert_eq!(s.labels, vec!["11"]);
    }

    #[test]
    fn test_match_types_strip_prefix() {
        let cases = [
            ("matched_ip_port", "ip_port"),
            ("matched_ssl_sni", "ssl_sni"),
            ("matched_ssl_ip", "ssl_ip"),
            ("matched_http_bl_ipv4", "http_bl_ipv4"),
            ("matched_http_bl_ipv6", "http_bl_ipv6"),
        ];
        for (name, kind) in cases {
            let s = sample(&format!("worker.0.1.{name}"), 3.0);
            assert_eq!(s.metric, MetricId::WorkerMatches);
            assert_eq!(s.labels, vec!["1", kind]);
        }
    }

    #[test]
    fn test_fragments_by_version() {
        assert_eq!(sample("worker.0.2.ipv4_fragments", 1.0).labels, vec!["2", "4"]);
        let s = sample("worker.0.2.ipv6_fragments", 1.0);
        assert_eq!(s.metric, MetricId::WorkerFragments);
        assert_eq!(s.labels, vec!["2", "6"]);
    }

    #[test]
    fn test_short_packets_ipv4_only() {
        let s = sample("worker.0.2.ipv4_short_packets", 5.0);
        assert_eq!(s.metric, MetricId::WorkerShortPackets);
        assert_eq!(s.labels, vec!["2", "4"]);

        assert_eq!(
            map_stat("worker.0.2.ipv6_short_packets", 5.0),
            Mapping::Unknown(UnknownKey::WorkerMetric("ipv6_short_packets".into()))
        );
    }

    #[test]
    fn test_core_label_is_verbatim() {
        assert_eq!(sample("worker.0.socket1-07.total_packets", 1.0).labels, vec!["socket1-07"]);
    }

    #[test]
    fn test_unknown_worker_metric() {
        assert_eq!(
            map_stat("worker.0.3.unknown_name", 1.0),
            Mapping::Unknown(UnknownKey::WorkerMetric("unknown_name".into()))
        );
    }

    #[test]
    fn test_truncated_worker_key() {
        match map_stat("worker.0.3", 1.0) {
            Mapping::Unknown(UnknownKey::Truncated {
                category, expected, ..
            }) => {
                assert_eq!(category, "worker");
                assert_eq!(expected, 4);
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_extra_segments_ignored() {
        let s = sample("worker.0.3.total_packets.extra", 1.0);
        assert_eq!(s.metric, MetricId::WorkerPackets);
        assert_eq!(s.labels, vec!["3"]);
    }

    #[test]
    fn test_allports_counters() {
        let cases = [
            ("allports.received_packets", MetricId::ReceivedPackets),
            ("allports.missed_packets", MetricId::MissedPackets),
            ("allports.ierrors", MetricId::InputErrors),
            ("allports.rx_nombuf", MetricId::RxNoBuffer),
        ];
        for (key, metric) in cases {
            let s = sample(key, 1000.0);
            assert_eq!(s.metric, metric);
            assert!(s.labels.is_empty());
            assert_eq!(s.value, 1000.0);
        }
    }

    #[test]
    fn test_unknown_allports_metric() {
        assert_eq!(
            map_stat("allports.bogus", 1.0),
            Mapping::Unknown(UnknownKey::AllportsMetric("bogus".into()))
        );
    }

    #[test]
    fn test_truncated_allports_key() {
        assert!(matches!(
            map_stat("allports", 1.0),
            Mapping::Unknown(UnknownKey::Truncated { category: "allports", .. })
        ));
    }

    #[test]
    fn test_allworkers_is_dropped() {
        assert_eq!(map_stat("allworkers.total_packets", 1.0), Mapping::Dropped);
        assert_eq!(map_stat("allworkers", 1.0), Mapping::Dropped);
    }

    #[test]
    fn test_unknown_category() {
        assert_eq!(
            map_stat("ports.0.ierrors", 1.0),
            Mapping::Unknown(UnknownKey::Category("ports".into()))
        );
    }

    #[test]
    fn test_worker_table_matches_label_schema() {
        for (name, rule) in WORKER_METRICS {
            if let WorkerRule::Emit(metric, _) = rule {
                let s = sample(&format!("worker.0.0.{name}"), 0.0);
                assert_eq!(s.labels.len(), metric.label_names().len(), "{name}");
            }
        }
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let keys = ["worker.0.3.ipv4_fragments", "allports.ierrors", "bogus.key"];
        for key in keys {
            assert_eq!(map_stat(key, 12.5), map_stat(key, 12.5));
        }
    }
}

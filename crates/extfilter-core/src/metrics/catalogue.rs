//! The fixed set of metrics the exporter can emit.

use std::fmt;

/// Prefix shared by every exposed metric name.
pub const METRICS_PREFIX: &str = "extfilter_";

/// Identity of one exposed metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricId {
    WorkerPackets,
    WorkerIpPackets,
    WorkerBytes,
    WorkerMatches,
    WorkerFragments,
    WorkerShortPackets,
    ReceivedPackets,
    MissedPackets,
    InputErrors,
    RxNoBuffer,
}

impl MetricId {
    /// Every metric, in catalogue order.
    pub const ALL: [MetricId; 10] = [
        MetricId::WorkerPackets,
        MetricId::WorkerIpPackets,
        MetricId::WorkerBytes,
        MetricId::WorkerMatches,
        MetricId::WorkerFragments,
        MetricId::WorkerShortPackets,
        MetricId::ReceivedPackets,
        MetricId::MissedPackets,
        MetricId::InputErrors,
        MetricId::RxNoBuffer,
    ];

    /// Metric name without [`METRICS_PREFIX`].
    pub fn name(self) -> &'static str {
        match self {
            MetricId::WorkerPackets => "worker_packets_total",
            MetricId::WorkerIpPackets => "ip_packets_total",
            MetricId::WorkerBytes => "bytes_total",
            MetricId::WorkerMatches => "matches_total",
            MetricId::WorkerFragments => "fragments_total",
            MetricId::WorkerShortPackets => "short_packets",
            MetricId::ReceivedPackets => "packets_received_total",
            MetricId::MissedPackets => "packets_missed_total",
            MetricId::InputErrors => "input_errors_total",
            MetricId::RxNoBuffer => "rx_no_buffer_total",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricId::WorkerPackets => "Total packets processed by the worker",
            MetricId::WorkerIpPackets => "Total IP packets processed by the worker",
            MetricId::WorkerBytes => "Total bytes processed by the worker",
            MetricId::WorkerMatches => "Total matches by the worker",
            MetricId::WorkerFragments => "Total fragments received by the worker",
            MetricId::WorkerShortPackets => "Total short packets processed by the worker",
            MetricId::ReceivedPackets => "Total packets received on all ports",
            MetricId::MissedPackets => "Total packets missed on all ports",
            MetricId::InputErrors => "Total input errors encountered on all ports",
            MetricId::RxNoBuffer => "Total RX buffer errors encountered on all ports",
        }
    }

    /// Label names, in the order sample label values are stored.
    pub fn label_names(self) -> &'static [&'static str] {
        match self {
            MetricId::WorkerPackets | MetricId::WorkerBytes => &["core"],
            MetricId::WorkerIpPackets
            | MetricId::WorkerFragments
            | MetricId::WorkerShortPackets => &["core", "ip_version"],
            MetricId::WorkerMatches => &["core", "type"],
            MetricId::ReceivedPackets
            | MetricId::MissedPackets
            | MetricId::InputErrors
            | MetricId::RxNoBuffer => &[],
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", METRICS_PREFIX, self.name())
    }
}

/// Descriptor of an exposed metric: full name, help text and label schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub id: MetricId,
    /// Fully qualified name, prefix included.
    pub name: String,
    pub help: &'static str,
    pub label_names: &'static [&'static str],
}

/// The immutable descriptor table, built once per collector.
#[derive(Debug, Clone)]
pub struct Catalogue {
    descriptors: Vec<MetricDescriptor>,
}

impl Catalogue {
    pub fn new() -> Self {
        let descriptors = MetricId::ALL
            .iter()
            .map(|&id| MetricDescriptor {
                id,
                name: id.to_string(),
                help: id.help(),
                label_names: id.label_names(),
            })
            .collect();
        Self { descriptors }
    }

    pub fn get(&self, id: MetricId) -> &MetricDescriptor {
        // Built from `MetricId::ALL`, whose order matches the discriminants.
        &self.descriptors[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.descriptors.iter()
    }

}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new()
    }
}

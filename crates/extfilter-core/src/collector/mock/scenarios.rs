//! Pre-built stats file fixtures.
//!
//! The layouts follow what extfilter writes: per-worker counters keyed by
//! worker id and lcore, aggregated `allworkers` counters, and DPDK port
//! totals under `allports`.

use super::filesystem::MockFs;

/// Path the fixtures are written to.
pub const TYPICAL_STATS_PATH: &str = "/var/run/extfilter/stats";

impl MockFs {
    /// Two workers on cores 1 and 2, with every counter extfilter reports.
    ///
    /// Yields 28 samples (12 per worker plus the port totals) and 4 dropped keys.
    pub fn typical_extfilter() -> Self {
        let fs = Self::new();
        fs.add_file(
            TYPICAL_STATS_PATH,
            "\
worker.0.1.total_packets=1048576
worker.0.1.ip_packets=1048000
worker.0.1.ipv4_packets=1000000
worker.0.1.ipv6_packets=48000
worker.0.1.total_bytes=734003200
worker.0.1.matched_ip_port=120
worker.0.1.matched_ssl_sni=4500
worker.0.1.matched_ssl_ip=30
worker.0.1.matched_http_bl_ipv4=870
worker.0.1.matched_http_bl_ipv6=12
worker.0.1.ipv4_fragments=310
worker.0.1.ipv6_fragments=4
worker.0.1.ipv4_short_packets=2
worker.1.2.total_packets=524288
worker.1.2.ip_packets=524000
worker.1.2.ipv4_packets=500000
worker.1.2.ipv6_packets=24000
worker.1.2.total_bytes=367001600
worker.1.2.matched_ip_port=60
worker.1.2.matched_ssl_sni=2250
worker.1.2.matched_ssl_ip=15
worker.1.2.matched_http_bl_ipv4=435
worker.1.2.matched_http_bl_ipv6=6
worker.1.2.ipv4_fragments=155
worker.1.2.ipv6_fragments=2
worker.1.2.ipv4_short_packets=1
allworkers.total_packets=1572864
allworkers.total_bytes=1101004800

allports.received_packets=1572900
allports.missed_packets=36
allports.ierrors=0
allports.rx_nombuf=0
",
        );
        fs
    }

    /// A stats file with malformed and unknown lines between good ones.
    ///
    /// Yields 3 samples; 2 lines are malformed, 3 keys are unknown and 1 is dropped.
    pub fn noisy_extfilter() -> Self {
        let fs = Self::new();
        fs.add_file(
            TYPICAL_STATS_PATH,
            "\
worker.0.3.total_packets=abc
worker.0.3.total_packets=42
worker.0.3.ip_packets=99
worker.0.3.unknown_name=1
allports.bogus=1
this line has no separator
dpdk.ports=2
allports.received_packets=1000
worker.0.3.ipv6_packets=7
",
        );
        fs
    }

    /// An empty filesystem: the stats file has not been written yet.
    pub fn missing_extfilter() -> Self {
        Self::new()
    }
}

/// Runtime configuration for the activity tracker.
use crate::label::{LabelSet, COUNTABLE_DEFAULT};

/// Tracker configuration. Everything here may be changed at runtime by the
/// host (see `comm::handle_command`) without reflashing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    /// Trailing window over which sightings count (ms).
    pub window_ms: u64,
    /// Entries in the most-seen list.
    pub top_n: usize,
    /// Entries in the most-recent list.
    pub recent_n: usize,
    /// Maximum time between aggregations when nothing new arrives (ms).
    pub quiescence_ms: u64,
    /// Minimum time between knowledge writes (ms). Protects flash endurance.
    pub flush_interval_ms: u64,
    /// Upper bound on tracked devices; the stalest is evicted beyond this.
    pub max_devices: usize,
    /// Sightings weaker than this (dBm) are ignored.
    pub min_rssi: i8,
    /// Labels counted in the headline active count.
    pub countable: LabelSet,
}

impl TrackerConfig {
    pub const fn new() -> Self {
        Self {
            window_ms: 60 * 60 * 1000,
            top_n: 5,
            recent_n: 5,
            quiescence_ms: 10_000,
            flush_interval_ms: 5 * 60 * 1000,
            max_devices: 256,
            min_rssi: -100,
            countable: COUNTABLE_DEFAULT,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

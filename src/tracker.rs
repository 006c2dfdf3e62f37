/// Per-device activity tracking over a sliding time window.
///
/// Each identity owns an [`ActivityRecord`] holding its detection
/// timestamps oldest-first. Sightings append at the back, ticks evict from
/// the front; a record whose window empties is dropped on the tick that
/// empties it.
use alloc::collections::{BTreeMap, VecDeque};
use alloc::vec::Vec;

use crate::config::TrackerConfig;
use crate::knowledge::KnowledgeBase;
use crate::label::Label;
use crate::protocol::NameString;

/// Activity of one device within the window.
#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub identity: u64,
    pub display: NameString,
    pub label: Label,
    /// Latest RSSI (dBm)
    pub rssi: i8,
    /// Detection timestamps (ms since boot), oldest first, non-decreasing
    seen: VecDeque<u64>,
    /// Ingestion cycle of the last appended timestamp
    cycle: u32,
}

impl ActivityRecord {
    /// Sightings inside the window (after the last tick).
    pub fn count_in_window(&self) -> usize {
        self.seen.len()
    }

    pub fn last_seen(&self) -> Option<u64> {
        self.seen.back().copied()
    }

    pub fn first_seen(&self) -> Option<u64> {
        self.seen.front().copied()
    }

    /// Read-only copy for aggregation. `None` when the window is empty.
    pub fn view(&self) -> Option<ActivityView> {
        Some(ActivityView {
            identity: self.identity,
            display: self.display.clone(),
            label: self.label,
            count: self.seen.len() as u32,
            last_seen: self.last_seen()?,
            rssi: self.rssi,
        })
    }

    fn append(&mut self, timestamp: u64, cycle: u32) {
        if self.cycle == cycle && !self.seen.is_empty() {
            return;
        }
        // Keep the sequence non-decreasing even if the clock source jitters.
        let ts = self.seen.back().map_or(timestamp, |&last| timestamp.max(last));
        self.seen.push_back(ts);
        self.cycle = cycle;
    }

    fn prune(&mut self, cutoff: u64) {
        while self.seen.front().is_some_and(|&t| t < cutoff) {
            self.seen.pop_front();
        }
    }
}

/// Snapshot of an active record, consumed by the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityView {
    pub identity: u64,
    pub display: NameString,
    pub label: Label,
    pub count: u32,
    pub last_seen: u64,
    pub rssi: i8,
}

/// All tracked devices, keyed by identity.
#[derive(Debug, Clone)]
pub struct ActivityStore {
    records: BTreeMap<u64, ActivityRecord>,
    window_ms: u64,
    max_devices: usize,
    cycle: u32,
}

impl ActivityStore {
    pub fn new(window_ms: u64, max_devices: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            window_ms,
            max_devices: max_devices.max(1),
            cycle: 0,
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.window_ms, config.max_devices)
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Start a new ingestion cycle (one scan round). Within a cycle each
    /// identity contributes at most one timestamp.
    pub fn begin_cycle(&mut self) {
        self.cycle = self.cycle.wrapping_add(1);
    }

    /// Record one sighting and return the effective label.
    ///
    /// Returns `None` for the null identity, which is discarded.
    pub fn record_sighting(
        &mut self,
        identity: u64,
        display: &str,
        heuristic: Label,
        rssi: i8,
        timestamp: u64,
        knowledge: &mut KnowledgeBase,
    ) -> Option<Label> {
        if identity == 0 {
            return None;
        }

        let cycle = self.cycle;
        if let Some(record) = self.records.get_mut(&identity) {
            if heuristic.is_strong() && heuristic != record.label {
                record.label = knowledge.resolve(identity, heuristic);
            }
            record.rssi = rssi;
            record.append(timestamp, cycle);
            return Some(record.label);
        }

        if self.records.len() >= self.max_devices {
            self.evict_stalest();
        }

        let mut record = ActivityRecord {
            identity,
            display: NameString::new(),
            label: knowledge.resolve(identity, heuristic),
            rssi,
            seen: VecDeque::new(),
            cycle,
        };
        for c in display.chars() {
            if record.display.push(c).is_err() {
                break;
            }
        }
        record.append(timestamp, cycle);
        let label = record.label;
        self.records.insert(identity, record);
        Some(label)
    }

    /// Drop the record seen least recently (lowest identity on ties).
    fn evict_stalest(&mut self) {
        let stalest = self
            .records
            .values()
            .min_by_key(|r| (r.last_seen().unwrap_or(0), r.identity))
            .map(|r| r.identity);
        if let Some(id) = stalest {
            log::debug!("Store full ({}), evicting {:012X}", self.max_devices, id);
            self.records.remove(&id);
        }
    }

    /// Evict timestamps older than the window and drop emptied records.
    ///
    /// A timestamp exactly `window_ms` old is still inside the window.
    /// Returns the number of records removed.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        let before = self.records.len();
        self.records.retain(|_, record| {
            record.prune(cutoff);
            record.count_in_window() > 0
        });
        let removed = before - self.records.len();
        if removed > 0 {
            log::debug!("Pruned {} idle devices, {} remain", removed, self.records.len());
        }
        removed
    }

    /// Copies of every record with a non-empty window, in identity order.
    pub fn snapshot_active(&self) -> Vec<ActivityView> {
        self.records.values().filter_map(ActivityRecord::view).collect()
    }

    pub fn get(&self, identity: u64) -> Option<&ActivityRecord> {
        self.records.get(&identity)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

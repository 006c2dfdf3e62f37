/// Ranked summary views over active devices.
///
/// Both rankings are total orders (primary key, then identity ascending),
/// so the output never depends on the order records arrive in.
use alloc::vec::Vec;
use core::cmp::Reverse;

use heapless::Vec as BoundedVec;
use serde::Serialize;

use crate::config::TrackerConfig;
use crate::filter::LabelFilter;
use crate::label::Label;
use crate::protocol::NameString;
use crate::tracker::ActivityView;

/// Maximum entries in either ranked list, whatever the configuration asks.
pub const MAX_RANKED: usize = 8;

/// One row of the most-seen list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    #[serde(skip)]
    pub identity: u64,
    #[serde(rename = "dev")]
    pub display: NameString,
    pub label: Label,
    #[serde(rename = "n")]
    pub count: u32,
    pub rssi: i8,
}

/// One row of the most-recent list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecencyEntry {
    #[serde(skip)]
    pub identity: u64,
    #[serde(rename = "dev")]
    pub display: NameString,
    pub label: Label,
    /// Timestamp of the latest sighting (ms since boot)
    #[serde(skip)]
    pub last_seen: u64,
    /// Seconds since the latest sighting, at aggregation time
    #[serde(rename = "age")]
    pub age_secs: u32,
    pub rssi: i8,
}

/// Immutable summary handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedView {
    /// Active devices in the countable label set, regardless of filter
    pub active_count: u32,
    pub top_by_frequency: BoundedVec<FrequencyEntry, MAX_RANKED>,
    pub top_by_recency: BoundedVec<RecencyEntry, MAX_RANKED>,
    pub filter: LabelFilter,
}

/// Build the ranked view for the given active records and filter.
pub fn aggregate(
    active: &[ActivityView],
    filter: LabelFilter,
    config: &TrackerConfig,
    now_ms: u64,
) -> RankedView {
    let active_count = active
        .iter()
        .filter(|v| config.countable.contains(v.label))
        .count() as u32;

    let mut candidates: Vec<&ActivityView> = active
        .iter()
        .filter(|v| v.count > 0 && filter.matches(v.label))
        .collect();

    candidates.sort_unstable_by_key(|v| (Reverse(v.count), v.identity));
    let top_by_frequency = candidates
        .iter()
        .take(config.top_n.min(MAX_RANKED))
        .map(|v| FrequencyEntry {
            identity: v.identity,
            display: v.display.clone(),
            label: v.label,
            count: v.count,
            rssi: v.rssi,
        })
        .collect();

    candidates.sort_unstable_by_key(|v| (Reverse(v.last_seen), v.identity));
    let top_by_recency = candidates
        .iter()
        .take(config.recent_n.min(MAX_RANKED))
        .map(|v| RecencyEntry {
            identity: v.identity,
            display: v.display.clone(),
            label: v.label,
            last_seen: v.last_seen,
            age_secs: (now_ms.saturating_sub(v.last_seen) / 1000) as u32,
            rssi: v.rssi,
        })
        .collect();

    RankedView {
        active_count,
        top_by_frequency,
        top_by_recency,
        filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::LabelSet;

    const A: u64 = 0xA;
    const B: u64 = 0xB;
    const C: u64 = 0xC;

    fn view(identity: u64, label: Label, count: u32, last_seen: u64) -> ActivityView {
        let mut display = NameString::new();
        let _ = core::fmt::write(&mut display, format_args!("{:X}", identity));
        ActivityView {
            identity,
            display,
            label,
            count,
            last_seen,
            rssi: -60,
        }
    }

    fn freq_ids(v: &RankedView) -> heapless::Vec<(u64, u32), MAX_RANKED> {
        v.top_by_frequency.iter().map(|e| (e.identity, e.count)).collect()
    }

    fn recent_ids(v: &RankedView) -> heapless::Vec<u64, MAX_RANKED> {
        v.top_by_recency.iter().map(|e| e.identity).collect()
    }

    fn scenario() -> [ActivityView; 3] {
        [
            view(C, Label::Phone, 3, 9_000),
            view(A, Label::Phone, 5, 5_000),
            view(B, Label::Watch, 3, 9_000),
        ]
    }

    #[test]
    fn frequency_ranking_with_identity_tie_break() {
        let cfg = TrackerConfig::new();
        let v = aggregate(&scenario(), LabelFilter::All, &cfg, 10_000);
        assert_eq!(freq_ids(&v).as_slice(), &[(A, 5), (B, 3), (C, 3)]);
    }

    #[test]
    fn filter_narrows_candidates() {
        let cfg = TrackerConfig::new();
        let v = aggregate(&scenario(), LabelFilter::Only(Label::Phone), &cfg, 10_000);
        assert_eq!(freq_ids(&v).as_slice(), &[(A, 5), (C, 3)]);
        assert_eq!(recent_ids(&v).as_slice(), &[C, A]);
        assert_eq!(v.filter, LabelFilter::Only(Label::Phone));

        let v = aggregate(&scenario(), LabelFilter::Only(Label::Tag), &cfg, 10_000);
        assert!(v.top_by_frequency.is_empty());
        assert!(v.top_by_recency.is_empty());
    }

    #[test]
    fn recency_ranking_with_identity_tie_break() {
        let cfg = TrackerConfig::new();
        let v = aggregate(&scenario(), LabelFilter::All, &cfg, 10_000);
        assert_eq!(recent_ids(&v).as_slice(), &[B, C, A]);
        assert_eq!(v.top_by_recency[0].age_secs, 1);
        assert_eq!(v.top_by_recency[2].age_secs, 5);
    }

    #[test]
    fn ranking_ignores_input_order() {
        let cfg = TrackerConfig::new();
        let mut input = scenario();
        let first = aggregate(&input, LabelFilter::All, &cfg, 10_000);
        input.reverse();
        let second = aggregate(&input, LabelFilter::All, &cfg, 10_000);
        input.swap(0, 1);
        let third = aggregate(&input, LabelFilter::All, &cfg, 10_000);
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn active_count_ignores_filter_and_uses_countable_set() {
        let cfg = TrackerConfig::new();
        let input = [
            view(1, Label::Phone, 1, 0),
            view(2, Label::Tag, 1, 0),
            view(3, Label::IBeacon, 1, 0),
            view(4, Label::OtherBle, 1, 0),
            view(5, Label::Unknown, 1, 0),
            view(6, Label::Sensor, 1, 0),
        ];
        let all = aggregate(&input, LabelFilter::All, &cfg, 0);
        let tags = aggregate(&input, LabelFilter::Only(Label::Tag), &cfg, 0);
        assert_eq!(all.active_count, 3);
        assert_eq!(tags.active_count, 3);
        assert_eq!(tags.top_by_frequency.len(), 1);
    }

    #[test]
    fn countable_policy_is_configurable() {
        let mut cfg = TrackerConfig::new();
        cfg.countable = LabelSet::of(&[Label::Tag]);
        let input = [view(1, Label::Phone, 1, 0), view(2, Label::Tag, 1, 0)];
        assert_eq!(aggregate(&input, LabelFilter::All, &cfg, 0).active_count, 1);
    }

    #[test]
    fn lists_truncate_to_configured_size() {
        let mut cfg = TrackerConfig::new();
        cfg.top_n = 2;
        cfg.recent_n = 3;
        let input: Vec<ActivityView> = (1..=10)
            .map(|i| view(i, Label::Phone, i as u32, i * 1000))
            .collect();
        let v = aggregate(&input, LabelFilter::All, &cfg, 20_000);
        assert_eq!(freq_ids(&v).as_slice(), &[(10, 10), (9, 9)]);
        assert_eq!(recent_ids(&v).as_slice(), &[10, 9, 8]);
    }

    #[test]
    fn oversized_config_is_clamped() {
        let mut cfg = TrackerConfig::new();
        cfg.top_n = 100;
        cfg.recent_n = 100;
        let input: Vec<ActivityView> = (1..=20).map(|i| view(i, Label::Phone, 1, 0)).collect();
        let v = aggregate(&input, LabelFilter::All, &cfg, 0);
        assert_eq!(v.top_by_frequency.len(), MAX_RANKED);
        assert_eq!(v.top_by_recency.len(), MAX_RANKED);
    }

    #[test]
    fn empty_input_gives_empty_view() {
        let cfg = TrackerConfig::new();
        let v = aggregate(&[], LabelFilter::All, &cfg, 0);
        assert_eq!(v.active_count, 0);
        assert!(v.top_by_frequency.is_empty());
        assert!(v.top_by_recency.is_empty());
    }
}

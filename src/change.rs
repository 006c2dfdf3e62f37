/// Redraw gating for ranked views.
///
/// A view is reduced to a canonical text fingerprint: the active count and
/// both ranked lists in display order, one `id:label:key:rssi` token per
/// entry. Two views with the same members in the same order and with the
/// same displayed values fingerprint identically.
use alloc::string::String;
use core::fmt::Write;

use crate::aggregate::RankedView;
use crate::filter::LabelFilter;

/// Canonical summary of one ranked view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    active_count: u32,
    frequency: String,
    recency: String,
    filter: LabelFilter,
}

impl Fingerprint {
    pub fn of(view: &RankedView) -> Self {
        let mut frequency = String::new();
        for e in &view.top_by_frequency {
            let _ = write!(frequency, "{:x}:{}:{}:{};", e.identity, e.label, e.count, e.rssi);
        }
        let mut recency = String::new();
        for e in &view.top_by_recency {
            let _ = write!(recency, "{:x}:{}:{}:{};", e.identity, e.label, e.last_seen, e.rssi);
        }
        Self {
            active_count: view.active_count,
            frequency,
            recency,
            filter: view.filter,
        }
    }
}

/// What differs between two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Change {
    /// Active count or either ranked list changed
    pub lists: bool,
    /// Active filter changed
    pub filter: bool,
}

impl Change {
    pub fn any(&self) -> bool {
        self.lists || self.filter
    }
}

pub fn diff(prev: &Fingerprint, cur: &Fingerprint) -> Change {
    Change {
        lists: prev.active_count != cur.active_count
            || prev.frequency != cur.frequency
            || prev.recency != cur.recency,
        filter: prev.filter != cur.filter,
    }
}

/// Whether `cur` would render differently from `prev`.
pub fn changed(prev: &RankedView, cur: &RankedView) -> bool {
    diff(&Fingerprint::of(prev), &Fingerprint::of(cur)).any()
}

/// Remembers the fingerprint of the last delivered view.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: Option<Fingerprint>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the last observed view and remember this one.
    /// The first observation always reports a change.
    pub fn observe(&mut self, view: &RankedView) -> Change {
        let cur = Fingerprint::of(view);
        let change = match &self.last {
            Some(prev) => diff(prev, &cur),
            None => Change {
                lists: true,
                filter: true,
            },
        };
        self.last = Some(cur);
        change
    }

    /// Forget the last view so the next observation reports a change.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

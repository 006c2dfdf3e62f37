/// The tracking context: one owner for all mutable tracker state.
///
/// The platform loop drives it in this order each pass: [`Tracker::ingest`]
/// a scan batch, apply any filter commands, [`Tracker::tick`] to get a view
/// when one is due and changed, then [`Tracker::flush_if_due`]. Time is
/// always passed in as milliseconds since boot.
use crate::aggregate::{aggregate, RankedView};
use crate::change::ChangeDetector;
use crate::classify::classify;
use crate::config::TrackerConfig;
use crate::filter::{cycle, present_labels, FilterCommand, LabelFilter};
use crate::knowledge::KnowledgeBase;
use crate::scanner::Sighting;
use crate::storage::{BlobStore, StorageError};
use crate::tracker::ActivityStore;

pub struct Tracker {
    config: TrackerConfig,
    store: ActivityStore,
    knowledge: KnowledgeBase,
    filter: LabelFilter,
    detector: ChangeDetector,
    last_view: Option<RankedView>,
    last_aggregate_ms: Option<u64>,
    /// New sightings since the last aggregation
    pending: bool,
    /// Filter changed since the last aggregation
    filter_dirty: bool,
}

impl Tracker {
    pub fn new(config: TrackerConfig, knowledge: KnowledgeBase) -> Self {
        Self {
            config,
            store: ActivityStore::from_config(&config),
            knowledge,
            filter: LabelFilter::All,
            detector: ChangeDetector::new(),
            last_view: None,
            last_aggregate_ms: None,
            pending: false,
            filter_dirty: false,
        }
    }

    /// Create a tracker whose knowledge is loaded from `store`.
    pub fn with_store<S: BlobStore>(config: TrackerConfig, store: &mut S) -> Self {
        let knowledge = KnowledgeBase::load(store, config.flush_interval_ms);
        Self::new(config, knowledge)
    }

    /// Ingest one scan round. Returns how many sightings were recorded.
    ///
    /// The batch is one ingestion cycle: repeated sightings of a device
    /// within it count once.
    pub fn ingest(&mut self, batch: &[Sighting]) -> usize {
        self.store.begin_cycle();
        let mut recorded = 0;
        for s in batch {
            if s.identity == 0 || s.rssi < self.config.min_rssi {
                continue;
            }
            let heuristic = classify(&s.advert.fields());
            if self
                .store
                .record_sighting(
                    s.identity,
                    &s.display,
                    heuristic,
                    s.rssi,
                    s.timestamp,
                    &mut self.knowledge,
                )
                .is_some()
            {
                recorded += 1;
            }
        }
        if recorded > 0 {
            self.pending = true;
        }
        log::debug!("Ingested {}/{} sightings", recorded, batch.len());
        recorded
    }

    /// Step the display filter through the labels currently present.
    ///
    /// Expired records are pruned first so a label whose devices have all
    /// left the window is not offered.
    pub fn apply(&mut self, cmd: FilterCommand, now_ms: u64) -> LabelFilter {
        if self.store.tick(now_ms) > 0 {
            self.pending = true;
        }
        let present = present_labels(&self.store.snapshot_active());
        let next = cycle(self.filter, cmd, present);
        if next != self.filter {
            log::info!("Filter {} -> {}", self.filter, next);
            self.filter = next;
            self.filter_dirty = true;
        }
        self.filter
    }

    pub fn set_min_rssi(&mut self, min_rssi: i8) {
        self.config.min_rssi = min_rssi;
        log::info!("RSSI threshold set to {}", min_rssi);
    }

    /// Whether an aggregation should run now: new data, a filter change,
    /// or the quiescence interval elapsed since the last one.
    pub fn tick_due(&self, now_ms: u64) -> bool {
        self.pending
            || self.filter_dirty
            || self
                .last_aggregate_ms
                .map_or(true, |t| now_ms.saturating_sub(t) >= self.config.quiescence_ms)
    }

    /// Prune and aggregate if due. Returns the new view only when it differs
    /// from the last one returned.
    pub fn tick(&mut self, now_ms: u64) -> Option<&RankedView> {
        if !self.tick_due(now_ms) {
            return None;
        }
        let view = self.refresh(now_ms);
        let change = self.detector.observe(&view);
        self.last_view = Some(view);
        if change.any() {
            self.last_view.as_ref()
        } else {
            None
        }
    }

    /// Prune and aggregate unconditionally, without change gating.
    pub fn refresh(&mut self, now_ms: u64) -> RankedView {
        self.store.tick(now_ms);
        let view = aggregate(&self.store.snapshot_active(), self.filter, &self.config, now_ms);
        self.pending = false;
        self.filter_dirty = false;
        self.last_aggregate_ms = Some(now_ms);
        view
    }

    /// Persist learned labels if the debounce interval allows it.
    /// Failures are logged and retried on a later call.
    pub fn flush_if_due<S: BlobStore>(
        &mut self,
        store: &mut S,
        now_ms: u64,
    ) -> Result<bool, StorageError> {
        self.knowledge.flush_if_due(store, now_ms).inspect_err(|e| {
            log::warn!("Knowledge flush failed: {}", e);
        })
    }

    /// Force the next view to be delivered even if unchanged (e.g. after the
    /// screen was cleared).
    pub fn invalidate(&mut self) {
        self.detector.reset();
        self.filter_dirty = true;
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn filter(&self) -> LabelFilter {
        self.filter
    }

    pub fn store(&self) -> &ActivityStore {
        &self.store
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn last_view(&self) -> Option<&RankedView> {
        self.last_view.as_ref()
    }
}

/// Durable knowledge of learned device classifications.
///
/// Heuristics see each advertisement in isolation, and many devices only
/// reveal a useful field (name, appearance) occasionally. The knowledge base
/// remembers the strongest label seen per identity across restarts, and
/// lends it to later sightings that only produce a weak label.
///
/// Persisted form: a flat JSON object, decimal identity → label string:
/// `{"187723572702979":"Phone","52":"Watch"}`.
use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::label::Label;
use crate::storage::{BlobStore, StorageError};

/// Blob name the knowledge document is stored under.
pub const KNOWLEDGE_BLOB: &str = "knowledge";

/// Maximum remembered identities.
pub const MAX_KNOWN: usize = 512;

/// Upper bound on one serialized entry: quoted 20-digit key, colon, quoted
/// label, comma.
const ENTRY_MAX_LEN: usize = 40;

/// Decimal identity as it appears in the document.
type IdString = heapless::String<20>;

/// Wire form of the knowledge document.
type KnowledgeDoc = BTreeMap<IdString, Label>;

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: BTreeMap<u64, Label>,
    dirty: bool,
    last_write_ms: Option<u64>,
    flush_interval_ms: u64,
}

impl KnowledgeBase {
    pub fn new(flush_interval_ms: u64) -> Self {
        Self {
            entries: BTreeMap::new(),
            dirty: false,
            last_write_ms: None,
            flush_interval_ms,
        }
    }

    /// Load the knowledge document from storage.
    ///
    /// Never fails: a missing, unreadable or malformed document yields an
    /// empty knowledge base.
    pub fn load<S: BlobStore>(store: &mut S, flush_interval_ms: u64) -> Self {
        let mut kb = Self::new(flush_interval_ms);
        match store.read(KNOWLEDGE_BLOB) {
            Ok(Some(bytes)) => match Self::decode(&bytes) {
                Some(entries) => {
                    log::info!("Knowledge loaded: {} devices", entries.len());
                    kb.entries = entries;
                }
                None => log::warn!("Knowledge document malformed, starting empty"),
            },
            Ok(None) => log::info!("No stored knowledge, starting empty"),
            Err(e) => log::warn!("Knowledge load failed ({}), starting empty", e),
        }
        kb
    }

    /// Parse a knowledge document. Entries with unparsable or zero keys and
    /// weak labels are skipped; a document that is not a JSON object of
    /// label strings is rejected as a whole.
    pub fn decode(bytes: &[u8]) -> Option<BTreeMap<u64, Label>> {
        let (doc, _) = serde_json_core::from_slice::<KnowledgeDoc>(bytes).ok()?;
        let entries = doc
            .iter()
            .filter_map(|(key, &label)| {
                let id = key.parse::<u64>().ok().filter(|&id| id != 0)?;
                label.is_strong().then_some((id, label))
            })
            .take(MAX_KNOWN)
            .collect();
        Some(entries)
    }

    /// Serialize the full mapping.
    pub fn encode(&self) -> Option<Vec<u8>> {
        let mut doc = KnowledgeDoc::new();
        for (&id, &label) in &self.entries {
            let mut key = IdString::new();
            write!(key, "{}", id).ok()?;
            doc.insert(key, label);
        }

        let mut buf = vec![0u8; 2 + self.entries.len() * ENTRY_MAX_LEN];
        let len = serde_json_core::to_slice(&doc, &mut buf).ok()?;
        buf.truncate(len);
        Some(buf)
    }

    pub fn get(&self, identity: u64) -> Option<Label> {
        self.entries.get(&identity).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether there are changes not yet written to storage.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Merge a heuristic label with stored knowledge.
    ///
    /// A strong heuristic wins and is staged for persistence when it differs
    /// from what is stored. A weak heuristic defers to a stored strong label.
    pub fn resolve(&mut self, identity: u64, heuristic: Label) -> Label {
        if heuristic.is_strong() {
            self.learn(identity, heuristic);
            return heuristic;
        }
        self.get(identity).unwrap_or(heuristic)
    }

    fn learn(&mut self, identity: u64, label: Label) {
        let full = self.entries.len() >= MAX_KNOWN;
        match self.entries.get_mut(&identity) {
            Some(stored) if *stored == label => {}
            Some(stored) => {
                log::debug!("Knowledge {:012X}: {} -> {}", identity, stored, label);
                *stored = label;
                self.dirty = true;
            }
            None if full => {
                log::warn!("Knowledge full ({}), not storing {:012X}", MAX_KNOWN, identity);
            }
            None => {
                self.entries.insert(identity, label);
                self.dirty = true;
            }
        }
    }

    /// Whether a flush would write now.
    pub fn flush_due(&self, now_ms: u64) -> bool {
        self.dirty
            && self
                .last_write_ms
                .map_or(true, |t| now_ms.saturating_sub(t) >= self.flush_interval_ms)
    }

    /// Write the full mapping if dirty and the minimum interval has passed.
    ///
    /// Returns `Ok(true)` when a write happened. On failure the base stays
    /// dirty and the write is retried on a later call.
    pub fn flush_if_due<S: BlobStore>(
        &mut self,
        store: &mut S,
        now_ms: u64,
    ) -> Result<bool, StorageError> {
        if !self.flush_due(now_ms) {
            return Ok(false);
        }
        let bytes = self.encode().ok_or(StorageError::TooLarge)?;
        store.write(KNOWLEDGE_BLOB, &bytes)?;
        self.dirty = false;
        self.last_write_ms = Some(now_ms);
        log::info!("Knowledge saved: {} devices, {} bytes", self.entries.len(), bytes.len());
        Ok(true)
    }
}

//! Reading history.
//!
//! An in-memory log of past readings, newest first, capped at
//! [`DEFAULT_CAPACITY`] entries. Each entry keeps just enough to rebuild the
//! reading with [`ReadingService::restore_draw`](crate::ReadingService::restore_draw):
//! spread id, ordered card ids, seed and output mode. The persisted form drops
//! the full [`ReadingResult`] and is validated when loaded back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::format::summary::{core_narrative_preview, DEFAULT_PREVIEW_LEN};
use crate::types::{Draw, EraState, OutputMode, ReadingResult, Scale};

/// Entries kept before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 50;

/// One past reading.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub question: Option<String>,
    pub spread_id: String,
    pub spread_name: String,
    pub output_mode: OutputMode,
    pub seed: Option<u64>,
    pub allow_repeats: bool,

    /// Card ids ordered by position index
    pub card_ids: Vec<String>,

    pub scale: Scale,
    pub era_state: EraState,
    pub core_narrative_preview: String,

    /// The full reading; present only for entries recorded this session
    pub reading: Option<ReadingResult>,
}

impl HistoryEntry {
    /// Record a finished reading of `draw`.
    pub fn from_reading(draw: &Draw, result: &ReadingResult, allow_repeats: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            question: result.question.clone(),
            spread_id: draw.spread.id.clone(),
            spread_name: draw.spread.name.clone(),
            output_mode: result.output_mode,
            seed: draw.seed,
            allow_repeats,
            card_ids: draw.card_ids(),
            scale: result.header.scale,
            era_state: result.header.era_state,
            core_narrative_preview: core_narrative_preview(&result.narrative, DEFAULT_PREVIEW_LEN),
            reading: Some(result.clone()),
        }
    }

    fn to_persisted(&self) -> PersistedHistoryEntry {
        PersistedHistoryEntry {
            id: Some(self.id),
            timestamp: Some(self.timestamp),
            question: self.question.clone(),
            spread_id: self.spread_id.clone(),
            spread_name: self.spread_name.clone(),
            output_mode: self.output_mode.as_str().to_string(),
            seed: self.seed,
            allow_repeats: self.allow_repeats,
            card_ids: self.card_ids.clone(),
            scale: self.scale.as_str().to_string(),
            era_state: self.era_state.as_str().to_string(),
            core_narrative_preview: self.core_narrative_preview.clone(),
        }
    }

    /// `None` when the stored record cannot be restored.
    fn from_persisted(entry: PersistedHistoryEntry) -> Option<Self> {
        if entry.spread_id.trim().is_empty()
            || entry.output_mode.trim().is_empty()
            || entry.card_ids.is_empty()
            || entry.card_ids.iter().any(|id| id.trim().is_empty())
        {
            tracing::warn!(spread = %entry.spread_id, "Skipping incomplete history entry");
            return None;
        }

        let (Ok(scale), Ok(era_state)) = (entry.scale.parse::<Scale>(), entry.era_state.parse::<EraState>()) else {
            tracing::warn!(scale = %entry.scale, era = %entry.era_state, "Skipping history entry with unknown classification");
            return None;
        };

        Some(Self {
            id: entry.id.filter(|id| !id.is_nil()).unwrap_or_else(Uuid::new_v4),
            timestamp: entry.timestamp.unwrap_or_else(Utc::now),
            question: entry.question,
            spread_id: entry.spread_id,
            spread_name: entry.spread_name,
            output_mode: OutputMode::from_id(&entry.output_mode),
            seed: entry.seed,
            allow_repeats: entry.allow_repeats,
            card_ids: entry.card_ids,
            scale,
            era_state,
            core_narrative_preview: entry.core_narrative_preview,
            reading: None,
        })
    }
}

/// Stored shape of a history entry.
///
/// Every field is optional on input so that a damaged record deserializes
/// and is rejected by validation instead of failing the whole log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedHistoryEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    pub spread_id: String,
    pub spread_name: String,
    pub output_mode: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    pub allow_repeats: bool,
    pub card_ids: Vec<String>,
    pub scale: String,
    pub era_state: String,
    pub core_narrative_preview: String,
}

/// Capped, newest-first reading log.
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Rebuild a log from stored entries.
    ///
    /// Invalid entries are skipped; the rest are ordered newest first and
    /// capped.
    pub fn from_persisted(entries: impl IntoIterator<Item = PersistedHistoryEntry>) -> Self {
        let mut history = Self::new();
        history.load_persisted(entries);
        history
    }

    /// Replace the current entries with stored ones.
    pub fn load_persisted(&mut self, entries: impl IntoIterator<Item = PersistedHistoryEntry>) {
        let mut restored: Vec<HistoryEntry> = entries.into_iter().filter_map(HistoryEntry::from_persisted).collect();
        restored.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        restored.truncate(self.capacity);

        tracing::debug!(entries = restored.len(), "History loaded");
        self.entries = restored;
    }

    /// Stored form of every entry, newest first.
    pub fn to_persisted(&self) -> Vec<PersistedHistoryEntry> {
        self.entries.iter().map(HistoryEntry::to_persisted).collect()
    }

    /// Record an entry as the newest, dropping the oldest past capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

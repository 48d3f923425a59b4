//! Persisted diary entry model.
//!
//! # Responsibility
//! - Define the canonical entry/photo/cover records read from storage.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - Photos of one entry are ordered by `position ASC`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one diary entry.
pub type EntryId = Uuid;

/// One journal entry attached to a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: EntryId,
    /// Calendar date the entry belongs to.
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// One photo attached to a persisted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPhoto {
    pub entry_id: EntryId,
    pub uri: String,
    /// Zero-based display order inside the entry.
    pub position: u32,
}

/// Cover photo chosen to represent one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCover {
    pub date: NaiveDate,
    pub uri: String,
}

//! Draft photo attachment model.
//!
//! # Responsibility
//! - Define the value type for one photo inside an in-progress write session.
//! - Provide lifecycle helpers for the one-way DELETE transition.
//!
//! # Invariants
//! - `id` is stable across reorderings and state transitions.
//! - `uri` never changes after creation.
//! - Lifecycle moves only `New -> Delete` or `Keep -> Delete`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for one draft photo item.
pub type PhotoItemId = Uuid;

/// Lifecycle tag for a draft photo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoItemState {
    /// Attached during this session.
    New,
    /// Hydrated from a persisted entry.
    Keep,
    /// Removed during this session; hidden from every visible projection.
    Delete,
}

impl PhotoItemState {
    /// Stable label used by FFI envelopes and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Keep => "keep",
            Self::Delete => "delete",
        }
    }
}

/// One photo attachment inside a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritePhotoItem {
    id: PhotoItemId,
    uri: String,
    state: PhotoItemState,
}

impl WritePhotoItem {
    /// Creates a freshly attached item with a generated id.
    pub fn new_attachment(uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri: uri.into(),
            state: PhotoItemState::New,
        }
    }

    /// Creates an item hydrated from a persisted entry photo.
    pub fn kept(uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            uri: uri.into(),
            state: PhotoItemState::Keep,
        }
    }

    pub fn id(&self) -> PhotoItemId {
        self.id
    }

    pub fn uri(&self) -> &str {
        self.uri.as_str()
    }

    pub fn state(&self) -> PhotoItemState {
        self.state
    }

    /// Returns whether this item is part of visible/active projections.
    pub fn is_active(&self) -> bool {
        self.state != PhotoItemState::Delete
    }

    /// Returns a copy tagged `Delete`. Already-deleted items stay deleted.
    pub fn deleted(&self) -> Self {
        Self {
            id: self.id,
            uri: self.uri.clone(),
            state: PhotoItemState::Delete,
        }
    }
}

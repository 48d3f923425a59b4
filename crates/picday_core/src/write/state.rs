//! Draft state for one write session and its pure transitions.
//!
//! # Responsibility
//! - Hold the in-progress title/content/photo attachments of one entry.
//! - Derive dirtiness, cover previews, and release sets from that state.
//!
//! # Invariants
//! - `is_dirty` is recomputed by every transition and cannot be set directly.
//! - `baseline` is present whenever `ui_mode != View`.
//! - Deleted photo items stay in `photo_items` but never appear in visible
//!   projections, and never come back to life.

use crate::config::UriScopePolicy;
use crate::model::entry::{DiaryEntry, EntryId, EntryPhoto};
use crate::model::photo::{PhotoItemId, WritePhotoItem};
use crate::nav::route::WriteMode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Baseline key used for every fresh Add session.
pub const ADD_BASELINE_KEY: &str = "ADD:new";

/// Session mode of the write screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteUiMode {
    /// No draft is open.
    #[default]
    View,
    /// Composing a new entry.
    Add,
    /// Editing a persisted entry.
    Edit,
}

impl WriteUiMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Add => "add",
            Self::Edit => "edit",
        }
    }
}

/// Snapshot of the draft fields at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBaseline {
    /// `ADD:new` or `EDIT:<entry id>`.
    pub key: String,
    pub title: String,
    pub content: String,
    /// Ordered URIs of the visible photos.
    pub photo_uris: Vec<String>,
}

impl WriteBaseline {
    fn empty_add() -> Self {
        Self {
            key: ADD_BASELINE_KEY.to_string(),
            title: String::new(),
            content: String::new(),
            photo_uris: Vec::new(),
        }
    }
}

/// Returns the baseline key for editing `entry_id`.
pub fn edit_baseline_key(entry_id: EntryId) -> String {
    format!("EDIT:{entry_id}")
}

/// In-progress draft of one diary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteState {
    ui_mode: WriteUiMode,
    editing_entry_id: Option<EntryId>,
    title: String,
    content: String,
    photo_items: Vec<WritePhotoItem>,
    pending_release_uris: BTreeSet<String>,
    baseline: Option<WriteBaseline>,
    is_dirty: bool,
}

impl WriteState {
    /// View-mode default: no draft, no baseline, not dirty.
    pub fn view() -> Self {
        Self::default()
    }

    /// Fresh Add draft with the empty baseline.
    pub fn for_add() -> Self {
        Self {
            ui_mode: WriteUiMode::Add,
            baseline: Some(WriteBaseline::empty_add()),
            ..Self::default()
        }
        .settle()
    }

    /// Switches to the mode a Write route opens in, discarding this draft.
    pub fn set_mode(self, mode: WriteMode) -> Self {
        match mode {
            WriteMode::Add => Self::for_add(),
            WriteMode::View => Self::view(),
        }
    }

    pub fn add_clicked(self) -> Self {
        Self::for_add()
    }

    /// Hydrates an Edit draft from a persisted entry and its ordered photos.
    pub fn edit_loaded(self, entry: &DiaryEntry, photos: &[EntryPhoto]) -> Self {
        let photo_items = photos
            .iter()
            .map(|photo| WritePhotoItem::kept(photo.uri.as_str()))
            .collect::<Vec<_>>();
        let baseline = WriteBaseline {
            key: edit_baseline_key(entry.id),
            title: entry.title.clone(),
            content: entry.content.clone(),
            photo_uris: photo_items
                .iter()
                .map(|item| item.uri().to_string())
                .collect(),
        };

        Self {
            ui_mode: WriteUiMode::Edit,
            editing_entry_id: Some(entry.id),
            title: entry.title.clone(),
            content: entry.content.clone(),
            photo_items,
            pending_release_uris: BTreeSet::new(),
            baseline: Some(baseline),
            is_dirty: false,
        }
        .settle()
    }

    pub fn title_changed(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self.settle()
    }

    pub fn content_changed(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self.settle()
    }

    /// Attaches new photos in front of the existing ones.
    ///
    /// URIs already attached (and not deleted) are dropped, as are repeats
    /// within `uris`. Blank URIs are ignored. Batch order is preserved.
    pub fn photos_added<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = self
            .visible_photos()
            .map(|item| item.uri().to_string())
            .collect::<HashSet<_>>();
        let mut added = Vec::new();
        for uri in uris {
            let uri = uri.into();
            if uri.trim().is_empty() || !seen.insert(uri.clone()) {
                continue;
            }
            added.push(WritePhotoItem::new_attachment(uri));
        }
        if added.is_empty() {
            return self;
        }

        added.append(&mut self.photo_items);
        self.photo_items = added;
        self.settle()
    }

    /// Promotes a visible photo to the front; the rest keep their order.
    pub fn photo_clicked(mut self, id: PhotoItemId) -> Self {
        let Some(index) = self
            .photo_items
            .iter()
            .position(|item| item.id() == id && item.is_active())
        else {
            return self;
        };
        if index == 0 {
            return self;
        }

        let item = self.photo_items.remove(index);
        self.photo_items.insert(0, item);
        self.settle()
    }

    /// Marks a photo deleted and remembers scoped URIs for permission release.
    pub fn photo_removed(mut self, id: PhotoItemId, scope: &UriScopePolicy) -> Self {
        let Some(slot) = self
            .photo_items
            .iter_mut()
            .find(|item| item.id() == id && item.is_active())
        else {
            return self;
        };

        let removed = slot.deleted();
        if scope.is_scoped(removed.uri()) {
            self.pending_release_uris.insert(removed.uri().to_string());
        }
        *slot = removed;
        self.settle()
    }

    pub fn ui_mode(&self) -> WriteUiMode {
        self.ui_mode
    }

    pub fn editing_entry_id(&self) -> Option<EntryId> {
        self.editing_entry_id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }

    /// All items, including deleted ones, in current order.
    pub fn photo_items(&self) -> &[WritePhotoItem] {
        &self.photo_items
    }

    /// Non-deleted items in current order.
    pub fn visible_photos(&self) -> impl Iterator<Item = &WritePhotoItem> + '_ {
        self.photo_items.iter().filter(|item| item.is_active())
    }

    pub fn pending_release_uris(&self) -> &BTreeSet<String> {
        &self.pending_release_uris
    }

    pub fn baseline(&self) -> Option<&WriteBaseline> {
        self.baseline.as_ref()
    }

    /// Baseline key of the open draft, if any.
    pub fn session_key(&self) -> Option<&str> {
        self.baseline.as_ref().map(|baseline| baseline.key.as_str())
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// URIs of all non-deleted items, in current order.
    pub fn retained_uris(&self) -> Vec<String> {
        self.visible_photos()
            .map(|item| item.uri().to_string())
            .collect()
    }

    /// Pending releases minus anything still attached.
    pub fn release_uris(&self) -> Vec<String> {
        let retained = self
            .visible_photos()
            .map(WritePhotoItem::uri)
            .collect::<HashSet<_>>();
        self.pending_release_uris
            .iter()
            .filter(|uri| !retained.contains(uri.as_str()))
            .cloned()
            .collect()
    }

    /// Live preview of the cover: the front visible photo.
    pub fn cover_photo_uri(&self) -> Option<&str> {
        self.visible_photos().next().map(WritePhotoItem::uri)
    }

    /// Cover persisted for the date on exit: the last visible photo.
    ///
    /// Intentionally the opposite end from `cover_photo_uri`.
    pub fn representative_photo_uri_for_exit(&self) -> Option<&str> {
        self.visible_photos().last().map(WritePhotoItem::uri)
    }

    fn settle(mut self) -> Self {
        self.is_dirty = compute_dirty(&self);
        self
    }
}

fn compute_dirty(state: &WriteState) -> bool {
    if state.ui_mode == WriteUiMode::View {
        return false;
    }
    let Some(baseline) = state.baseline.as_ref() else {
        return false;
    };

    if state.title != baseline.title || state.content != baseline.content {
        return true;
    }
    !state
        .visible_photos()
        .map(WritePhotoItem::uri)
        .eq(baseline.photo_uris.iter().map(String::as_str))
}

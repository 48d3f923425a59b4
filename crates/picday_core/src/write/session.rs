//! Write session: one draft plus the repository calls that start and end it.
//!
//! # Responsibility
//! - Own one `WriteState` and replace it atomically on every transition.
//! - Hydrate Edit drafts, persist saves, and delete entries via
//!   `EntryRepository`.
//! - Ignore entry loads superseded by a later session change.
//!
//! # Invariants
//! - A failed repository call leaves the draft untouched for retry.
//! - The draft resets to View only after save/delete succeeded.
//! - A load ticket is honoured only while its generation is current.

use super::state::{WriteState, WriteUiMode};
use crate::config::UriScopePolicy;
use crate::model::entry::{DiaryEntry, EntryId, EntryPhoto};
use crate::model::photo::PhotoItemId;
use crate::nav::route::WriteMode;
use crate::repo::entry_repo::{EntryRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by session operations that touch storage.
#[derive(Debug)]
pub enum WriteSessionError {
    /// The entry being edited no longer exists.
    EntryNotFound(EntryId),
    Repo(RepoError),
}

impl Display for WriteSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WriteSessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::EntryNotFound(_) => None,
        }
    }
}

impl From<RepoError> for WriteSessionError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::EntryNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Entry and photos fetched for an Edit draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSnapshot {
    pub entry: DiaryEntry,
    pub photos: Vec<EntryPhoto>,
}

/// Fetches everything an Edit draft needs. Safe to run off the UI thread.
pub fn load_edit_snapshot<R>(repo: &R, entry_id: EntryId) -> RepoResult<Option<EditSnapshot>>
where
    R: EntryRepository + ?Sized,
{
    let Some(entry) = repo.get_by_id(entry_id)? else {
        return Ok(None);
    };
    let photos = repo.get_photos(entry_id)?;
    Ok(Some(EditSnapshot { entry, photos }))
}

/// Proof that an edit load was started at a given session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditLoadTicket {
    generation: u64,
    entry_id: EntryId,
}

impl EditLoadTicket {
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Mode the draft was in when saved; `View` means nothing was written.
    pub mode: WriteUiMode,
    /// Created or updated entry.
    pub entry_id: Option<EntryId>,
    /// URIs handed to the release callback.
    pub released_uris: Vec<String>,
    /// Representative photo to persist as the date cover.
    pub exit_cover_uri: Option<String>,
}

/// One in-progress add/edit/view session.
#[derive(Debug, Clone, Default)]
pub struct WriteSession {
    state: WriteState,
    scope: UriScopePolicy,
    generation: u64,
}

impl WriteSession {
    pub fn new(scope: UriScopePolicy) -> Self {
        Self {
            state: WriteState::view(),
            scope,
            generation: 0,
        }
    }

    /// Current draft snapshot.
    pub fn state(&self) -> &WriteState {
        &self.state
    }

    pub fn set_mode(&mut self, mode: WriteMode) {
        self.supersede();
        self.apply(|state| state.set_mode(mode));
    }

    pub fn on_add_clicked(&mut self) {
        self.supersede();
        self.apply(WriteState::add_clicked);
    }

    pub fn on_title_changed(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.apply(|state| state.title_changed(title));
    }

    pub fn on_content_changed(&mut self, content: impl Into<String>) {
        let content = content.into();
        self.apply(|state| state.content_changed(content));
    }

    pub fn on_photos_added<I, S>(&mut self, uris: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply(|state| state.photos_added(uris));
    }

    pub fn on_photo_clicked(&mut self, id: PhotoItemId) {
        self.apply(|state| state.photo_clicked(id));
    }

    pub fn on_photo_removed(&mut self, id: PhotoItemId) {
        let scope = &self.scope;
        let next = std::mem::take(&mut self.state).photo_removed(id, scope);
        self.state = next;
    }

    /// Starts an edit load; any earlier outstanding load becomes stale.
    pub fn begin_edit_load(&mut self, entry_id: EntryId) -> EditLoadTicket {
        self.supersede();
        EditLoadTicket {
            generation: self.generation,
            entry_id,
        }
    }

    /// Applies a finished load if `ticket` is still current.
    ///
    /// Returns `Ok(true)` when the draft was hydrated, `Ok(false)` for a stale
    /// ticket or a missing entry. Errors leave the draft unchanged.
    pub fn finish_edit_load(
        &mut self,
        ticket: EditLoadTicket,
        loaded: RepoResult<Option<EditSnapshot>>,
    ) -> Result<bool, WriteSessionError> {
        if ticket.generation != self.generation {
            debug!(
                "event=write_edit_load module=write status=skip reason=stale entry_id={}",
                ticket.entry_id
            );
            return Ok(false);
        }

        let snapshot = match loaded {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(
                    "event=write_edit_load module=write status=skip reason=not_found entry_id={}",
                    ticket.entry_id
                );
                return Ok(false);
            }
            Err(err) => {
                error!(
                    "event=write_edit_load module=write status=error entry_id={} error={}",
                    ticket.entry_id, err
                );
                return Err(err.into());
            }
        };

        self.apply(|state| state.edit_loaded(&snapshot.entry, &snapshot.photos));
        info!(
            "event=write_edit_load module=write status=ok entry_id={} photo_count={}",
            ticket.entry_id,
            snapshot.photos.len()
        );
        Ok(true)
    }

    /// Loads `entry_id` and hydrates an Edit draft in one call.
    pub fn on_edit_clicked<R>(
        &mut self,
        repo: &R,
        entry_id: EntryId,
    ) -> Result<bool, WriteSessionError>
    where
        R: EntryRepository + ?Sized,
    {
        let ticket = self.begin_edit_load(entry_id);
        let loaded = load_edit_snapshot(repo, entry_id);
        self.finish_edit_load(ticket, loaded)
    }

    /// Persists the draft for `date`, releases detached scoped URIs, then
    /// resets to View.
    pub fn on_save<R>(
        &mut self,
        repo: &R,
        date: NaiveDate,
        release: impl FnOnce(&[String]),
    ) -> Result<SaveOutcome, WriteSessionError>
    where
        R: EntryRepository + ?Sized,
    {
        let mode = self.state.ui_mode();
        let retained_uris = self.state.retained_uris();
        let released_uris = self.state.release_uris();
        let exit_cover_uri = self
            .state
            .representative_photo_uri_for_exit()
            .map(str::to_string);

        let entry_id = match mode {
            WriteUiMode::View => {
                debug!("event=write_save module=write status=skip reason=view_mode");
                return Ok(SaveOutcome::default());
            }
            WriteUiMode::Add => repo
                .add_for_date(date, self.state.title(), self.state.content(), &retained_uris)
                .inspect_err(|err| log_save_error(mode, err))?,
            WriteUiMode::Edit => {
                let Some(entry_id) = self.state.editing_entry_id() else {
                    warn!("event=write_save module=write status=skip reason=edit_without_entry");
                    return Ok(SaveOutcome::default());
                };
                let updated = repo
                    .update(entry_id, self.state.title(), self.state.content())
                    .inspect_err(|err| log_save_error(mode, err))?;
                if !updated {
                    warn!(
                        "event=write_save module=write status=error mode=edit error_code=entry_missing entry_id={}",
                        entry_id
                    );
                    return Err(WriteSessionError::EntryNotFound(entry_id));
                }
                repo.replace_photos(entry_id, &retained_uris)
                    .inspect_err(|err| log_save_error(mode, err))?;
                entry_id
            }
        };

        if !released_uris.is_empty() {
            release(&released_uris);
        }
        self.reset();

        info!(
            "event=write_save module=write status=ok mode={} entry_id={} photo_count={} released_count={}",
            mode.as_str(),
            entry_id,
            retained_uris.len(),
            released_uris.len()
        );
        Ok(SaveOutcome {
            mode,
            entry_id: Some(entry_id),
            released_uris,
            exit_cover_uri,
        })
    }

    /// Deletes `entry_id`, then resets to View.
    pub fn on_delete<R>(&mut self, repo: &R, entry_id: EntryId) -> Result<(), WriteSessionError>
    where
        R: EntryRepository + ?Sized,
    {
        if let Err(err) = repo.delete(entry_id) {
            error!(
                "event=write_delete module=write status=error entry_id={} error={}",
                entry_id, err
            );
            return Err(err.into());
        }
        self.reset();
        info!(
            "event=write_delete module=write status=ok entry_id={}",
            entry_id
        );
        Ok(())
    }

    /// Discards the draft and any outstanding load.
    pub fn reset(&mut self) {
        self.supersede();
        self.state = WriteState::view();
    }

    pub fn cover_photo_uri(&self) -> Option<&str> {
        self.state.cover_photo_uri()
    }

    pub fn representative_photo_uri_for_exit(&self) -> Option<&str> {
        self.state.representative_photo_uri_for_exit()
    }

    fn apply(&mut self, transition: impl FnOnce(WriteState) -> WriteState) {
        let current = std::mem::take(&mut self.state);
        self.state = transition(current);
    }

    fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

fn log_save_error(mode: WriteUiMode, err: &RepoError) {
    error!(
        "event=write_save module=write status=error mode={} error={}",
        mode.as_str(),
        err
    );
}

//! Navigation host: owns the live stack and interprets reducer effects.
//!
//! # Responsibility
//! - Hold the single authoritative `NavigationState` and bump `version` on
//!   every effective transition.
//! - Apply ordered effects: stack edits, selected-date broadcast, and
//!   pending-edit consumption.
//! - Create a `WriteSession` per Write route and drop it when the route
//!   leaves the stack.
//! - Drive save/delete of the top Write route and pop it on success.
//! - Keep the date cover in step with the photos that remain for that date.
//!
//! # Invariants
//! - After `dispatch`, the entry list mirrors `state.back_stack` exactly.
//! - Every Write entry owns exactly one live session; no other entry does.
//! - Failed save/delete leaves stack, version, and draft untouched.

use super::event::{NavEffect, NavEvent};
use super::reducer::NavReducer;
use super::route::{NavigationState, RouteNode};
use crate::config::{CoreConfig, UriScopePolicy};
use crate::model::entry::EntryId;
use crate::repo::entry_repo::{EntryRepository, RepoResult};
use crate::write::session::{SaveOutcome, WriteSession, WriteSessionError};
use crate::write::state::WriteUiMode;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, RwLock};

/// Identifier of one write session owned by the host.
pub type SessionId = u64;

/// Shared, observable "selected date" read by sibling screens.
#[derive(Debug, Clone, Default)]
pub struct SelectedDateCell {
    inner: Arc<RwLock<Option<NaiveDate>>>,
}

impl SelectedDateCell {
    pub fn new(initial: Option<NaiveDate>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> Option<NaiveDate> {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Some(date),
            Err(poisoned) => *poisoned.into_inner() = Some(date),
        }
    }
}

/// Errors from host-level write operations.
#[derive(Debug)]
pub enum NavHostError {
    /// The visible route is not a Write route.
    NoActiveWrite,
    /// Delete requested but neither draft nor route names an entry.
    NoEditingEntry,
    Session(WriteSessionError),
}

impl Display for NavHostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveWrite => write!(f, "no write screen is active"),
            Self::NoEditingEntry => write!(f, "no entry is being edited"),
            Self::Session(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NavHostError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Session(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WriteSessionError> for NavHostError {
    fn from(value: WriteSessionError) -> Self {
        Self::Session(value)
    }
}

#[derive(Debug)]
struct StackEntry {
    node: RouteNode,
    session: Option<SessionId>,
}

/// Owner of the live navigation stack and its write sessions.
pub struct NavHost {
    reducer: NavReducer,
    scope: UriScopePolicy,
    state: NavigationState,
    entries: Vec<StackEntry>,
    sessions: BTreeMap<SessionId, WriteSession>,
    next_session_id: SessionId,
    version: u64,
    selected_date: SelectedDateCell,
    pending_edit_entry: Option<EntryId>,
}

impl NavHost {
    /// Creates a host on the default single-root state.
    pub fn new(config: &CoreConfig, selected_date: SelectedDateCell) -> Self {
        Self::with_state(config, NavigationState::default(), selected_date)
    }

    /// Creates a host from a restored state. Malformed states fall back to
    /// the default root.
    pub fn with_state(
        config: &CoreConfig,
        state: NavigationState,
        selected_date: SelectedDateCell,
    ) -> Self {
        let state = if state.is_well_formed() {
            state
        } else {
            warn!(
                "event=nav_restore module=nav status=skip reason=malformed_stack depth={}",
                state.back_stack.len()
            );
            NavigationState::default()
        };
        if let Some(date) = state.selected_date {
            selected_date.set(date);
        }

        let mut host = Self {
            reducer: NavReducer::new(&config.deep_link),
            scope: config.uri_scope.clone(),
            state: state.clone(),
            entries: Vec::new(),
            sessions: BTreeMap::new(),
            next_session_id: 1,
            version: 0,
            selected_date,
            pending_edit_entry: None,
        };
        host.rebuild_entries(&state.back_stack);
        host
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    /// Incremented once per transition that produced effects.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selected_date(&self) -> &SelectedDateCell {
        &self.selected_date
    }

    /// Records the entry id the UI is about to open for editing.
    pub fn set_pending_edit_entry(&mut self, entry_id: Option<EntryId>) {
        self.pending_edit_entry = entry_id;
    }

    pub fn pending_edit_entry(&self) -> Option<EntryId> {
        self.pending_edit_entry
    }

    /// Reduces `event`, applies its effects in order, and returns them.
    pub fn dispatch(&mut self, event: NavEvent) -> Vec<NavEffect> {
        let transition = self.reducer.reduce(&self.state, &event);
        if transition.is_noop() {
            debug!(
                "event=nav_dispatch module=nav status=skip nav_event={} version={}",
                event.name(),
                self.version
            );
            return Vec::new();
        }

        for effect in &transition.effects {
            self.apply_effect(effect);
        }

        let mirrored = self
            .entries
            .iter()
            .map(|entry| &entry.node)
            .eq(transition.state.back_stack.iter());
        if !mirrored {
            warn!(
                "event=nav_dispatch module=nav status=error error_code=stack_mismatch nav_event={} depth={}",
                event.name(),
                transition.state.back_stack.len()
            );
            self.rebuild_entries(&transition.state.back_stack);
        }

        self.state = transition.state;
        self.version += 1;
        info!(
            "event=nav_dispatch module=nav status=ok nav_event={} effects={} depth={} top={} version={}",
            event.name(),
            transition.effects.len(),
            self.state.back_stack.len(),
            self.state.top().map(RouteNode::label).unwrap_or_default(),
            self.version
        );
        transition.effects
    }

    /// Session of the visible route, when it is a Write route.
    pub fn top_session(&self) -> Option<(SessionId, &WriteSession)> {
        let id = self.entries.last()?.session?;
        self.sessions.get(&id).map(|session| (id, session))
    }

    pub fn top_session_mut(&mut self) -> Option<&mut WriteSession> {
        let id = self.entries.last()?.session?;
        self.sessions.get_mut(&id)
    }

    pub fn session(&self, id: SessionId) -> Option<&WriteSession> {
        self.sessions.get(&id)
    }

    /// Number of live write sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Hydrates the top session from the route's `editing_entry_id`.
    ///
    /// Returns `Ok(false)` when the route names no entry or it is missing.
    pub fn load_top_edit<R>(&mut self, repo: &R) -> Result<bool, NavHostError>
    where
        R: EntryRepository + ?Sized,
    {
        let (_, entry_id) = self.top_write_route()?;
        let Some(entry_id) = entry_id else {
            return Ok(false);
        };
        let session = self.top_session_mut().ok_or(NavHostError::NoActiveWrite)?;
        Ok(session.on_edit_clicked(repo, entry_id)?)
    }

    /// Saves the top draft, refreshes the date cover, and pops the route.
    ///
    /// The draft's exit photo becomes the cover; without one the cover is
    /// recomputed from the date's remaining entries or cleared.
    pub fn save_top<R>(
        &mut self,
        repo: &R,
        release: impl FnOnce(&[String]),
    ) -> Result<SaveOutcome, NavHostError>
    where
        R: EntryRepository + ?Sized,
    {
        let (date, _) = self.top_write_route()?;
        let session = self.top_session_mut().ok_or(NavHostError::NoActiveWrite)?;
        let outcome = session.on_save(repo, date, release)?;

        if outcome.mode != WriteUiMode::View {
            refresh_date_cover(repo, date, outcome.exit_cover_uri.as_deref());
        }

        self.dispatch(NavEvent::WriteSaveComplete);
        Ok(outcome)
    }

    /// Deletes the entry edited by the top route, refreshes the date cover,
    /// and pops the route. Returns the deleted entry id.
    pub fn delete_top<R>(&mut self, repo: &R) -> Result<EntryId, NavHostError>
    where
        R: EntryRepository + ?Sized,
    {
        let (date, route_entry_id) = self.top_write_route()?;
        let session = self.top_session_mut().ok_or(NavHostError::NoActiveWrite)?;
        let entry_id = session
            .state()
            .editing_entry_id()
            .or(route_entry_id)
            .ok_or(NavHostError::NoEditingEntry)?;
        session.on_delete(repo, entry_id)?;
        refresh_date_cover(repo, date, None);

        self.dispatch(NavEvent::WriteDeleteComplete);
        Ok(entry_id)
    }

    fn top_write_route(&self) -> Result<(NaiveDate, Option<EntryId>), NavHostError> {
        match self.state.top() {
            Some(RouteNode::Write {
                date,
                editing_entry_id,
                ..
            }) => Ok((*date, *editing_entry_id)),
            _ => Err(NavHostError::NoActiveWrite),
        }
    }

    fn apply_effect(&mut self, effect: &NavEffect) {
        match effect {
            NavEffect::Navigate(node) => {
                let entry = self.open_entry(node);
                self.entries.push(entry);
            }
            NavEffect::ReplaceRoot(node) => {
                self.close_entries_from(0);
                let entry = self.open_entry(node);
                self.entries.push(entry);
            }
            NavEffect::Pop => {
                if self.entries.len() > 1 {
                    self.close_entries_from(self.entries.len() - 1);
                } else {
                    warn!("event=nav_effect module=nav status=skip effect=pop reason=at_root");
                }
            }
            NavEffect::PopToRoot => self.close_entries_from(1),
            NavEffect::UpdateSelectedDate(date) => self.selected_date.set(*date),
            NavEffect::ConsumeEditEntry(entry_id) => {
                if self.pending_edit_entry == Some(*entry_id) {
                    self.pending_edit_entry = None;
                }
            }
        }
    }

    fn open_entry(&mut self, node: &RouteNode) -> StackEntry {
        let session = match node {
            RouteNode::Write { mode, .. } => {
                let id = self.next_session_id;
                self.next_session_id += 1;
                let mut session = WriteSession::new(self.scope.clone());
                session.set_mode(*mode);
                self.sessions.insert(id, session);
                debug!(
                    "event=write_session_open module=nav status=ok session_id={} mode={}",
                    id,
                    mode.as_str()
                );
                Some(id)
            }
            RouteNode::Calendar | RouteNode::Diary => None,
        };
        StackEntry {
            node: node.clone(),
            session,
        }
    }

    fn close_entries_from(&mut self, index: usize) {
        if index >= self.entries.len() {
            return;
        }
        for entry in self.entries.drain(index..) {
            if let Some(id) = entry.session {
                self.sessions.remove(&id);
                debug!("event=write_session_close module=nav status=ok session_id={id}");
            }
        }
    }

    fn rebuild_entries(&mut self, back_stack: &[RouteNode]) {
        self.close_entries_from(0);
        self.sessions.clear();
        for node in back_stack {
            let entry = self.open_entry(node);
            self.entries.push(entry);
        }
    }
}

/// Stores `preferred` as the cover of `date`, or recomputes it from the
/// remaining entries: the last photo of the latest entry that has photos.
/// Clears the cover when no entry of that date has photos. Best-effort.
fn refresh_date_cover<R>(repo: &R, date: NaiveDate, preferred: Option<&str>)
where
    R: EntryRepository + ?Sized,
{
    let cover = match preferred {
        Some(uri) => Ok(Some(uri.to_string())),
        None => derive_date_cover(repo, date),
    };
    let result = cover.and_then(|cover| {
        repo.set_date_cover(date, cover.as_deref())?;
        Ok(cover)
    });
    match result {
        Ok(cover) => debug!(
            "event=date_cover_update module=nav status=ok date={} cleared={}",
            date,
            cover.is_none()
        ),
        Err(err) => warn!(
            "event=date_cover_update module=nav status=error date={} error={}",
            date, err
        ),
    }
}

fn derive_date_cover<R>(repo: &R, date: NaiveDate) -> RepoResult<Option<String>>
where
    R: EntryRepository + ?Sized,
{
    for entry in repo.list_for_date(date)?.iter().rev() {
        if let Some(photo) = repo.get_photos(entry.id)?.pop() {
            return Ok(Some(photo.uri));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::SelectedDateCell;
    use chrono::NaiveDate;

    #[test]
    fn selected_date_cell_is_shared_between_clones() {
        let cell = SelectedDateCell::default();
        let observer = cell.clone();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
        cell.set(date);
        assert_eq!(observer.get(), Some(date));
    }
}

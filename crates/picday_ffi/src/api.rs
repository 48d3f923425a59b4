//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose navigation and write-session use cases to Dart via FRB.
//! - Own the single process-wide `NavHost` and serialise access to it.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Inputs are plain strings (ISO dates, UUIDs, labels); every failure is
//!   reported through `ok=false` plus a message.

use chrono::NaiveDate;
use log::{debug, warn};
use picday_core::db::open_db;
use picday_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, EntryRepository, NavEffect, NavEvent, NavHost, RouteNode, SelectedDateCell,
    SqliteEntryRepository, Tab, WriteMode, WriteSession,
};
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const ENTRY_DB_FILE_NAME: &str = "picday_entries.sqlite3";
const DB_PATH_ENV: &str = "PICDAY_DB_PATH";
const CONFIG_JSON_ENV: &str = "PICDAY_CONFIG_JSON";
const DATE_FORMAT: &str = "%Y-%m-%d";

static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static NAV_HOST: OnceLock<Mutex<NavHost>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Navigation intent in wire form.
///
/// `kind` is the snake_case event name (`bottom_tab_click`,
/// `calendar_date_selected`, `diary_write_click`, `diary_edit_click`,
/// `write_add_click`, `write_back`, `write_save_complete`,
/// `write_delete_complete`, `process_deep_link`). Other fields are read
/// only by the kinds that need them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavEventInput {
    pub kind: String,
    pub tab: Option<String>,
    pub date: Option<String>,
    pub mode: Option<String>,
    pub entry_id: Option<String>,
    pub uri: Option<String>,
}

/// One back-stack element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteItem {
    /// `calendar|diary|write`.
    pub route: String,
    pub date: Option<String>,
    pub mode: Option<String>,
    pub editing_entry_id: Option<String>,
}

/// Navigation snapshot plus the effects of the last dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavResponse {
    pub ok: bool,
    pub message: String,
    /// Bottom to top.
    pub back_stack: Vec<RouteItem>,
    pub selected_date: Option<String>,
    pub version: u64,
    /// Applied effects as labels, e.g. `navigate:write:2026-01-22:add`.
    pub effects: Vec<String>,
    pub pending_edit_entry_id: Option<String>,
}

/// One visible photo of the active draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePhotoView {
    pub id: String,
    pub uri: String,
    /// `new|keep`.
    pub state: String,
}

/// Active draft snapshot for the write screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse {
    pub ok: bool,
    pub message: String,
    /// `view|add|edit`.
    pub mode: String,
    pub editing_entry_id: Option<String>,
    pub title: String,
    pub content: String,
    /// Visible photos, front first.
    pub photos: Vec<WritePhotoView>,
    pub is_dirty: bool,
    pub cover_uri: Option<String>,
}

impl WriteResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            mode: "view".to_string(),
            editing_entry_id: None,
            title: String::new(),
            content: String::new(),
            photos: Vec::new(),
            is_dirty: false,
            cover_uri: None,
        }
    }
}

/// Result of saving or deleting the active draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteActionResponse {
    pub ok: bool,
    /// Created, updated or deleted entry.
    pub entry_id: Option<String>,
    /// Scoped URIs whose read grants the caller must now release.
    pub released_uris: Vec<String>,
    pub message: String,
}

impl WriteActionResponse {
    fn success(message: impl Into<String>, entry_id: Option<String>) -> Self {
        Self {
            ok: true,
            entry_id,
            released_uris: Vec::new(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            released_uris: Vec::new(),
            message: message.into(),
        }
    }
}

/// Cover photo of one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCoverItem {
    pub date: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCoversResponse {
    pub ok: bool,
    pub covers: Vec<CalendarCoverItem>,
    pub message: String,
}

/// Reduces one navigation intent and applies its effects.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Malformed input returns `ok=false` and leaves navigation untouched.
/// - An ignored intent (pop at root, bad deep link) is `ok=true` with no
///   effects.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_dispatch(input: NavEventInput) -> NavResponse {
    let mut host = lock_host();
    let event = match parse_nav_event(&input) {
        Ok(event) => event,
        Err(message) => {
            return nav_response(&host, false, format!("nav_dispatch failed: {message}"), &[]);
        }
    };
    let effects = host.dispatch(event);
    let message = if effects.is_empty() {
        "Ignored.".to_string()
    } else {
        format!("Applied {} effect(s).", effects.len())
    };
    nav_response(&host, true, message, &effects)
}

/// Returns the current navigation snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_snapshot() -> NavResponse {
    let host = lock_host();
    nav_response(&host, true, "OK", &[])
}

/// Records the entry the UI is about to open; `None` clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_set_pending_edit(entry_id: Option<String>) -> NavResponse {
    let mut host = lock_host();
    let parsed = match entry_id.as_deref().map(parse_entry_id).transpose() {
        Ok(parsed) => parsed,
        Err(message) => {
            let message = format!("nav_set_pending_edit failed: {message}");
            return nav_response(&host, false, message, &[]);
        }
    };
    host.set_pending_edit_entry(parsed);
    nav_response(&host, true, "OK", &[])
}

/// Returns the draft of the visible Write route.
#[flutter_rust_bridge::frb(sync)]
pub fn write_snapshot() -> WriteResponse {
    with_top_session("write_snapshot", |_| ())
}

#[flutter_rust_bridge::frb(sync)]
pub fn write_add_clicked() -> WriteResponse {
    with_top_session("write_add_clicked", WriteSession::on_add_clicked)
}

#[flutter_rust_bridge::frb(sync)]
pub fn write_title_changed(title: String) -> WriteResponse {
    with_top_session("write_title_changed", |session| {
        session.on_title_changed(title)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn write_content_changed(content: String) -> WriteResponse {
    with_top_session("write_content_changed", |session| {
        session.on_content_changed(content)
    })
}

/// Attaches newly picked photos in front of the existing ones.
#[flutter_rust_bridge::frb(sync)]
pub fn write_photos_added(uris: Vec<String>) -> WriteResponse {
    with_top_session("write_photos_added", |session| session.on_photos_added(uris))
}

/// Moves the photo to the front.
#[flutter_rust_bridge::frb(sync)]
pub fn write_photo_clicked(photo_id: String) -> WriteResponse {
    let Ok(id) = Uuid::parse_str(photo_id.trim()) else {
        return WriteResponse::failure(format!(
            "write_photo_clicked failed: invalid photo id `{photo_id}`"
        ));
    };
    with_top_session("write_photo_clicked", |session| session.on_photo_clicked(id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn write_photo_removed(photo_id: String) -> WriteResponse {
    let Ok(id) = Uuid::parse_str(photo_id.trim()) else {
        return WriteResponse::failure(format!(
            "write_photo_removed failed: invalid photo id `{photo_id}`"
        ));
    };
    with_top_session("write_photo_removed", |session| session.on_photo_removed(id))
}

/// Hydrates the visible Write route's draft from its `editing_entry_id`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - A missing entry is `ok=true` with the draft unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn write_load_edit() -> WriteResponse {
    let mut host = lock_host();
    let conn = match open_entry_db() {
        Ok(conn) => conn,
        Err(message) => {
            return WriteResponse::failure(format!("write_load_edit failed: {message}"));
        }
    };
    let repo = match SqliteEntryRepository::try_new(&conn) {
        Ok(repo) => repo,
        Err(err) => {
            return WriteResponse::failure(format!(
                "write_load_edit failed: entry repo init failed: {err}"
            ));
        }
    };
    let message = match host.load_top_edit(&repo) {
        Ok(true) => "Loaded.",
        Ok(false) => "Nothing to load.",
        Err(err) => return WriteResponse::failure(format!("write_load_edit failed: {err}")),
    };
    write_response(&host, message)
}

/// Saves the visible draft, stores its date cover, and pops the route.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - On failure the draft and stack are unchanged; retry is safe.
/// - `released_uris` must be released by the caller.
#[flutter_rust_bridge::frb(sync)]
pub fn write_save() -> WriteActionResponse {
    let mut host = lock_host();
    let result = with_entry_repo(|repo| {
        host.save_top(repo, |uris| {
            debug!(
                "event=write_release module=ffi status=ok released_count={}",
                uris.len()
            );
        })
        .map_err(|err| err.to_string())
    });
    match result {
        Ok(outcome) => WriteActionResponse {
            released_uris: outcome.released_uris,
            ..WriteActionResponse::success(
                "Saved.",
                outcome.entry_id.map(|id| id.to_string()),
            )
        },
        Err(message) => WriteActionResponse::failure(format!("write_save failed: {message}")),
    }
}

/// Deletes the entry edited by the visible route and pops it.
#[flutter_rust_bridge::frb(sync)]
pub fn write_delete() -> WriteActionResponse {
    let mut host = lock_host();
    match with_entry_repo(|repo| host.delete_top(repo).map_err(|err| err.to_string())) {
        Ok(entry_id) => WriteActionResponse::success("Deleted.", Some(entry_id.to_string())),
        Err(message) => WriteActionResponse::failure(format!("write_delete failed: {message}")),
    }
}

/// Lists date covers within `from..=to` (ISO dates).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_covers(from: String, to: String) -> CalendarCoversResponse {
    let failure = |message: String| CalendarCoversResponse {
        ok: false,
        covers: Vec::new(),
        message: format!("calendar_covers failed: {message}"),
    };
    let (from, to) = match (parse_date(&from), parse_date(&to)) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(message), _) | (_, Err(message)) => return failure(message),
    };

    match with_entry_repo(|repo| {
        repo.list_date_covers(from, to)
            .map_err(|err| err.to_string())
    }) {
        Ok(covers) => CalendarCoversResponse {
            ok: true,
            message: format!("Found {} cover(s).", covers.len()),
            covers: covers
                .into_iter()
                .map(|cover| CalendarCoverItem {
                    date: cover.date.format(DATE_FORMAT).to_string(),
                    uri: cover.uri,
                })
                .collect(),
        },
        Err(message) => failure(message),
    }
}

fn lock_host() -> MutexGuard<'static, NavHost> {
    let host = NAV_HOST.get_or_init(|| {
        Mutex::new(NavHost::new(&resolve_config(), SelectedDateCell::default()))
    });
    match host.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("event=nav_host_lock module=ffi status=error error_code=poisoned");
            poisoned.into_inner()
        }
    }
}

fn resolve_config() -> CoreConfig {
    let Ok(raw) = std::env::var(CONFIG_JSON_ENV) else {
        return CoreConfig::default();
    };
    match CoreConfig::from_json_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "event=config_load module=ffi status=error error_code=invalid_config error={}",
                err
            );
            CoreConfig::default()
        }
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn open_entry_db() -> Result<Connection, String> {
    open_db(resolve_entry_db_path()).map_err(|err| format!("entry DB open failed: {err}"))
}

fn with_entry_repo<T>(
    f: impl FnOnce(&SqliteEntryRepository<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_entry_db()?;
    let repo = SqliteEntryRepository::try_new(&conn)
        .map_err(|err| format!("entry repo init failed: {err}"))?;
    f(&repo)
}

fn with_top_session(op: &str, f: impl FnOnce(&mut WriteSession)) -> WriteResponse {
    let mut host = lock_host();
    let Some(session) = host.top_session_mut() else {
        return WriteResponse::failure(format!("{op} failed: no write screen is active"));
    };
    f(session);
    write_response(&host, "OK")
}

fn write_response(host: &NavHost, message: &str) -> WriteResponse {
    let Some((_, session)) = host.top_session() else {
        return WriteResponse::failure("no write screen is active");
    };
    let state = session.state();
    WriteResponse {
        ok: true,
        message: message.to_string(),
        mode: state.ui_mode().as_str().to_string(),
        editing_entry_id: state.editing_entry_id().map(|id| id.to_string()),
        title: state.title().to_string(),
        content: state.content().to_string(),
        photos: state
            .visible_photos()
            .map(|item| WritePhotoView {
                id: item.id().to_string(),
                uri: item.uri().to_string(),
                state: item.state().as_str().to_string(),
            })
            .collect(),
        is_dirty: state.is_dirty(),
        cover_uri: state.cover_photo_uri().map(str::to_string),
    }
}

fn nav_response(
    host: &NavHost,
    ok: bool,
    message: impl Into<String>,
    effects: &[NavEffect],
) -> NavResponse {
    let state = host.state();
    NavResponse {
        ok,
        message: message.into(),
        back_stack: state.back_stack.iter().map(to_route_item).collect(),
        selected_date: state
            .selected_date
            .map(|date| date.format(DATE_FORMAT).to_string()),
        version: host.version(),
        effects: effects.iter().map(effect_label).collect(),
        pending_edit_entry_id: host.pending_edit_entry().map(|id| id.to_string()),
    }
}

fn to_route_item(node: &RouteNode) -> RouteItem {
    match node {
        RouteNode::Calendar | RouteNode::Diary => RouteItem {
            route: node.label(),
            date: None,
            mode: None,
            editing_entry_id: None,
        },
        RouteNode::Write {
            date,
            mode,
            editing_entry_id,
        } => RouteItem {
            route: "write".to_string(),
            date: Some(date.format(DATE_FORMAT).to_string()),
            mode: Some(mode.as_str().to_string()),
            editing_entry_id: editing_entry_id.map(|id| id.to_string()),
        },
    }
}

fn effect_label(effect: &NavEffect) -> String {
    match effect {
        NavEffect::Navigate(node) => format!("navigate:{}", node.label()),
        NavEffect::ReplaceRoot(node) => format!("replace_root:{}", node.label()),
        NavEffect::Pop => "pop".to_string(),
        NavEffect::PopToRoot => "pop_to_root".to_string(),
        NavEffect::UpdateSelectedDate(date) => {
            format!("update_selected_date:{}", date.format(DATE_FORMAT))
        }
        NavEffect::ConsumeEditEntry(id) => format!("consume_edit_entry:{id}"),
    }
}

fn parse_nav_event(input: &NavEventInput) -> Result<NavEvent, String> {
    let event = match input.kind.trim() {
        "bottom_tab_click" => {
            let raw = required(&input.tab, "tab")?;
            let tab = Tab::parse(raw).ok_or_else(|| format!("unknown tab `{raw}`"))?;
            NavEvent::BottomTabClick(tab)
        }
        "calendar_date_selected" => {
            NavEvent::CalendarDateSelected(required_date(input)?, required_mode(input)?)
        }
        "diary_write_click" => {
            NavEvent::DiaryWriteClick(required_date(input)?, required_mode(input)?)
        }
        "diary_edit_click" => NavEvent::DiaryEditClick(
            required_date(input)?,
            parse_entry_id(required(&input.entry_id, "entry_id")?)?,
        ),
        "write_add_click" => NavEvent::WriteAddClick(required_date(input)?),
        "write_back" => NavEvent::WriteBack,
        "write_save_complete" => NavEvent::WriteSaveComplete,
        "write_delete_complete" => NavEvent::WriteDeleteComplete,
        "process_deep_link" => NavEvent::ProcessDeepLink(input.uri.clone()),
        other => return Err(format!("unknown event kind `{other}`")),
    };
    Ok(event)
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("`{field}` is required"))
}

fn required_date(input: &NavEventInput) -> Result<NaiveDate, String> {
    parse_date(required(&input.date, "date")?)
}

fn required_mode(input: &NavEventInput) -> Result<WriteMode, String> {
    let raw = required(&input.mode, "mode")?;
    WriteMode::parse(raw).ok_or_else(|| format!("unknown mode `{raw}`"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| format!("invalid date `{raw}`; expected YYYY-MM-DD"))
}

fn parse_entry_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid entry id `{raw}`"))
}

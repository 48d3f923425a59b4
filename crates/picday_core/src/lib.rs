//! Core domain logic for PicDay.
//! This crate is the single source of truth for navigation and draft
//! invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod nav;
pub mod repo;
pub mod write;

pub use config::{ConfigError, CoreConfig, DeepLinkConfig, UriScopePolicy};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entry::{DateCover, DiaryEntry, EntryId, EntryPhoto};
pub use model::photo::{PhotoItemId, PhotoItemState, WritePhotoItem};
pub use nav::deep_link::DeepLinkParser;
pub use nav::event::{NavEffect, NavEvent, NavTransition};
pub use nav::host::{NavHost, NavHostError, SelectedDateCell, SessionId};
pub use nav::reducer::{reduce, NavReducer};
pub use nav::route::{NavigationState, RouteNode, Tab, WriteMode};
pub use repo::entry_repo::{EntryRepository, RepoError, RepoResult, SqliteEntryRepository};
pub use write::session::{
    load_edit_snapshot, EditLoadTicket, EditSnapshot, SaveOutcome, WriteSession,
    WriteSessionError,
};
pub use write::state::{WriteBaseline, WriteState, WriteUiMode};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

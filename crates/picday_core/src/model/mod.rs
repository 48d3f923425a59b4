//! Domain model for diary entries and draft photo attachments.
//!
//! # Responsibility
//! - Define persisted entry/photo records shared by repository and session.
//! - Define draft-only photo items with NEW/KEEP/DELETE lifecycle tags.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - Draft photo items keep their `id` and `uri` for the whole session.

pub mod entry;
pub mod photo;

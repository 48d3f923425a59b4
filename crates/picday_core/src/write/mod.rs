//! Write-session draft state machine.
//!
//! # Responsibility
//! - Model one in-progress add/edit of a diary entry as an explicit value.
//! - Track photo attachments through NEW/KEEP/DELETE lifecycle states.
//! - Persist or discard the draft through `EntryRepository`.
//!
//! # Invariants
//! - Dirtiness is derived, never stored independently.
//! - Photo order matters: a reorder alone makes a draft dirty.

pub mod session;
pub mod state;

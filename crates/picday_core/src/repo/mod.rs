//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the diary persistence contract consumed by write sessions.
//! - Isolate SQLite query details from session/navigation logic.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod entry_repo;

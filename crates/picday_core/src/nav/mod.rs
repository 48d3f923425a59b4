//! Navigation state machine.
//!
//! # Responsibility
//! - Model the screen back-stack and the shared selected date as values.
//! - Map user intents to a new state plus an ordered effect list (`reducer`).
//! - Apply effect lists to the owned stack and collaborators (`host`).
//!
//! # Invariants
//! - `back_stack` is never empty and its first element is a tab root.
//! - The reducer performs no I/O and never panics.

pub mod deep_link;
pub mod event;
pub mod host;
pub mod reducer;
pub mod route;

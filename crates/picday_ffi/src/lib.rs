//! Flutter-facing bindings for `picday_core`.
//!
//! Generated FRB glue is produced by `flutter_rust_bridge_codegen` into the
//! app tree; this crate only declares the exported use-case API.

pub mod api;

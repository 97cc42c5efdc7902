//! Flutter-facing bindings for `studykit_core`.

pub mod api;

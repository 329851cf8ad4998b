//! Flutter-facing bindings for the org chart core.

pub mod api;

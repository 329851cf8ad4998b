//! Core logic for the org chart.
//! Owns the member model, persistence, hierarchy and layout rules, viewport
//! math and search; shells only draw and forward input.

pub mod config;
pub mod db;
pub mod geometry;
pub mod hierarchy;
pub mod layout;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod store;
pub mod viewport;

pub use config::{load_config, ChartConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use hierarchy::{build_forest, build_sorted_forest, HierarchyNode, TitleRank};
pub use layout::{render_forest, Card, HeadlessSurface, ViewSurface, VisualTree};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::member::{Member, MemberDraft, MemberId, MemberValidationError, PairPosition};
pub use search::{highlight, search, SearchOutcome};
pub use service::{ChartService, ChartSession, ServiceError, ServiceResult};
pub use store::blob_store::{BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use store::member_store::MemberStore;
pub use store::{StoreError, StoreResult};
pub use viewport::{FocusOutcome, ViewState, ViewportController};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

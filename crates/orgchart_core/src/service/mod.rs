//! UI-facing use cases.
//!
//! # Responsibility
//! - `ChartService`: validated member mutations over the record store.
//! - `ChartSession`: one interactive chart wiring service, surface, viewport
//!   and search.

pub mod chart_service;
pub mod session;

pub use chart_service::{ChartService, ServiceError, ServiceResult};
pub use session::{ChartSession, RenderSummary, SearchKeyOutcome, SessionError, SessionResult};

//! Zoom, pan and focus over the rendered chart.
//!
//! # Responsibility
//! - Own the `ViewState` and the Idle / Panning / AnimatingFocus modes.
//! - Derive the base zoom from measured chart size.
//! - Center a node through an aim step plus bounded corrections.

pub mod controller;
pub mod state;

pub use controller::{
    FocusError, FocusOutcome, FocusPhase, FocusProgress, FocusStep, ViewMode, ViewportController,
};
pub use state::ViewState;

//! Viewport state machine: fit, zoom, pan and focus.
//!
//! # Invariants
//! - At most one focus animation runs at a time.
//! - Pan input is ignored while a focus animation runs.
//! - `zoom` stays within the configured zoom bounds after any zoom operation.

use super::state::ViewState;
use crate::config::ViewportConfig;
use crate::geometry::{Point, Size};
use crate::layout::surface::ViewSurface;
use crate::model::member::MemberId;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPhase {
    /// Jump from the base view to the target zoom.
    Aim,
    /// Re-measure and nudge until within tolerance.
    Correct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusProgress {
    pub target: MemberId,
    pub phase: FocusPhase,
    pub corrections: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Idle,
    Panning { anchor: Point },
    AnimatingFocus(FocusProgress),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FocusOutcome {
    Centered { corrections: u32 },
    /// Correction budget spent; `residual` is the last measured offset.
    Unconverged { residual: Point },
    /// Target has no bounds on the surface.
    NotRendered,
}

/// Result of one [`ViewportController::advance_focus`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusStep {
    /// Surface layout has not settled yet.
    Waiting,
    /// View changed; another step is needed after the surface settles.
    Moved,
    Finished(FocusOutcome),
    /// No focus animation is running.
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusError {
    Busy { target: MemberId },
}

impl Display for FocusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy { target } => write!(f, "already focusing member `{target}`"),
        }
    }
}

impl Error for FocusError {}

#[derive(Debug, Clone)]
pub struct ViewportController {
    state: ViewState,
    mode: ViewMode,
    config: ViewportConfig,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            state: ViewState::default(),
            mode: ViewMode::Idle,
            config,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.mode, ViewMode::AnimatingFocus(_))
    }

    pub fn zoom_percent(&self) -> u32 {
        self.state.zoom_percent()
    }

    /// Scales the chart to fit the viewport and makes that the 100% view.
    pub fn fit_to_contents(&mut self, chart: Size, viewport: Size) -> &ViewState {
        let base = if chart.is_empty() {
            1.0
        } else {
            let pad = 2.0 * self.config.fit_padding;
            let zoom_x = (viewport.width - pad) / chart.width;
            let zoom_y = (viewport.height - pad) / chart.height;
            let optimal = zoom_x.min(zoom_y).min(1.0);
            bounded(
                optimal * self.config.fit_boost,
                self.config.base_zoom_min,
                self.config.base_zoom_max,
            )
        };

        let scaled_height = chart.height * base;
        self.state = ViewState {
            zoom: base,
            base_zoom: base,
            pan_x: 0.0,
            pan_y: if scaled_height < viewport.height {
                (viewport.height - scaled_height) / (2.0 * base)
            } else {
                0.0
            },
        };
        debug!(
            "event=viewport_fit module=viewport status=ok base_zoom={:.3}",
            base
        );
        &self.state
    }

    /// Returns the view to the last fitted zoom with pan cleared.
    pub fn reset_to_base(&mut self) -> &ViewState {
        self.state.zoom = self.state.base_zoom;
        self.state.pan_x = 0.0;
        self.state.pan_y = 0.0;
        &self.state
    }

    pub fn set_zoom(&mut self, level: f64) -> &ViewState {
        let level = if level.is_nan() { self.state.zoom } else { level };
        self.state.zoom = bounded(level, self.config.zoom_min, self.config.zoom_max);
        &self.state
    }

    pub fn zoom_in(&mut self) -> &ViewState {
        self.set_zoom(self.state.zoom + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> &ViewState {
        self.set_zoom(self.state.zoom - self.config.zoom_step)
    }

    /// Wheel scroll: positive delta zooms out, negative zooms in.
    pub fn wheel(&mut self, delta_y: f64) -> &ViewState {
        if delta_y > 0.0 {
            self.zoom_out()
        } else if delta_y < 0.0 {
            self.zoom_in()
        } else {
            &self.state
        }
    }

    /// Starts a drag at `pointer`. Returns false while a focus animation runs.
    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        if self.is_animating() {
            return false;
        }
        self.mode = ViewMode::Panning { anchor: pointer };
        true
    }

    /// Moves the view with the pointer during a drag.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let ViewMode::Panning { anchor } = self.mode else {
            return false;
        };
        let delta = pointer - anchor;
        self.mode = ViewMode::Panning { anchor: pointer };
        self.translate(delta.x, delta.y);
        true
    }

    pub fn end_pan(&mut self) {
        if matches!(self.mode, ViewMode::Panning { .. }) {
            self.mode = ViewMode::Idle;
        }
    }

    /// Translates by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if self.is_animating() {
            return false;
        }
        self.translate(dx, dy);
        true
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.pan_x += dx / self.state.zoom;
        self.state.pan_y += dy / self.state.zoom;
    }

    /// Starts centering `target`: resets to the base view and applies it.
    ///
    /// # Errors
    /// - `FocusError::Busy` while another focus animation runs.
    pub fn begin_focus<S: ViewSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: &str,
    ) -> Result<(), FocusError> {
        if let ViewMode::AnimatingFocus(progress) = &self.mode {
            return Err(FocusError::Busy {
                target: progress.target.clone(),
            });
        }
        self.reset_to_base();
        surface.apply_view(&self.state);
        self.mode = ViewMode::AnimatingFocus(FocusProgress {
            target: target.to_string(),
            phase: FocusPhase::Aim,
            corrections: 0,
        });
        Ok(())
    }

    /// Runs one focus step against settled surface geometry.
    pub fn advance_focus<S: ViewSurface + ?Sized>(&mut self, surface: &mut S) -> FocusStep {
        let ViewMode::AnimatingFocus(progress) = &self.mode else {
            return FocusStep::Idle;
        };
        if !surface.is_settled() {
            return FocusStep::Waiting;
        }
        let FocusProgress {
            target,
            phase,
            corrections,
        } = progress.clone();

        let Some(bounds) = surface.node_bounds(&target) else {
            self.mode = ViewMode::Idle;
            return FocusStep::Finished(FocusOutcome::NotRendered);
        };
        let viewport = surface.viewport();
        let residual = bounds.center() - viewport.center();

        match phase {
            FocusPhase::Aim => {
                let zoom = self.state.zoom;
                let target_zoom =
                    bounded(self.config.focus_zoom, self.config.zoom_min, self.config.zoom_max);
                let half_height = viewport.height / 2.0;
                self.state.pan_x -= residual.x / zoom;
                self.state.pan_y +=
                    half_height / target_zoom - (residual.y + half_height) / zoom;
                self.state.zoom = target_zoom;
                self.mode = ViewMode::AnimatingFocus(FocusProgress {
                    target,
                    phase: FocusPhase::Correct,
                    corrections,
                });
                surface.apply_view(&self.state);
                FocusStep::Moved
            }
            FocusPhase::Correct => {
                let tolerance = self.config.focus_tolerance_px;
                if residual.x.abs() <= tolerance && residual.y.abs() <= tolerance {
                    surface.pulse(&target);
                    self.mode = ViewMode::Idle;
                    debug!(
                        "event=viewport_focus module=viewport status=ok member_id={target} corrections={corrections}"
                    );
                    return FocusStep::Finished(FocusOutcome::Centered { corrections });
                }
                if corrections >= self.config.focus_max_corrections {
                    self.mode = ViewMode::Idle;
                    warn!(
                        "event=viewport_focus module=viewport status=unconverged member_id={target} residual_x={:.1} residual_y={:.1}",
                        residual.x, residual.y
                    );
                    return FocusStep::Finished(FocusOutcome::Unconverged { residual });
                }
                self.state.pan_x -= residual.x / self.state.zoom;
                self.state.pan_y -= residual.y / self.state.zoom;
                self.mode = ViewMode::AnimatingFocus(FocusProgress {
                    target,
                    phase: FocusPhase::Correct,
                    corrections: corrections + 1,
                });
                surface.apply_view(&self.state);
                FocusStep::Moved
            }
        }
    }

    /// Abandons a running focus animation, keeping the current view.
    pub fn cancel_focus(&mut self) {
        if self.is_animating() {
            self.mode = ViewMode::Idle;
        }
    }

    /// Runs a whole focus animation, settling the surface between steps.
    pub fn focus<S: ViewSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: &str,
    ) -> Result<FocusOutcome, FocusError> {
        self.begin_focus(surface, target)?;
        loop {
            match self.advance_focus(surface) {
                FocusStep::Finished(outcome) => return Ok(outcome),
                FocusStep::Idle => return Ok(FocusOutcome::NotRendered),
                FocusStep::Moved => {}
                FocusStep::Waiting => {
                    surface.settle();
                    if !surface.is_settled() {
                        self.cancel_focus();
                        warn!(
                            "event=viewport_focus module=viewport status=abandoned reason=surface_unsettled member_id={target}"
                        );
                        return Ok(FocusOutcome::NotRendered);
                    }
                }
            }
        }
    }
}

/// Clamp that favors `min` on inverted bounds instead of panicking.
fn bounded(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

//! Boundary to the rendering substrate.
//!
//! The substrate lays out a visual tree, reports measured geometry once
//! layout has settled, and applies view transforms.

use super::visual::VisualTree;
use crate::geometry::{Rect, Size};
use crate::viewport::ViewState;

/// Identifies one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Layout has not settled since the last render or view change.
    Pending,
    /// Unscaled chart size.
    Ready(Size),
}

pub trait ViewSurface {
    /// Replaces the displayed tree. Geometry is pending until [`ViewSurface::settle`].
    fn render(&mut self, tree: &VisualTree) -> RenderHandle;

    fn is_settled(&self) -> bool;

    /// Completes pending layout work.
    fn settle(&mut self);

    /// Chart size for `handle`; `Pending` before layout settles or for a stale handle.
    fn measure(&self, handle: RenderHandle) -> Measurement;

    /// Visible viewport in screen coordinates.
    fn viewport(&self) -> Rect;

    /// Screen bounds of a rendered node under the current view.
    fn node_bounds(&self, id: &str) -> Option<Rect>;

    fn apply_view(&mut self, view: &ViewState);

    /// Briefly highlights a node.
    fn pulse(&mut self, id: &str);
}

/// Settles the surface if needed, then measures `handle`.
pub fn measure_settled<S: ViewSurface + ?Sized>(surface: &mut S, handle: RenderHandle) -> Option<Size> {
    if !surface.is_settled() {
        surface.settle();
    }
    match surface.measure(handle) {
        Measurement::Ready(size) => Some(size),
        Measurement::Pending => None,
    }
}

//! Off-screen surface with fixed card metrics.
//!
//! Lays items out left to right with parents centred over their reports.
//! Used by the smoke binary, FFI fit queries and tests.

use super::surface::{Measurement, RenderHandle, ViewSurface};
use super::visual::{VisualItem, VisualLevel, VisualNode, VisualTree};
use crate::geometry::{Rect, Size};
use crate::model::member::MemberId;
use crate::viewport::ViewState;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMetrics {
    pub width: f64,
    pub height: f64,
    /// Gap between cards of one item and between items.
    pub h_gap: f64,
    /// Gap between a level and its reports.
    pub v_gap: f64,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 96.0,
            h_gap: 24.0,
            v_gap: 56.0,
        }
    }
}

#[derive(Debug, Default)]
struct Layout {
    size: Size,
    cards: HashMap<MemberId, Rect>,
}

#[derive(Debug)]
pub struct HeadlessSurface {
    metrics: CardMetrics,
    viewport: Rect,
    view: ViewState,
    pending: Option<VisualTree>,
    layout: Option<Layout>,
    dirty: bool,
    renders: u64,
    pulses: Vec<MemberId>,
}

impl HeadlessSurface {
    pub fn new(viewport: Size) -> Self {
        Self::with_metrics(viewport, CardMetrics::default())
    }

    pub fn with_metrics(viewport: Size, metrics: CardMetrics) -> Self {
        Self {
            metrics,
            viewport: Rect::from_size(viewport),
            view: ViewState::default(),
            pending: None,
            layout: None,
            dirty: false,
            renders: 0,
            pulses: Vec::new(),
        }
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = Rect::from_size(viewport);
        self.dirty = true;
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Unscaled card bounds in content space.
    pub fn content_bounds(&self, id: &str) -> Option<Rect> {
        self.layout.as_ref()?.cards.get(id).copied()
    }

    pub fn pulses(&self) -> &[MemberId] {
        &self.pulses
    }

    pub fn render_count(&self) -> u64 {
        self.renders
    }

    fn lay_out(&self, tree: &VisualTree) -> Layout {
        let mut layout = Layout::default();
        if let Some(top) = &tree.top {
            self.place_level(top, 0.0, 0.0, &mut layout.cards);
            let bottom = layout
                .cards
                .values()
                .map(Rect::bottom)
                .fold(0.0, f64::max);
            layout.size = Size::new(self.level_width(top), bottom);
        }
        layout
    }

    fn row_width(&self, cards: usize) -> f64 {
        let m = self.metrics;
        cards as f64 * m.width + cards.saturating_sub(1) as f64 * m.h_gap
    }

    fn level_width(&self, level: &VisualLevel) -> f64 {
        let widths = level.items.iter().map(|item| self.item_width(item));
        joined_width(widths, self.metrics.h_gap)
    }

    fn item_width(&self, item: &VisualItem) -> f64 {
        let nodes = item.nodes();
        self.row_width(nodes.len()).max(self.reports_width(&nodes))
    }

    fn reports_width(&self, nodes: &[&VisualNode]) -> f64 {
        let widths = nodes
            .iter()
            .filter_map(|node| node.children.as_ref())
            .map(|level| self.level_width(level));
        joined_width(widths, self.metrics.h_gap)
    }

    /// Places `level` with its left edge at `left`, centring each item's
    /// cards over the reports below them.
    fn place_level(
        &self,
        level: &VisualLevel,
        left: f64,
        top: f64,
        cards: &mut HashMap<MemberId, Rect>,
    ) {
        let m = self.metrics;
        let mut cursor = left;
        for item in &level.items {
            let nodes = item.nodes();
            let width = self.item_width(item);

            let row_left = cursor + (width - self.row_width(nodes.len())) / 2.0;
            for (slot, node) in nodes.iter().enumerate() {
                let x = row_left + slot as f64 * (m.width + m.h_gap);
                cards.insert(node.id().to_string(), Rect::new(x, top, m.width, m.height));
            }

            let mut below_left = cursor + (width - self.reports_width(&nodes)) / 2.0;
            for node in &nodes {
                if let Some(children) = &node.children {
                    self.place_level(children, below_left, top + m.height + m.v_gap, cards);
                    below_left += self.level_width(children) + m.h_gap;
                }
            }
            cursor += width + m.h_gap;
        }
    }
}

fn joined_width(widths: impl Iterator<Item = f64>, gap: f64) -> f64 {
    let (total, count) = widths.fold((0.0, 0usize), |(total, count), width| {
        (total + width, count + 1)
    });
    total + count.saturating_sub(1) as f64 * gap
}

impl ViewSurface for HeadlessSurface {
    fn render(&mut self, tree: &VisualTree) -> RenderHandle {
        self.renders += 1;
        self.pending = Some(tree.clone());
        self.dirty = true;
        RenderHandle(self.renders)
    }

    fn is_settled(&self) -> bool {
        !self.dirty
    }

    fn settle(&mut self) {
        if let Some(tree) = self.pending.take() {
            self.layout = Some(self.lay_out(&tree));
        }
        self.dirty = false;
    }

    fn measure(&self, handle: RenderHandle) -> Measurement {
        match &self.layout {
            Some(layout) if !self.dirty && handle.0 == self.renders => Measurement::Ready(layout.size),
            _ => Measurement::Pending,
        }
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn node_bounds(&self, id: &str) -> Option<Rect> {
        let layout = self.layout.as_ref()?;
        let card = layout.cards.get(id)?;
        Some(
            self.view
                .content_rect_to_screen(*card, layout.size, self.viewport),
        )
    }

    fn apply_view(&mut self, view: &ViewState) {
        self.view = *view;
        self.dirty = true;
    }

    fn pulse(&mut self, id: &str) {
        self.pulses.push(id.to_string());
    }
}

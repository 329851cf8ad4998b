//! View transform state.

use crate::geometry::{Point, Rect, Size};

/// Zoom and pan applied to the chart.
///
/// Pan is in unscaled content units; the chart is centred horizontally in the
/// viewport and scaled about its top-centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub zoom: f64,
    /// Zoom produced by the last fit; the 100% reference.
    pub base_zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            base_zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl ViewState {
    /// User-facing zoom relative to the fitted view.
    pub fn zoom_percent(&self) -> u32 {
        if self.base_zoom <= 0.0 {
            return 100;
        }
        (self.zoom / self.base_zoom * 100.0).round().max(0.0) as u32
    }

    pub fn content_to_screen(&self, point: Point, content: Size, viewport: Rect) -> Point {
        Point::new(
            viewport.x + viewport.width / 2.0 + (point.x - content.width / 2.0 + self.pan_x) * self.zoom,
            viewport.y + (point.y + self.pan_y) * self.zoom,
        )
    }

    pub fn content_rect_to_screen(&self, rect: Rect, content: Size, viewport: Rect) -> Rect {
        let origin = self.content_to_screen(rect.origin(), content, viewport);
        Rect::new(
            origin.x,
            origin.y,
            rect.width * self.zoom,
            rect.height * self.zoom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::ViewState;
    use crate::geometry::{Point, Rect, Size};

    #[test]
    fn percent_is_relative_to_base() {
        let view = ViewState {
            zoom: 0.66,
            base_zoom: 0.55,
            ..ViewState::default()
        };
        assert_eq!(view.zoom_percent(), 120);
    }

    #[test]
    fn content_top_centre_maps_to_viewport_top_centre() {
        let view = ViewState {
            zoom: 2.0,
            ..ViewState::default()
        };
        let viewport = Rect::new(10.0, 20.0, 800.0, 600.0);
        let content = Size::new(400.0, 300.0);
        assert_eq!(
            view.content_to_screen(Point::new(200.0, 0.0), content, viewport),
            Point::new(410.0, 20.0)
        );
        let panned = ViewState {
            pan_x: 5.0,
            pan_y: 5.0,
            ..view
        };
        assert_eq!(
            panned.content_to_screen(Point::new(200.0, 0.0), content, viewport),
            Point::new(420.0, 30.0)
        );
    }
}

use orgchart_core::geometry::{Point, Rect, Size};
use orgchart_core::layout::{Measurement, RenderHandle, ViewSurface, VisualTree};
use orgchart_core::viewport::{FocusError, FocusOutcome, FocusStep, ViewMode, ViewportController};
use orgchart_core::ViewState;
use std::collections::HashMap;

/// Surface with hand-placed nodes. `pan_gain` scales the pan it actually
/// applies, so values below 1.0 model a surface that lags behind the view.
struct FakeSurface {
    viewport: Rect,
    content: Size,
    nodes: HashMap<String, Rect>,
    view: ViewState,
    pan_gain: f64,
    settled: bool,
    renders: u64,
    pulses: Vec<String>,
}

impl FakeSurface {
    fn new(pan_gain: f64) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert("n".to_string(), Rect::new(1500.0, 700.0, 100.0, 50.0));
        nodes.insert("top".to_string(), Rect::new(950.0, 0.0, 100.0, 50.0));
        Self {
            viewport: Rect::new(0.0, 0.0, 1000.0, 800.0),
            content: Size::new(2000.0, 1000.0),
            nodes,
            view: ViewState::default(),
            pan_gain,
            settled: true,
            renders: 0,
            pulses: Vec::new(),
        }
    }
}

impl ViewSurface for FakeSurface {
    fn render(&mut self, _tree: &VisualTree) -> RenderHandle {
        self.renders += 1;
        self.settled = false;
        RenderHandle(self.renders)
    }

    fn is_settled(&self) -> bool {
        self.settled
    }

    fn settle(&mut self) {
        self.settled = true;
    }

    fn measure(&self, handle: RenderHandle) -> Measurement {
        if self.settled && handle.0 == self.renders {
            Measurement::Ready(self.content)
        } else {
            Measurement::Pending
        }
    }

    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn node_bounds(&self, id: &str) -> Option<Rect> {
        let rect = self.nodes.get(id)?;
        let effective = ViewState {
            pan_x: self.view.pan_x * self.pan_gain,
            pan_y: self.view.pan_y * self.pan_gain,
            ..self.view
        };
        Some(effective.content_rect_to_screen(*rect, self.content, self.viewport))
    }

    fn apply_view(&mut self, view: &ViewState) {
        self.view = *view;
        self.settled = false;
    }

    fn pulse(&mut self, id: &str) {
        self.pulses.push(id.to_string());
    }
}

fn fitted_controller(surface: &FakeSurface) -> ViewportController {
    let mut controller = ViewportController::default();
    controller.fit_to_contents(surface.content, surface.viewport.size());
    controller
}

#[test]
fn exact_surface_centers_without_corrections() {
    let mut surface = FakeSurface::new(1.0);
    let mut controller = fitted_controller(&surface);

    let outcome = controller.focus(&mut surface, "n").unwrap();
    assert_eq!(outcome, FocusOutcome::Centered { corrections: 0 });
    assert_eq!(controller.state().zoom, 2.0);
    assert_eq!(controller.mode(), &ViewMode::Idle);
    assert_eq!(surface.pulses, vec!["n"]);

    let center = surface.node_bounds("n").unwrap().center();
    assert!((center.x - 500.0).abs() <= 5.0);
    assert!((center.y - 400.0).abs() <= 5.0);
}

#[test]
fn lagging_surface_converges_within_budget() {
    let mut surface = FakeSurface::new(0.8);
    let mut controller = fitted_controller(&surface);

    let outcome = controller.focus(&mut surface, "n").unwrap();
    let FocusOutcome::Centered { corrections } = outcome else {
        panic!("expected convergence, got {outcome:?}");
    };
    assert!((1..=5).contains(&corrections));
    assert_eq!(surface.pulses, vec!["n"]);
}

#[test]
fn surface_ignoring_pan_exhausts_budget() {
    let mut surface = FakeSurface::new(0.0);
    let mut controller = fitted_controller(&surface);

    let outcome = controller.focus(&mut surface, "n").unwrap();
    assert!(matches!(outcome, FocusOutcome::Unconverged { residual } if residual.x > 5.0));
    assert!(surface.pulses.is_empty());
    assert_eq!(controller.mode(), &ViewMode::Idle);
}

#[test]
fn missing_node_reports_not_rendered() {
    let mut surface = FakeSurface::new(1.0);
    let mut controller = fitted_controller(&surface);

    let outcome = controller.focus(&mut surface, "ghost").unwrap();
    assert_eq!(outcome, FocusOutcome::NotRendered);
    assert_eq!(controller.mode(), &ViewMode::Idle);
}

#[test]
fn focus_steps_wait_for_layout_and_refuse_overlap() {
    let mut surface = FakeSurface::new(1.0);
    let mut controller = fitted_controller(&surface);

    controller.begin_focus(&mut surface, "top").unwrap();
    assert_eq!(
        controller.begin_focus(&mut surface, "n"),
        Err(FocusError::Busy {
            target: "top".to_string()
        })
    );
    assert!(!controller.pan(10.0, 10.0));
    assert!(!controller.begin_pan(Point::new(0.0, 0.0)));

    assert_eq!(controller.advance_focus(&mut surface), FocusStep::Waiting);
    surface.settle();
    assert_eq!(controller.advance_focus(&mut surface), FocusStep::Moved);
    surface.settle();
    assert_eq!(
        controller.advance_focus(&mut surface),
        FocusStep::Finished(FocusOutcome::Centered { corrections: 0 })
    );
    assert_eq!(controller.advance_focus(&mut surface), FocusStep::Idle);
}

#[test]
fn focus_starts_from_base_view() {
    let mut surface = FakeSurface::new(1.0);
    let mut controller = fitted_controller(&surface);
    controller.set_zoom(1.7);
    controller.pan(300.0, -200.0);

    controller.begin_focus(&mut surface, "n").unwrap();
    assert_eq!(controller.state().zoom, controller.state().base_zoom);
    assert_eq!((controller.state().pan_x, controller.state().pan_y), (0.0, 0.0));
    assert_eq!(surface.view, *controller.state());
}

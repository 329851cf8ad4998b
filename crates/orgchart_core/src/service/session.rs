//! Interactive chart session: members, surface, viewport and search together.
//!
//! # Responsibility
//! - Re-render and re-fit after every structural change.
//! - Route zoom, pan and search input to their controllers.
//! - Focus a member with one re-render retry when it is not on the surface.
//!
//! # Invariants
//! - The surface always shows the current member list after a mutation.
//! - Search results refer to members by id, so mutations cannot leave dangling borrows.

use super::chart_service::{ChartService, ServiceError, ServiceResult};
use crate::config::{CardConfig, ChartConfig};
use crate::geometry::{Point, Size};
use crate::hierarchy::build_sorted_forest;
use crate::layout::card::Card;
use crate::layout::surface::{measure_settled, RenderHandle, ViewSurface};
use crate::layout::visual::render_forest;
use crate::model::member::{Member, MemberDraft, MemberId};
use crate::search::{search, CursorAction, DebounceInput, Debouncer, ResultCursor, SearchKey, SearchOutcome};
use crate::store::blob_store::BlobStore;
use crate::store::photos::PhotoSource;
use crate::viewport::{FocusError, FocusOutcome, ViewState, ViewportController};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Service(ServiceError),
    Focus(FocusError),
    UnknownMember(MemberId),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Focus(err) => write!(f, "{err}"),
            Self::UnknownMember(id) => write!(f, "member not found: {id}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Focus(err) => Some(err),
            Self::UnknownMember(_) => None,
        }
    }
}

impl From<ServiceError> for SessionError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<FocusError> for SessionError {
    fn from(value: FocusError) -> Self {
        Self::Focus(value)
    }
}

/// What one render pass produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub nodes: usize,
    /// Unscaled chart size; `None` when the surface could not measure it.
    pub chart: Option<Size>,
    pub base_zoom: f64,
}

impl RenderSummary {
    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }
}

/// Result of a key press in the search results.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchKeyOutcome {
    Highlighted(MemberId),
    Focused(MemberId, FocusOutcome),
    Closed,
    Ignored,
}

pub struct ChartSession<B: BlobStore, S: ViewSurface> {
    service: ChartService<B>,
    surface: S,
    viewport: ViewportController,
    debouncer: Debouncer,
    cursor: ResultCursor,
    results: Vec<MemberId>,
    cards: CardConfig,
    last_render: Option<RenderHandle>,
}

impl<B: BlobStore, S: ViewSurface> ChartSession<B, S> {
    pub fn new(service: ChartService<B>, surface: S, config: &ChartConfig) -> Self {
        Self {
            service,
            surface,
            viewport: ViewportController::new(config.viewport.clone()),
            debouncer: Debouncer::from_millis(config.search.debounce_ms),
            cursor: ResultCursor::default(),
            results: Vec::new(),
            cards: config.cards.clone(),
            last_render: None,
        }
    }

    pub fn service(&self) -> &ChartService<B> {
        &self.service
    }

    pub fn members(&self) -> &[Member] {
        self.service.members()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn view(&self) -> &ViewState {
        self.viewport.state()
    }

    pub fn zoom_percent(&self) -> u32 {
        self.viewport.zoom_percent()
    }

    /// Rebuilds the chart, renders it and fits it to the viewport.
    pub fn render(&mut self) -> RenderSummary {
        self.viewport.cancel_focus();
        let forest = build_sorted_forest(self.service.members());
        let tree = render_forest(&forest);
        let handle = self.surface.render(&tree);
        self.last_render = Some(handle);

        let chart = measure_settled(&mut self.surface, handle);
        match chart {
            Some(size) if !tree.is_empty() => {
                self.viewport
                    .fit_to_contents(size, self.surface.viewport().size());
            }
            Some(_) => {}
            None => warn!("event=chart_render module=session status=unmeasured"),
        }
        self.surface.apply_view(self.viewport.state());

        let summary = RenderSummary {
            nodes: tree.node_count(),
            chart,
            base_zoom: self.viewport.state().base_zoom,
        };
        info!(
            "event=chart_render module=session status=ok nodes={} base_zoom={:.3}",
            summary.nodes, summary.base_zoom
        );
        summary
    }

    /// Re-fits the last render, or returns to the base view if it cannot be measured.
    pub fn reset_zoom(&mut self) -> u32 {
        let measured = self
            .last_render
            .and_then(|handle| measure_settled(&mut self.surface, handle));
        match measured {
            Some(size) => {
                self.viewport
                    .fit_to_contents(size, self.surface.viewport().size());
            }
            None => {
                self.viewport.reset_to_base();
            }
        }
        self.apply_view()
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.viewport.zoom_in();
        self.apply_view()
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.viewport.zoom_out();
        self.apply_view()
    }

    pub fn set_zoom(&mut self, level: f64) -> u32 {
        self.viewport.set_zoom(level);
        self.apply_view()
    }

    pub fn wheel(&mut self, delta_y: f64) -> u32 {
        self.viewport.wheel(delta_y);
        self.apply_view()
    }

    pub fn begin_pan(&mut self, pointer: Point) -> bool {
        self.viewport.begin_pan(pointer)
    }

    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let moved = self.viewport.drag_to(pointer);
        if moved {
            self.surface.apply_view(self.viewport.state());
        }
        moved
    }

    pub fn end_pan(&mut self) {
        self.viewport.end_pan();
    }

    pub fn add_member(&mut self, draft: MemberDraft, reports_to: Option<&str>) -> ServiceResult<MemberId> {
        let id = self.service.add_member(draft, reports_to)?;
        self.render();
        Ok(id)
    }

    pub fn edit_member(&mut self, id: &str, draft: MemberDraft) -> ServiceResult<()> {
        self.service.edit_member(id, draft)?;
        self.render();
        Ok(())
    }

    pub fn reassign_manager(&mut self, id: &str, manager: Option<&str>) -> ServiceResult<()> {
        self.service.reassign_manager(id, manager)?;
        self.render();
        Ok(())
    }

    pub fn delete_member<F>(&mut self, id: &str, confirm: F) -> ServiceResult<bool>
    where
        F: FnOnce(&Member) -> bool,
    {
        let deleted = self.service.delete_member(id, confirm)?;
        if deleted {
            self.results.retain(|result| result != id);
            self.cursor.reset(self.results.len());
            self.render();
        }
        Ok(deleted)
    }

    /// Merges photos from `source` and re-renders when any changed.
    pub fn merge_photos<P: PhotoSource + ?Sized>(&mut self, source: &P) -> ServiceResult<bool> {
        let changed = self.service.merge_photos_from(source)?;
        if changed {
            self.render();
        }
        Ok(changed)
    }

    /// Detail panel content for `id`.
    pub fn detail_card(&self, id: &str) -> Option<Card> {
        self.service
            .member(id)
            .map(|member| Card::detail(member, self.cards.max_inline_links))
    }

    /// Records a keystroke. Clearing the box suppresses results immediately.
    pub fn search_input(&mut self, text: &str, now: Instant) -> Option<SearchOutcome<'_>> {
        match self.debouncer.input(text, now) {
            DebounceInput::Scheduled => None,
            DebounceInput::Cleared => {
                self.results.clear();
                self.cursor.reset(0);
                Some(SearchOutcome::Suppressed)
            }
        }
    }

    /// Runs the pending search once the debounce delay has passed.
    pub fn poll_search(&mut self, now: Instant) -> Option<SearchOutcome<'_>> {
        let query = self.debouncer.poll(now)?;
        let outcome = search(&query, self.service.members());
        self.results = outcome
            .matches()
            .iter()
            .map(|member| member.id.clone())
            .collect();
        self.cursor.reset(self.results.len());
        Some(outcome)
    }

    /// Keyboard navigation of the latest results; Enter focuses the pick.
    pub fn search_key(&mut self, key: SearchKey) -> SessionResult<SearchKeyOutcome> {
        match self.cursor.press(key) {
            CursorAction::Highlight(index) => Ok(self
                .results
                .get(index)
                .cloned()
                .map_or(SearchKeyOutcome::Ignored, SearchKeyOutcome::Highlighted)),
            CursorAction::Pick(index) => {
                let Some(id) = self.results.get(index).cloned() else {
                    return Ok(SearchKeyOutcome::Ignored);
                };
                self.results.clear();
                self.cursor.reset(0);
                let outcome = self.focus_member(&id)?;
                Ok(SearchKeyOutcome::Focused(id, outcome))
            }
            CursorAction::Close => {
                self.results.clear();
                self.cursor.reset(0);
                Ok(SearchKeyOutcome::Closed)
            }
            CursorAction::Nothing => Ok(SearchKeyOutcome::Ignored),
        }
    }

    /// Centers and pulses `id`. When the node is missing from the surface the
    /// chart is re-rendered and the focus retried once.
    ///
    /// # Errors
    /// - `UnknownMember` when `id` is not in the member list.
    /// - `Focus(Busy)` while another focus animation runs.
    pub fn focus_member(&mut self, id: &str) -> SessionResult<FocusOutcome> {
        if !self.service.contains(id) {
            return Err(SessionError::UnknownMember(id.to_string()));
        }
        if self.last_render.is_none() {
            self.render();
        }

        let outcome = self.viewport.focus(&mut self.surface, id)?;
        if outcome != FocusOutcome::NotRendered {
            return Ok(outcome);
        }

        warn!("event=chart_focus module=session status=retry member_id={id}");
        self.render();
        if !self.service.contains(id) {
            return Ok(FocusOutcome::NotRendered);
        }
        let retried = self.viewport.focus(&mut self.surface, id)?;
        if retried == FocusOutcome::NotRendered {
            warn!("event=chart_focus module=session status=gave_up member_id={id}");
        }
        Ok(retried)
    }

    fn apply_view(&mut self) -> u32 {
        self.surface.apply_view(self.viewport.state());
        self.viewport.zoom_percent()
    }
}

//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose member editing, search and zoom as use-case-level functions to Dart via FRB.
//! - Translate core errors into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every member call re-opens the chart database, so Dart never holds core state.
//! - Viewport state and the loaded config live on the calling thread; the UI
//!   drives them from one thread.

use orgchart_core::db::open_db;
use orgchart_core::geometry::Size;
use orgchart_core::store::photos::FilePhotoSource;
use orgchart_core::viewport::ViewportController;
use orgchart_core::{
    core_version as core_version_inner, highlight, init_logging as init_logging_inner,
    load_config, ping as ping_inner, search, ChartConfig, ChartService, Member, MemberDraft,
    PairPosition, SearchOutcome, ServiceError, ServiceResult, SqliteBlobStore,
};
use std::path::Path;
use std::cell::RefCell;
use std::path::PathBuf;

const CHART_DB_FILE_NAME: &str = "orgchart.sqlite3";

thread_local! {
    static CHART_DB_PATH: RefCell<Option<PathBuf>> = const { RefCell::new(None) };
    static CHART_CONFIG: RefCell<ChartConfig> = RefCell::new(ChartConfig::default());
    static VIEWPORT: RefCell<ViewportController> = RefCell::new(ViewportController::new(
        ChartConfig::default().viewport,
    ));
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Member record as shown by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberItem {
    pub id: String,
    pub name: String,
    pub title: String,
    /// Photo URL or `data:` URL.
    pub photo: Option<String>,
    pub notes: String,
    pub links: Vec<String>,
    pub reports_to: Option<String>,
    pub paired_with: Option<String>,
    /// `left|right` when the pairing pins a side.
    pub position: Option<String>,
}

/// Member list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartListResponse {
    pub ok: bool,
    pub items: Vec<MemberItem>,
    pub message: String,
}

/// Generic action envelope for member commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected member ID, when there is one.
    pub member_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ChartActionResponse {
    fn success(message: impl Into<String>, member_id: Option<String>) -> Self {
        Self {
            ok: true,
            member_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            member_id: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSearchItem {
    pub member_id: String,
    pub name: String,
    pub title: String,
    /// HTML-escaped name with matches wrapped in `<mark>`.
    pub name_html: String,
    pub title_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSearchResponse {
    pub items: Vec<ChartSearchItem>,
    /// True for a blank query: the result list should be hidden, not shown empty.
    pub suppressed: bool,
    pub message: String,
}

/// Viewport state after a zoom or fit call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewResponse {
    pub zoom: f64,
    pub base_zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    /// Zoom relative to the fitted base view, for the zoom label.
    pub zoom_percent: u32,
}

/// Points member calls at `db_path` and loads the chart once.
///
/// A blank path falls back to the temp directory. Seeds the default chart when
/// the database holds none.
///
/// `config_path` optionally names a JSON chart config; a missing file keeps the
/// defaults. An unreadable or invalid config fails the call and leaves the
/// previous database and config in place. A successful open resets the view.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_open(db_path: String, config_path: Option<String>) -> ChartActionResponse {
    let config = match non_blank(config_path) {
        Some(path) => match load_config(Some(Path::new(&path))) {
            Ok(config) => config,
            Err(err) => return ChartActionResponse::failure(format!("chart_open failed: {err}")),
        },
        None => ChartConfig::default(),
    };

    let trimmed = db_path.trim();
    let path = if trimmed.is_empty() {
        default_db_path()
    } else {
        PathBuf::from(trimmed)
    };
    VIEWPORT.with(|cell| *cell.borrow_mut() = ViewportController::new(config.viewport.clone()));
    CHART_CONFIG.with(|cell| *cell.borrow_mut() = config);
    CHART_DB_PATH.with(|cell| *cell.borrow_mut() = Some(path));

    match with_service(|service| Ok(service.members().len())) {
        Ok(count) => ChartActionResponse::success(format!("Loaded {count} member(s)."), None),
        Err(err) => ChartActionResponse::failure(format!("chart_open failed: {err}")),
    }
}

/// Lists every member in store order.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_members() -> ChartListResponse {
    list_response("chart_members", |service| {
        Ok(service.members().iter().map(to_member_item).collect())
    })
}

/// Lists members who may be picked as a manager.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_manager_candidates() -> ChartListResponse {
    list_response("chart_manager_candidates", |service| {
        Ok(service
            .manager_candidates()
            .into_iter()
            .map(to_member_item)
            .collect())
    })
}

/// Adds a member under `reports_to` (or as a root).
#[flutter_rust_bridge::frb(sync)]
pub fn chart_add_member(
    name: String,
    title: String,
    notes: String,
    links: Vec<String>,
    photo: Option<String>,
    reports_to: Option<String>,
) -> ChartActionResponse {
    let draft = MemberDraft {
        name,
        title,
        photo,
        notes,
        links,
    };
    let manager = non_blank(reports_to);
    match with_service(|service| service.add_member(draft, manager.as_deref())) {
        Ok(id) => ChartActionResponse::success("Member added.", Some(id)),
        Err(err) => ChartActionResponse::failure(format!("chart_add_member failed: {err}")),
    }
}

/// Replaces the editable fields of `id`. `photo = None` clears the photo.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_edit_member(
    id: String,
    name: String,
    title: String,
    notes: String,
    links: Vec<String>,
    photo: Option<String>,
) -> ChartActionResponse {
    let draft = MemberDraft {
        name,
        title,
        photo,
        notes,
        links,
    };
    match with_service(|service| service.edit_member(&id, draft)) {
        Ok(()) => ChartActionResponse::success("Member updated.", Some(id)),
        Err(err) => ChartActionResponse::failure(format!("chart_edit_member failed: {err}")),
    }
}

/// Moves `id` under `manager_id`; `None` or blank makes it a root.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_reassign_manager(id: String, manager_id: Option<String>) -> ChartActionResponse {
    let manager = non_blank(manager_id);
    match with_service(|service| service.reassign_manager(&id, manager.as_deref())) {
        Ok(()) => ChartActionResponse::success("Manager updated.", Some(id)),
        Err(err) => {
            ChartActionResponse::failure(format!("chart_reassign_manager failed: {err}"))
        }
    }
}

/// Deletes `id` when the user confirmed the prompt.
///
/// # FFI contract
/// - `confirmed = false` leaves the chart untouched and returns `ok = false`.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_delete_member(id: String, confirmed: bool) -> ChartActionResponse {
    match with_service(|service| service.delete_member(&id, |_| confirmed)) {
        Ok(true) => ChartActionResponse::success("Member deleted.", Some(id)),
        Ok(false) => ChartActionResponse {
            ok: false,
            member_id: Some(id),
            message: "Delete cancelled.".to_string(),
        },
        Err(err) => ChartActionResponse::failure(format!("chart_delete_member failed: {err}")),
    }
}

/// Reads the image at `path` and stores it as the member's photo.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_upload_photo(id: String, path: String) -> ChartActionResponse {
    let result = with_service(|service| {
        let member = service
            .member(&id)
            .ok_or_else(|| ServiceError::MemberNotFound(id.clone()))?;
        let draft = draft_from(member);
        let photo = service.photo_from_file(path.trim())?;
        service.edit_member(
            &id,
            MemberDraft {
                photo: Some(photo),
                ..draft
            },
        )
    });
    match result {
        Ok(()) => ChartActionResponse::success("Photo updated.", Some(id)),
        Err(err) => ChartActionResponse::failure(format!("chart_upload_photo failed: {err}")),
    }
}

/// Backfills photos from a JSON `[{id, photo}]` feed file.
///
/// # FFI contract
/// - An unreadable or malformed feed is logged and reported as "no changes".
/// - Only `photo` fields change; records for unknown ids are ignored.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_merge_photos(feed_path: String) -> ChartActionResponse {
    let feed = FilePhotoSource::new(feed_path.trim());
    match with_service(|service| service.merge_photos_from(&feed)) {
        Ok(true) => ChartActionResponse::success("Photos merged.", None),
        Ok(false) => ChartActionResponse::success("No photo changes.", None),
        Err(err) => ChartActionResponse::failure(format!("chart_merge_photos failed: {err}")),
    }
}

/// Ranked member search with highlighted names and titles.
#[flutter_rust_bridge::frb(sync)]
pub fn chart_search(query: String) -> ChartSearchResponse {
    let result = with_service(|service| {
        let outcome = search(&query, service.members());
        let suppressed = matches!(outcome, SearchOutcome::Suppressed);
        let items = outcome
            .matches()
            .iter()
            .map(|member| ChartSearchItem {
                member_id: member.id.clone(),
                name: member.name.clone(),
                title: member.title.clone(),
                name_html: highlight(&member.name, &query),
                title_html: highlight(&member.title, &query),
            })
            .collect::<Vec<_>>();
        Ok((items, suppressed))
    });

    match result {
        Ok((items, true)) => ChartSearchResponse {
            items,
            suppressed: true,
            message: String::new(),
        },
        Ok((items, false)) => {
            let message = if items.is_empty() {
                "No matches.".to_string()
            } else {
                format!("Found {} match(es).", items.len())
            };
            ChartSearchResponse {
                items,
                suppressed: false,
                message,
            }
        }
        Err(err) => ChartSearchResponse {
            items: Vec::new(),
            suppressed: false,
            message: format!("chart_search failed: {err}"),
        },
    }
}

/// Fits the measured chart into the viewport and makes that the base view.
///
/// Sizes are unscaled logical pixels as measured by the UI.
#[flutter_rust_bridge::frb(sync)]
pub fn view_fit(
    chart_width: f64,
    chart_height: f64,
    viewport_width: f64,
    viewport_height: f64,
) -> ViewResponse {
    with_viewport(|viewport| {
        viewport.fit_to_contents(
            Size::new(chart_width, chart_height),
            Size::new(viewport_width, viewport_height),
        );
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn view_zoom_in() -> ViewResponse {
    with_viewport(|viewport| {
        viewport.zoom_in();
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn view_zoom_out() -> ViewResponse {
    with_viewport(|viewport| {
        viewport.zoom_out();
    })
}

/// Returns to the last fitted base view.
#[flutter_rust_bridge::frb(sync)]
pub fn view_reset() -> ViewResponse {
    with_viewport(|viewport| {
        viewport.reset_to_base();
    })
}

/// Sets an absolute zoom level, clamped to the configured bounds.
#[flutter_rust_bridge::frb(sync)]
pub fn view_set_zoom(level: f64) -> ViewResponse {
    with_viewport(|viewport| {
        viewport.set_zoom(level);
    })
}

/// Applies one mouse-wheel notch; negative `delta_y` zooms in.
#[flutter_rust_bridge::frb(sync)]
pub fn view_wheel(delta_y: f64) -> ViewResponse {
    with_viewport(|viewport| {
        viewport.wheel(delta_y);
    })
}

/// Pans by a screen-pixel drag delta.
#[flutter_rust_bridge::frb(sync)]
pub fn view_pan(dx: f64, dy: f64) -> ViewResponse {
    with_viewport(|viewport| {
        viewport.pan(dx, dy);
    })
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(CHART_DB_FILE_NAME)
}

fn resolve_chart_db_path() -> PathBuf {
    CHART_DB_PATH
        .with(|cell| cell.borrow().clone())
        .unwrap_or_else(default_db_path)
}

fn with_service<T>(
    f: impl FnOnce(&mut ChartService<SqliteBlobStore<'_>>) -> ServiceResult<T>,
) -> Result<T, String> {
    let db_path = resolve_chart_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("chart DB open failed: {err}"))?;
    let blobs =
        SqliteBlobStore::try_new(&conn).map_err(|err| format!("chart store init failed: {err}"))?;
    let config = CHART_CONFIG.with(|cell| cell.borrow().clone());
    let mut service = ChartService::open_configured(blobs, &config)
        .map_err(|err| format!("chart load failed: {err}"))?;
    f(&mut service).map_err(|err| err.to_string())
}

fn with_viewport(f: impl FnOnce(&mut ViewportController)) -> ViewResponse {
    VIEWPORT.with(|cell| {
        let mut viewport = cell.borrow_mut();
        f(&mut viewport);
        let state = viewport.state();
        ViewResponse {
            zoom: state.zoom,
            base_zoom: state.base_zoom,
            pan_x: state.pan_x,
            pan_y: state.pan_y,
            zoom_percent: state.zoom_percent(),
        }
    })
}

fn list_response(
    operation: &str,
    f: impl FnOnce(&mut ChartService<SqliteBlobStore<'_>>) -> ServiceResult<Vec<MemberItem>>,
) -> ChartListResponse {
    match with_service(f) {
        Ok(items) => ChartListResponse {
            ok: true,
            message: format!("{} member(s).", items.len()),
            items,
        },
        Err(err) => ChartListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn draft_from(member: &Member) -> MemberDraft {
    MemberDraft {
        name: member.name.clone(),
        title: member.title.clone(),
        photo: member.photo.clone(),
        notes: member.notes.clone(),
        links: member.links.clone(),
    }
}

fn to_member_item(member: &Member) -> MemberItem {
    MemberItem {
        id: member.id.clone(),
        name: member.name.clone(),
        title: member.title.clone(),
        photo: member.photo.clone(),
        notes: member.notes.clone(),
        links: member.links.clone(),
        reports_to: member.reports_to.clone(),
        paired_with: member.paired_with.clone(),
        position: member.position.map(position_label).map(str::to_string),
    }
}

fn position_label(position: PairPosition) -> &'static str {
    match position {
        PairPosition::Left => "left",
        PairPosition::Right => "right",
    }
}

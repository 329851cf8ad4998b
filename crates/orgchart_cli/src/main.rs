//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `orgchart_core` linkage.
//! - Lay out the seeded chart headlessly and print a deterministic summary.

use orgchart_core::geometry::Size;
use orgchart_core::{ChartConfig, ChartService, ChartSession, HeadlessSurface, MemoryBlobStore};
use std::process::ExitCode;

const SMOKE_VIEWPORT: Size = Size::new(1280.0, 800.0);

fn main() -> ExitCode {
    println!("orgchart_core ping={}", orgchart_core::ping());
    println!("orgchart_core version={}", orgchart_core::core_version());

    let config = ChartConfig::default();
    let service = match ChartService::open_configured(MemoryBlobStore::new(), &config) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("orgchart_core seed_load_failed error={err}");
            return ExitCode::FAILURE;
        }
    };
    let members = service.members().len();
    let mut session = ChartSession::new(service, HeadlessSurface::new(SMOKE_VIEWPORT), &config);
    let summary = session.render();

    println!("orgchart_core members={members} nodes={}", summary.nodes);
    match summary.chart {
        Some(size) => println!(
            "orgchart_core chart={:.0}x{:.0} base_zoom={:.3}",
            size.width, size.height, summary.base_zoom
        ),
        None => println!("orgchart_core chart=unmeasured"),
    }
    ExitCode::SUCCESS
}

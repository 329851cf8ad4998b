//! Chart rendering model and the surface boundary.
//!
//! # Responsibility
//! - Turn a sorted forest into visual items (single, pair, trio) with team ids.
//! - Build compact and detail card content.
//! - Define the `ViewSurface` contract and a headless implementation.
//!
//! # Invariants
//! - Geometry is only read after the surface reports a settled layout.

pub mod card;
pub mod headless;
pub mod surface;
pub mod visual;

pub use card::{link_label, Avatar, Card, CardVariant, LinkBadge};
pub use headless::{CardMetrics, HeadlessSurface};
pub use surface::{measure_settled, Measurement, RenderHandle, ViewSurface};
pub use visual::{render_forest, VisualItem, VisualLevel, VisualNode, VisualTree};

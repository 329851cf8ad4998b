//! Reporting hierarchy derived from the flat member list.
//!
//! # Responsibility
//! - Index members by id and manager (`forest`).
//! - Order siblings by title rank and name, and roots by pairing key (`ordering`).
//!
//! # Invariants
//! - Every member appears exactly once in the built forest.
//! - A member is a root iff its manager is absent, unknown or itself, or it
//!   was promoted to break an unreachable reporting cycle.

pub mod forest;
pub mod ordering;

pub use forest::{build_forest, ForestIndex, HierarchyNode};
pub use ordering::{build_sorted_forest, sort_roots, sort_siblings, TitleRank};

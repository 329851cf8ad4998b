//! Domain model for org chart records.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one flat record shape; hierarchy is always derived, never stored.
//!
//! # Invariants
//! - Every member is identified by a stable `MemberId`.
//! - Deletion is a hard removal; reports of a removed member become roots.

pub mod member;

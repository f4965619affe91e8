//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: SQLite-backed repositories using Diesel ORM
//! - **evidence**: capability-scoped filesystem store for uploaded evidence
//! - **insight**: canned keyword-matched insight table
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod evidence;
pub mod insight;
pub mod persistence;

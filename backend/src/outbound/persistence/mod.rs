//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the audit repository
//! ports backed by a SQLite file via Diesel, with async access through
//! `diesel-async`'s sync connection wrapper and `bb8` pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Filtering semantics live in the domain `ControlFilter`.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: every Diesel and pool failure is mapped onto
//!   the port's `Connection` or `Query` variant.
//!
//! # Example
//!
//! ```ignore
//! use audit_backend::outbound::persistence::{DbPool, DieselControlRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("audit_controls.db")).await?;
//! let controls = DieselControlRepository::new(pool);
//! ```

mod diesel_audit_response_repository;
mod diesel_audit_session_repository;
mod diesel_basic_error_mapping;
mod diesel_control_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_audit_response_repository::DieselAuditResponseRepository;
pub use diesel_audit_session_repository::DieselAuditSessionRepository;
pub use diesel_control_repository::DieselControlRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, SqliteConn};

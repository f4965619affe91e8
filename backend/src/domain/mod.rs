//! Domain primitives, services and ports.
//!
//! Purpose: define the audit questionnaire engine independently of HTTP and
//! storage. Adapters reach the engine through the driving ports in [`ports`].
//!
//! Public surface:
//! - [`audit`]: controls, sessions, responses, framework mapping and scoring.
//! - [`AuditSessionService`]: implements both audit driving ports.
//! - [`Error`] / [`ErrorCode`]: transport-agnostic failures.
//! - [`AppMode`]: live or demo operation.
//! - [`TraceId`]: request correlation identifier.

pub mod audit;
mod audit_session_service;
pub mod error;
pub mod mode;
pub mod ports;
pub mod trace_id;

pub use self::audit_session_service::{AuditServicePorts, AuditSessionService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::mode::{AppMode, DEMO_UNAVAILABLE_NOTICE, UPLOADS_DISABLED_NOTICE};
pub use self::trace_id::TraceId;

/// Header carrying the request trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

//! HTTP inbound adapter exposing the audit questionnaire.

pub mod audits;
pub mod cache_control;
pub mod demo;
pub mod error;
pub mod flash;
pub mod health;
pub mod redirect;
pub mod session_config;
pub mod state;
pub mod submission;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

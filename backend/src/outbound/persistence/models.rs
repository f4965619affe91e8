//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use super::schema::{audit_responses, audit_sessions, controls, evidence_files, evidence_urls};

// ---------------------------------------------------------------------------
// Control models
// ---------------------------------------------------------------------------

/// Row struct for reading from the controls table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = controls)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ControlRow {
    pub id: i32,
    pub control_name: String,
    pub category: String,
    pub framework: String,
    pub risk_level: String,
    pub question: String,
}

// ---------------------------------------------------------------------------
// Audit session models
// ---------------------------------------------------------------------------

/// Row struct for reading from the audit_sessions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AuditSessionRow {
    pub session_id: String,
    pub session_name: String,
    pub framework_filter: String,
    pub framework_pattern: Option<String>,
    pub category_filter: String,
    pub risk_level_filter: String,
    pub sector_filter: String,
    pub region_filter: String,
    pub created_at: NaiveDateTime,
}

/// Insertable struct for creating audit session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_sessions)]
pub(crate) struct NewAuditSessionRow<'a> {
    pub session_id: String,
    pub session_name: &'a str,
    pub framework_filter: &'a str,
    pub framework_pattern: Option<&'a str>,
    pub category_filter: &'a str,
    pub risk_level_filter: &'a str,
    pub sector_filter: &'a str,
    pub region_filter: &'a str,
    pub created_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Audit response models
// ---------------------------------------------------------------------------

/// Row struct for reading from the audit_responses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_responses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AuditResponseRow {
    pub id: i32,
    pub session_id: String,
    pub control_id: i32,
    pub response: String,
    pub confidence: i32,
    pub reference_text: String,
    pub evidence_notes: String,
    pub evidence_date: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

/// Insertable struct for the first submission of an answer.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_responses)]
pub(crate) struct NewAuditResponseRow<'a> {
    pub session_id: &'a str,
    pub control_id: i32,
    pub response: &'a str,
    pub confidence: i32,
    pub reference_text: &'a str,
    pub evidence_notes: &'a str,
    pub evidence_date: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

/// Changeset applied when an answer is resubmitted.
///
/// `treat_none_as_null` lets a cleared evidence date overwrite a stored one.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = audit_responses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AuditResponseUpdate<'a> {
    pub response: &'a str,
    pub confidence: i32,
    pub reference_text: &'a str,
    pub evidence_notes: &'a str,
    pub evidence_date: Option<NaiveDate>,
    pub updated_at: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Evidence models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = evidence_urls)]
pub(crate) struct NewEvidenceUrlRow<'a> {
    pub response_id: i32,
    pub url: &'a str,
}

/// Row struct for reading from the evidence_files table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = evidence_files)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct EvidenceFileRow {
    pub filename: String,
    pub file_path: String,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = evidence_files)]
pub(crate) struct NewEvidenceFileRow<'a> {
    pub response_id: i32,
    pub filename: &'a str,
    pub file_path: &'a str,
    pub uploaded_at: NaiveDateTime,
}

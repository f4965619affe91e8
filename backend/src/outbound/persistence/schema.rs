//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the embedded migrations exactly. When a
//! migration changes the schema, regenerate them with `diesel print-schema`
//! or update them by hand.

diesel::table! {
    /// Reference controls; read-only apart from startup seeding.
    controls (id) {
        id -> Integer,
        control_name -> Text,
        category -> Text,
        /// Free-text framework tag matched with `LIKE`.
        framework -> Text,
        risk_level -> Text,
        question -> Text,
    }
}

diesel::table! {
    /// Audit sessions with their frozen filter criteria.
    audit_sessions (session_id) {
        /// UUID session token stored as text.
        session_id -> Text,
        session_name -> Text,
        framework_filter -> Text,
        /// Resolved `LIKE` pattern; null when no framework filter applies.
        framework_pattern -> Nullable<Text>,
        category_filter -> Text,
        risk_level_filter -> Text,
        sector_filter -> Text,
        region_filter -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    /// One answer per (session, control); unique on that pair.
    audit_responses (id) {
        id -> Integer,
        session_id -> Text,
        control_id -> Integer,
        response -> Text,
        confidence -> Integer,
        reference_text -> Text,
        evidence_notes -> Text,
        evidence_date -> Nullable<Date>,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    /// Evidence URLs, replaced wholesale on every submission.
    evidence_urls (id) {
        id -> Integer,
        response_id -> Integer,
        url -> Text,
    }
}

diesel::table! {
    /// Stored evidence files; rows accumulate across submissions.
    evidence_files (id) {
        id -> Integer,
        response_id -> Integer,
        filename -> Text,
        file_path -> Text,
        uploaded_at -> Timestamp,
    }
}

diesel::joinable!(audit_responses -> controls (control_id));
diesel::joinable!(audit_responses -> audit_sessions (session_id));
diesel::joinable!(evidence_urls -> audit_responses (response_id));
diesel::joinable!(evidence_files -> audit_responses (response_id));

diesel::allow_tables_to_appear_in_same_query!(
    audit_responses,
    audit_sessions,
    controls,
    evidence_files,
    evidence_urls,
);

//! SQLite-backed `AuditResponseRepository` implementation using Diesel ORM.
//!
//! A submission is one transaction: the response row is upserted on its
//! `(session_id, control_id)` key and its URL children are replaced. File
//! rows are only ever appended.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::audit::{
    AnsweredControl, AuditResponse, ControlId, EvidenceFile, ResponseEvidence, ResponseId,
    ResponseUpsert, SessionToken, StoredResponse,
};
use crate::domain::ports::{AuditResponseRepository, AuditResponseRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_control_repository::row_to_control;
use super::models::{
    AuditResponseRow, AuditResponseUpdate, ControlRow, EvidenceFileRow, NewAuditResponseRow,
    NewEvidenceFileRow, NewEvidenceUrlRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{audit_responses, controls, evidence_files, evidence_urls};

/// Diesel-backed implementation of the audit response repository port.
#[derive(Clone)]
pub struct DieselAuditResponseRepository {
    pool: DbPool,
}

impl DieselAuditResponseRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuditResponseRepositoryError {
    map_basic_pool_error(error, AuditResponseRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuditResponseRepositoryError {
    map_basic_diesel_error(
        error,
        AuditResponseRepositoryError::query,
        AuditResponseRepositoryError::connection,
    )
}

fn row_to_response(row: AuditResponseRow) -> Result<AuditResponse, AuditResponseRepositoryError> {
    let AuditResponseRow {
        id,
        session_id,
        control_id,
        response,
        confidence,
        reference_text,
        evidence_notes,
        evidence_date,
        updated_at,
    } = row;

    let session: SessionToken = session_id.parse().map_err(|err| {
        AuditResponseRepositoryError::query(format!("invalid session token {session_id}: {err}"))
    })?;

    Ok(AuditResponse {
        id: ResponseId::new(id),
        session,
        control_id: ControlId::new(control_id),
        answer: response,
        confidence,
        reference_text,
        evidence_notes,
        evidence_date,
        updated_at: updated_at.and_utc(),
    })
}

fn row_to_file(row: EvidenceFileRow) -> EvidenceFile {
    EvidenceFile {
        filename: row.filename,
        file_path: row.file_path,
        uploaded_at: row.uploaded_at.and_utc(),
    }
}

#[async_trait]
impl AuditResponseRepository for DieselAuditResponseRepository {
    async fn find(
        &self,
        session: &SessionToken,
        control_id: ControlId,
    ) -> Result<Option<StoredResponse>, AuditResponseRepositoryError> {
        let session_id = session.to_string();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Read the response and its children in one transaction so a
        // concurrent resubmission is never observed half-applied.
        let loaded = conn
            .transaction(|conn| {
                async move {
                    let Some(row) = audit_responses::table
                        .filter(audit_responses::session_id.eq(&session_id))
                        .filter(audit_responses::control_id.eq(control_id.get()))
                        .select(AuditResponseRow::as_select())
                        .first::<AuditResponseRow>(conn)
                        .await
                        .optional()?
                    else {
                        return Ok(None);
                    };

                    let urls: Vec<String> = evidence_urls::table
                        .filter(evidence_urls::response_id.eq(row.id))
                        .order(evidence_urls::id.asc())
                        .select(evidence_urls::url)
                        .load(conn)
                        .await?;
                    let files: Vec<EvidenceFileRow> = evidence_files::table
                        .filter(evidence_files::response_id.eq(row.id))
                        .order(evidence_files::id.asc())
                        .select(EvidenceFileRow::as_select())
                        .load(conn)
                        .await?;

                    Ok(Some((row, urls, files)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let Some((row, urls, files)) = loaded else {
            return Ok(None);
        };
        Ok(Some(StoredResponse {
            response: row_to_response(row)?,
            evidence: ResponseEvidence {
                urls,
                files: files.into_iter().map(row_to_file).collect(),
            },
        }))
    }

    async fn upsert(
        &self,
        upsert: &ResponseUpsert,
    ) -> Result<ResponseId, AuditResponseRepositoryError> {
        let session_id = upsert.session.to_string();
        let control_id = upsert.control_id.get();
        let updated_at = upsert.updated_at.naive_utc();
        let new_row = NewAuditResponseRow {
            session_id: &session_id,
            control_id,
            response: &upsert.answer,
            confidence: upsert.confidence,
            reference_text: &upsert.reference_text,
            evidence_notes: &upsert.evidence_notes,
            evidence_date: upsert.evidence_date,
            updated_at,
        };
        let update_row = AuditResponseUpdate {
            response: &upsert.answer,
            confidence: upsert.confidence,
            reference_text: &upsert.reference_text,
            evidence_notes: &upsert.evidence_notes,
            evidence_date: upsert.evidence_date,
            updated_at,
        };
        let urls = &upsert.evidence_urls;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let id = conn
            .transaction(|conn| {
                async move {
                    diesel::insert_into(audit_responses::table)
                        .values(&new_row)
                        .on_conflict((audit_responses::session_id, audit_responses::control_id))
                        .do_update()
                        .set(&update_row)
                        .execute(conn)
                        .await?;

                    let id: i32 = audit_responses::table
                        .filter(audit_responses::session_id.eq(new_row.session_id))
                        .filter(audit_responses::control_id.eq(control_id))
                        .select(audit_responses::id)
                        .first(conn)
                        .await?;

                    diesel::delete(evidence_urls::table.filter(evidence_urls::response_id.eq(id)))
                        .execute(conn)
                        .await?;
                    for url in urls {
                        diesel::insert_into(evidence_urls::table)
                            .values(&NewEvidenceUrlRow {
                                response_id: id,
                                url: url.as_str(),
                            })
                            .execute(conn)
                            .await?;
                    }

                    Ok(id)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(ResponseId::new(id))
    }

    async fn attach_files(
        &self,
        response_id: ResponseId,
        files: &[EvidenceFile],
    ) -> Result<(), AuditResponseRepositoryError> {
        let rows: Vec<NewEvidenceFileRow<'_>> = files
            .iter()
            .map(|file| NewEvidenceFileRow {
                response_id: response_id.get(),
                filename: &file.filename,
                file_path: &file.file_path,
                uploaded_at: file.uploaded_at.naive_utc(),
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                for row in &rows {
                    diesel::insert_into(evidence_files::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_answered(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<AnsweredControl>, AuditResponseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(AuditResponseRow, ControlRow)> = audit_responses::table
            .inner_join(controls::table)
            .filter(audit_responses::session_id.eq(session.to_string()))
            .order(audit_responses::id.asc())
            .select((AuditResponseRow::as_select(), ControlRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(response, control)| {
                Ok(AnsweredControl {
                    control: row_to_control(control),
                    response: row_to_response(response)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion and error mapping.

    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> AuditResponseRow {
        AuditResponseRow {
            id: 3,
            session_id: "6f1d2c3b-4a59-4e8f-9d7c-0b1a2c3d4e5f".to_owned(),
            control_id: 9,
            response: "Partial".to_owned(),
            confidence: 2,
            reference_text: "ISO 42001 clause 6".to_owned(),
            evidence_notes: "Draft policy only".to_owned(),
            evidence_date: NaiveDate::from_ymd_opt(2026, 1, 20),
            updated_at: NaiveDate::from_ymd_opt(2026, 1, 21)
                .and_then(|date| date.and_hms_opt(12, 0, 0))
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn row_conversion_keeps_answer_fields(valid_row: AuditResponseRow) {
        let response = row_to_response(valid_row).expect("valid row");

        assert_eq!(response.id, ResponseId::new(3));
        assert_eq!(response.control_id, ControlId::new(9));
        assert_eq!(response.answer, "Partial");
        assert_eq!(response.confidence, 2);
        assert_eq!(response.evidence_date, NaiveDate::from_ymd_opt(2026, 1, 20));
    }

    #[rstest]
    fn row_conversion_rejects_malformed_token(mut valid_row: AuditResponseRow) {
        valid_row.session_id = "garbage".to_owned();

        let error = row_to_response(valid_row).expect_err("malformed token");
        assert!(matches!(error, AuditResponseRepositoryError::Query { .. }));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let error = map_pool_error(PoolError::build("unable to open database file"));
        assert!(matches!(error, AuditResponseRepositoryError::Connection { .. }));
    }
}

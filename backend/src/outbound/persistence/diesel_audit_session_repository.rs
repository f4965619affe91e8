//! SQLite-backed `AuditSessionRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::audit::{AuditFilters, AuditSession, AuditSessionDraft, SessionToken};
use crate::domain::ports::{AuditSessionRepository, AuditSessionRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AuditSessionRow, NewAuditSessionRow};
use super::pool::{DbPool, PoolError};
use super::schema::audit_sessions;

/// Diesel-backed implementation of the audit session repository port.
#[derive(Clone)]
pub struct DieselAuditSessionRepository {
    pool: DbPool,
}

impl DieselAuditSessionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuditSessionRepositoryError {
    map_basic_pool_error(error, AuditSessionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuditSessionRepositoryError {
    map_basic_diesel_error(
        error,
        AuditSessionRepositoryError::query,
        AuditSessionRepositoryError::connection,
    )
}

/// Convert a database row into a domain session.
fn row_to_session(row: AuditSessionRow) -> Result<AuditSession, AuditSessionRepositoryError> {
    let AuditSessionRow {
        session_id,
        session_name,
        framework_filter,
        framework_pattern,
        category_filter,
        risk_level_filter,
        sector_filter,
        region_filter,
        created_at,
    } = row;

    let token: SessionToken = session_id.parse().map_err(|err| {
        AuditSessionRepositoryError::query(format!("invalid session token {session_id}: {err}"))
    })?;

    Ok(AuditSession::new(AuditSessionDraft {
        token,
        name: session_name,
        filters: AuditFilters {
            framework: framework_filter,
            category: category_filter,
            risk_level: risk_level_filter,
            sector: sector_filter,
            region: region_filter,
        },
        framework_pattern,
        created_at: created_at.and_utc(),
    }))
}

fn new_row(session: &AuditSession) -> NewAuditSessionRow<'_> {
    let filters = session.filters();
    NewAuditSessionRow {
        session_id: session.token().to_string(),
        session_name: session.name(),
        framework_filter: &filters.framework,
        framework_pattern: session.framework_pattern(),
        category_filter: &filters.category,
        risk_level_filter: &filters.risk_level,
        sector_filter: &filters.sector,
        region_filter: &filters.region,
        created_at: session.created_at().naive_utc(),
    }
}

#[async_trait]
impl AuditSessionRepository for DieselAuditSessionRepository {
    async fn insert(&self, session: &AuditSession) -> Result<(), AuditSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(audit_sessions::table)
            .values(&new_row(session))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn insert_if_absent(
        &self,
        session: &AuditSession,
    ) -> Result<bool, AuditSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_or_ignore_into(audit_sessions::table)
            .values(&new_row(session))
            .execute(&mut conn)
            .await
            .map(|inserted| inserted > 0)
            .map_err(map_diesel_error)
    }

    async fn find(
        &self,
        token: &SessionToken,
    ) -> Result<Option<AuditSession>, AuditSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = audit_sessions::table
            .filter(audit_sessions::session_id.eq(token.to_string()))
            .select(AuditSessionRow::as_select())
            .first::<AuditSessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_session).transpose()
    }

    async fn list_recent(&self) -> Result<Vec<AuditSession>, AuditSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AuditSessionRow> = audit_sessions::table
            .order((
                audit_sessions::created_at.desc(),
                audit_sessions::session_id.desc(),
            ))
            .select(AuditSessionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_session).collect()
    }
}

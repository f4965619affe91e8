//! SQLite-backed `ControlRepository` implementation using Diesel ORM.
//!
//! Framework filters use SQLite `LIKE`, which is case-insensitive for ASCII,
//! so the stored tags are matched loosely against the resolved pattern.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_async::RunQueryDsl;

use crate::domain::audit::{CatalogueFacets, Control, ControlFilter, ControlId};
use crate::domain::ports::{ControlRepository, ControlRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::ControlRow;
use super::pool::{DbPool, PoolError};
use super::schema::controls;

/// Diesel-backed implementation of the control catalogue port.
#[derive(Clone)]
pub struct DieselControlRepository {
    pool: DbPool,
}

impl DieselControlRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ControlRepositoryError {
    map_basic_pool_error(error, ControlRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ControlRepositoryError {
    map_basic_diesel_error(
        error,
        ControlRepositoryError::query,
        ControlRepositoryError::connection,
    )
}

pub(super) fn row_to_control(row: ControlRow) -> Control {
    let ControlRow {
        id,
        control_name,
        category,
        framework,
        risk_level,
        question,
    } = row;
    Control {
        id: ControlId::new(id),
        name: control_name,
        category,
        framework,
        risk_level,
        question,
    }
}

fn control_to_row(control: &Control) -> ControlRow {
    ControlRow {
        id: control.id.get(),
        control_name: control.name.clone(),
        category: control.category.clone(),
        framework: control.framework.clone(),
        risk_level: control.risk_level.clone(),
        question: control.question.clone(),
    }
}

/// Sorted distinct values with blanks removed.
fn distinct_non_empty(mut values: Vec<String>) -> Vec<String> {
    values.retain(|value| !value.trim().is_empty());
    values.sort();
    values.dedup();
    values
}

#[async_trait]
impl ControlRepository for DieselControlRepository {
    async fn list_matching(
        &self,
        filter: &ControlFilter,
    ) -> Result<Vec<Control>, ControlRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query: controls::BoxedQuery<'_, Sqlite> = controls::table.into_boxed();
        if let Some(pattern) = filter.framework_pattern() {
            query = query.filter(controls::framework.like(pattern.to_owned()));
        }
        if let Some(category) = filter.category() {
            query = query.filter(controls::category.eq(category.to_owned()));
        }
        if let Some(risk_level) = filter.risk_level() {
            query = query.filter(controls::risk_level.eq(risk_level.to_owned()));
        }

        let rows: Vec<ControlRow> = query
            .order(controls::id.asc())
            .select(ControlRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_control).collect())
    }

    async fn facets(&self) -> Result<CatalogueFacets, ControlRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let frameworks: Vec<String> = controls::table
            .select(controls::framework)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let categories: Vec<String> = controls::table
            .select(controls::category)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let risk_levels: Vec<String> = controls::table
            .select(controls::risk_level)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(CatalogueFacets {
            frameworks: distinct_non_empty(frameworks),
            categories: distinct_non_empty(categories),
            risk_levels: distinct_non_empty(risk_levels),
        })
    }

    async fn seed_if_empty(&self, seed: &[Control]) -> Result<usize, ControlRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let rows: Vec<ControlRow> = seed.iter().map(control_to_row).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                let existing: i64 = controls::table.count().get_result(conn).await?;
                if existing > 0 {
                    return Ok(0);
                }
                let mut inserted = 0;
                for row in &rows {
                    inserted += diesel::insert_into(controls::table)
                        .values(row)
                        .execute(conn)
                        .await?;
                }
                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

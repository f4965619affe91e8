//! Port for reading the control catalogue.

use async_trait::async_trait;

use crate::domain::audit::{CatalogueFacets, Control, ControlFilter};

use super::define_port_error;

define_port_error! {
    /// Errors raised by control repository adapters.
    pub enum ControlRepositoryError {
        /// Repository connection could not be established.
        Connection => "control repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "control repository query failed: {message}",
    }
}

/// Port over the read-only control catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControlRepository: Send + Sync {
    /// Controls matching `filter`, ordered by id ascending.
    async fn list_matching(
        &self,
        filter: &ControlFilter,
    ) -> Result<Vec<Control>, ControlRepositoryError>;

    /// Distinct framework, category and risk-level values.
    async fn facets(&self) -> Result<CatalogueFacets, ControlRepositoryError>;

    /// Insert `controls` only when the catalogue is empty.
    ///
    /// Returns the number of controls inserted.
    async fn seed_if_empty(&self, controls: &[Control]) -> Result<usize, ControlRepositoryError>;
}

/// Fixture implementation backed by an empty catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureControlRepository;

#[async_trait]
impl ControlRepository for FixtureControlRepository {
    async fn list_matching(
        &self,
        _filter: &ControlFilter,
    ) -> Result<Vec<Control>, ControlRepositoryError> {
        Ok(Vec::new())
    }

    async fn facets(&self) -> Result<CatalogueFacets, ControlRepositoryError> {
        Ok(CatalogueFacets::default())
    }

    async fn seed_if_empty(&self, _controls: &[Control]) -> Result<usize, ControlRepositoryError> {
        Ok(0)
    }
}

//! Startup-aware health endpoints.
//!
//! The service moves through a fixed sequence of [`StartupStage`]s: the
//! schema is migrated, the control catalogue seeded, then traffic served.
//! Readiness holds off until serving; liveness fails once draining so an
//! orchestrator stops routing sessions to a shutting-down instance.

use std::sync::atomic::{AtomicU8, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle stage reported by the health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StartupStage {
    Migrating,
    Seeding,
    Serving,
    Draining,
}

impl StartupStage {
    const ORDER: [Self; 4] = [Self::Migrating, Self::Seeding, Self::Serving, Self::Draining];

    fn from_raw(raw: u8) -> Self {
        Self::ORDER
            .get(usize::from(raw))
            .copied()
            .unwrap_or(Self::Draining)
    }
}

/// Body of both health responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub stage: StartupStage,
}

/// Shared lifecycle stage. Stages only move forward.
#[derive(Debug, Default)]
pub struct HealthState {
    stage: AtomicU8,
}

impl HealthState {
    /// Start in [`StartupStage::Migrating`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> StartupStage {
        StartupStage::from_raw(self.stage.load(Ordering::Acquire))
    }

    /// Move to `stage` unless a later stage was already reached.
    pub fn advance(&self, stage: StartupStage) {
        self.stage.fetch_max(stage as u8, Ordering::AcqRel);
    }

    pub fn is_ready(&self) -> bool {
        self.stage() == StartupStage::Serving
    }

    pub fn is_alive(&self) -> bool {
        self.stage() != StartupStage::Draining
    }

    fn report(&self, ok: bool) -> HttpResponse {
        let mut response = if ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(HealthReport {
                stage: self.stage(),
            })
    }
}

/// Readiness: 200 once migrations and seeding have finished.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Serving audit traffic", body = HealthReport),
        (status = 503, description = "Still starting or draining", body = HealthReport)
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    state.report(state.is_ready())
}

/// Liveness: 200 until shutdown begins.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Process alive", body = HealthReport),
        (status = 503, description = "Draining for shutdown", body = HealthReport)
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    state.report(state.is_alive())
}

//! Demo-mode HTTP handlers.
//!
//! ```text
//! GET /demo/create-session
//! GET /demo/status
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{AppMode, DEMO_UNAVAILABLE_NOTICE};
use crate::inbound::http::flash::{FlashLevel, FlashMessages};
use crate::inbound::http::redirect::{home, question_path, see_other};
use crate::inbound::http::state::HttpState;

/// Current mode and the banner pages should show.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DemoStatus {
    pub mode: AppMode,
    pub demo: bool,
    pub uploads_enabled: bool,
    pub banner: Option<String>,
}

impl From<AppMode> for DemoStatus {
    fn from(mode: AppMode) -> Self {
        Self {
            mode,
            demo: mode.is_demo(),
            uploads_enabled: mode.accepts_uploads(),
            banner: mode.banner().map(str::to_owned),
        }
    }
}

/// Open the pre-filled demo session, creating it on first use.
#[utoipa::path(
    get,
    path = "/demo/create-session",
    tags = ["demo"],
    responses(
        (status = 303, description = "Redirect to the demo session's first question, or to `/` with a flash")
    )
)]
#[get("/demo/create-session")]
pub async fn create_demo_session(
    state: web::Data<HttpState>,
    flash: FlashMessages,
) -> HttpResponse {
    if !state.mode.is_demo() {
        flash.push(FlashLevel::Warning, DEMO_UNAVAILABLE_NOTICE);
        return home();
    }

    match state.audit_commands.create_demo_session().await {
        Ok(demo) => {
            if demo.created {
                info!(session = %demo.session, "demo session ready");
            }
            see_other(question_path(&demo.session, 0))
        }
        Err(error) => {
            flash.push_error(&error);
            home()
        }
    }
}

#[utoipa::path(
    get,
    path = "/demo/status",
    tags = ["demo"],
    responses((status = 200, description = "Mode and banner", body = DemoStatus))
)]
#[get("/demo/status")]
pub async fn demo_status(state: web::Data<HttpState>) -> HttpResponse {
    HttpResponse::Ok().json(DemoStatus::from(state.mode))
}

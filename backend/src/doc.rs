//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every audit, demo and health endpoint. The document
//! backs Swagger UI in debug builds and is exported by the `openapi-dump`
//! binary for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::audits::{
    ComparisonPage, IndexPage, QuestionPage, SessionsPage, StartAuditForm, SummaryPage,
};
use crate::inbound::http::demo::DemoStatus;
use crate::inbound::http::flash::{FlashLevel, FlashMessage};
use crate::inbound::http::health::{HealthReport, StartupStage};

/// Document the cookie carrying flash messages between redirects.
struct SessionCookieAddon;

impl Modify for SessionCookieAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted cookie holding pending flash messages.",
            ))),
        );
    }
}

/// OpenAPI document for the audit service.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SessionCookieAddon),
    info(
        title = "AI governance audit API",
        description = "Questionnaire flow for auditing AI systems against governance controls."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::audits::index_page,
        crate::inbound::http::audits::start_audit_page,
        crate::inbound::http::audits::start_audit,
        crate::inbound::http::audits::question,
        crate::inbound::http::audits::submit_answer,
        crate::inbound::http::audits::summary,
        crate::inbound::http::audits::list_audits,
        crate::inbound::http::audits::compare_audits,
        crate::inbound::http::demo::create_demo_session,
        crate::inbound::http::demo::demo_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FlashLevel,
        FlashMessage,
        IndexPage,
        QuestionPage,
        SummaryPage,
        SessionsPage,
        ComparisonPage,
        StartAuditForm,
        DemoStatus,
        HealthReport,
        StartupStage
    )),
    tags(
        (name = "audits", description = "Audit sessions, questions and scoring"),
        (name = "demo", description = "Demo mode helpers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

//! Audit questionnaire HTTP handlers.
//!
//! ```text
//! GET  /
//! GET  /start-audit
//! POST /start-audit
//! GET  /audit/{session}/question/{index}
//! POST /audit/{session}/question/{index}/submit
//! GET  /audit/{session}/summary
//! GET  /audits
//! GET  /audit/compare/{first}/{second}
//! ```
//!
//! Page flows never answer with a server error. Failures become a flash
//! message and a `303 See Other`: invalid submissions return to the same
//! question, compare failures to `/audits`, and everything else to `/`.

use actix_multipart::Multipart;
use actix_session::SessionExt;
use actix_web::error::{InternalError, PathError};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::audit::{AuditFilters, SessionToken};
use crate::domain::ports::{
    AuditSessionPayload, ComparisonView, FilterOptions, GetQuestionRequest, QuestionOutcome,
    QuestionView, StartAuditRequest, SubmitAnswerOutcome, SummaryView,
};
use crate::domain::{AppMode, Error, ErrorCode, UPLOADS_DISABLED_NOTICE};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache_header;
use crate::inbound::http::flash::{FlashLevel, FlashMessage, FlashMessages};
use crate::inbound::http::redirect::{home, question_path, see_other, summary_path};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::submission::{SubmissionLimits, UploadPolicy, read_submission};

const SESSIONS_PATH: &str = "/audits";

/// Landing view: start-form options plus pending flashes.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub filter_options: FilterOptions,
    pub flashes: Vec<FlashMessage>,
    pub mode: AppMode,
    pub banner: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPage {
    pub question: QuestionView,
    pub flashes: Vec<FlashMessage>,
    pub banner: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPage {
    pub summary: SummaryView,
    pub flashes: Vec<FlashMessage>,
    pub banner: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionsPage {
    pub sessions: Vec<AuditSessionPayload>,
    pub flashes: Vec<FlashMessage>,
    pub banner: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPage {
    pub comparison: ComparisonView,
    pub flashes: Vec<FlashMessage>,
    pub banner: Option<String>,
}

/// Form posted by the start-audit page.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct StartAuditForm {
    pub session_name: String,
    pub framework_filter: String,
    pub category_filter: String,
    pub risk_level_filter: String,
    pub sector_filter: String,
    pub region_filter: String,
}

impl From<StartAuditForm> for StartAuditRequest {
    fn from(form: StartAuditForm) -> Self {
        Self {
            name: form.session_name,
            filters: AuditFilters {
                framework: form.framework_filter,
                category: form.category_filter,
                risk_level: form.risk_level_filter,
                sector: form.sector_filter,
                region: form.region_filter,
            },
        }
    }
}

fn banner(mode: AppMode) -> Option<String> {
    mode.banner().map(str::to_owned)
}

fn json_page(body: &impl Serialize) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .json(body)
}

/// Parse a session path segment; malformed tokens read as unknown sessions.
fn parse_session(raw: &str) -> Result<SessionToken, Error> {
    raw.parse().map_err(|_| {
        Error::not_found("Audit session not found").with_details(json!({ "sessionId": raw }))
    })
}

/// Path extraction for page routes: an unparsable question index flashes and
/// returns to the landing page instead of a bare `404`.
pub fn page_path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(page_path_error)
}

fn page_path_error(err: PathError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = req.path(), error = %err, "unparsable page path");
    let flash = FlashMessages::new(req.get_session());
    flash.push_error(&Error::not_found("Audit page not found"));
    InternalError::from_response(err, home()).into()
}

/// Flash `error` and return to the landing page.
fn fail_home(flash: &FlashMessages, error: &Error) -> HttpResponse {
    flash.push_error(error);
    home()
}

/// Filter options for the start form, pending flashes and the mode banner.
#[utoipa::path(
    get,
    path = "/",
    tags = ["audits"],
    responses(
        (status = 200, description = "Start form options", body = IndexPage),
        (status = 503, description = "Catalogue unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    )
)]
#[get("/")]
pub async fn index_page(
    state: web::Data<HttpState>,
    flash: FlashMessages,
) -> ApiResult<HttpResponse> {
    let filter_options = state.audit_queries.filter_options().await?;
    Ok(json_page(&IndexPage {
        filter_options,
        flashes: flash.take(),
        mode: state.mode,
        banner: banner(state.mode),
    }))
}

/// The start form only accepts POST; stray GETs return to the landing page.
#[utoipa::path(
    get,
    path = "/start-audit",
    tags = ["audits"],
    responses((status = 303, description = "Redirect to the landing page"))
)]
#[get("/start-audit")]
pub async fn start_audit_page() -> HttpResponse {
    home()
}

/// Create a session from the posted filters and open its first question.
#[utoipa::path(
    post,
    path = "/start-audit",
    tags = ["audits"],
    request_body(
        content = StartAuditForm,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 303, description = "Redirect to the first question, or to `/` with a flash")
    )
)]
#[post("/start-audit")]
pub async fn start_audit(
    state: web::Data<HttpState>,
    flash: FlashMessages,
    form: web::Form<StartAuditForm>,
) -> HttpResponse {
    match state
        .audit_commands
        .start_audit(form.into_inner().into())
        .await
    {
        Ok(started) => see_other(question_path(&started.session, 0)),
        Err(error) => fail_home(&flash, &error),
    }
}

/// One question with progress, any prior answer and its insight.
#[utoipa::path(
    get,
    path = "/audit/{session}/question/{index}",
    tags = ["audits"],
    params(
        ("session" = String, Path, description = "Audit session token"),
        ("index" = usize, Path, description = "Zero-based question index")
    ),
    responses(
        (status = 200, description = "Question view", body = QuestionPage),
        (status = 303, description = "Redirect to the summary once exhausted, or to `/` with a flash")
    )
)]
#[get("/audit/{session}/question/{index}")]
pub async fn question(
    state: web::Data<HttpState>,
    flash: FlashMessages,
    path: web::Path<(String, usize)>,
) -> HttpResponse {
    let (raw_session, index) = path.into_inner();
    let session = match parse_session(&raw_session) {
        Ok(session) => session,
        Err(error) => return fail_home(&flash, &error),
    };

    match state
        .audit_queries
        .get_question(GetQuestionRequest { session, index })
        .await
    {
        Ok(QuestionOutcome::Question(question)) => json_page(&QuestionPage {
            question: *question,
            flashes: flash.take(),
            banner: banner(state.mode),
        }),
        Ok(QuestionOutcome::Exhausted) => {
            debug!(session = %session, index, "question index exhausted; showing summary");
            see_other(summary_path(&session))
        }
        Err(error) => fail_home(&flash, &error),
    }
}

/// Record the answer for one question and move on.
#[utoipa::path(
    post,
    path = "/audit/{session}/question/{index}/submit",
    tags = ["audits"],
    params(
        ("session" = String, Path, description = "Audit session token"),
        ("index" = usize, Path, description = "Zero-based question index")
    ),
    request_body(
        content_type = "multipart/form-data",
        description = "Fields `response`, `confidence` or `response_score`, `reference_text`, \
                       `evidence_notes`, `evidence_date`, repeated `evidence_urls[]` and \
                       files `evidence_files[]`"
    ),
    responses(
        (status = 303, description = "Redirect to the next question or the summary")
    )
)]
#[post("/audit/{session}/question/{index}/submit")]
pub async fn submit_answer(
    state: web::Data<HttpState>,
    flash: FlashMessages,
    path: web::Path<(String, usize)>,
    payload: Multipart,
) -> HttpResponse {
    let (raw_session, index) = path.into_inner();
    let session = match parse_session(&raw_session) {
        Ok(session) => session,
        Err(error) => return fail_home(&flash, &error),
    };
    let back_to_question = |error: &Error| {
        flash.push_error(error);
        see_other(question_path(&session, index))
    };

    let uploads = if state.mode.accepts_uploads() {
        UploadPolicy::Keep
    } else {
        UploadPolicy::Discard
    };
    let form = match read_submission(payload, SubmissionLimits::default(), uploads).await {
        Ok(form) => form,
        Err(error) => return back_to_question(&error),
    };
    if form.uploads_discarded {
        flash.push(FlashLevel::Info, UPLOADS_DISABLED_NOTICE);
    }

    match state
        .audit_commands
        .submit_answer(form.into_request(session, index))
        .await
    {
        Ok(SubmitAnswerOutcome::Next { index }) => see_other(question_path(&session, index)),
        Ok(SubmitAnswerOutcome::Summary) => see_other(summary_path(&session)),
        Err(error) if error.code() == ErrorCode::InvalidRequest => back_to_question(&error),
        Err(error) => fail_home(&flash, &error),
    }
}

/// Completion, compliance and category scoring for a session.
#[utoipa::path(
    get,
    path = "/audit/{session}/summary",
    tags = ["audits"],
    params(("session" = String, Path, description = "Audit session token")),
    responses(
        (status = 200, description = "Summary view", body = SummaryPage),
        (status = 303, description = "Redirect to `/` with a flash")
    )
)]
#[get("/audit/{session}/summary")]
pub async fn summary(
    state: web::Data<HttpState>,
    flash: FlashMessages,
    path: web::Path<String>,
) -> HttpResponse {
    let session = match parse_session(&path.into_inner()) {
        Ok(session) => session,
        Err(error) => return fail_home(&flash, &error),
    };

    match state.audit_queries.summary(&session).await {
        Ok(summary) => json_page(&SummaryPage {
            summary,
            flashes: flash.take(),
            banner: banner(state.mode),
        }),
        Err(error) => fail_home(&flash, &error),
    }
}

/// Every session, newest first.
#[utoipa::path(
    get,
    path = "/audits",
    tags = ["audits"],
    responses(
        (status = 200, description = "Session list", body = SessionsPage),
        (status = 303, description = "Redirect to `/` with a flash")
    )
)]
#[get("/audits")]
pub async fn list_audits(state: web::Data<HttpState>, flash: FlashMessages) -> HttpResponse {
    match state.audit_queries.list_sessions().await {
        Ok(sessions) => json_page(&SessionsPage {
            sessions,
            flashes: flash.take(),
            banner: banner(state.mode),
        }),
        Err(error) => fail_home(&flash, &error),
    }
}

/// Two sessions side by side.
#[utoipa::path(
    get,
    path = "/audit/compare/{first}/{second}",
    tags = ["audits"],
    params(
        ("first" = String, Path, description = "First session token"),
        ("second" = String, Path, description = "Second session token")
    ),
    responses(
        (status = 200, description = "Comparison view", body = ComparisonPage),
        (status = 303, description = "Redirect to `/audits` with a flash")
    )
)]
#[get("/audit/compare/{first}/{second}")]
pub async fn compare_audits(
    state: web::Data<HttpState>,
    flash: FlashMessages,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (raw_first, raw_second) = path.into_inner();
    let back_to_sessions = |error: &Error| {
        flash.push_error(error);
        see_other(SESSIONS_PATH)
    };
    let (first, second) = match (parse_session(&raw_first), parse_session(&raw_second)) {
        (Ok(first), Ok(second)) => (first, second),
        (Err(error), _) | (_, Err(error)) => return back_to_sessions(&error),
    };

    match state.audit_queries.compare(&first, &second).await {
        Ok(comparison) => json_page(&ComparisonPage {
            comparison,
            flashes: flash.take(),
            banner: banner(state.mode),
        }),
        Err(error) => back_to_sessions(&error),
    }
}

#[cfg(test)]
#[path = "audits_tests.rs"]
mod tests;

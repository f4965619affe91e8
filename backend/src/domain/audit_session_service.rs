//! Audit session engine.
//!
//! Implements the audit driving ports over the control catalogue, session and
//! response repositories. The applicable controls of a session are recomputed
//! from its frozen criteria on every call, so question indices always resolve
//! against the catalogue as it stands.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::Error;
use crate::domain::audit::{
    AuditSession, AuditSessionDraft, AuditSummary, Control, ControlFilter, DEMO_ANSWERS,
    DEMO_SESSION_NAME, FrameworkMapping, Progress, ResponseId, ResponseUpsert, SessionComparison,
    SessionToken, demo_filters, demo_session_token, normalise_evidence_urls, parse_confidence,
    parse_evidence_date,
};
use crate::domain::ports::{
    AuditResponseRepository, AuditResponseRepositoryError, AuditSessionCommand,
    AuditSessionPayload, AuditSessionQuery, AuditSessionRepository, AuditSessionRepositoryError,
    ComparisonView, ControlRepository, ControlRepositoryError, DemoSessionResponse,
    EvidenceFileStore, EvidenceFileStoreError, EvidenceUpload, FilterOptions, GetQuestionRequest,
    InsightRequest, InsightSource, QuestionOutcome, QuestionView, ResponsePayload,
    StartAuditRequest, StartAuditResponse, SubmitAnswerOutcome, SubmitAnswerRequest, SummaryView,
};

const SESSION_NOT_FOUND: &str = "Audit session not found";
const COMPARISON_NOT_FOUND: &str = "One or both audit sessions were not found";
const NO_MATCHING_CONTROLS: &str =
    "No audit controls match the selected criteria. Please choose different filters.";

fn map_control_error(error: ControlRepositoryError) -> Error {
    match error {
        ControlRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("control repository unavailable: {message}"))
        }
        ControlRepositoryError::Query { message } => {
            Error::internal(format!("control repository error: {message}"))
        }
    }
}

fn map_session_error(error: AuditSessionRepositoryError) -> Error {
    match error {
        AuditSessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("audit session repository unavailable: {message}"))
        }
        AuditSessionRepositoryError::Query { message } => {
            Error::internal(format!("audit session repository error: {message}"))
        }
    }
}

fn map_response_error(error: AuditResponseRepositoryError) -> Error {
    match error {
        AuditResponseRepositoryError::Connection { message } => Error::service_unavailable(
            format!("audit response repository unavailable: {message}"),
        ),
        AuditResponseRepositoryError::Query { message } => {
            Error::internal(format!("audit response repository error: {message}"))
        }
    }
}

fn map_evidence_error(error: EvidenceFileStoreError) -> Error {
    Error::internal(format!("evidence store error: {error}"))
}

fn session_not_found(token: &SessionToken) -> Error {
    Error::not_found(SESSION_NOT_FOUND).with_details(json!({ "sessionId": token.to_string() }))
}

/// Driven ports required by [`AuditSessionService`].
pub struct AuditServicePorts<S, R, C> {
    pub sessions: Arc<S>,
    pub responses: Arc<R>,
    pub controls: Arc<C>,
    pub evidence: Arc<dyn EvidenceFileStore>,
    pub insights: Arc<dyn InsightSource>,
}

/// Audit engine implementing [`AuditSessionCommand`] and
/// [`AuditSessionQuery`].
pub struct AuditSessionService<S, R, C> {
    sessions: Arc<S>,
    responses: Arc<R>,
    controls: Arc<C>,
    evidence: Arc<dyn EvidenceFileStore>,
    insights: Arc<dyn InsightSource>,
    mapping: FrameworkMapping,
    clock: Arc<dyn Clock>,
}

impl<S, R, C> AuditSessionService<S, R, C> {
    /// Create a service using the default framework mapping.
    pub fn new(ports: AuditServicePorts<S, R, C>, clock: Arc<dyn Clock>) -> Self {
        let AuditServicePorts {
            sessions,
            responses,
            controls,
            evidence,
            insights,
        } = ports;
        Self {
            sessions,
            responses,
            controls,
            evidence,
            insights,
            mapping: FrameworkMapping::default(),
            clock,
        }
    }

    /// Replace the framework label mapping.
    #[must_use]
    pub fn with_framework_mapping(mut self, mapping: FrameworkMapping) -> Self {
        self.mapping = mapping;
        self
    }
}

impl<S, R, C> AuditSessionService<S, R, C>
where
    S: AuditSessionRepository,
    R: AuditResponseRepository,
    C: ControlRepository,
{
    async fn find_session(&self, token: &SessionToken) -> Result<Option<AuditSession>, Error> {
        self.sessions.find(token).await.map_err(map_session_error)
    }

    async fn require_session(&self, token: &SessionToken) -> Result<AuditSession, Error> {
        self.find_session(token)
            .await?
            .ok_or_else(|| session_not_found(token))
    }

    /// Controls matching the session's criteria, relaxed to every framework
    /// when nothing matches. May still be empty.
    async fn applicable_controls(&self, session: &AuditSession) -> Result<Vec<Control>, Error> {
        let controls = self
            .controls
            .list_matching(&session.control_filter())
            .await
            .map_err(map_control_error)?;
        if !controls.is_empty() {
            return Ok(controls);
        }

        debug!(
            session = %session.token(),
            "no controls match session criteria; relaxing to all frameworks"
        );
        self.controls
            .list_matching(&ControlFilter::wildcard())
            .await
            .map_err(map_control_error)
    }

    async fn non_empty_applicable_controls(
        &self,
        session: &AuditSession,
    ) -> Result<Vec<Control>, Error> {
        let controls = self.applicable_controls(session).await?;
        if controls.is_empty() {
            return Err(Error::not_found(NO_MATCHING_CONTROLS)
                .with_details(json!({ "sessionId": session.token().to_string() })));
        }
        Ok(controls)
    }

    async fn store_evidence(
        &self,
        response_id: ResponseId,
        uploads: Vec<EvidenceUpload>,
    ) -> Result<(), Error> {
        let accepted: Vec<EvidenceUpload> = uploads
            .into_iter()
            .filter(|upload| !upload.filename.trim().is_empty())
            .filter(|upload| {
                let accepted = upload.accepted_extension().is_some();
                if !accepted {
                    warn!(
                        filename = %upload.filename,
                        response_id = %response_id,
                        "skipping evidence file with unsupported extension"
                    );
                }
                accepted
            })
            .collect();
        if accepted.is_empty() {
            return Ok(());
        }

        let stored = self
            .evidence
            .store(response_id, accepted)
            .await
            .map_err(map_evidence_error)?;
        if stored.is_empty() {
            return Ok(());
        }
        if let Err(error) = self.responses.attach_files(response_id, &stored).await {
            if let Err(cleanup) = self.evidence.discard(&stored).await {
                warn!(
                    response_id = %response_id,
                    error = %cleanup,
                    "stored evidence files could not be removed after a failed attach"
                );
            }
            return Err(map_response_error(error));
        }
        Ok(())
    }

    async fn seed_demo_answers(&self, session: &AuditSession) -> Result<(), Error> {
        let controls = self.applicable_controls(session).await?;
        let created_at = session.created_at();
        for (control, demo) in controls.iter().zip(DEMO_ANSWERS.iter()) {
            let upsert = ResponseUpsert {
                session: session.token(),
                control_id: control.id,
                answer: demo.answer.to_owned(),
                confidence: demo.confidence,
                reference_text: String::new(),
                evidence_notes: demo.evidence_notes.to_owned(),
                evidence_date: Some(
                    (created_at - Duration::days(demo.evidence_age_days)).date_naive(),
                ),
                evidence_urls: Vec::new(),
                updated_at: created_at,
            };
            self.responses
                .upsert(&upsert)
                .await
                .map_err(map_response_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<S, R, C> AuditSessionCommand for AuditSessionService<S, R, C>
where
    S: AuditSessionRepository,
    R: AuditResponseRepository,
    C: ControlRepository,
{
    async fn start_audit(&self, request: StartAuditRequest) -> Result<StartAuditResponse, Error> {
        let StartAuditRequest { name, filters } = request;
        let framework_pattern = self.mapping.resolve(&filters.framework);
        let session = AuditSession::new(AuditSessionDraft {
            token: SessionToken::generate(),
            name,
            filters,
            framework_pattern,
            created_at: self.clock.utc(),
        });

        self.sessions
            .insert(&session)
            .await
            .map_err(map_session_error)?;

        info!(
            session = %session.token(),
            name = session.name(),
            framework_pattern = ?session.framework_pattern(),
            "started audit session"
        );
        Ok(StartAuditResponse {
            session: session.token(),
        })
    }

    async fn submit_answer(
        &self,
        request: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerOutcome, Error> {
        let session = self.require_session(&request.session).await?;
        let controls = self.non_empty_applicable_controls(&session).await?;
        let total = controls.len();
        let Some(control) = controls.into_iter().nth(request.index) else {
            debug!(
                session = %session.token(),
                index = request.index,
                total,
                "submission past the last control; routing to summary"
            );
            return Ok(SubmitAnswerOutcome::Summary);
        };

        let evidence_date = parse_evidence_date(request.evidence_date.as_deref()).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({ "field": "evidence_date" }))
        })?;
        let upsert = ResponseUpsert {
            session: session.token(),
            control_id: control.id,
            answer: request.answer,
            confidence: parse_confidence(request.confidence.as_deref()),
            reference_text: request.reference_text,
            evidence_notes: request.evidence_notes,
            evidence_date,
            evidence_urls: normalise_evidence_urls(request.evidence_urls),
            updated_at: self.clock.utc(),
        };
        let response_id = self
            .responses
            .upsert(&upsert)
            .await
            .map_err(map_response_error)?;
        info!(
            session = %session.token(),
            control_id = %control.id,
            response_id = %response_id,
            "recorded audit answer"
        );

        self.store_evidence(response_id, request.evidence_files)
            .await?;

        let next = request.index + 1;
        Ok(if next < total {
            SubmitAnswerOutcome::Next { index: next }
        } else {
            SubmitAnswerOutcome::Summary
        })
    }

    async fn create_demo_session(&self) -> Result<DemoSessionResponse, Error> {
        let token = demo_session_token();
        let filters = demo_filters();
        let session = AuditSession::new(AuditSessionDraft {
            token,
            name: DEMO_SESSION_NAME.to_owned(),
            framework_pattern: self.mapping.resolve(&filters.framework),
            filters,
            created_at: self.clock.utc(),
        });
        let created = self
            .sessions
            .insert_if_absent(&session)
            .await
            .map_err(map_session_error)?;
        if created {
            self.seed_demo_answers(&session).await?;
            info!(session = %token, "created demo audit session");
        }

        Ok(DemoSessionResponse {
            session: token,
            created,
        })
    }
}

#[async_trait]
impl<S, R, C> AuditSessionQuery for AuditSessionService<S, R, C>
where
    S: AuditSessionRepository,
    R: AuditResponseRepository,
    C: ControlRepository,
{
    async fn filter_options(&self) -> Result<FilterOptions, Error> {
        let facets = self.controls.facets().await.map_err(map_control_error)?;

        let mut frameworks: Vec<String> = self.mapping.labels().map(str::to_owned).collect();
        for tag in facets.frameworks {
            if !frameworks.iter().any(|known| known.eq_ignore_ascii_case(&tag)) {
                frameworks.push(tag);
            }
        }
        frameworks.sort();

        Ok(FilterOptions {
            frameworks,
            categories: facets.categories,
            risk_levels: facets.risk_levels,
        })
    }

    async fn list_applicable_controls(
        &self,
        session: &SessionToken,
    ) -> Result<Vec<Control>, Error> {
        let session = self.require_session(session).await?;
        self.non_empty_applicable_controls(&session).await
    }

    async fn get_question(&self, request: GetQuestionRequest) -> Result<QuestionOutcome, Error> {
        let session = self.require_session(&request.session).await?;
        let controls = self.non_empty_applicable_controls(&session).await?;
        let Some(progress) = Progress::at(request.index, controls.len()) else {
            return Ok(QuestionOutcome::Exhausted);
        };
        let Some(control) = controls.into_iter().nth(request.index) else {
            return Ok(QuestionOutcome::Exhausted);
        };

        let response = self
            .responses
            .find(&session.token(), control.id)
            .await
            .map_err(map_response_error)?
            .map(ResponsePayload::from)
            .unwrap_or_default();

        let filters = session.filters();
        let sector = filters.sector_label().to_owned();
        let region = filters.region_label().to_owned();
        let insight = self
            .insights
            .insight_for(&InsightRequest {
                control_name: control.name.clone(),
                category: control.category.clone(),
                risk_level: control.risk_level.clone(),
                sector: sector.clone(),
                region: region.clone(),
            })
            .await;

        Ok(QuestionOutcome::Question(Box::new(QuestionView {
            session: AuditSessionPayload::from(&session),
            index: request.index,
            control,
            progress,
            response,
            insight,
            sector,
            region,
        })))
    }

    async fn summary(&self, session: &SessionToken) -> Result<SummaryView, Error> {
        let session = self.require_session(session).await?;
        let controls = self.applicable_controls(&session).await?;
        let answered = self
            .responses
            .list_answered(&session.token())
            .await
            .map_err(map_response_error)?;

        Ok(SummaryView {
            session: AuditSessionPayload::from(&session),
            summary: AuditSummary::compute(&controls, &answered),
        })
    }

    async fn list_sessions(&self) -> Result<Vec<AuditSessionPayload>, Error> {
        let sessions = self
            .sessions
            .list_recent()
            .await
            .map_err(map_session_error)?;
        Ok(sessions.iter().map(AuditSessionPayload::from).collect())
    }

    async fn compare(
        &self,
        first: &SessionToken,
        second: &SessionToken,
    ) -> Result<ComparisonView, Error> {
        let (Some(first), Some(second)) =
            (self.find_session(first).await?, self.find_session(second).await?)
        else {
            return Err(Error::not_found(COMPARISON_NOT_FOUND));
        };

        let first_answers = self
            .responses
            .list_answered(&first.token())
            .await
            .map_err(map_response_error)?;
        let second_answers = self
            .responses
            .list_answered(&second.token())
            .await
            .map_err(map_response_error)?;

        Ok(ComparisonView {
            first: AuditSessionPayload::from(&first),
            second: AuditSessionPayload::from(&second),
            comparison: SessionComparison::build(&first_answers, &second_answers),
        })
    }
}

#[cfg(test)]
#[path = "audit_session_service_tests.rs"]
mod tests;

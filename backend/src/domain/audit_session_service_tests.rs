//! Tests for the audit session service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::audit::{
    AnsweredControl, AuditFilters, AuditResponse, CatalogueFacets, ControlId, EvidenceFile,
    WILDCARD_PATTERN,
};
use crate::domain::ports::{
    MockAuditResponseRepository, MockAuditSessionRepository, MockControlRepository,
    MockEvidenceFileStore, MockInsightSource,
};

type TestService = AuditSessionService<
    MockAuditSessionRepository,
    MockAuditResponseRepository,
    MockControlRepository,
>;

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[derive(Default)]
struct Mocks {
    sessions: MockAuditSessionRepository,
    responses: MockAuditResponseRepository,
    controls: MockControlRepository,
    evidence: MockEvidenceFileStore,
    insights: MockInsightSource,
}

impl Mocks {
    fn into_service(self) -> TestService {
        AuditSessionService::new(
            AuditServicePorts {
                sessions: Arc::new(self.sessions),
                responses: Arc::new(self.responses),
                controls: Arc::new(self.controls),
                evidence: Arc::new(self.evidence),
                insights: Arc::new(self.insights),
            },
            Arc::new(FixtureClock {
                utc_now: fixture_timestamp(),
            }),
        )
    }

    fn with_session(mut self, session: AuditSession) -> Self {
        self.sessions
            .expect_find()
            .returning(move |_| Ok(Some(session.clone())));
        self
    }

    fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls
            .expect_list_matching()
            .returning(move |_| Ok(controls.clone()));
        self
    }
}

fn control(id: i32, category: &str) -> Control {
    Control {
        id: ControlId::new(id),
        name: format!("Control {id}"),
        category: category.to_owned(),
        framework: "EU AI Law Article 9".to_owned(),
        risk_level: "High".to_owned(),
        question: format!("Is control {id} implemented?"),
    }
}

#[fixture]
fn session() -> AuditSession {
    AuditSession::new(AuditSessionDraft {
        token: SessionToken::generate(),
        name: "Quarterly review".to_owned(),
        filters: AuditFilters {
            framework: "EU AI Act (2023)".to_owned(),
            ..AuditFilters::default()
        },
        framework_pattern: Some("%EU AI Law%".to_owned()),
        created_at: fixture_timestamp(),
    })
}

fn submission(session: &AuditSession, index: usize) -> SubmitAnswerRequest {
    SubmitAnswerRequest {
        session: session.token(),
        index,
        answer: "Yes".to_owned(),
        confidence: None,
        reference_text: "Policy 4.2".to_owned(),
        evidence_notes: "Reviewed by compliance".to_owned(),
        evidence_date: Some("2026-03-01".to_owned()),
        evidence_urls: vec![
            " https://evidence.example/a ".to_owned(),
            String::new(),
            "https://evidence.example/b".to_owned(),
        ],
        evidence_files: Vec::new(),
    }
}

fn answered(response_id: i32, control: &Control, session: &AuditSession, answer: &str) -> AnsweredControl {
    AnsweredControl {
        control: control.clone(),
        response: AuditResponse {
            id: ResponseId::new(response_id),
            session: session.token(),
            control_id: control.id,
            answer: answer.to_owned(),
            confidence: 3,
            reference_text: String::new(),
            evidence_notes: String::new(),
            evidence_date: None,
            updated_at: fixture_timestamp(),
        },
    }
}

#[rstest]
#[tokio::test]
async fn start_audit_resolves_framework_and_defaults_name() {
    let mut mocks = Mocks::default();
    mocks
        .sessions
        .expect_insert()
        .withf(|session| {
            session.name() == "Audit 2026-03-14"
                && session.framework_pattern() == Some("%EU AI Law%")
                && session.created_at() == fixture_timestamp()
        })
        .times(1)
        .return_once(|_| Ok(()));

    let response = mocks
        .into_service()
        .start_audit(StartAuditRequest {
            name: String::new(),
            filters: AuditFilters {
                framework: "EU AI Act (2023)".to_owned(),
                ..AuditFilters::default()
            },
        })
        .await
        .expect("session starts");

    assert!(!response.session.as_uuid().is_nil());
}

#[rstest]
#[tokio::test]
async fn start_audit_maps_connection_error_to_service_unavailable() {
    let mut mocks = Mocks::default();
    mocks
        .sessions
        .expect_insert()
        .return_once(|_| Err(AuditSessionRepositoryError::connection("pool closed")));

    let error = mocks
        .into_service()
        .start_audit(StartAuditRequest::default())
        .await
        .expect_err("storage failure");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn get_question_reports_missing_session() {
    let mut mocks = Mocks::default();
    mocks.sessions.expect_find().return_once(|_| Ok(None));

    let error = mocks
        .into_service()
        .get_question(GetQuestionRequest {
            session: SessionToken::generate(),
            index: 0,
        })
        .await
        .expect_err("missing session");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), SESSION_NOT_FOUND);
}

#[rstest]
#[tokio::test]
async fn get_question_returns_default_response_with_progress_and_insight(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance"), control(2, "Data")]);
    mocks
        .responses
        .expect_find()
        .withf(|_, control_id| *control_id == ControlId::new(2))
        .times(1)
        .return_once(|_, _| Ok(None));
    mocks
        .insights
        .expect_insight_for()
        .withf(|request| request.sector == "General" && request.region == "Global")
        .return_const(Some("Review data lineage.".to_owned()));

    let outcome = mocks
        .into_service()
        .get_question(GetQuestionRequest {
            session: session.token(),
            index: 1,
        })
        .await
        .expect("question loads");

    let QuestionOutcome::Question(view) = outcome else {
        panic!("expected a question");
    };
    assert_eq!(view.control.id, ControlId::new(2));
    assert_eq!(view.progress.current, 2);
    assert_eq!(view.progress.percentage, 100);
    assert!(!view.progress.has_next);
    assert_eq!(view.response, ResponsePayload::default());
    assert_eq!(view.response.confidence, 3);
    assert_eq!(view.insight.as_deref(), Some("Review data lineage."));
}

#[rstest]
#[tokio::test]
async fn get_question_past_last_control_is_exhausted(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance"), control(2, "Data"), control(3, "Data")]);
    mocks.responses.expect_find().times(0);

    let outcome = mocks
        .into_service()
        .get_question(GetQuestionRequest {
            session: session.token(),
            index: 5,
        })
        .await
        .expect("outcome");

    assert_eq!(outcome, QuestionOutcome::Exhausted);
}

#[rstest]
#[tokio::test]
async fn applicable_controls_relax_to_wildcard_when_nothing_matches(session: AuditSession) {
    let mut mocks = Mocks::default().with_session(session.clone());
    mocks
        .controls
        .expect_list_matching()
        .withf(|filter| filter.framework_pattern() == Some("%EU AI Law%"))
        .times(1)
        .return_once(|_| Ok(Vec::new()));
    mocks
        .controls
        .expect_list_matching()
        .withf(|filter| {
            filter.framework_pattern() == Some(WILDCARD_PATTERN)
                && filter.category().is_none()
                && filter.risk_level().is_none()
        })
        .times(1)
        .return_once(|_| Ok(vec![control(7, "Security")]));

    let controls = mocks
        .into_service()
        .list_applicable_controls(&session.token())
        .await
        .expect("relaxed controls");

    assert_eq!(controls.len(), 1);
    assert_eq!(controls[0].id, ControlId::new(7));
}

#[rstest]
#[tokio::test]
async fn empty_catalogue_is_a_user_facing_error(session: AuditSession) {
    let mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(Vec::new());

    let error = mocks
        .into_service()
        .get_question(GetQuestionRequest {
            session: session.token(),
            index: 0,
        })
        .await
        .expect_err("no controls");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(error.message(), NO_MATCHING_CONTROLS);
}

#[rstest]
#[tokio::test]
async fn submit_answer_upserts_normalised_values_and_advances(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance"), control(2, "Data")]);
    let token = session.token();
    mocks
        .responses
        .expect_upsert()
        .withf(move |upsert| {
            upsert.session == token
                && upsert.control_id == ControlId::new(1)
                && upsert.confidence == 3
                && upsert.evidence_urls
                    == vec!["https://evidence.example/a", "https://evidence.example/b"]
                && upsert.evidence_date.map(|date| date.to_string()).as_deref()
                    == Some("2026-03-01")
                && upsert.updated_at == fixture_timestamp()
        })
        .times(1)
        .return_once(|_| Ok(ResponseId::new(11)));
    mocks.evidence.expect_store().times(0);

    let outcome = mocks
        .into_service()
        .submit_answer(submission(&session, 0))
        .await
        .expect("answer recorded");

    assert_eq!(outcome, SubmitAnswerOutcome::Next { index: 1 });
}

#[rstest]
#[tokio::test]
async fn submit_answer_on_last_control_routes_to_summary(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance"), control(2, "Data")]);
    mocks
        .responses
        .expect_upsert()
        .times(1)
        .return_once(|_| Ok(ResponseId::new(12)));

    let outcome = mocks
        .into_service()
        .submit_answer(submission(&session, 1))
        .await
        .expect("answer recorded");

    assert_eq!(outcome, SubmitAnswerOutcome::Summary);
}

#[rstest]
#[tokio::test]
async fn submit_answer_out_of_range_writes_nothing(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance")]);
    mocks.responses.expect_upsert().times(0);

    let outcome = mocks
        .into_service()
        .submit_answer(submission(&session, 4))
        .await
        .expect("routed to summary");

    assert_eq!(outcome, SubmitAnswerOutcome::Summary);
}

#[rstest]
#[tokio::test]
async fn submit_answer_rejects_malformed_evidence_date(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance")]);
    mocks.responses.expect_upsert().times(0);
    let mut request = submission(&session, 0);
    request.evidence_date = Some("14/03/2026".to_owned());

    let error = mocks
        .into_service()
        .submit_answer(request)
        .await
        .expect_err("invalid date");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn submit_answer_stores_only_accepted_evidence_files(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance")]);
    mocks
        .responses
        .expect_upsert()
        .return_once(|_| Ok(ResponseId::new(7)));
    mocks
        .evidence
        .expect_store()
        .withf(|response_id, uploads| {
            *response_id == ResponseId::new(7)
                && uploads.len() == 1
                && uploads[0].filename == "policy.pdf"
        })
        .times(1)
        .return_once(|response_id, uploads| {
            Ok(uploads
                .into_iter()
                .map(|upload| EvidenceFile {
                    file_path: format!("response_{response_id}/stored.pdf"),
                    filename: upload.filename,
                    uploaded_at: fixture_timestamp(),
                })
                .collect())
        });
    mocks
        .responses
        .expect_attach_files()
        .withf(|response_id, files| *response_id == ResponseId::new(7) && files.len() == 1)
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut request = submission(&session, 0);
    request.evidence_files = vec![
        EvidenceUpload {
            filename: "policy.pdf".to_owned(),
            bytes: b"%PDF-1.7".to_vec(),
        },
        EvidenceUpload {
            filename: "macro.exe".to_owned(),
            bytes: vec![0x4d, 0x5a],
        },
        EvidenceUpload {
            filename: String::new(),
            bytes: Vec::new(),
        },
    ];

    let outcome = mocks
        .into_service()
        .submit_answer(request)
        .await
        .expect("answer recorded");

    assert_eq!(outcome, SubmitAnswerOutcome::Summary);
}

#[rstest]
#[tokio::test]
async fn failed_attach_discards_stored_evidence(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance")]);
    mocks
        .responses
        .expect_upsert()
        .return_once(|_| Ok(ResponseId::new(4)));
    mocks.evidence.expect_store().return_once(|_, _| {
        Ok(vec![EvidenceFile {
            file_path: "response_4/stored.pdf".to_owned(),
            filename: "policy.pdf".to_owned(),
            uploaded_at: fixture_timestamp(),
        }])
    });
    mocks
        .responses
        .expect_attach_files()
        .return_once(|_, _| Err(AuditResponseRepositoryError::query("disk full")));
    mocks
        .evidence
        .expect_discard()
        .withf(|files| files.len() == 1 && files[0].file_path == "response_4/stored.pdf")
        .times(1)
        .return_once(|_| Ok(()));
    let mut request = submission(&session, 0);
    request.evidence_files = vec![EvidenceUpload {
        filename: "policy.pdf".to_owned(),
        bytes: b"%PDF-1.7".to_vec(),
    }];

    let error = mocks
        .into_service()
        .submit_answer(request)
        .await
        .expect_err("attach failure surfaces");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn submit_answer_maps_query_error_to_internal(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![control(1, "Governance")]);
    mocks
        .responses
        .expect_upsert()
        .return_once(|_| Err(AuditResponseRepositoryError::query("constraint failed")));

    let error = mocks
        .into_service()
        .submit_answer(submission(&session, 0))
        .await
        .expect_err("storage failure");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn summary_scores_applicable_controls(session: AuditSession) {
    let governance = control(1, "Governance");
    let data = control(2, "Data");
    let security = control(3, "Security");
    let responses = vec![
        answered(1, &governance, &session, "Yes"),
        answered(2, &data, &session, "Yes"),
        answered(3, &security, &session, "No"),
    ];
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(vec![governance, data, security]);
    mocks
        .responses
        .expect_list_answered()
        .return_once(move |_| Ok(responses));

    let view = mocks
        .into_service()
        .summary(&session.token())
        .await
        .expect("summary");

    assert_eq!(view.summary.completion_percentage, 100);
    assert_eq!(view.summary.compliance_percentage, 66);
    assert_eq!(view.session.name, "Quarterly review");
}

#[rstest]
#[tokio::test]
async fn summary_tolerates_empty_catalogue(session: AuditSession) {
    let mut mocks = Mocks::default()
        .with_session(session.clone())
        .with_controls(Vec::new());
    mocks
        .responses
        .expect_list_answered()
        .return_once(|_| Ok(Vec::new()));

    let view = mocks
        .into_service()
        .summary(&session.token())
        .await
        .expect("summary");

    assert_eq!(view.summary.total, 0);
    assert_eq!(view.summary.completion_percentage, 0);
}

#[rstest]
#[tokio::test]
async fn compare_requires_both_sessions(session: AuditSession) {
    let known = session.token();
    let mut mocks = Mocks::default();
    mocks.sessions.expect_find().returning(move |token| {
        Ok((*token == known).then(|| session.clone()))
    });

    let error = mocks
        .into_service()
        .compare(&known, &SessionToken::generate())
        .await
        .expect_err("second session missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn filter_options_merge_mapping_labels_with_catalogue_tags() {
    let mut mocks = Mocks::default();
    mocks.controls.expect_facets().return_once(|| {
        Ok(CatalogueFacets {
            frameworks: vec!["Acme Internal".to_owned(), "nist ai rmf".to_owned()],
            categories: vec!["Data".to_owned(), "Governance".to_owned()],
            risk_levels: vec!["High".to_owned()],
        })
    });

    let options = mocks
        .into_service()
        .with_framework_mapping(FrameworkMapping::new([("NIST AI RMF", "%NIST%")]))
        .filter_options()
        .await
        .expect("options");

    assert_eq!(options.frameworks, vec!["Acme Internal", "NIST AI RMF"]);
    assert_eq!(options.categories, vec!["Data", "Governance"]);
}

#[rstest]
#[tokio::test]
async fn create_demo_session_is_idempotent() {
    let mut mocks = Mocks::default();
    mocks.sessions.expect_find().times(0);
    mocks.sessions.expect_insert().times(0);
    mocks
        .sessions
        .expect_insert_if_absent()
        .times(1)
        .return_once(|_| Ok(false));
    mocks.responses.expect_upsert().times(0);

    let response = mocks
        .into_service()
        .create_demo_session()
        .await
        .expect("demo session");

    assert!(!response.created);
    assert_eq!(response.session, demo_session_token());
}

#[rstest]
#[tokio::test]
async fn create_demo_session_prefills_first_three_controls() {
    let mut mocks = Mocks::default().with_controls(vec![
        control(1, "Governance"),
        control(2, "Data"),
        control(3, "Monitoring"),
        control(4, "Security"),
    ]);
    mocks
        .sessions
        .expect_insert_if_absent()
        .withf(|session| {
            session.token() == demo_session_token()
                && session.filters().sector == "Technology"
                && session.filters().region == "United States"
        })
        .times(1)
        .return_once(|_| Ok(true));
    mocks
        .responses
        .expect_upsert()
        .withf(|upsert| upsert.control_id.get() <= 3 && upsert.evidence_date.is_some())
        .times(3)
        .returning(|upsert| Ok(ResponseId::new(upsert.control_id.get())));

    let response = mocks
        .into_service()
        .create_demo_session()
        .await
        .expect("demo session");

    assert!(response.created);
}

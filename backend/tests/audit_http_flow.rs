//! End-to-end questionnaire flow over the real service, SQLite and evidence
//! store.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::Value;
use tempfile::TempDir;

use audit_backend::domain::ports::ControlRepository;
use audit_backend::domain::{AppMode, AuditServicePorts, AuditSessionService};
use audit_backend::inbound::http::audits::{
    compare_audits, index_page, list_audits, page_path_config, question, start_audit, submit_answer,
    summary,
};
use audit_backend::inbound::http::state::{HttpState, HttpStatePorts};
use audit_backend::outbound::evidence::open_evidence_store;
use audit_backend::outbound::insight::CannedInsightSource;
use audit_backend::outbound::persistence::{
    DieselAuditResponseRepository, DieselAuditSessionRepository, DieselControlRepository,
};
use audit_backend::test_support::cap_fs::path_exists;
use audit_backend::test_support::catalogue::eu_ai_act_scenario;
use audit_backend::test_support::sqlite::TempDatabase;

const BOUNDARY: &str = "----audit-flow-boundary";

struct Harness {
    db: TempDatabase,
    evidence_dir: TempDir,
}

impl Harness {
    async fn new() -> Self {
        let db = TempDatabase::new().await;
        DieselControlRepository::new(db.pool.clone())
            .seed_if_empty(&eu_ai_act_scenario())
            .await
            .expect("seed controls");
        Self {
            db,
            evidence_dir: tempfile::tempdir().expect("evidence dir"),
        }
    }

    fn state(&self, mode: AppMode) -> web::Data<HttpState> {
        let clock = Arc::new(DefaultClock);
        let evidence =
            open_evidence_store(self.evidence_dir.path(), clock.clone()).expect("evidence store");
        let service = Arc::new(AuditSessionService::new(
            AuditServicePorts {
                sessions: Arc::new(DieselAuditSessionRepository::new(self.db.pool.clone())),
                responses: Arc::new(DieselAuditResponseRepository::new(self.db.pool.clone())),
                controls: Arc::new(DieselControlRepository::new(self.db.pool.clone())),
                evidence: Arc::new(evidence),
                insights: Arc::new(CannedInsightSource),
            },
            clock,
        ));
        web::Data::new(HttpState::new(
            HttpStatePorts {
                audit_commands: service.clone(),
                audit_queries: service,
            },
            mode,
        ))
    }
}

fn multipart(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> test::TestRequest {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"evidence_files[]\"; \
                 filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    test::TestRequest::post()
        .uri(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn location<B>(response: &ServiceResponse<B>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("redirect location")
        .to_owned()
}

macro_rules! get_json {
    ($app:expr, $uri:expr) => {{
        let uri: &str = $uri;
        let response = test::call_service($app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        let body: Value = test::read_body_json(response).await;
        body
    }};
}

macro_rules! audit_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state)
                .app_data(page_path_config())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_name("session".to_owned())
                        .cookie_secure(false)
                        .build(),
                )
                .service(index_page)
                .service(start_audit)
                .service(compare_audits)
                .service(question)
                .service(submit_answer)
                .service(summary)
                .service(list_audits),
        )
        .await
    };
}

#[actix_web::test]
async fn eu_ai_act_questionnaire_runs_to_summary() {
    let harness = Harness::new().await;
    let app = audit_app!(harness.state(AppMode::Live));

    let started = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/start-audit")
            .set_form([
                ("session_name", "EU readiness"),
                ("framework_filter", "EU AI Act (2023)"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(started.status(), StatusCode::SEE_OTHER);
    let first_question = location(&started);
    let base = first_question
        .strip_suffix("/question/0")
        .expect("redirect to first question")
        .to_owned();

    let view = get_json!(&app, &first_question);
    assert_eq!(view["question"]["control"]["id"], 1);
    assert_eq!(view["question"]["progress"]["total"], 3);
    assert_eq!(view["question"]["response"]["confidence"], 3);

    let answers = ["Yes", "No", "Yes"];
    for (index, answer) in answers.iter().enumerate() {
        let file = (index == 0).then_some(("policy.pdf", b"%PDF-1.7".as_slice()));
        let submitted = test::call_service(
            &app,
            multipart(
                &format!("{base}/question/{index}/submit"),
                &[
                    ("response", answer),
                    ("response_score", "4"),
                    ("evidence_urls[]", "https://example.org/evidence"),
                ],
                file,
            )
            .to_request(),
        )
        .await;
        assert_eq!(submitted.status(), StatusCode::SEE_OTHER);
        let expected = if index + 1 < answers.len() {
            format!("{base}/question/{}", index + 1)
        } else {
            format!("{base}/summary")
        };
        assert_eq!(location(&submitted), expected);
    }

    let revisited = get_json!(&app, &first_question);
    assert_eq!(revisited["question"]["response"]["answer"], "Yes");
    assert_eq!(revisited["question"]["response"]["confidence"], 4);
    let files = revisited["question"]["response"]["evidenceFiles"]
        .as_array()
        .expect("evidence files");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "policy.pdf");
    let stored_path = files[0]["filePath"].as_str().expect("stored path");
    assert!(path_exists(&harness.evidence_dir.path().join(stored_path)));

    let scored = get_json!(&app, &format!("{base}/summary"));
    assert_eq!(scored["summary"]["summary"]["total"], 3);
    assert_eq!(scored["summary"]["summary"]["completionPercentage"], 100);
    assert_eq!(scored["summary"]["summary"]["compliancePercentage"], 66);
}

#[actix_web::test]
async fn question_past_the_end_redirects_to_summary() {
    let harness = Harness::new().await;
    let app = audit_app!(harness.state(AppMode::Live));

    let started = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/start-audit")
            .set_form([("framework_filter", "EU AI Act (2023)")])
            .to_request(),
    )
    .await;
    let base = location(&started)
        .strip_suffix("/question/0")
        .expect("redirect to first question")
        .to_owned();

    let response = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("{base}/question/5"))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("{base}/summary"));
}

#[actix_web::test]
async fn demo_mode_saves_answers_without_files() {
    let harness = Harness::new().await;
    let app = audit_app!(harness.state(AppMode::Demo));

    let started = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/start-audit")
            .set_form([("framework_filter", "EU AI Act (2023)")])
            .to_request(),
    )
    .await;
    let first_question = location(&started);
    let base = first_question
        .strip_suffix("/question/0")
        .expect("redirect to first question")
        .to_owned();

    let submitted = test::call_service(
        &app,
        multipart(
            &format!("{base}/question/0/submit"),
            &[("response", "Partial")],
            Some(("scan.png", b"\x89PNG")),
        )
        .to_request(),
    )
    .await;
    assert_eq!(submitted.status(), StatusCode::SEE_OTHER);

    let view = get_json!(&app, &first_question);
    assert_eq!(view["question"]["response"]["answer"], "Partial");
    assert_eq!(
        view["question"]["response"]["evidenceFiles"],
        Value::Array(Vec::new())
    );
}

#[actix_web::test]
async fn sessions_are_listed_and_compared() {
    let harness = Harness::new().await;
    let app = audit_app!(harness.state(AppMode::Live));

    let mut bases = Vec::new();
    for name in ["First", "Second"] {
        let started = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/start-audit")
                .set_form([
                    ("session_name", name),
                    ("framework_filter", "EU AI Act (2023)"),
                ])
                .to_request(),
        )
        .await;
        bases.push(
            location(&started)
                .strip_suffix("/question/0")
                .expect("redirect to first question")
                .to_owned(),
        );
    }

    let listed = get_json!(&app, "/audits");
    assert_eq!(listed["sessions"].as_array().map(Vec::len), Some(2));

    let tokens: Vec<&str> = bases
        .iter()
        .map(|base| base.trim_start_matches("/audit/"))
        .collect();
    let compared = get_json!(&app, &format!("/audit/compare/{}/{}", tokens[0], tokens[1]));
    assert_eq!(compared["comparison"]["first"]["name"], "First");
    assert_eq!(compared["comparison"]["second"]["name"], "Second");
}

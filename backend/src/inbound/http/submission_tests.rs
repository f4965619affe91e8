//! Tests for multipart answer parsing.

use std::sync::{Arc, Mutex};

use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test as actix_test, web};
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;

pub(crate) const BOUNDARY: &str = "----audit-form-boundary";

/// One multipart part: `(name, filename, body)`.
pub(crate) type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub(crate) fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(crate) fn multipart_request(uri: &str, parts: &[Part<'_>]) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri(uri)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(multipart_body(parts))
}

async fn parse(parts: &[Part<'_>]) -> Result<SubmissionForm, Error> {
    parse_with(parts, SubmissionLimits::default(), UploadPolicy::Keep).await
}

async fn parse_with(
    parts: &[Part<'_>],
    limits: SubmissionLimits,
    uploads: UploadPolicy,
) -> Result<SubmissionForm, Error> {
    let slot: Arc<Mutex<Option<Result<SubmissionForm, Error>>>> = Arc::default();
    let handler_slot = Arc::clone(&slot);
    let app = actix_test::init_service(App::new().route(
        "/submit",
        web::post().to(move |payload: Multipart| {
            let slot = Arc::clone(&handler_slot);
            async move {
                let parsed = read_submission(payload, limits, uploads).await;
                *slot.lock().expect("result slot lock") = Some(parsed);
                HttpResponse::Ok().finish()
            }
        }),
    ))
    .await;

    let response =
        actix_test::call_service(&app, multipart_request("/submit", parts).to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);
    slot.lock()
        .expect("result slot lock")
        .take()
        .expect("handler reported a parse result")
}

#[actix_web::test]
async fn collects_text_fields_urls_and_files() {
    let form = parse(&[
        ("response", None, b"Yes"),
        ("confidence", None, b"2"),
        ("response_score", None, b"5"),
        ("reference_text", None, b"Policy 4.2"),
        ("evidence_notes", None, b"Reviewed quarterly"),
        ("evidence_date", None, b"2026-01-31"),
        ("evidence_urls[]", None, b"https://example.org/a"),
        ("evidence_urls[]", None, b"https://example.org/b"),
        ("evidence_files[]", Some("policy.pdf"), b"%PDF-1.7"),
        ("unexpected", None, b"ignored"),
    ])
    .await
    .expect("form parses");

    assert_eq!(form.answer, "Yes");
    assert_eq!(form.reference_text, "Policy 4.2");
    assert_eq!(form.evidence_notes, "Reviewed quarterly");
    assert_eq!(form.evidence_date.as_deref(), Some("2026-01-31"));
    assert_eq!(
        form.evidence_urls,
        vec!["https://example.org/a", "https://example.org/b"]
    );
    assert_eq!(
        form.evidence_files,
        vec![EvidenceUpload {
            filename: "policy.pdf".to_owned(),
            bytes: b"%PDF-1.7".to_vec(),
        }]
    );

    let request = form.into_request(SessionToken::generate(), 1);
    assert_eq!(request.confidence.as_deref(), Some("5"));
    assert_eq!(request.index, 1);
}

#[actix_web::test]
async fn skips_empty_file_inputs() {
    let form = parse(&[
        ("response", None, b"No"),
        ("evidence_files[]", Some(""), b""),
    ])
    .await
    .expect("form parses");

    assert!(form.evidence_files.is_empty());
    assert_eq!(form.confidence, None);
}

#[actix_web::test]
async fn rejects_oversized_text_fields() {
    let notes = vec![b'n'; SubmissionLimits::default().text_field_bytes + 1];

    let error = parse(&[("evidence_notes", None, &notes)])
        .await
        .expect_err("oversized field rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[actix_web::test]
async fn rejects_non_utf8_text() {
    let error = parse(&[("response", None, &[0xff_u8, 0xfe])])
        .await
        .expect_err("invalid UTF-8 rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "response must be UTF-8 text");
}

fn small_limits() -> SubmissionLimits {
    SubmissionLimits {
        text_field_bytes: 64,
        file_bytes: 1024,
        max_files: 2,
        total_bytes: 2048,
    }
}

#[actix_web::test]
async fn rejects_more_files_than_allowed() {
    let error = parse_with(
        &[
            ("evidence_files[]", Some("a.pdf"), b"a"),
            ("evidence_files[]", Some("b.pdf"), b"b"),
            ("evidence_files[]", Some("c.pdf"), b"c"),
        ],
        small_limits(),
        UploadPolicy::Keep,
    )
    .await
    .expect_err("third file rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        error.message(),
        "At most 2 evidence files can be uploaded at once"
    );
}

#[actix_web::test]
async fn rejects_forms_over_the_total_budget() {
    let chunk = vec![b'x'; 900];

    let error = parse_with(
        &[
            ("evidence_files[]", Some("a.pdf"), &chunk),
            ("evidence_files[]", Some("b.pdf"), &chunk),
            ("evidence_notes", None, &chunk[..60]),
            ("ignored_file", Some("c.pdf"), &chunk),
        ],
        small_limits(),
        UploadPolicy::Keep,
    )
    .await
    .expect_err("aggregate size rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "The submission exceeds the 2048 byte limit");
}

#[actix_web::test]
async fn rejects_files_over_the_per_file_limit() {
    let body = vec![b'x'; 1025];

    let error = parse_with(
        &[("evidence_files[]", Some("big.pdf"), &body)],
        small_limits(),
        UploadPolicy::Keep,
    )
    .await
    .expect_err("oversized file rejected");

    assert_eq!(error.message(), "evidence_files[] exceeds the 1024 byte limit");
}

#[rstest]
#[case(false)]
#[case(true)]
#[actix_web::test]
async fn discarding_drains_files_without_keeping_them(#[case] with_file: bool) {
    let mut parts: Vec<Part<'_>> = vec![
        ("response", None, b"Yes".as_slice()),
        ("evidence_files[]", Some(""), b"".as_slice()),
    ];
    if with_file {
        parts.push(("evidence_files[]", Some("scan.png"), b"png".as_slice()));
    }

    let form = parse_with(&parts, small_limits(), UploadPolicy::Discard)
        .await
        .expect("form parses");

    assert_eq!(form.answer, "Yes");
    assert!(form.evidence_files.is_empty());
    assert_eq!(form.uploads_discarded, with_file);
}

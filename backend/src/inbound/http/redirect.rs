//! Page-flow redirects.

use actix_web::HttpResponse;
use actix_web::http::header;

use crate::domain::audit::SessionToken;

/// `303 See Other` to `location`.
pub fn see_other(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub fn home() -> HttpResponse {
    see_other("/")
}

pub fn question_path(session: &SessionToken, index: usize) -> String {
    format!("/audit/{session}/question/{index}")
}

pub fn summary_path(session: &SessionToken) -> String {
    format!("/audit/{session}/summary")
}

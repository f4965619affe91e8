//! Shared helpers for page-flow handler tests.
//!
//! Page handlers answer with `303 See Other` and carry flashes in the cookie
//! session, so most assertions need the redirect target and the session
//! cookie to replay on the follow-up request.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;

/// Cookie name shared by the production and test session middleware.
pub const SESSION_COOKIE: &str = "session";

/// Cookie session middleware with a per-test key, served over plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Redirect target of a page response, if any.
pub fn location<B>(response: &ServiceResponse<B>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

/// Session cookie set by `response`, owned so it can be replayed.
///
/// # Panics
///
/// Panics when the response did not write the session.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .expect("session cookie set")
        .into_owned()
}

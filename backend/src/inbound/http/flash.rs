//! One-shot flash messages carried in the cookie session.
//!
//! Page handlers never surface a raw failure: they push a flash message and
//! redirect, and the next page view drains the queue.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::domain::Error;

const FLASH_KEY: &str = "_flashes";

/// Flash shown in place of internal or storage failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Info,
    Warning,
    Error,
}

/// A message queued for the next page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Session-backed flash queue extracted per request.
#[derive(Clone)]
pub struct FlashMessages(Session);

impl FlashMessages {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Queue a message. Session write failures are logged and dropped.
    pub fn push(&self, level: FlashLevel, message: impl Into<String>) {
        let mut queued = self.peek();
        queued.push(FlashMessage {
            level,
            message: message.into(),
        });
        if let Err(err) = self.0.insert(FLASH_KEY, &queued) {
            warn!(error = %err, "failed to queue flash message");
        }
    }

    /// Queue the user-facing text for `error`, logging faults.
    pub fn push_error(&self, error: &Error) {
        if error.is_fault() {
            error!(
                code = ?error.code(),
                message = error.message(),
                trace_id = error.trace_id().unwrap_or_default(),
                "audit request failed"
            );
            self.push(FlashLevel::Error, GENERIC_FAILURE_MESSAGE);
        } else {
            self.push(FlashLevel::Warning, error.message());
        }
    }

    /// Drain every queued message.
    pub fn take(&self) -> Vec<FlashMessage> {
        self.0
            .remove_as::<Vec<FlashMessage>>(FLASH_KEY)
            .and_then(Result::ok)
            .unwrap_or_default()
    }

    fn peek(&self) -> Vec<FlashMessage> {
        match self.0.get::<Vec<FlashMessage>>(FLASH_KEY) {
            Ok(queued) => queued.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "discarding unreadable flash messages");
                Vec::new()
            }
        }
    }
}

impl FromRequest for FlashMessages {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(FlashMessages::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    #[actix_web::test]
    async fn queued_messages_are_drained_once() {
        let app = test::init_service(
            App::new()
                .wrap(test_session_middleware())
                .route(
                    "/queue",
                    web::get().to(|flash: FlashMessages| async move {
                        flash.push(FlashLevel::Info, "saved");
                        flash.push_error(&Error::internal("disk full"));
                        HttpResponse::Ok().finish()
                    }),
                )
                .route(
                    "/drain",
                    web::get().to(|flash: FlashMessages| async move {
                        HttpResponse::Ok().json(flash.take())
                    }),
                ),
        )
        .await;

        let queued =
            test::call_service(&app, test::TestRequest::get().uri("/queue").to_request()).await;
        assert_eq!(queued.status(), StatusCode::OK);
        let cookie = session_cookie(&queued);

        let drained = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/drain")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let messages: Vec<FlashMessage> = test::read_body_json(drained).await;

        assert_eq!(
            messages,
            vec![
                FlashMessage {
                    level: FlashLevel::Info,
                    message: "saved".to_owned(),
                },
                FlashMessage {
                    level: FlashLevel::Error,
                    message: GENERIC_FAILURE_MESSAGE.to_owned(),
                },
            ]
        );
    }

    #[actix_web::test]
    async fn user_facing_errors_keep_their_message() {
        let app = test::init_service(App::new().wrap(test_session_middleware()).route(
            "/",
            web::get().to(|flash: FlashMessages| async move {
                flash.push_error(&Error::not_found("Audit session not found"));
                HttpResponse::Ok().json(flash.take())
            }),
        ))
        .await;

        let response = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let messages: Vec<FlashMessage> = test::read_body_json(response).await;

        assert_eq!(messages[0].level, FlashLevel::Warning);
        assert_eq!(messages[0].message, "Audit session not found");
    }
}

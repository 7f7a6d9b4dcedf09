use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};

use korak_core::error::{KorakError, Result};

use super::event::{locale_of, UserCreated, WebhookEvent, USER_CREATED};
use crate::app_state::AppState;
use crate::email::template::{render_welcome, WELCOME_TEMPLATE};
use crate::email::{EmailError, OutboundEmail};

/// Terminal result of one webhook call.
#[derive(Debug)]
pub enum Outcome {
    /// Welcome email accepted by the provider; carries its payload.
    Sent(Value),
    /// Provider reported a failure.
    EmailFailed(EmailError),
    /// Event type is not handled.
    Rejected,
    /// Anything unexpected (malformed payload, metric misuse, ...).
    Failed(KorakError),
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Sent(payload) => (StatusCode::OK, Json(payload)).into_response(),
            Outcome::EmailFailed(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err }))).into_response()
            }
            Outcome::Rejected => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid event type" }))).into_response()
            }
            Outcome::Failed(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}

/// `POST /api/clerk/webhook`
///
/// Never fails at the HTTP layer: every error becomes a JSON response.
pub async fn clerk_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let outcome = match handle_event(&state, &body).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, code = e.client_code().as_str(), "webhook handling failed");
            Outcome::Failed(e)
        }
    };
    outcome.into_response()
}

/// Decode the envelope and route by event type.
pub async fn handle_event(state: &AppState, body: &[u8]) -> Result<Outcome> {
    let body: Value = serde_json::from_slice(body)
        .map_err(|e| KorakError::BadRequest(format!("webhook body is not valid json: {e}")))?;
    let event = WebhookEvent::from_json(body);

    match event.event_type.as_deref() {
        Some(USER_CREATED) => on_user_created(state, &event.data).await,
        other => {
            tracing::info!(event_type = other.unwrap_or("<missing>"), "ignoring webhook event");
            Ok(Outcome::Rejected)
        }
    }
}

async fn on_user_created(state: &AppState, data: &Value) -> Result<Outcome> {
    let metrics = state.metrics();
    let cfg = state.cfg();

    let locale = locale_of(data).unwrap_or(cfg.metrics.fallback_locale.as_str());
    metrics.user_signups.labels(&[("locale", locale)])?.inc();

    let template = [("template", WELCOME_TEMPLATE)];
    let timer = metrics.email_duration.start_timer(&template)?;

    let user: UserCreated = serde_json::from_value(data.clone())
        .map_err(|e| KorakError::BadRequest(format!("invalid user.created payload: {e}")))?;
    let recipient = user
        .recipient()
        .ok_or_else(|| KorakError::BadRequest("user.created payload has no email address".into()))?;

    let content = render_welcome(user.first_name.as_deref(), locale);
    let email = OutboundEmail {
        from: cfg.email.from.clone(),
        to: vec![recipient.to_string()],
        subject: cfg.email.welcome_subject.clone(),
        html: content.html,
        text: content.text,
    };
    let sent = state.email().send(&email).await;
    let elapsed_s = timer.stop();

    match sent {
        Ok(payload) => {
            metrics.emails_sent.labels(&template)?.inc();
            tracing::info!(locale, elapsed_s, "welcome email sent");
            Ok(Outcome::Sent(payload))
        }
        Err(err) => {
            metrics.email_errors.labels(&template)?.inc();
            tracing::warn!(locale, elapsed_s, error = %err, "welcome email failed");
            Ok(Outcome::EmailFailed(err))
        }
    }
}

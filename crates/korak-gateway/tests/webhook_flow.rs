#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use korak_core::metrics::Registry;
use korak_gateway::app_state::AppState;
use korak_gateway::config::{GatewayConfig, MetricsSection};
use korak_gateway::email::{EmailError, EmailSender, OutboundEmail};
use korak_gateway::router::build_router;

/// Records every message and answers with a fixed result.
struct RecordingSender {
    calls: Mutex<Vec<OutboundEmail>>,
    fail: bool,
}

impl RecordingSender {
    fn ok() -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), fail: false })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), fail: true })
    }

    fn calls(&self) -> Vec<OutboundEmail> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: &OutboundEmail) -> Result<Value, EmailError> {
        self.calls.lock().unwrap().push(email.clone());
        if self.fail {
            Err(EmailError {
                name: "validation_error".into(),
                message: "Invalid `to` field".into(),
                status_code: Some(422),
            })
        } else {
            Ok(json!({ "id": "email_123" }))
        }
    }
}

fn test_cfg() -> GatewayConfig {
    GatewayConfig {
        metrics: MetricsSection {
            process_metrics: false,
            ..MetricsSection::default()
        },
        ..GatewayConfig::default()
    }
}

fn create_test_app(sender: Arc<RecordingSender>) -> (Router, AppState) {
    let registry = Arc::new(Registry::new());
    let state = AppState::new(test_cfg(), registry, sender).unwrap();
    (build_router(state.clone()), state)
}

fn sample_event() -> Value {
    json!({
        "type": "user.created",
        "data": {
            "email_addresses": [{ "email_address": "a@b.com" }],
            "first_name": "Ana",
            "unsafe_metadata": { "locale": "sl" }
        }
    })
}

async fn post_webhook(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/clerk/webhook")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

const WELCOME: [(&str, &str); 1] = [("template", "welcome")];

#[tokio::test]
async fn user_created_sends_welcome_and_counts_signup() {
    let sender = RecordingSender::ok();
    let (app, state) = create_test_app(Arc::clone(&sender));
    let m = state.metrics();
    assert_eq!(m.user_signups.get(&[("locale", "sl")]), Some(0.0));

    let (status, body) = post_webhook(app, sample_event().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": "email_123" }));

    assert_eq!(m.user_signups.get(&[("locale", "sl")]), Some(1.0));
    assert_eq!(m.user_signups.get(&[("locale", "en")]), Some(0.0));
    assert_eq!(m.emails_sent.get(&WELCOME), Some(1.0));
    assert_eq!(m.email_errors.get(&WELCOME), None);
    assert_eq!(m.email_duration.get_count(&WELCOME), Some(1));

    let calls = sender.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, vec!["a@b.com".to_string()]);
    assert_eq!(calls[0].subject, "Welcome to Slovenščina Korak za Korakom");
    assert!(calls[0].html.contains("Živjo Ana,"));
}

#[tokio::test]
async fn unknown_event_type_is_rejected_without_side_effects() {
    let sender = RecordingSender::ok();
    let (app, state) = create_test_app(Arc::clone(&sender));
    let before = state.metrics().render();

    let (status, body) = post_webhook(app, json!({ "type": "something.else" }).to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid event type" }));
    assert_eq!(state.metrics().render(), before);
    assert!(sender.calls().is_empty());
}

#[tokio::test]
async fn non_string_event_type_is_rejected() {
    let bodies = [
        json!({ "type": 5 }),
        json!({ "type": { "a": 1 }, "data": {} }),
        json!("user.created"),
        json!([]),
    ];
    for event in bodies {
        let sender = RecordingSender::ok();
        let (app, state) = create_test_app(Arc::clone(&sender));
        let before = state.metrics().render();

        let (status, body) = post_webhook(app, event.to_string()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{event}");
        assert_eq!(body, json!({ "error": "Invalid event type" }));
        assert_eq!(state.metrics().render(), before);
        assert!(sender.calls().is_empty());
    }
}

#[tokio::test]
async fn email_failure_counts_error_not_sent() {
    let sender = RecordingSender::failing();
    let (app, state) = create_test_app(Arc::clone(&sender));
    let m = state.metrics();

    let (status, body) = post_webhook(app, sample_event().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["name"], "validation_error");
    assert_eq!(body["error"]["statusCode"], 422);

    assert_eq!(m.email_errors.get(&WELCOME), Some(1.0));
    assert_eq!(m.emails_sent.get(&WELCOME), Some(0.0));
    assert_eq!(m.email_duration.get_count(&WELCOME), Some(1));
    assert_eq!(m.user_signups.get(&[("locale", "sl")]), Some(1.0));
    assert_eq!(sender.calls().len(), 1);
}

#[tokio::test]
async fn missing_locale_uses_fallback() {
    let sender = RecordingSender::ok();
    let (app, state) = create_test_app(Arc::clone(&sender));

    let event = json!({
        "type": "user.created",
        "data": { "email_addresses": [{ "email_address": "a@b.com" }], "first_name": null }
    });
    let (status, _) = post_webhook(app, event.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.metrics().user_signups.get(&[("locale", "en")]), Some(1.0));
    assert!(sender.calls()[0].text.starts_with("Hi there,"));
}

#[tokio::test]
async fn malformed_body_is_a_generic_500() {
    let sender = RecordingSender::ok();
    let (app, state) = create_test_app(Arc::clone(&sender));
    let before = state.metrics().render();

    let (status, body) = post_webhook(app, "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert_eq!(body.as_object().unwrap().len(), 1);
    assert_eq!(state.metrics().render(), before);
    assert!(sender.calls().is_empty());
}

#[tokio::test]
async fn missing_recipient_fails_after_counting_signup() {
    let sender = RecordingSender::ok();
    let (app, state) = create_test_app(Arc::clone(&sender));
    let m = state.metrics();

    let event = json!({
        "type": "user.created",
        "data": { "first_name": "Ana", "unsafe_metadata": { "locale": "it" } }
    });
    let (status, body) = post_webhook(app, event.to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("no email address"));
    assert_eq!(body.as_object().unwrap().len(), 1);
    assert_eq!(m.user_signups.get(&[("locale", "it")]), Some(1.0));
    // The timer runs from before the email is built and records on drop.
    assert_eq!(m.email_duration.get_count(&WELCOME), Some(1));
    assert_eq!(m.emails_sent.get(&WELCOME), Some(0.0));
    assert_eq!(m.email_errors.get(&WELCOME), None);
    assert!(sender.calls().is_empty());
}

#[tokio::test]
async fn metrics_endpoint_serves_exposition() {
    let (app, _state) = create_test_app(RecordingSender::ok());

    let scrape = |app: Router| async move {
        let response = app
            .oneshot(Request::builder().uri("/api/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let ct = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (ct, String::from_utf8(bytes.to_vec()).unwrap())
    };

    let (ct, first) = scrape(app.clone()).await;
    let (_, second) = scrape(app).await;

    assert_eq!(ct, "text/plain; version=0.0.4; charset=utf-8");
    assert!(first.contains("# TYPE user_signups_total counter\n"));
    assert!(first.contains("user_signups_total{locale=\"sl\"} 0\n"));
    assert!(first.contains("bookings_total{status=\"booked\",type=\"individual\"} 0\n"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn rebuilding_state_on_one_registry_shares_metrics() {
    let registry = Arc::new(Registry::new());
    let first = AppState::new(test_cfg(), Arc::clone(&registry), RecordingSender::ok()).unwrap();
    let second = AppState::new(test_cfg(), Arc::clone(&registry), RecordingSender::ok()).unwrap();

    let (status, _) = post_webhook(build_router(second.clone()), sample_event().to_string()).await;
    assert_eq!(status, StatusCode::OK);

    assert!(first.metrics().user_signups.same_as(&second.metrics().user_signups));
    assert_eq!(first.metrics().user_signups.get(&[("locale", "sl")]), Some(1.0));
    assert_eq!(registry.len(), 6);
}

#[tokio::test]
async fn healthz_is_ok() {
    let (app, _state) = create_test_app(RecordingSender::ok());
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

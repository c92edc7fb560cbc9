//! Router-level tests: each case builds a fresh in-memory state with
//! canned providers and drives the assembled router directly.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sauti_api::auth::{AppState, AppStateInner};
use sauti_api::config::Config;
use sauti_api::routes::build_router;
use sauti_api::token::issue_token;
use sauti_db::Database;
use sauti_providers::{ChatCompleter, Messenger};

const JWT_SECRET: &str = "router-test-secret";
const CANNED_REPLY: &str = "You are not alone.";

struct CannedChat;

#[async_trait]
impl ChatCompleter for CannedChat {
    async fn complete_chat(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(CANNED_REPLY.to_string())
    }
}

struct CannedMessenger;

#[async_trait]
impl Messenger for CannedMessenger {
    async fn send_message(&self, _to: &str, _body: &str) -> Result<String> {
        Ok("SM000".to_string())
    }
}

fn test_config(upload_dir: std::path::PathBuf) -> Config {
    Config {
        jwt_secret: JWT_SECRET.to_string(),
        token_ttl_minutes: 60,
        db_path: upload_dir.join("unused.db"),
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir,
        public_base_url: "http://127.0.0.1:8000".to_string(),
        sos_alert_number: None,
        groq_api_key: String::new(),
        groq_model: "canned".to_string(),
        twilio_account_sid: String::new(),
        twilio_auth_token: String::new(),
        twilio_from_number: String::new(),
    }
}

/// Router plus a handle on the state; the TempDir keeps the upload
/// directory alive for the test's duration.
fn make_app() -> (axum::Router, AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        config: test_config(dir.path().to_path_buf()),
        llm: Box::new(CannedChat),
        messenger: Box::new(CannedMessenger),
    });
    (build_router(state.clone(), dir.path()), state, dir)
}

fn post_json(uri: &str, json: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn support_chatbot_answers_with_and_without_trailing_slash() {
    let (app, _state, _dir) = make_app();

    for uri in ["/support-chatbot", "/support-chatbot/"] {
        let resp = app
            .clone()
            .oneshot(post_json(uri, r#"{"message": "hi"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "POST {}", uri);
        let body = json_body(resp).await;
        assert_eq!(body["reply"], CANNED_REPLY);
    }
}

#[tokio::test]
async fn admin_can_put_back_the_user_object_it_fetched() {
    let (app, state, _dir) = make_app();

    let admin = state
        .db
        .create_user("Admin", "admin@example.com", "hash", "admin")
        .unwrap();
    let target = state
        .db
        .create_user("Amina N.", "amina@example.com", "hash", "user")
        .unwrap();
    let token = issue_token(JWT_SECRET, 60, &admin.email).unwrap();

    // The dashboard serializes the fetched user wholesale, id included.
    let payload = format!(
        r#"{{"id": {}, "full_name": "Amina N.", "email": "amina@example.com", "role": "admin"}}"#,
        target.id
    );
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/users/{}", target.id))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["role"], "admin");
    assert_eq!(body["id"], target.id);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let (app, _state, _dir) = make_app();

    let payload = r#"{"full_name": "Amina N.", "email": "amina@example.com", "password": "longenough"}"#;
    let first = app.clone().oneshot(post_json("/register", payload)).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(post_json("/register", payload)).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

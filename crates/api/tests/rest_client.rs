//! Integration test: boots an in-process axum server that stands in for
//! the TripChat backend, points a real [`RestChatClient`] at it and checks
//! the wire contract end to end:
//! - completion request body and bearer header
//! - a completion body split across many TCP writes still decodes in order
//! - 401 on an authenticated call clears stored credentials
//! - 401 on sign-in is reported as bad credentials and clears nothing
//! - 404 maps to `NotFound`
//! - speech upload uses the `audio_file` multipart field

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use tc_api::{
    AudioUpload, ChatApi, CompletionRequest, CreateChatRequest, RestChatClient, SignInRequest,
    SESSION_EXPIRED_NOTICE,
};
use tc_cache::{CredentialStore, MemoryStore};
use tc_domain::config::ApiConfig;
use tc_domain::error::{AuthErrorCode, Error};
use tc_domain::model::User;
use tc_domain::notice::{Notice, Notifier};
use tc_domain::stream::CompletionEvent;

// ── Recording backend ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Captured {
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Default)]
struct Backend {
    requests: Mutex<Vec<Captured>>,
}

impl Backend {
    fn record(&self, path: String, headers: &HeaderMap, body: &[u8]) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        self.requests.lock().unwrap().push(Captured {
            path,
            authorization: header("authorization"),
            content_type: header("content-type"),
            body: body.to_vec(),
        });
    }

    fn last(&self, path: &str) -> Captured {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.path == path)
            .cloned()
            .unwrap_or_else(|| panic!("no request to {path}"))
    }
}

type Shared = Arc<Backend>;

async fn list_chats(State(b): State<Shared>, headers: HeaderMap) -> Json<Value> {
    b.record("/chats/".into(), &headers, &[]);
    Json(json!({
        "chats": [
            { "id": "c1", "title": "Kyoto", "user_id": "u1", "updated_at": "2026-03-01T10:00:00" },
            { "id": "", "title": "broken" },
            { "id": "c2", "title": null, "user_id": null }
        ]
    }))
}

async fn create_chat(State(b): State<Shared>, headers: HeaderMap, body: Bytes) -> Json<Value> {
    b.record("/chats/".into(), &headers, &body);
    Json(json!({ "id": "fresh-1", "title": null, "user_id": "u1" }))
}

async fn get_chat(
    State(b): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    b.record(format!("/chats/{id}"), &headers, &[]);
    match id.as_str() {
        "expired" => (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "token expired" })))
            .into_response(),
        "missing" => (StatusCode::NOT_FOUND, Json(json!({ "detail": "Chat not found" })))
            .into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response(),
        _ => Json(json!({ "id": id, "title": "Trip", "user_id": "u1" })).into_response(),
    }
}

async fn delete_chat(
    State(b): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> StatusCode {
    b.record(format!("DELETE /chats/{id}"), &headers, &[]);
    StatusCode::NO_CONTENT
}

async fn list_messages(
    State(b): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    b.record(format!("/chats/{id}/messages"), &headers, &[]);
    Json(json!({
        "messages": [
            { "id": "m1", "content": "Hello", "sender": "user", "created_at": "2026-03-01T10:00:00Z" },
            { "id": "m2", "content": "Hi there", "sender": "ai", "created_at": "2026-03-01T10:00:02Z" }
        ]
    }))
}

/// Streams a completion in deliberately awkward pieces: one frame split
/// across writes, a multi-byte character cut in half, a malformed frame.
async fn completions(
    State(b): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    b.record(format!("/chats/{id}/completions"), &headers, &body);

    let full = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Day 1: \"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"京都\"}}]}\n\n",
        "data: {not json\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" temples\"}}]}\n\n",
        "data: [DONE]\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
    )
    .as_bytes()
    .to_vec();

    let pieces: Vec<Result<Bytes, std::io::Error>> = full
        .chunks(7)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    let stream = futures_util::stream::iter(pieces).then(|piece| async move {
        tokio::time::sleep(Duration::from_millis(1)).await;
        piece
    });

    Response::builder()
        .header("content-type", "text/event-stream")
        .body(Body::from_stream(stream))
        .unwrap()
}

async fn sign_in(State(b): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    b.record("/auth/signin".into(), &headers, &body);
    let req: Value = serde_json::from_slice(&body).unwrap();
    if req["password"] == "secret" {
        Json(json!({
            "token": "tok-123",
            "user": { "id": "u1", "email": "ana@example.com", "name": "Ana", "is_guest": false }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
            .into_response()
    }
}

async fn sign_up(State(b): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    b.record("/auth/signup".into(), &headers, &body);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "detail": { "code": "USERNAME_ALREADY_EXISTS", "message": "Username ana is taken" }
        })),
    )
        .into_response()
}

async fn speech(State(b): State<Shared>, headers: HeaderMap, body: Bytes) -> Json<Value> {
    b.record("/speech/speech-to-text".into(), &headers, &body);
    Json(json!({ "success": true, "text": "two days in Porto" }))
}

async fn start_backend() -> (SocketAddr, Shared) {
    let backend: Shared = Arc::new(Backend::default());
    let app = Router::new()
        .route("/api/chats/", get(list_chats).post(create_chat))
        .route("/api/chats/:id", get(get_chat).delete(delete_chat))
        .route("/api/chats/:id/messages", get(list_messages))
        .route("/api/chats/:id/completions", post(completions))
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/signup", post(sign_up))
        .route("/api/speech/speech-to-text", post(speech))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

// ── Client side helpers ─────────────────────────────────────────────────

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
    fn alert(&self, _text: &str) {}
}

struct Harness {
    client: RestChatClient,
    credentials: Arc<CredentialStore>,
    notifier: Arc<RecordingNotifier>,
    backend: Shared,
}

fn signed_in_user() -> User {
    User {
        id: "u1".into(),
        email: "ana@example.com".into(),
        name: "Ana".into(),
        avatar: None,
        age: None,
        bio: None,
        is_guest: false,
    }
}

async fn harness(signed_in: bool) -> Harness {
    let (addr, backend) = start_backend().await;
    let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryStore::new())));
    if signed_in {
        credentials.save("tok-123", &signed_in_user()).unwrap();
    }
    let notifier = Arc::new(RecordingNotifier::default());
    let cfg = ApiConfig {
        base_url: format!("http://{addr}/api/"),
        ..ApiConfig::default()
    };
    let client = RestChatClient::new(&cfg, credentials.clone(), notifier.clone()).unwrap();
    Harness {
        client,
        credentials,
        notifier,
        backend,
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn completion_request_and_chunked_stream() {
    let h = harness(true).await;

    let events: Vec<CompletionEvent> = h
        .client
        .stream_completion("c1", CompletionRequest::user_turn("Hello", None))
        .await
        .unwrap()
        .map(|e| e.unwrap())
        .collect()
        .await;

    let req = h.backend.last("/chats/c1/completions");
    let body: Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(
        body,
        json!({ "messages": [{ "role": "user", "content": "Hello" }], "stream": true })
    );
    assert_eq!(req.authorization.as_deref(), Some("Bearer tok-123"));

    let text: String = events
        .iter()
        .filter_map(|e| match e {
            CompletionEvent::Delta { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Day 1: 京都 temples");
    assert!(events
        .iter()
        .any(|e| matches!(e, CompletionEvent::Malformed { .. })));
    assert_eq!(events.last(), Some(&CompletionEvent::Done));
}

#[tokio::test]
async fn anonymous_calls_carry_no_bearer() {
    let h = harness(false).await;
    h.client.list_chats().await.unwrap();
    assert_eq!(h.backend.last("/chats/").authorization, None);
}

#[tokio::test]
async fn list_chats_drops_records_without_id() {
    let h = harness(true).await;
    let chats = h.client.list_chats().await.unwrap();
    let ids: Vec<&str> = chats.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c1", "c2"]);
    assert_eq!(chats[1].user_id, None);
}

#[tokio::test]
async fn create_chat_returns_server_id() {
    let h = harness(true).await;
    let chat = h
        .client
        .create_chat(CreateChatRequest::default())
        .await
        .unwrap();
    assert_eq!(chat.id, "fresh-1");
}

#[tokio::test]
async fn messages_map_legacy_sender() {
    let h = harness(true).await;
    let messages = h.client.list_messages("c1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender, "ai");
    let mapped = messages[1].clone().into_message();
    assert_eq!(mapped.sender, tc_domain::model::Sender::Assistant);
}

#[tokio::test]
async fn unauthorized_clears_credentials() {
    let h = harness(true).await;
    let err = h.client.get_chat("expired").await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(h.credentials.token(), None);
    assert_eq!(h.credentials.user(), None);

    let notices = h.notifier.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].key, Some(SESSION_EXPIRED_NOTICE));
}

#[tokio::test]
async fn not_found_and_server_errors_are_distinct() {
    let h = harness(true).await;

    match h.client.get_chat("missing").await.unwrap_err() {
        Error::NotFound(msg) => assert_eq!(msg, "Chat not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    match h.client.get_chat("boom").await.unwrap_err() {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(h.credentials.token().is_some());
}

#[tokio::test]
async fn delete_chat_hits_resource() {
    let h = harness(true).await;
    h.client.delete_chat("c2").await.unwrap();
    let req = h.backend.last("DELETE /chats/c2");
    assert_eq!(req.authorization.as_deref(), Some("Bearer tok-123"));
}

#[tokio::test]
async fn sign_in_success_and_bad_password() {
    let h = harness(false).await;

    let ok = h
        .client
        .sign_in(SignInRequest {
            email: "ana@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(ok.token, "tok-123");
    assert_eq!(ok.user.into_user().name, "Ana");

    let err = h
        .client
        .sign_in(SignInRequest {
            email: "ana@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    match err {
        Error::Auth { code, message } => {
            assert_eq!(code, AuthErrorCode::InvalidCredentials);
            assert!(message.starts_with("Incorrect email or password"));
        }
        other => panic!("expected auth error, got {other:?}"),
    }
    // Credential checks never trigger the forced logout path.
    assert!(h.notifier.notices.lock().unwrap().is_empty());
}

#[tokio::test]
async fn sign_up_surfaces_structured_code() {
    let h = harness(false).await;
    let err = h
        .client
        .sign_up(tc_api::SignUpRequest {
            email: "ana@example.com".into(),
            password: "secret".into(),
            name: "Ana".into(),
            username: "ana".into(),
        })
        .await
        .unwrap_err();
    match err {
        Error::Auth { code, message } => {
            assert_eq!(code, AuthErrorCode::UsernameAlreadyExists);
            assert_eq!(message, "Username ana is taken");
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn speech_upload_is_multipart() {
    let h = harness(true).await;
    let text = h
        .client
        .speech_to_text(AudioUpload {
            bytes: b"RIFF fake wav".to_vec(),
            file_name: "note.wav".into(),
            mime: "audio/wav".into(),
        })
        .await
        .unwrap();
    assert_eq!(text, "two days in Porto");

    let req = h.backend.last("/speech/speech-to-text");
    assert!(req
        .content_type
        .as_deref()
        .unwrap_or_default()
        .starts_with("multipart/form-data"));
    let raw = String::from_utf8_lossy(&req.body);
    assert!(raw.contains("name=\"audio_file\""));
    assert!(raw.contains("filename=\"note.wav\""));
    assert!(raw.contains("audio/wav"));
}

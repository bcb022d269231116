//! Recording fake of the backend API plus helpers shared by the
//! integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use tc_api::{
    AudioUpload, AuthResponse, ChatApi, ChatRecord, CompletionRequest, CreateChatRequest,
    MessageRecord, SignInRequest, SignUpRequest,
};
use tc_cache::{CredentialStore, KeyValueStore, MemoryStore};
use tc_client::{AppState, ChatView, Navigator};
use tc_domain::config::Config;
use tc_domain::error::{AuthErrorCode, Error, Result};
use tc_domain::model::{ChatMessage, User};
use tc_domain::notice::{Notice, Notifier};
use tc_domain::stream::{BoxStream, CompletionEvent};

/// One scripted item of a completion stream.
#[derive(Debug, Clone)]
pub enum Step {
    Event(CompletionEvent),
    /// Transport failure mid-stream.
    Fail(String),
}

pub fn delta(text: &str) -> Step {
    Step::Event(CompletionEvent::Delta { text: text.into() })
}

pub fn done() -> Step {
    Step::Event(CompletionEvent::Done)
}

#[derive(Default)]
pub struct FakeApi {
    pub calls: Mutex<Vec<String>>,
    pub completions: Mutex<Vec<(String, CompletionRequest)>>,
    pub script: Mutex<Vec<Step>>,
    /// `(status, message)` returned instead of opening a stream.
    pub reject_completion: Mutex<Option<(u16, String)>>,
    pub fail_create: Mutex<bool>,
    pub fail_list: Mutex<bool>,
    pub fail_delete: Mutex<bool>,
    /// Answer of `get_chat`: `None` = exists, `Some(404)` = missing,
    /// `Some(other)` = server failure.
    pub get_chat_status: Mutex<Option<u16>>,
    pub chats: Mutex<Vec<ChatRecord>>,
    pub messages: Mutex<Vec<MessageRecord>>,
    pub next_chat_id: Mutex<u32>,
}

impl FakeApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn script(&self, steps: Vec<Step>) {
        *self.script.lock().unwrap() = steps;
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

pub fn chat_record(id: &str, owner: Option<&str>) -> ChatRecord {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("chat {id}"),
        "user_id": owner,
        "updated_at": "2026-03-01T10:00:00"
    }))
    .unwrap()
}

fn auth_response(email: &str, name: &str) -> AuthResponse {
    serde_json::from_value(json!({
        "token": "tok-A",
        "user": { "id": "A", "email": email, "name": name, "is_guest": false }
    }))
    .unwrap()
}

#[async_trait]
impl ChatApi for FakeApi {
    async fn list_chats(&self) -> Result<Vec<ChatRecord>> {
        self.record("list_chats");
        if *self.fail_list.lock().unwrap() {
            return Err(Error::Api {
                status: 500,
                message: "server error".into(),
            });
        }
        Ok(self.chats.lock().unwrap().clone())
    }

    async fn create_chat(&self, _req: CreateChatRequest) -> Result<ChatRecord> {
        self.record("create_chat");
        if *self.fail_create.lock().unwrap() {
            return Err(Error::Http("connection refused".into()));
        }
        let mut n = self.next_chat_id.lock().unwrap();
        *n += 1;
        Ok(chat_record(&format!("c-{n}"), Some("A")))
    }

    async fn get_chat(&self, chat_id: &str) -> Result<ChatRecord> {
        self.record(format!("get_chat:{chat_id}"));
        match *self.get_chat_status.lock().unwrap() {
            None => Ok(chat_record(chat_id, Some("A"))),
            Some(404) => Err(Error::NotFound("Chat not found".into())),
            Some(status) => Err(Error::Api {
                status,
                message: "server error".into(),
            }),
        }
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<MessageRecord>> {
        self.record(format!("list_messages:{chat_id}"));
        Ok(self.messages.lock().unwrap().clone())
    }

    async fn stream_completion(
        &self,
        chat_id: &str,
        req: CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>> {
        self.record(format!("stream_completion:{chat_id}"));
        self.completions
            .lock()
            .unwrap()
            .push((chat_id.to_owned(), req));

        if let Some((status, message)) = self.reject_completion.lock().unwrap().clone() {
            return Err(Error::Api { status, message });
        }

        let items: Vec<Result<CompletionEvent>> = self
            .script
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(|step| match step {
                Step::Event(e) => Ok(e),
                Step::Fail(msg) => Err(Error::Http(msg)),
            })
            .collect();
        Ok(Box::pin(futures_util::stream::iter(items)))
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        self.record(format!("delete_chat:{chat_id}"));
        if *self.fail_delete.lock().unwrap() {
            return Err(Error::Api {
                status: 500,
                message: "database unavailable".into(),
            });
        }
        Ok(())
    }

    async fn sign_in(&self, req: SignInRequest) -> Result<AuthResponse> {
        self.record("sign_in");
        if req.password == "secret1" {
            Ok(auth_response(&req.email, "Ana"))
        } else {
            Err(Error::Auth {
                code: AuthErrorCode::InvalidCredentials,
                message: "Incorrect email or password, please check your input".into(),
            })
        }
    }

    async fn sign_up(&self, req: SignUpRequest) -> Result<AuthResponse> {
        self.record("sign_up");
        Ok(auth_response(&req.email, &req.name))
    }

    async fn speech_to_text(&self, audio: AudioUpload) -> Result<String> {
        self.record(format!("speech_to_text:{}:{}", audio.file_name, audio.mime));
        Ok("two days in Porto".into())
    }
}

// ── front-end doubles ───────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
    pub alerts: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn alert(&self, text: &str) {
        self.alerts.lock().unwrap().push(text.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub routes: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn replace_route(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_owned());
    }
}

/// Counts view callbacks.
#[derive(Default)]
pub struct CountingView {
    pub appended: Mutex<usize>,
    pub updated: Mutex<usize>,
}

impl ChatView for CountingView {
    fn message_appended(&self, _message: &ChatMessage) {
        *self.appended.lock().unwrap() += 1;
    }

    fn message_updated(&self, _message: &ChatMessage) {
        *self.updated.lock().unwrap() += 1;
    }
}

// ── wiring ──────────────────────────────────────────────────────────

pub struct Fixture {
    pub app: AppState,
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn user_a() -> User {
    User {
        id: "A".into(),
        email: "ana@example.com".into(),
        name: "Ana".into(),
        avatar: None,
        age: None,
        bio: None,
        is_guest: false,
    }
}

pub fn fixture(signed_in: bool) -> Fixture {
    let api = Arc::new(FakeApi::default());
    let store = Arc::new(MemoryStore::new());
    let kv: Arc<dyn KeyValueStore> = store.clone();
    let credentials = Arc::new(CredentialStore::new(kv.clone()));
    if signed_in {
        credentials.save("tok-A", &user_a()).unwrap();
    }
    let notifier = Arc::new(RecordingNotifier::default());
    let app = AppState::assemble(
        Config::default(),
        api.clone(),
        kv,
        credentials,
        notifier.clone(),
    )
    .unwrap();
    if signed_in {
        app.auth.restore();
    }
    Fixture {
        app,
        api,
        store,
        notifier,
        navigator: Arc::new(RecordingNavigator::default()),
    }
}

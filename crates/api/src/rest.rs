//! REST implementation of [`ChatApi`].
//!
//! `RestChatClient` wraps a `reqwest::Client` and translates every trait
//! method into the corresponding HTTP call. Nothing is retried: each
//! failure is terminal for the call that produced it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use tc_cache::CredentialStore;
use tc_domain::config::ApiConfig;
use tc_domain::error::{Error, Result};
use tc_domain::notice::{Notice, NoticeLevel, Notifier};
use tc_domain::stream::{BoxStream, CompletionEvent};
use tc_domain::trace::TraceEvent;

use crate::error_body::{auth_error, detail_message, AuthAction};
use crate::provider::ChatApi;
use crate::sse::completion_events;
use crate::types::{
    AudioUpload, AuthResponse, ChatListResponse, ChatRecord, CompletionRequest,
    CreateChatRequest, MessageListResponse, MessageRecord, SignInRequest, SignUpRequest,
    SpeechResponse,
};

/// Notice key for the forced-logout message, so repeated 401s show once.
pub const SESSION_EXPIRED_NOTICE: &str = "session-expired";

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Whether a 401 on this call means "session expired".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnUnauthorized {
    ForceLogout,
    /// Credential checks (sign in/up) report 401 as bad credentials.
    PassThrough,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A REST client for the TripChat backend.
///
/// Created once and shared. The underlying `reqwest::Client` keeps a
/// connection pool.
#[derive(Clone)]
pub struct RestChatClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    stream_timeout: Duration,
    credentials: Arc<CredentialStore>,
    notifier: Arc<dyn Notifier>,
}

impl RestChatClient {
    /// Build a new client from the shared `ApiConfig`.
    pub fn new(
        cfg: &ApiConfig,
        credentials: Arc<CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(cfg.connect_timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            timeout: Duration::from_millis(cfg.timeout_ms),
            stream_timeout: Duration::from_millis(cfg.stream_timeout_ms),
            credentials,
            notifier,
        })
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Build the full URL for a path like `/chats/`.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, when one is stored.
    fn authorize(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    /// Send a request and turn non-success statuses into errors.
    ///
    /// * 401 on an authenticated call clears the credentials, shows the
    ///   expiry notice and returns [`Error::SessionExpired`].
    /// * 404 returns [`Error::NotFound`].
    /// * Any other non-success status returns [`Error::Api`] carrying the
    ///   server's `detail` message.
    async fn execute(
        &self,
        endpoint: &str,
        rb: RequestBuilder,
        on_unauthorized: OnUnauthorized,
    ) -> Result<Response> {
        let start = Instant::now();
        let result = rb.send().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                TraceEvent::ApiCall {
                    endpoint: endpoint.to_owned(),
                    status: e.status().map(|s| s.as_u16()).unwrap_or(0),
                    duration_ms,
                }
                .emit();
                return Err(from_reqwest(e));
            }
        };

        let status = resp.status();
        TraceEvent::ApiCall {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
            duration_ms,
        }
        .emit();

        if status.is_success() || on_unauthorized == OnUnauthorized::PassThrough {
            return Ok(resp);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.force_logout(endpoint);
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = detail_message(status.as_u16(), &body);
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(message));
        }
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn force_logout(&self, endpoint: &str) {
        tracing::warn!(endpoint, "authenticated call rejected, clearing credentials");
        self.credentials.clear();
        self.notifier.notify(Notice::keyed(
            SESSION_EXPIRED_NOTICE,
            NoticeLevel::Error,
            "Your session has expired, please sign in again",
        ));
        TraceEvent::SessionExpired {
            endpoint: endpoint.to_owned(),
        }
        .emit();
    }

    async fn read_json<T: DeserializeOwned>(&self, endpoint: &str, resp: Response) -> Result<T> {
        let body = resp.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(endpoint, error = %e, "undecodable response body");
            Error::Json(e)
        })
    }

    async fn authenticate(
        &self,
        action: AuthAction,
        endpoint: &str,
        rb: RequestBuilder,
    ) -> Result<AuthResponse> {
        let resp = self
            .execute(endpoint, rb, OnUnauthorized::PassThrough)
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(auth_error(action, status.as_u16(), &body));
        }
        let auth: AuthResponse = self.read_json(endpoint, resp).await?;
        if auth.token.is_empty() || auth.user.id.is_empty() {
            return Err(Error::Other(format!("{endpoint}: response without token or user")));
        }
        Ok(auth)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait]
impl ChatApi for RestChatClient {
    async fn list_chats(&self) -> Result<Vec<ChatRecord>> {
        let endpoint = "GET /chats/";
        let rb = self
            .authorize(self.http.get(self.url("/chats/")))
            .timeout(self.timeout);
        let resp = self.execute(endpoint, rb, OnUnauthorized::ForceLogout).await?;
        let list: ChatListResponse = self.read_json(endpoint, resp).await?;

        let total = list.chats.len();
        let chats: Vec<ChatRecord> = list
            .chats
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .collect();
        if chats.len() != total {
            tracing::warn!(dropped = total - chats.len(), "chat records without id dropped");
        }
        Ok(chats)
    }

    async fn create_chat(&self, req: CreateChatRequest) -> Result<ChatRecord> {
        let endpoint = "POST /chats/";
        let rb = self
            .authorize(self.http.post(self.url("/chats/")).json(&req))
            .timeout(self.timeout);
        let resp = self.execute(endpoint, rb, OnUnauthorized::ForceLogout).await?;
        let chat: ChatRecord = self.read_json(endpoint, resp).await?;
        if chat.id.is_empty() {
            return Err(Error::Other("chat creation returned an empty id".into()));
        }
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: &str) -> Result<ChatRecord> {
        let endpoint = format!("GET /chats/{chat_id}");
        let rb = self
            .authorize(self.http.get(self.url(&format!("/chats/{chat_id}"))))
            .timeout(self.timeout);
        let resp = self.execute(&endpoint, rb, OnUnauthorized::ForceLogout).await?;
        self.read_json(&endpoint, resp).await
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<MessageRecord>> {
        let endpoint = format!("GET /chats/{chat_id}/messages");
        let rb = self
            .authorize(self.http.get(self.url(&format!("/chats/{chat_id}/messages"))))
            .timeout(self.timeout);
        let resp = self.execute(&endpoint, rb, OnUnauthorized::ForceLogout).await?;
        let list: MessageListResponse = self.read_json(&endpoint, resp).await?;
        Ok(list.messages)
    }

    async fn stream_completion(
        &self,
        chat_id: &str,
        req: CompletionRequest,
    ) -> Result<BoxStream<'static, Result<CompletionEvent>>> {
        let endpoint = format!("POST /chats/{chat_id}/completions");
        let rb = self
            .authorize(
                self.http
                    .post(self.url(&format!("/chats/{chat_id}/completions")))
                    .header(reqwest::header::ACCEPT, "text/event-stream")
                    .json(&req),
            )
            .timeout(self.stream_timeout);

        tracing::debug!(chat_id, "completion stream request");
        let resp = self.execute(&endpoint, rb, OnUnauthorized::ForceLogout).await?;

        let bytes = resp.bytes_stream().map(|chunk| chunk.map_err(from_reqwest));
        Ok(completion_events(bytes))
    }

    async fn delete_chat(&self, chat_id: &str) -> Result<()> {
        let endpoint = format!("DELETE /chats/{chat_id}");
        let rb = self
            .authorize(self.http.delete(self.url(&format!("/chats/{chat_id}"))))
            .timeout(self.timeout);
        self.execute(&endpoint, rb, OnUnauthorized::ForceLogout)
            .await?;
        Ok(())
    }

    async fn sign_in(&self, req: SignInRequest) -> Result<AuthResponse> {
        let rb = self
            .http
            .post(self.url("/auth/signin"))
            .json(&req)
            .timeout(self.timeout);
        self.authenticate(AuthAction::SignIn, "POST /auth/signin", rb)
            .await
    }

    async fn sign_up(&self, req: SignUpRequest) -> Result<AuthResponse> {
        let rb = self
            .http
            .post(self.url("/auth/signup"))
            .json(&req)
            .timeout(self.timeout);
        self.authenticate(AuthAction::SignUp, "POST /auth/signup", rb)
            .await
    }

    async fn speech_to_text(&self, audio: AudioUpload) -> Result<String> {
        let endpoint = "POST /speech/speech-to-text";
        let size = audio.bytes.len();
        let part = reqwest::multipart::Part::bytes(audio.bytes)
            .file_name(audio.file_name)
            .mime_str(&audio.mime)
            .map_err(from_reqwest)?;
        let form = reqwest::multipart::Form::new().part("audio_file", part);

        let rb = self
            .authorize(self.http.post(self.url("/speech/speech-to-text")).multipart(form))
            .timeout(self.timeout);
        let resp = self.execute(endpoint, rb, OnUnauthorized::ForceLogout).await?;
        let result: SpeechResponse = self.read_json(endpoint, resp).await?;

        if !result.success {
            return Err(Error::Api {
                status: 200,
                message: result
                    .error
                    .unwrap_or_else(|| "speech recognition failed".into()),
            });
        }
        let text = result.text.unwrap_or_default();
        TraceEvent::SpeechTranscribed {
            audio_bytes: size,
            chars: text.chars().count(),
        }
        .emit();
        Ok(text)
    }
}

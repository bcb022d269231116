//! Authentication state machine.
//!
//! ```text
//! Anonymous ──login/register──▶ Authenticating ──ok──▶ Authenticated
//!     ▲                              │                      │
//!     └──────────── error ───────────┘◀────── logout ───────┘
//! Anonymous ──guest_login──▶ Guest ──logout──▶ Anonymous
//! ```
//!
//! A failed login or register returns to the phase it started from, so a
//! signed-in or guest user keeps their identity.
//!
//! Identity itself lives in the [`CredentialStore`]; this type tracks the
//! phase and the last displayed error.

use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;

use tc_api::{ChatApi, SignInRequest, SignUpRequest};
use tc_cache::CredentialStore;
use tc_domain::error::{AuthErrorCode, Error, Result};
use tc_domain::model::User;
use tc_domain::trace::TraceEvent;

const EMAIL_PATTERN: &str = r"^\S+@\S+\.\S+$";
const USERNAME_PATTERN: &str = r"^[A-Za-z0-9_]{3,20}$";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Guest,
}

impl AuthPhase {
    fn as_str(self) -> &'static str {
        match self {
            AuthPhase::Anonymous => "anonymous",
            AuthPhase::Authenticating => "authenticating",
            AuthPhase::Authenticated => "authenticated",
            AuthPhase::Guest => "guest",
        }
    }
}

/// Registration input as collected by the front end.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub username: String,
}

struct AuthState {
    phase: AuthPhase,
    error: Option<String>,
}

// ── form validation ─────────────────────────────────────────────────

/// Precompiled input rules, checked before any network call.
struct FormRules {
    email: Regex,
    username: Regex,
}

impl FormRules {
    fn new() -> Result<Self> {
        let compile =
            |p: &str| Regex::new(p).map_err(|e| Error::Config(format!("form rule {p}: {e}")));
        Ok(Self {
            email: compile(EMAIL_PATTERN)?,
            username: compile(USERNAME_PATTERN)?,
        })
    }

    fn check_login(&self, email: &str, password: &str) -> std::result::Result<(), String> {
        if email.trim().is_empty() {
            return Err("Please enter your email".into());
        }
        if !self.email.is_match(email.trim()) {
            return Err("Please enter a valid email address".into());
        }
        if password.is_empty() {
            return Err("Please enter your password".into());
        }
        Ok(())
    }

    fn check_registration(&self, form: &Registration) -> std::result::Result<(), String> {
        self.check_login(&form.email, &form.password)?;
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        if form.password != form.confirm_password {
            return Err("The two passwords do not match".into());
        }
        if form.name.trim().is_empty() {
            return Err("Please enter your name".into());
        }
        if !self.username.is_match(&form.username) {
            return Err(
                "Username must be 3-20 characters of letters, digits or underscores".into(),
            );
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session manager
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct AuthSession {
    api: Arc<dyn ChatApi>,
    credentials: Arc<CredentialStore>,
    rules: FormRules,
    state: RwLock<AuthState>,
}

impl AuthSession {
    pub fn new(api: Arc<dyn ChatApi>, credentials: Arc<CredentialStore>) -> Result<Self> {
        Ok(Self {
            api,
            credentials,
            rules: FormRules::new()?,
            state: RwLock::new(AuthState {
                phase: AuthPhase::Anonymous,
                error: None,
            }),
        })
    }

    /// Reload the persisted identity at startup.
    pub fn restore(&self) -> Option<User> {
        let user = self.credentials.restore();
        let phase = if user.is_some() {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        };
        self.set_phase(phase, user.as_ref());
        user
    }

    /// Current phase, reconciled with the credential store (a forced
    /// logout after a 401 clears credentials underneath us).
    pub fn phase(&self) -> AuthPhase {
        let phase = self.state.read().phase;
        let stale = match phase {
            AuthPhase::Authenticated => self.credentials.token().is_none(),
            AuthPhase::Guest => self.credentials.user().is_none(),
            _ => false,
        };
        if stale {
            self.state.write().phase = AuthPhase::Anonymous;
            return AuthPhase::Anonymous;
        }
        phase
    }

    pub fn user(&self) -> Option<User> {
        match self.phase() {
            AuthPhase::Authenticated | AuthPhase::Guest => self.credentials.user(),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<String> {
        self.credentials.token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == AuthPhase::Authenticated
    }

    /// The error to display, if the last attempt failed.
    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.write().error = None;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        if let Err(msg) = self.rules.check_login(email, password) {
            return Err(self.fail_validation(msg));
        }

        let previous = self.begin();
        let result = self
            .api
            .sign_in(SignInRequest {
                email: email.trim().to_owned(),
                password: password.to_owned(),
            })
            .await;
        self.finish(result, previous)
    }

    pub async fn register(&self, form: &Registration) -> Result<User> {
        if let Err(msg) = self.rules.check_registration(form) {
            return Err(self.fail_validation(msg));
        }

        let previous = self.begin();
        let result = self
            .api
            .sign_up(SignUpRequest {
                email: form.email.trim().to_owned(),
                password: form.password.clone(),
                name: form.name.trim().to_owned(),
                username: form.username.clone(),
            })
            .await;
        self.finish(result, previous)
    }

    /// Switch to a locally synthesized guest identity. No network call and
    /// no token.
    pub fn guest_login(&self) -> User {
        let guest = User::guest(chrono::Utc::now().timestamp_millis());
        self.credentials.set_guest(guest.clone());
        self.state.write().error = None;
        self.set_phase(AuthPhase::Guest, Some(&guest));
        guest
    }

    /// Drop the identity immediately. No network call.
    pub fn logout(&self) {
        self.credentials.clear();
        self.state.write().error = None;
        self.set_phase(AuthPhase::Anonymous, None);
    }

    // ── transitions ──────────────────────────────────────────────────

    /// Enter `Authenticating`; returns the phase to fall back to on failure.
    fn begin(&self) -> AuthPhase {
        let previous = match self.phase() {
            AuthPhase::Authenticating => AuthPhase::Anonymous,
            other => other,
        };
        let mut state = self.state.write();
        state.phase = AuthPhase::Authenticating;
        state.error = None;
        previous
    }

    /// A failed attempt keeps whatever identity was active before it.
    fn finish(&self, result: Result<tc_api::AuthResponse>, previous: AuthPhase) -> Result<User> {
        let stored = result.and_then(|auth| {
            let user = auth.user.into_user();
            self.credentials.save(&auth.token, &user)?;
            Ok(user)
        });

        match stored {
            Ok(user) => {
                self.set_phase(AuthPhase::Authenticated, Some(&user));
                Ok(user)
            }
            Err(e) => {
                let message = display_message(&e);
                tracing::warn!(error = %e, "authentication failed");
                {
                    let mut state = self.state.write();
                    state.phase = previous;
                    state.error = Some(message.clone());
                }
                Err(match e {
                    Error::Auth { .. } => e,
                    _ => Error::Auth {
                        code: AuthErrorCode::Unknown,
                        message,
                    },
                })
            }
        }
    }

    fn fail_validation(&self, msg: String) -> Error {
        self.state.write().error = Some(msg.clone());
        Error::Validation(msg)
    }

    fn set_phase(&self, phase: AuthPhase, user: Option<&User>) {
        self.state.write().phase = phase;
        TraceEvent::AuthChanged {
            phase: phase.as_str().to_owned(),
            user_id: user.map(|u| u.id.clone()),
        }
        .emit();
    }
}

/// Human-readable text for any auth failure.
fn display_message(e: &Error) -> String {
    match e {
        Error::Auth { message, .. } => message.clone(),
        Error::Timeout(_) => "The server did not respond in time, please try again".into(),
        Error::Http(_) => "Could not reach the server, please check your connection".into(),
        Error::Json(_) => "The server sent an unexpected response".into(),
        other => other.to_string(),
    }
}

//! Mapping of non-success response bodies to displayable errors.
//!
//! The backend uses FastAPI's `{"detail": ...}` envelope in three shapes:
//! a structured `{"code", "message"}` object (newer auth errors), a plain
//! string, or a list of validation issues.

use serde_json::Value;

use tc_domain::error::{AuthErrorCode, Error};

/// Which auth form produced the error; selects the fallback wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignIn,
    SignUp,
}

impl AuthAction {
    fn label(self) -> &'static str {
        match self {
            AuthAction::SignIn => "Sign in",
            AuthAction::SignUp => "Registration",
        }
    }
}

/// Best human-readable message for a failed call.
pub fn detail_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => match value.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => obj
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string()),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|i| i.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            _ => fallback(status, body),
        },
        Err(_) => fallback(status, body),
    }
}

fn fallback(status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("request failed with HTTP {status}")
    } else {
        body.to_owned()
    }
}

/// Map a failed sign-in/sign-up response to [`Error::Auth`].
pub fn auth_error(action: AuthAction, status: u16, body: &str) -> Error {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            return Error::Auth {
                code: AuthErrorCode::Unknown,
                message: format!("{} failed ({status})", action.label()),
            }
        }
    };

    let detail = parsed.get("detail");

    if let Some(Value::Object(obj)) = detail {
        if let (Some(code), Some(message)) = (
            obj.get("code").and_then(Value::as_str),
            obj.get("message").and_then(Value::as_str),
        ) {
            return Error::Auth {
                code: AuthErrorCode::parse(code),
                message: message.to_owned(),
            };
        }
    }

    let (code, message) = match status {
        401 => (
            AuthErrorCode::InvalidCredentials,
            "Incorrect email or password, please check your input".to_owned(),
        ),
        400 => (
            AuthErrorCode::Unknown,
            detail
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| "Invalid request parameters".to_owned()),
        ),
        s if s >= 500 => (
            AuthErrorCode::Unknown,
            "Server error, please try again later".to_owned(),
        ),
        _ => (AuthErrorCode::Unknown, format!("{} failed", action.label())),
    };

    Error::Auth { code, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_parts(err: Error) -> (AuthErrorCode, String) {
        match err {
            Error::Auth { code, message } => (code, message),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn structured_code_wins() {
        let body = r#"{"detail":{"code":"EMAIL_ALREADY_EXISTS","message":"Email a@b.c is already registered"}}"#;
        let (code, message) = auth_parts(auth_error(AuthAction::SignUp, 400, body));
        assert_eq!(code, AuthErrorCode::EmailAlreadyExists);
        assert_eq!(message, "Email a@b.c is already registered");
    }

    #[test]
    fn legacy_401_means_bad_credentials() {
        let (code, message) =
            auth_parts(auth_error(AuthAction::SignIn, 401, r#"{"detail":"nope"}"#));
        assert_eq!(code, AuthErrorCode::InvalidCredentials);
        assert!(message.contains("Incorrect email or password"));
    }

    #[test]
    fn legacy_400_uses_detail_string() {
        let (_, message) = auth_parts(auth_error(
            AuthAction::SignUp,
            400,
            r#"{"detail":"Username already taken"}"#,
        ));
        assert_eq!(message, "Username already taken");
    }

    #[test]
    fn server_errors_are_generic() {
        let (_, message) = auth_parts(auth_error(AuthAction::SignIn, 503, "{}"));
        assert_eq!(message, "Server error, please try again later");
    }

    #[test]
    fn unparseable_body_reports_status() {
        let (code, message) = auth_parts(auth_error(AuthAction::SignUp, 502, "<html>"));
        assert_eq!(code, AuthErrorCode::Unknown);
        assert_eq!(message, "Registration failed (502)");
    }

    #[test]
    fn detail_message_shapes() {
        assert_eq!(detail_message(404, r#"{"detail":"Chat not found"}"#), "Chat not found");
        assert_eq!(
            detail_message(402, r#"{"detail":{"code":"X","message":"Insufficient Balance"}}"#),
            "Insufficient Balance"
        );
        assert_eq!(
            detail_message(422, r#"{"detail":[{"msg":"field required"},{"msg":"bad"}]}"#),
            "field required; bad"
        );
        assert_eq!(detail_message(500, ""), "request failed with HTTP 500");
        assert_eq!(detail_message(502, "Bad Gateway"), "Bad Gateway");
    }
}

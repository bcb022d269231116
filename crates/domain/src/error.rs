/// Shared error type used across all TripChat crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// Sign-in / sign-up rejected; `message` is ready for display.
    #[error("{message}")]
    Auth {
        code: AuthErrorCode,
        message: String,
    },

    /// A 401 on an authenticated call; credentials have been cleared.
    #[error("session expired, please sign in again")]
    SessionExpired,

    /// Local input check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Structured error codes returned by the auth endpoints in
/// `{"detail": {"code": ..., "message": ...}}` bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyExists,
    UsernameAlreadyExists,
    WeakPassword,
    InvalidCredentials,
    UserNotFound,
    InactiveUser,
    InvalidEmail,
    InvalidUsername,
    PasswordMismatch,
    GuestAccountLimitation,
    /// No structured code (legacy body, bare status, or local failure).
    Unknown,
    Other(String),
}

impl AuthErrorCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "EMAIL_ALREADY_EXISTS" => Self::EmailAlreadyExists,
            "USERNAME_ALREADY_EXISTS" => Self::UsernameAlreadyExists,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "INACTIVE_USER" => Self::InactiveUser,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "INVALID_USERNAME" => Self::InvalidUsername,
            "PASSWORD_MISMATCH" => Self::PasswordMismatch,
            "GUEST_ACCOUNT_LIMITATION" => Self::GuestAccountLimitation,
            other => Self::Other(other.to_owned()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_parse() {
        assert_eq!(
            AuthErrorCode::parse("EMAIL_ALREADY_EXISTS"),
            AuthErrorCode::EmailAlreadyExists
        );
        assert_eq!(
            AuthErrorCode::parse("WEAK_PASSWORD"),
            AuthErrorCode::WeakPassword
        );
    }

    #[test]
    fn unknown_code_is_kept() {
        assert_eq!(
            AuthErrorCode::parse("RATE_LIMITED"),
            AuthErrorCode::Other("RATE_LIMITED".into())
        );
    }

    #[test]
    fn api_error_displays_message_only() {
        let err = Error::Api {
            status: 402,
            message: "Insufficient Balance".into(),
        };
        assert_eq!(err.to_string(), "Insufficient Balance");
    }
}

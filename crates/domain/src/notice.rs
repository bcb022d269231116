//! User-facing notifications.
//!
//! Components never print; they hand a [`Notice`] to a [`Notifier`]
//! supplied by the front end. Notices sharing a `key` replace each other
//! instead of stacking.

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Loading,
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub key: Option<&'static str>,
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            key: None,
            level,
            text: text.into(),
        }
    }

    pub fn keyed(key: &'static str, level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            key: Some(key),
            level,
            text: text.into(),
        }
    }
}

/// Sink for transient notices and blocking alerts.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);

    /// An error the user must acknowledge before continuing.
    fn alert(&self, text: &str);
}

/// Notifier that only writes to the log. Used when no front end is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => {
                tracing::warn!(key = ?notice.key, text = %notice.text, "notice")
            }
            _ => tracing::info!(key = ?notice.key, level = ?notice.level, text = %notice.text, "notice"),
        }
    }

    fn alert(&self, text: &str) {
        tracing::warn!(text = %text, "alert");
    }
}

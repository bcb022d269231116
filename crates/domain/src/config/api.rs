use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Remote API connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (e.g. `/chats/`).
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Timeout for ordinary request/response calls.
    #[serde(default = "d_30000")]
    pub timeout_ms: u64,
    #[serde(default = "d_5000")]
    pub connect_timeout_ms: u64,
    /// Upper bound for a whole streaming completion, body included.
    #[serde(default = "d_300000")]
    pub stream_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            stream_timeout_ms: 300_000,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "http://localhost:8000/api".into()
}
fn d_30000() -> u64 {
    30_000
}
fn d_5000() -> u64 {
    5_000
}
fn d_300000() -> u64 {
    300_000
}

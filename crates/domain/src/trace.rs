use serde::Serialize;

/// Structured trace events emitted across all TripChat crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ApiCall {
        endpoint: String,
        status: u16,
        duration_ms: u64,
    },
    SessionBound {
        session_id: String,
    },
    SessionOpened {
        session_id: String,
        messages: usize,
        from_cache: bool,
    },
    CompletionFinished {
        session_id: String,
        outcome: String,
        deltas: usize,
        malformed_frames: usize,
        chars: usize,
        duration_ms: u64,
    },
    HistorySynced {
        viewer: Option<String>,
        total: usize,
        visible: usize,
    },
    AuthChanged {
        phase: String,
        user_id: Option<String>,
    },
    SessionExpired {
        endpoint: String,
    },
    ChatDeleted {
        chat_id: String,
        ok: bool,
    },
    SpeechTranscribed {
        audio_bytes: usize,
        chars: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "tc_event");
    }
}

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat behaviour
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model name sent with completion requests. When `None` the field is
    /// omitted and the server picks its default.
    #[serde(default)]
    pub model: Option<String>,
    /// Largest audio recording accepted for speech-to-text.
    #[serde(default = "d_max_audio")]
    pub max_audio_bytes: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_audio_bytes: d_max_audio(),
        }
    }
}

fn d_max_audio() -> usize {
    10 * 1024 * 1024
}

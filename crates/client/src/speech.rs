//! Voice input: validate a recording locally, then transcribe it.

use std::path::Path;
use std::sync::Arc;

use tc_api::{AudioUpload, ChatApi};
use tc_domain::error::{Error, Result};
use tc_domain::notice::Notifier;

const DEFAULT_MIME: &str = "audio/webm";

/// MIME type for an audio file, from its extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("webm") => "audio/webm",
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        _ => DEFAULT_MIME,
    }
}

/// Reject recordings the server would refuse anyway.
pub fn check_recording(len: usize, max_bytes: usize) -> std::result::Result<(), String> {
    if len == 0 {
        return Err("The recording is empty, please try again".into());
    }
    if len > max_bytes {
        return Err(format!(
            "The recording is too large ({len} bytes, limit {max_bytes})"
        ));
    }
    Ok(())
}

pub struct SpeechToText {
    api: Arc<dyn ChatApi>,
    notifier: Arc<dyn Notifier>,
    max_bytes: usize,
}

impl SpeechToText {
    pub fn new(api: Arc<dyn ChatApi>, notifier: Arc<dyn Notifier>, max_bytes: usize) -> Self {
        Self {
            api,
            notifier,
            max_bytes,
        }
    }

    /// Transcribe an in-memory recording. Local problems raise a blocking
    /// alert and send nothing.
    pub async fn transcribe(&self, bytes: Vec<u8>, file_name: &str) -> Result<String> {
        if let Err(msg) = check_recording(bytes.len(), self.max_bytes) {
            self.notifier.alert(&msg);
            return Err(Error::Validation(msg));
        }
        let upload = AudioUpload {
            bytes,
            mime: mime_for(Path::new(file_name)).to_owned(),
            file_name: file_name.to_owned(),
        };
        self.api.speech_to_text(upload).await.map_err(|e| {
            tracing::warn!(error = %e, "speech recognition failed");
            self.notifier
                .alert(&format!("Speech recognition failed: {e}"));
            e
        })
    }

    pub async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => {
                self.notifier
                    .alert(&format!("Could not read the recording {}: {e}", path.display()));
                return Err(Error::Io(e));
            }
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording.webm")
            .to_owned();
        self.transcribe(bytes, &file_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for(Path::new("a.wav")), "audio/wav");
        assert_eq!(mime_for(Path::new("a.MP3")), "audio/mpeg");
        assert_eq!(mime_for(Path::new("a.m4a")), "audio/mp4");
        assert_eq!(mime_for(Path::new("a.ogg")), "audio/ogg");
        assert_eq!(mime_for(Path::new("a")), "audio/webm");
        assert_eq!(mime_for(Path::new("a.flac")), "audio/webm");
    }

    #[test]
    fn recording_limits() {
        assert!(check_recording(0, 10).is_err());
        assert!(check_recording(10, 10).is_ok());
        assert!(check_recording(11, 10).is_err());
    }
}

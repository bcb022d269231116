//! `tripchat transcribe <file>`.

use std::path::Path;

use tc_client::AppState;

pub async fn transcribe(app: &AppState, file: &Path) -> anyhow::Result<String> {
    eprintln!("Transcribing {} ...", file.display());
    let text = app.speech.transcribe_file(file).await?;
    if text.trim().is_empty() {
        anyhow::bail!("no speech recognized in {}", file.display());
    }
    Ok(text)
}

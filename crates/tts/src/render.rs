use std::path::{Path, PathBuf};

use crate::{
    error::{Result, TtsError},
    server::Server,
    types::SpeakOptions,
};

/// `filename` with an `.mp3` extension appended unless it already ends in one
pub fn mp3_path(filename: &str) -> PathBuf {
    if filename.to_ascii_lowercase().ends_with(".mp3") {
        PathBuf::from(filename)
    } else {
        PathBuf::from(format!("{filename}.mp3"))
    }
}

impl Server {
    /// Synthesize `text` into an MP3 file and return its path
    ///
    /// Audio is written to a temporary file next to the target and moved
    /// into place only once synthesis succeeded, so a failed render leaves
    /// any existing file untouched.
    pub async fn render_to_file(&self, text: &str, filename: &str, options: &SpeakOptions) -> Result<PathBuf> {
        if text.is_empty() {
            return Err(TtsError::MissingInput("text"));
        }

        if filename.is_empty() {
            return Err(TtsError::MissingInput("filename"));
        }

        let out = mp3_path(filename);
        let dir = out
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let (file, partial) = tempfile::Builder::new()
            .prefix(".voxgate-")
            .suffix(".part")
            .tempfile_in(dir)?
            .into_parts();

        let mut file = tokio::fs::File::from_std(file);
        let bytes = self.synthesize_into(text, options, &mut file).await?;
        drop(file);

        partial.persist(&out).map_err(|e| TtsError::Stream(e.error))?;

        tracing::info!(path = %out.display(), bytes, "wrote audio file");

        Ok(out)
    }
}

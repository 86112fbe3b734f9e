//! Invokes the `yt-dlp` executable to pull the audio track out of a remote video.
//!
//! The tool is always run with an explicit argument list, never through a shell, so a
//! caller supplied URL cannot inject extra commands.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Captured result of one tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// stdout followed by stderr, lossily decoded.
    pub combined: String,
}

/// Handle to the `yt-dlp` program located at `program` (a path or a name on `PATH`).
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments requesting a 192K mp3 of a single video written to `output`.
    pub fn audio_args(url: &str, output: &Path) -> Vec<String> {
        vec![
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--audio-quality".to_string(),
            "192K".to_string(),
            "--output".to_string(),
            output.to_string_lossy().into_owned(),
            "--no-playlist".to_string(),
            url.to_string(),
        ]
    }

    /// Runs the tool to completion. There is no timeout and the child is not killed if
    /// this future is dropped. Failing to start the process at all is an extraction error.
    pub async fn extract_audio(&self, url: &str, output: &Path) -> Result<ToolOutput, Error> {
        let args = Self::audio_args(url, output);
        debug!("Executing {} {:?}", self.program.display(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|err| {
                warn!("Failed to start {}: {err}", self.program.display());
                Error {
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Extraction(format!(
                        "failed to run {}: {err}",
                        self.program.display()
                    ))),
                    source: Some(Box::new(err)),
                }
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            combined,
        })
    }
}

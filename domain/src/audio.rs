//! Audio extraction pipeline.
//!
//! A job goes requested → extracting → extracted → served → reclaimed, or ends in
//! failed. Every job writes to its own `<scratch>/<uuid>.mp3`, so concurrent
//! extractions of the same URL never share a file. Served files are deleted by a
//! detached timer task; if the process exits first the file is left for
//! [`AudioExtractor::cleanup`].
//!
//! A job runs on its own task. Dropping the future returned by
//! [`AudioExtractor::extract_audio`] does not stop the tool; the job still finishes and
//! removes whatever it produced.

use crate::error::Error;
use crate::gateway::yt_dlp::YtDlp;
use log::*;
use service::config::Config;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Delay between serving an artifact and deleting it.
pub const DEFAULT_RECLAIM_DELAY: Duration = Duration::from_secs(10);

const ARTIFACT_EXTENSION: &str = "mp3";

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub scratch_dir: PathBuf,
    pub yt_dlp_path: PathBuf,
    pub reclaim_delay: Duration,
}

impl From<&Config> for ExtractionSettings {
    fn from(config: &Config) -> Self {
        Self {
            scratch_dir: config.audio_scratch_dir(),
            yt_dlp_path: PathBuf::from(config.yt_dlp_path()),
            reclaim_delay: Duration::from_secs(config.audio_reclaim_delay_secs),
        }
    }
}

/// One extraction request and the artifact it is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    pub url: String,
    pub id: Uuid,
    pub output_path: PathBuf,
}

impl ExtractionJob {
    pub fn new(url: &str, scratch_dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            url: url.to_string(),
            id,
            output_path: scratch_dir.join(format!("{id}.{ARTIFACT_EXTENSION}")),
        }
    }
}

#[derive(Debug)]
pub struct AudioExtractor {
    settings: ExtractionSettings,
    tool: YtDlp,
}

impl AudioExtractor {
    /// Creates the scratch directory (once per process) and returns the extractor.
    pub fn new(settings: ExtractionSettings) -> Result<Self, Error> {
        std::fs::create_dir_all(&settings.scratch_dir).map_err(|err| {
            error!(
                "Failed to create audio scratch directory {}: {err}",
                settings.scratch_dir.display()
            );
            Error::from(err)
        })?;
        info!(
            "Audio scratch directory: {}",
            settings.scratch_dir.display()
        );

        Ok(Self {
            tool: YtDlp::new(settings.yt_dlp_path.clone()),
            settings,
        })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.settings.scratch_dir
    }

    pub fn reclaim_delay(&self) -> Duration {
        self.settings.reclaim_delay
    }

    /// Downloads the audio track of `url` and returns the path of the produced mp3.
    ///
    /// Waits for the tool to finish however long that takes. On failure nothing is left
    /// behind at the job's path. If the caller stops waiting the job keeps running and
    /// deletes its artifact once done.
    pub async fn extract_audio(&self, url: &str) -> Result<PathBuf, Error> {
        if url.trim().is_empty() {
            return Err(Error::validation("URL is required"));
        }

        let job = ExtractionJob::new(url, &self.settings.scratch_dir);
        info!("Extracting audio for job {} from {}", job.id, job.url);

        let tool = self.tool.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let id = job.id;
            let result = run_job(&tool, job).await;
            if let Err(Ok(path)) = tx.send(result) {
                debug!("Nobody is waiting for job {id}, removing its artifact");
                remove_partial(&path).await;
            }
        });

        rx.await.map_err(|err| {
            error!("Audio extraction task ended without a result: {err}");
            Error::extraction("extraction task ended without a result")
        })?
    }

    /// Deletes `path` after the reclaim delay on a detached task. Returns immediately;
    /// the deletion is never awaited and a failure to delete is ignored.
    pub fn schedule_reclaim(&self, path: PathBuf) {
        let delay = self.settings.reclaim_delay;
        debug!(
            "Scheduling removal of {} in {}s",
            path.display(),
            delay.as_secs_f32()
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tokio::fs::remove_file(&path).await;
        });
    }

    /// Removes the scratch directory and everything still in it.
    pub async fn cleanup(&self) -> Result<(), Error> {
        info!(
            "Removing audio scratch directory {}",
            self.settings.scratch_dir.display()
        );
        match tokio::fs::remove_dir_all(&self.settings.scratch_dir).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

async fn run_job(tool: &YtDlp, job: ExtractionJob) -> Result<PathBuf, Error> {
    let output = match tool.extract_audio(&job.url, &job.output_path).await {
        Ok(output) => output,
        Err(err) => {
            remove_partial(&job.output_path).await;
            return Err(err);
        }
    };

    if !output.success {
        warn!(
            "yt-dlp failed for job {} (exit code {:?}): {}",
            job.id, output.exit_code, output.combined
        );
        remove_partial(&job.output_path).await;
        return Err(Error::extraction(format!(
            "yt-dlp failed: {}",
            output.combined.trim()
        )));
    }

    if !tokio::fs::try_exists(&job.output_path).await.unwrap_or(false) {
        warn!(
            "yt-dlp exited successfully but {} does not exist",
            job.output_path.display()
        );
        return Err(Error::extraction(format!(
            "audio file was not created: {}",
            output.combined.trim()
        )));
    }

    debug!("Audio extracted to {}", job.output_path.display());
    Ok(job.output_path)
}

async fn remove_partial(path: &Path) {
    if tokio::fs::remove_file(path).await.is_ok() {
        debug!("Removed partial artifact {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind, InternalErrorKind};
    use tempfile::TempDir;

    fn extractor(scratch: &TempDir, tool: &Path, delay: Duration) -> AudioExtractor {
        AudioExtractor::new(ExtractionSettings {
            scratch_dir: scratch.path().join("youtube_audio"),
            yt_dlp_path: tool.to_path_buf(),
            reclaim_delay: delay,
        })
        .unwrap()
    }

    /// Writes an executable shell script standing in for yt-dlp.
    #[cfg(unix)]
    fn fake_tool(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("fake-yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    // Writes the URL into the file named by the argument following --output.
    #[cfg(unix)]
    const WRITING_TOOL: &str = r#"out=""
url=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output) out="$2"; shift 2 ;;
    *) url="$1"; shift ;;
  esac
done
printf '%s' "$url" > "$out"
echo "[ExtractAudio] Destination: $out""#;

    fn scratch_entries(extractor: &AudioExtractor) -> usize {
        std::fs::read_dir(extractor.scratch_dir()).unwrap().count()
    }

    #[test]
    fn new_creates_the_scratch_directory() {
        let tmp = TempDir::new().unwrap();
        let extractor = extractor(&tmp, Path::new("yt-dlp"), DEFAULT_RECLAIM_DELAY);
        assert!(extractor.scratch_dir().is_dir());
    }

    #[test]
    fn jobs_get_unique_mp3_paths_in_the_scratch_dir() {
        let scratch = Path::new("/tmp/youtube_audio");
        let a = ExtractionJob::new("https://youtu.be/x", scratch);
        let b = ExtractionJob::new("https://youtu.be/x", scratch);

        assert_ne!(a.id, b.id);
        assert_ne!(a.output_path, b.output_path);
        assert_eq!(a.output_path, scratch.join(format!("{}.mp3", a.id)));
    }

    #[tokio::test]
    async fn empty_url_is_rejected_without_running_the_tool() {
        let tmp = TempDir::new().unwrap();
        let extractor = extractor(&tmp, Path::new("/nonexistent/yt-dlp"), DEFAULT_RECLAIM_DELAY);

        let err = extractor.extract_audio("  ").await.unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_tool_is_an_extraction_error() {
        let tmp = TempDir::new().unwrap();
        let extractor = extractor(&tmp, Path::new("/nonexistent/yt-dlp"), DEFAULT_RECLAIM_DELAY);

        let err = extractor
            .extract_audio("https://youtu.be/x")
            .await
            .unwrap_err();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Extraction(_))
        ));
        assert_eq!(scratch_entries(&extractor), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_run_returns_the_artifact_path() {
        let tmp = TempDir::new().unwrap();
        let tool = fake_tool(&tmp, WRITING_TOOL);
        let extractor = extractor(&tmp, &tool, DEFAULT_RECLAIM_DELAY);

        let path = extractor
            .extract_audio("https://youtu.be/abc")
            .await
            .unwrap();

        assert_eq!(path.parent().unwrap(), extractor.scratch_dir());
        assert_eq!(path.extension().unwrap(), "mp3");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "https://youtu.be/abc");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_an_extraction_error_carrying_tool_output() {
        let tmp = TempDir::new().unwrap();
        let tool = fake_tool(
            &tmp,
            r#"out=""
prev=""
for a in "$@"; do
  [ "$prev" = "--output" ] && out="$a"
  prev="$a"
done
printf 'partial' > "$out"
echo "ERROR: Unsupported URL: $prev" >&2
exit 1"#,
        );
        let extractor = extractor(&tmp, &tool, DEFAULT_RECLAIM_DELAY);

        let err = extractor
            .extract_audio("https://example.com/not-a-video")
            .await
            .unwrap_err();

        match err.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Extraction(msg)) => {
                assert!(
                    msg.contains("ERROR: Unsupported URL: https://example.com/not-a-video"),
                    "unexpected message: {msg}"
                );
            }
            other => panic!("Expected Extraction error, got: {other:?}"),
        }
        assert_eq!(scratch_entries(&extractor), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn clean_exit_without_artifact_is_an_extraction_error() {
        let tmp = TempDir::new().unwrap();
        let tool = fake_tool(&tmp, "echo 'nothing to do'\nexit 0");
        let extractor = extractor(&tmp, &tool, DEFAULT_RECLAIM_DELAY);

        let err = extractor
            .extract_audio("https://youtu.be/abc")
            .await
            .unwrap_err();

        match err.error_kind {
            DomainErrorKind::External(ExternalErrorKind::Extraction(msg)) => {
                assert!(msg.starts_with("audio file was not created"));
                assert!(msg.contains("nothing to do"));
            }
            other => panic!("Expected Extraction error, got: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn concurrent_extractions_of_the_same_url_do_not_collide() {
        let tmp = TempDir::new().unwrap();
        let tool = fake_tool(&tmp, WRITING_TOOL);
        let extractor = extractor(&tmp, &tool, DEFAULT_RECLAIM_DELAY);
        let url = "https://youtu.be/same";

        let (first, second) = tokio::join!(extractor.extract_audio(url), extractor.extract_audio(url));
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_ne!(first, second);
        assert!(first.exists());
        assert!(second.exists());
        assert_eq!(scratch_entries(&extractor), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dropped_request_lets_the_tool_finish_and_removes_the_artifact() {
        let tmp = TempDir::new().unwrap();
        let marker = tmp.path().join("finished");
        let tool = fake_tool(
            &tmp,
            &format!("sleep 1\n{WRITING_TOOL}\ntouch '{}'", marker.display()),
        );
        let extractor = extractor(&tmp, &tool, DEFAULT_RECLAIM_DELAY);

        let waited = tokio::time::timeout(
            Duration::from_millis(200),
            extractor.extract_audio("https://youtu.be/abc"),
        )
        .await;
        assert!(waited.is_err());

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(marker.exists());
        assert_eq!(scratch_entries(&extractor), 0);
    }

    #[tokio::test]
    async fn schedule_reclaim_returns_before_the_file_is_deleted() {
        let tmp = TempDir::new().unwrap();
        let extractor = extractor(&tmp, Path::new("yt-dlp"), Duration::from_millis(200));
        let path = extractor.scratch_dir().join("served.mp3");
        std::fs::write(&path, b"audio").unwrap();

        extractor.schedule_reclaim(path.clone());
        assert!(path.exists());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn schedule_reclaim_ignores_missing_files() {
        let tmp = TempDir::new().unwrap();
        let extractor = extractor(&tmp, Path::new("yt-dlp"), Duration::from_millis(10));

        extractor.schedule_reclaim(extractor.scratch_dir().join("already-gone.mp3"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(extractor.scratch_dir().is_dir());
    }

    #[tokio::test]
    async fn cleanup_removes_the_scratch_directory() {
        let tmp = TempDir::new().unwrap();
        let extractor = extractor(&tmp, Path::new("yt-dlp"), DEFAULT_RECLAIM_DELAY);
        std::fs::write(extractor.scratch_dir().join("left-over.mp3"), b"audio").unwrap();

        extractor.cleanup().await.unwrap();
        assert!(!extractor.scratch_dir().exists());

        // Cleaning up twice is fine
        extractor.cleanup().await.unwrap();
    }
}

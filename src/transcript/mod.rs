use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::extractors::{
    validate_request_url, CaptionExtractor, ClientPreset, ExtractorError, ToolOutput,
    YtDlpExtractor,
};
use crate::subtitles::{strip_vtt_to_plain_text, transcript_length};
use crate::utils::preview;
use crate::TranscriptError;

pub mod classify;

pub use classify::{classify_output, FailureKind};

const OUTPUT_PREVIEW_CHARS: usize = 400;
const TRANSCRIPT_PREVIEW_CHARS: usize = 200;

/// A successfully fetched transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    /// Caption text with all cue markup removed
    pub text: String,

    /// Length in UTF-16 code units
    pub length: usize,

    /// Preset that produced the captions
    pub preset: String,

    /// Number of attempts made, including the successful one
    pub attempts: usize,
}

#[derive(Debug, Clone)]
struct AttemptFailure {
    preset: ClientPreset,
    kind: Option<FailureKind>,
    exit_code: Option<i32>,
}

/// Sequential attempt-and-classify loop over the configured presets
pub struct TranscriptPipeline {
    extractor: Arc<dyn CaptionExtractor>,
    presets: Vec<ClientPreset>,
    temp_dir: Option<PathBuf>,
    jobs: Semaphore,
}

impl TranscriptPipeline {
    /// Create a pipeline backed by yt-dlp
    pub fn new(config: &Config) -> Self {
        Self::with_extractor(config, Arc::new(YtDlpExtractor::from_config(&config.ytdlp)))
    }

    pub fn with_extractor(config: &Config, extractor: Arc<dyn CaptionExtractor>) -> Self {
        Self {
            extractor,
            presets: config.ytdlp.presets.clone(),
            temp_dir: config.app.temp_dir.clone(),
            jobs: Semaphore::new(config.app.max_concurrent_jobs.max(1)),
        }
    }

    /// Validate a raw `url` parameter, then fetch its transcript
    pub async fn fetch_from_query(&self, raw_url: Option<&str>) -> Result<Transcript, TranscriptError> {
        let url = validate_request_url(raw_url).inspect_err(|e| {
            let code = e.code();
            tracing::warn!(code = %code, "Rejected transcript request: {:?}", raw_url);
        })?;
        self.fetch(&url).await
    }

    /// Fetch captions for an already validated URL
    pub async fn fetch(&self, url: &str) -> Result<Transcript, TranscriptError> {
        let _permit = self
            .jobs
            .acquire()
            .await
            .map_err(|_| TranscriptError::Setup(io::Error::other("job limiter closed")))?;

        let workspace = self.create_workspace().map_err(|e| {
            tracing::error!("Failed to create temp dir before running yt-dlp: {}", e);
            TranscriptError::Setup(e)
        })?;
        let workspace_path = workspace.path().to_path_buf();
        tracing::debug!("Using temp dir {}", workspace_path.display());

        let result = self.run_attempts(url, &workspace_path).await;

        if let Err(e) = workspace.close() {
            tracing::error!(
                "Failed to clean temp dir {}: {}",
                workspace_path.display(),
                e
            );
        }

        match &result {
            Ok(transcript) => tracing::info!(
                preset = %transcript.preset,
                attempts = transcript.attempts,
                "Transcript length: {} preview: {}...",
                transcript.length,
                preview(&transcript.text, TRANSCRIPT_PREVIEW_CHARS)
            ),
            Err(e) => {
                let code = e.code();
                tracing::error!(code = %code, "Transcript request failed: {}", e);
            }
        }

        result
    }

    fn create_workspace(&self) -> io::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("yt-dlp-");
        match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }

    async fn run_attempts(&self, url: &str, workspace: &Path) -> Result<Transcript, TranscriptError> {
        let total = self.presets.len();
        let mut failures: Vec<AttemptFailure> = Vec::with_capacity(total);

        for (index, preset) in self.presets.iter().enumerate() {
            let attempt = index + 1;
            let attempt_dir = workspace.join(format!("attempt-{}-{}", attempt, preset.name()));
            tokio::fs::create_dir(&attempt_dir)
                .await
                .map_err(TranscriptError::Setup)?;

            tracing::info!(preset = %preset, "Fetching captions for {} (attempt {}/{})", url, attempt, total);

            let output = match self.extractor.fetch_captions(url, preset, &attempt_dir).await {
                Ok(output) => output,
                Err(e @ ExtractorError::Spawn { .. }) => {
                    tracing::error!("{}", e);
                    return Err(TranscriptError::ToolFailed {
                        exit_code: None,
                        attempts: attempt,
                    });
                }
                Err(e @ ExtractorError::TimedOut { .. }) => {
                    tracing::warn!(preset = %preset, "{}", e);
                    failures.push(AttemptFailure {
                        preset: preset.clone(),
                        kind: None,
                        exit_code: None,
                    });
                    continue;
                }
            };

            log_tool_output(self.extractor.tool_name(), &output);

            let kind = if output.success {
                match read_captions(&attempt_dir).await? {
                    Some(text) if !text.trim().is_empty() => {
                        return Ok(Transcript {
                            length: transcript_length(&text),
                            text,
                            preset: preset.name().to_string(),
                            attempts: attempt,
                        });
                    }
                    Some(_) => Some(FailureKind::EmptyTranscript),
                    None => {
                        let combined = format!("{}\n{}", output.stderr, output.stdout);
                        match classify_output(&combined) {
                            Some(FailureKind::NoCaptions) => Some(FailureKind::NoCaptions),
                            _ => Some(FailureKind::NoVttFile),
                        }
                    }
                }
            } else {
                classify_output(output.diagnostic_text())
            };

            tracing::warn!(
                preset = %preset,
                exit_code = ?output.exit_code,
                "Attempt {}/{} failed: {:?}",
                attempt,
                total,
                kind
            );

            failures.push(AttemptFailure {
                preset: preset.clone(),
                kind,
                exit_code: output.exit_code,
            });
        }

        Err(resolve_failures(&failures))
    }
}

/// Pick the error to report once every preset has failed.
///
/// The earliest attempt with a recognised failure decides; without one the
/// last exit code is reported.
fn resolve_failures(failures: &[AttemptFailure]) -> TranscriptError {
    if let Some(failure) = failures.iter().find(|failure| failure.kind.is_some()) {
        tracing::debug!(preset = %failure.preset, "Reporting failure from first classified attempt");
        if let Some(kind) = failure.kind {
            return kind.into();
        }
    }

    TranscriptError::ToolFailed {
        exit_code: failures.last().and_then(|failure| failure.exit_code),
        attempts: failures.len(),
    }
}

/// Read the first `.vtt` file (by name) in `dir` and strip it to text
async fn read_captions(dir: &Path) -> Result<Option<String>, TranscriptError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(TranscriptError::Filesystem)?;

    let mut vtt_files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(TranscriptError::Filesystem)?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "vtt") {
            vtt_files.push(path);
        }
    }
    vtt_files.sort();

    let Some(path) = vtt_files.into_iter().next() else {
        tracing::error!("No .vtt file produced in {}", dir.display());
        return Ok(None);
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!("Filesystem error while reading {}: {}", path.display(), e);
        TranscriptError::Filesystem(e)
    })?;

    // Caption files are not always valid UTF-8
    let vtt = String::from_utf8_lossy(&bytes);
    Ok(Some(strip_vtt_to_plain_text(&vtt)))
}

fn log_tool_output(tool: &str, output: &ToolOutput) {
    if !output.stderr.is_empty() {
        tracing::warn!(
            "{} stderr (preview): {}",
            tool,
            preview(&output.stderr, OUTPUT_PREVIEW_CHARS)
        );
    }
    if !output.stdout.is_empty() {
        tracing::debug!(
            "{} stdout (preview): {}",
            tool,
            preview(&output.stdout, OUTPUT_PREVIEW_CHARS)
        );
    }
}

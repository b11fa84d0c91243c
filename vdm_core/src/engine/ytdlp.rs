use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use super::fetch_engine::{EngineConfig, FetchEngine, PostProcessor, ProgressHook, ProgressPayload};
use crate::types::types::DownloadError;

/// Drives the `yt-dlp` binary as a fetch engine.
///
/// Progress is read line-by-line from stdout using a JSON progress template,
/// so the hook fires at the same granularity yt-dlp reports. A hook abort
/// kills the child process; since lines are the only callback points, a
/// transfer that prints nothing cannot be cancelled until its next line.
pub struct YtDlpEngine {
    binary: PathBuf,
}

impl YtDlpEngine {
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
        }
    }

    /// Use a specific binary instead of `yt-dlp` from `PATH`.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps an `EngineConfig` onto a yt-dlp argument list.
fn build_args(config: &EngineConfig) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "--newline".into(),
        "--progress".into(),
        "--progress-template".into(),
        "download:%(progress)j".into(),
        "-o".into(),
        config.output_template.clone(),
    ];
    args.push(if config.resume {
        "--continue".into()
    } else {
        "--no-continue".into()
    });
    if config.quiet {
        args.push("--quiet".into());
        args.push("--no-warnings".into());
    }
    if let Some(proxy) = &config.proxy {
        args.push("--proxy".into());
        args.push(proxy.clone());
    }
    for postprocessor in &config.postprocessors {
        match postprocessor {
            PostProcessor::VideoConvertor { preferred_format } => {
                args.push("--recode-video".into());
                args.push(preferred_format.clone());
            }
        }
    }
    if config.keep_original {
        args.push("--keep-video".into());
    }
    args
}

/// Parses one stdout line as a progress-template JSON object, if it is one.
fn parse_progress_line(line: &str) -> Option<ProgressPayload> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Extracts the file path from a `[download] <path> has already been
/// downloaded` message.
fn parse_already_downloaded(line: &str) -> Option<&str> {
    line.trim()
        .strip_prefix("[download] ")?
        .strip_suffix(" has already been downloaded")
}

/// Categorizes a non-zero exit by the last non-empty stderr line.
fn classify_failure(stderr: &str) -> DownloadError {
    let last_line = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("download failed");
    let message = last_line
        .strip_prefix("ERROR: ")
        .unwrap_or(last_line)
        .to_string();
    let lower = message.to_lowercase();
    if lower.contains("content too short") {
        DownloadError::ContentTooShort(message)
    } else if lower.contains("unable to extract") || lower.contains("unsupported url") {
        DownloadError::Extraction(message)
    } else if lower.contains("unavailable") || lower.contains("removed") || lower.contains("private") {
        DownloadError::Unavailable(message)
    } else {
        DownloadError::Download(message)
    }
}

#[async_trait]
impl FetchEngine for YtDlpEngine {
    async fn fetch(
        &self,
        config: &EngineConfig,
        url: &str,
        hook: &dyn ProgressHook,
    ) -> Result<(), DownloadError> {
        let mut command = Command::new(&self.binary);
        command
            .args(build_args(config))
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        log::info!("[ytdlp] launching {} for {}", self.binary.display(), url);
        let mut child = command.spawn().map_err(|e| {
            DownloadError::Download(format!("failed to launch {}: {}", self.binary.display(), e))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Download("yt-dlp stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Download("yt-dlp stderr unavailable".to_string()))?;

        // Drain stderr concurrently so a chatty child cannot deadlock on a
        // full pipe while we are blocked reading stdout.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    stderr_task.abort();
                    return Err(DownloadError::Download(e.to_string()));
                }
            };

            let payload = if let Some(payload) = parse_progress_line(&line) {
                Some(payload)
            } else if let Some(path) = parse_already_downloaded(&line) {
                // The skip case never produces progress JSON; synthesize the
                // payload shape the hook expects (no downloaded_bytes).
                let total = tokio::fs::metadata(path).await.ok().map(|m| m.len() as f64);
                Some(ProgressPayload {
                    total_bytes: total,
                    filename: path.to_string(),
                    status: "finished".to_string(),
                    ..ProgressPayload::default()
                })
            } else {
                log::debug!("[ytdlp] {}", line);
                None
            };

            if let Some(payload) = payload {
                if let Err(err) = hook.on_progress(&payload) {
                    log::info!("[ytdlp] hook aborted, killing child for {}", url);
                    let _ = child.start_kill();
                    let _ = child.wait().await;
                    stderr_task.abort();
                    return Err(err);
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::Download(e.to_string()))?;
        let stderr_text = stderr_task.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(classify_failure(&stderr_text))
        }
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::types::types::DownloadError;

/// Raw progress data a fetch engine reports on each hook invocation.
///
/// Engines are loosely typed at this boundary: numeric fields arrive as JSON
/// numbers or numeric strings depending on the engine build, so all four are
/// deserialized leniently.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressPayload {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub downloaded_bytes: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub speed: Option<f64>,
    /// Remaining seconds.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub eta: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_bytes: Option<f64>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub status: String,
}

/// Accepts a number, a numeric string, or null.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Post-download processing step requested from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Re-encode the downloaded media into the given container format.
    VideoConvertor { preferred_format: String },
}

/// Configuration handed to a fetch engine for one transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output path template; `%(title)s`, `%(id)s` and `%(ext)s` placeholders
    /// are resolved by the engine.
    pub output_template: String,
    /// Continue partially downloaded files.
    pub resume: bool,
    /// Suppress the engine's own console output.
    pub quiet: bool,
    pub proxy: Option<String>,
    pub postprocessors: Vec<PostProcessor>,
    /// Keep the original file after post-processing.
    pub keep_original: bool,
}

/// Callback a fetch engine invokes, synchronously and repeatedly, as bytes
/// arrive.
///
/// Returning `Err(DownloadError::Cancelled)` tells the engine to stop network
/// activity and propagate the error out of `fetch`. This is the sole
/// cancellation mechanism, so an engine that never calls back cannot be
/// cancelled mid-wait.
pub trait ProgressHook: Send + Sync {
    fn on_progress(&self, payload: &ProgressPayload) -> Result<(), DownloadError>;
}

/// The external collaborator performing the actual transfer.
///
/// `fetch` drives one URL to completion, invoking `hook` as progress arrives,
/// and fails with one of the four categorized `DownloadError` kinds on an
/// irrecoverable error, or `DownloadError::Cancelled` when propagating a hook
/// abort.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    async fn fetch(
        &self,
        config: &EngineConfig,
        url: &str,
        hook: &dyn ProgressHook,
    ) -> Result<(), DownloadError>;
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier correlating a task with one observer-visible row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque back-reference to the coordinator that owns a task.
/// Stored for routing only; the task never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinatorId(pub u64);

/// Immutable configuration captured at task creation.
#[derive(Debug, Clone)]
pub struct TaskOptions {
    pub url: String,
    /// Destination directory. Empty means the current location.
    pub directory: String,
    pub row: RowId,
    /// Target container format for post-download conversion, if any.
    pub convert_format: Option<String>,
    pub proxy: Option<String>,
    /// Keep the original file next to the converted one.
    pub keep_file: bool,
    pub parent: Option<CoordinatorId>,
}

impl TaskOptions {
    pub fn new(url: impl Into<String>, row: RowId) -> Self {
        Self {
            url: url.into(),
            directory: String::new(),
            row,
            convert_format: None,
            proxy: None,
            keep_file: false,
            parent: None,
        }
    }

    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_convert_format(mut self, format: impl Into<String>) -> Self {
        self.convert_format = Some(format.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_keep_file(mut self, keep: bool) -> Self {
        self.keep_file = keep;
        self
    }

    pub fn with_parent(mut self, parent: CoordinatorId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Lifecycle phase of a download task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPhase {
    Created,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Terminated,
}

/// Terminal result of one task execution, returned by `DownloadTask::run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// Failure conditions raised by a fetch engine, plus cooperative cancellation.
///
/// The four categorized kinds carry the engine's own description; `Display`
/// renders it bare because the task forwards it verbatim as a status message.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// General transfer failure.
    #[error("{0}")]
    Download(String),

    /// The transfer ended with fewer bytes than the engine expected.
    #[error("{0}")]
    ContentTooShort(String),

    /// The engine could not extract media information from the source.
    #[error("{0}")]
    Extraction(String),

    /// The media is gone or inaccessible.
    #[error("{0}")]
    Unavailable(String),

    /// Raised by the progress hook when it observes a stopped task; the
    /// engine propagates this and halts network activity.
    #[error("download cancelled")]
    Cancelled,
}

impl DownloadError {
    /// Whether this is the internal cancellation signal rather than one of
    /// the four categorized engine failures.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}

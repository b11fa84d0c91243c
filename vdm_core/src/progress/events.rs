use serde::Serialize;

use crate::types::types::RowId;

/// Status label carried by a progress update.
///
/// `Engine` passes the fetch engine's own status string through unchanged
/// (typically `"downloading"`); the other variants are produced by the task
/// and hook themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatusLabel {
    Starting,
    Engine(String),
    Converting,
    Finished,
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusLabel::Starting => write!(f, "Starting"),
            StatusLabel::Engine(raw) => write!(f, "{}", raw),
            StatusLabel::Converting => write!(f, "Converting"),
            StatusLabel::Finished => write!(f, "Finished"),
        }
    }
}

/// Immutable snapshot of one row's display state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub row: RowId,
    pub name: String,
    pub size: String,
    pub eta: String,
    pub speed: String,
    pub status: StatusLabel,
}

/// Typed events a task emits to its observers, in emission order.
///
/// `Finished` fires exactly once per task execution and is the reliable
/// signal for resource cleanup. `StatusMessage` may repeat; the other
/// variants fire at most once per logical occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TaskEvent {
    StatusMessage(String),
    RemoveSource { url: String },
    RemoveRow,
    Progress(ProgressUpdate),
    Finished,
}

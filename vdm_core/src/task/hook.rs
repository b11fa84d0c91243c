use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::download_task::TaskState;
use crate::engine::fetch_engine::{ProgressHook, ProgressPayload};
use crate::progress::events::{ProgressUpdate, StatusLabel, TaskEvent};
use crate::progress::format::{format_duration, format_rate, format_size, IDLE_SPEED};
use crate::types::types::{DownloadError, RowId};

/// The callback a task registers with its fetch engine.
///
/// Each invocation is also the cancellation checkpoint: a stopped task makes
/// every subsequent call return `DownloadError::Cancelled` so the engine
/// aborts the transfer.
pub(crate) struct TaskProgressHook {
    state: Arc<Mutex<TaskState>>,
    cancel: CancellationToken,
    row: RowId,
    events: UnboundedSender<TaskEvent>,
}

impl TaskProgressHook {
    pub(crate) fn new(
        state: Arc<Mutex<TaskState>>,
        cancel: CancellationToken,
        row: RowId,
        events: UnboundedSender<TaskEvent>,
    ) -> Self {
        Self {
            state,
            cancel,
            row,
            events,
        }
    }

    fn emit(&self, event: TaskEvent) {
        // Receiver gone means the notifier already stopped; nothing to do.
        let _ = self.events.send(event);
    }
}

impl ProgressHook for TaskProgressHook {
    fn on_progress(&self, payload: &ProgressPayload) -> Result<(), DownloadError> {
        if self.cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        if payload.downloaded_bytes.is_some() {
            if payload.speed.is_some() {
                let update = {
                    let mut state = self.state.lock().unwrap();
                    state.speed = format_rate(payload.speed);
                    state.eta = format_duration(payload.eta.unwrap_or(0.0));
                    state.size = match payload.total_bytes {
                        Some(total) => format_size(Some(total)),
                        None => "unknown".to_string(),
                    };
                    ProgressUpdate {
                        row: self.row,
                        name: display_stem(&payload.filename),
                        size: state.size.clone(),
                        eta: state.eta.clone(),
                        speed: state.speed.clone(),
                        status: StatusLabel::Engine(payload.status.clone()),
                    }
                };
                self.emit(TaskEvent::Progress(update));
            } else if payload.status == "finished" {
                // Raw transfer done but total size never arrived: the engine
                // is now post-processing.
                let update = {
                    let mut state = self.state.lock().unwrap();
                    state.file_name = display_stem(&payload.filename);
                    ProgressUpdate {
                        row: self.row,
                        name: state.file_name.clone(),
                        size: state.size.clone(),
                        eta: state.eta.clone(),
                        speed: state.speed.clone(),
                        status: StatusLabel::Converting,
                    }
                };
                self.emit(TaskEvent::Progress(update));
            }
        } else {
            // No byte count at all: the destination already exists and
            // nothing needs transferring.
            let update = {
                let mut state = self.state.lock().unwrap();
                state.size = format_size(payload.total_bytes);
                state.file_name = base_name(&payload.filename);
                state.speed = IDLE_SPEED.to_string();
                ProgressUpdate {
                    row: self.row,
                    name: state.file_name.clone(),
                    size: state.size.clone(),
                    eta: "00:00".to_string(),
                    speed: state.speed.clone(),
                    status: StatusLabel::Finished,
                }
            };
            self.emit(TaskEvent::Progress(update));
            self.emit(TaskEvent::StatusMessage("Already Downloaded".to_string()));
            self.emit(TaskEvent::RemoveRow);
        }

        Ok(())
    }
}

/// Last path component truncated at the first `.`.
fn display_stem(path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    base.split('.').next().unwrap_or_default().to_string()
}

/// Last `/`-separated component, extension kept.
fn base_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

use std::path::MAIN_SEPARATOR;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_util::sync::CancellationToken;

use super::hook::TaskProgressHook;
use crate::engine::fetch_engine::{EngineConfig, FetchEngine, PostProcessor};
use crate::progress::events::{ProgressUpdate, StatusLabel, TaskEvent};
use crate::progress::format::{format_size, IDLE_SPEED};
use crate::progress::notifier::EventNotifier;
use crate::progress::observer::TaskObserver;
use crate::types::types::{DownloadError, TaskOptions, TaskOutcome, TaskPhase};

/// Mutable per-task display state, shared between the task and its hook.
///
/// Only the task's own execution and the hook it registers ever touch this;
/// no other task instance shares it.
pub(crate) struct TaskState {
    /// Resolved output file name. Empty until the hook learns it.
    pub(crate) file_name: String,
    pub(crate) speed: String,
    pub(crate) eta: String,
    pub(crate) size: String,
    pub(crate) phase: TaskPhase,
}

impl TaskState {
    fn new() -> Self {
        Self {
            file_name: String::new(),
            speed: IDLE_SPEED.to_string(),
            eta: "00:00".to_string(),
            size: format_size(None),
            phase: TaskPhase::Created,
        }
    }
}

/// Cloneable handle for stopping a task from any context, e.g. a UI thread.
#[derive(Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    /// Requests cancellation. Idempotent; safe before, during and after
    /// `run`. Nothing is emitted here; the hook observes the flag on its
    /// next invocation and performs the actual abort.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// One background download: drives a fetch engine, reports progress through
/// typed events, and supports cooperative cancellation.
///
/// `run` consumes the task, so each instance executes exactly once and emits
/// `TaskEvent::Finished` exactly once on every terminal path.
pub struct DownloadTask {
    options: TaskOptions,
    engine: Arc<dyn FetchEngine>,
    state: Arc<Mutex<TaskState>>,
    error_occurred: AtomicBool,
    cancel: CancellationToken,
    notifier: EventNotifier,
}

impl DownloadTask {
    pub fn new(options: TaskOptions, engine: Arc<dyn FetchEngine>) -> Self {
        Self {
            options,
            engine,
            state: Arc::new(Mutex::new(TaskState::new())),
            error_occurred: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            notifier: EventNotifier::new(),
        }
    }

    /// Register an observer. Must be called before `run()`.
    pub fn add_observer(&mut self, observer: Box<dyn TaskObserver>) {
        self.notifier.add_observer(observer);
    }

    /// Handle for stopping this task from another context.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    pub fn options(&self) -> &TaskOptions {
        &self.options
    }

    pub fn phase(&self) -> TaskPhase {
        self.state.lock().unwrap().phase
    }

    /// Runs the task to completion and returns the terminal outcome.
    ///
    /// The task spawns its notifier, emits the `Starting` row, drives the
    /// engine, emits the terminal sequence for whichever branch was taken,
    /// then closes the channel and waits for the notifier so every event is
    /// delivered before this returns.
    pub async fn run(mut self) -> TaskOutcome {
        self.set_phase(TaskPhase::Running);
        log::info!(
            "[download_task] row={} starting {}",
            self.options.row,
            self.options.url
        );

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let notifier = std::mem::replace(&mut self.notifier, EventNotifier::new());
        let notifier_handle = tokio::spawn(notifier.run(events_rx));

        emit(
            &events_tx,
            TaskEvent::Progress(ProgressUpdate {
                row: self.options.row,
                name: self.options.url.clone(),
                size: String::new(),
                eta: String::new(),
                speed: String::new(),
                status: StatusLabel::Starting,
            }),
        );

        let result = self.download(&events_tx).await;

        if result.as_ref().is_err_and(|err| err.is_cancelled()) {
            // Cancelled tasks end silently: one Finished, nothing else.
            self.cancel.cancel();
            emit(&events_tx, TaskEvent::Finished);
            self.set_phase(TaskPhase::Cancelled);
            log::info!("[download_task] row={} cancelled", self.options.row);
            self.set_phase(TaskPhase::Terminated);
            drop(events_tx);
            let _ = notifier_handle.await;
            return TaskOutcome::Cancelled;
        }

        let failed = self.error_occurred.load(Ordering::Acquire);
        if !failed {
            let (name, size, speed) = {
                let state = self.state.lock().unwrap();
                (
                    state.file_name.clone(),
                    state.size.clone(),
                    state.speed.clone(),
                )
            };
            emit(
                &events_tx,
                TaskEvent::Progress(ProgressUpdate {
                    row: self.options.row,
                    name,
                    size,
                    eta: "00:00".to_string(),
                    speed,
                    status: StatusLabel::Finished,
                }),
            );
            emit(
                &events_tx,
                TaskEvent::StatusMessage("Done!".to_string()),
            );
            self.set_phase(TaskPhase::Succeeded);
            log::info!("[download_task] row={} done", self.options.row);
        } else {
            self.set_phase(TaskPhase::Failed);
        }

        emit(
            &events_tx,
            TaskEvent::RemoveSource {
                url: self.options.url.clone(),
            },
        );
        // Done is monotonic: late hook invocations abort, the object is inert.
        self.cancel.cancel();
        emit(&events_tx, TaskEvent::Finished);
        self.set_phase(TaskPhase::Terminated);

        drop(events_tx);
        let _ = notifier_handle.await;

        if failed {
            TaskOutcome::Failed
        } else {
            TaskOutcome::Succeeded
        }
    }

    /// Builds the engine configuration and drives the transfer once.
    async fn download(&self, events: &UnboundedSender<TaskEvent>) -> Result<(), DownloadError> {
        let config = self.engine_config();
        let hook = TaskProgressHook::new(
            Arc::clone(&self.state),
            self.cancel.clone(),
            self.options.row,
            events.clone(),
        );

        match self.engine.fetch(&config, &self.options.url, &hook).await {
            Ok(()) => Ok(()),
            Err(DownloadError::Cancelled) => Err(DownloadError::Cancelled),
            Err(err) => {
                self.error_occurred.store(true, Ordering::Release);
                log::error!(
                    "[download_task] row={} failed: {}",
                    self.options.row,
                    err
                );
                emit(events, TaskEvent::RemoveRow);
                // The terminal sequence repeats RemoveSource on this path;
                // observers see it twice for a categorized failure.
                emit(
                    events,
                    TaskEvent::RemoveSource {
                        url: self.options.url.clone(),
                    },
                );
                emit(events, TaskEvent::StatusMessage(err.to_string()));
                Err(err)
            }
        }
    }

    fn engine_config(&self) -> EngineConfig {
        let directory = if self.options.directory.is_empty() {
            String::new()
        } else {
            let trimmed = self
                .options
                .directory
                .trim_end_matches(['/', '\\'])
                .to_string();
            format!("{}{}", trimmed, MAIN_SEPARATOR)
        };
        EngineConfig {
            output_template: format!("{}%(title)s-%(id)s.%(ext)s", directory),
            resume: true,
            quiet: true,
            proxy: self.options.proxy.clone(),
            postprocessors: self
                .options
                .convert_format
                .as_ref()
                .map(|format| {
                    vec![PostProcessor::VideoConvertor {
                        preferred_format: format.clone(),
                    }]
                })
                .unwrap_or_default(),
            keep_original: self.options.keep_file,
        }
    }

    fn set_phase(&self, phase: TaskPhase) {
        self.state.lock().unwrap().phase = phase;
    }
}

fn emit(events: &UnboundedSender<TaskEvent>, event: TaskEvent) {
    // Receiver gone means the notifier already stopped; nothing to do.
    let _ = events.send(event);
}

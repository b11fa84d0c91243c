//! Background media-download tasks: drive an external fetch engine, report
//! ordered progress events to observers, and cancel cooperatively.

pub mod engine;
pub mod progress;
pub mod task;
pub mod types;

pub use engine::{EngineConfig, FetchEngine, PostProcessor, ProgressHook, ProgressPayload, YtDlpEngine};
pub use progress::{EventNotifier, ProgressUpdate, StatusLabel, TaskEvent, TaskObserver};
pub use task::{DownloadTask, StopHandle};
pub use types::types::{
    CoordinatorId, DownloadError, RowId, TaskOptions, TaskOutcome, TaskPhase,
};

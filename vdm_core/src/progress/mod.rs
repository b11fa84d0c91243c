pub mod events;
pub mod format;
pub mod notifier;
pub mod observer;

// Convenient re-exports
pub use events::{ProgressUpdate, StatusLabel, TaskEvent};
pub use format::{format_duration, format_rate, format_size, IDLE_SPEED};
pub use notifier::EventNotifier;
pub use observer::TaskObserver;

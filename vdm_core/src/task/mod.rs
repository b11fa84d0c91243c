pub mod download_task;
mod hook;

pub use download_task::{DownloadTask, StopHandle};

pub mod fetch_engine;
pub mod ytdlp;

pub use fetch_engine::{EngineConfig, FetchEngine, PostProcessor, ProgressHook, ProgressPayload};
pub use ytdlp::YtDlpEngine;

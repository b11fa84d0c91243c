use std::sync::Arc;

use clap::Parser;

use vdm_core::engine::YtDlpEngine;
use vdm_core::task::DownloadTask;
use vdm_core::types::types::{RowId, TaskOptions, TaskOutcome};

mod terminal_observer;
use terminal_observer::TerminalObserver;

#[derive(Parser)]
#[command(name = "vdm", about = "Video download manager")]
struct Args {
    /// URL to download
    url: String,

    /// Destination directory (defaults to the current one)
    #[arg(short, long, default_value = "")]
    directory: String,

    /// Re-encode into this container format after downloading
    #[arg(long)]
    convert: Option<String>,

    /// Proxy address handed to the fetch engine
    #[arg(long)]
    proxy: Option<String>,

    /// Keep the original file next to the converted one
    #[arg(short, long)]
    keep_file: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut options = TaskOptions::new(args.url.clone(), RowId(0))
        .with_directory(args.directory)
        .with_keep_file(args.keep_file);
    if let Some(format) = args.convert {
        options = options.with_convert_format(format);
    }
    if let Some(proxy) = args.proxy {
        options = options.with_proxy(proxy);
    }

    let mut task = DownloadTask::new(options, Arc::new(YtDlpEngine::new()));
    task.add_observer(Box::new(TerminalObserver::new()));

    // Ctrl-C requests cooperative cancellation; the hook aborts the engine
    // at its next progress callback.
    let handle = task.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("ctrl-c received, stopping");
            handle.stop();
        }
    });

    println!("Starting download: {}", args.url);
    match task.run().await {
        TaskOutcome::Succeeded => println!("Download completed"),
        TaskOutcome::Cancelled => println!("Download cancelled"),
        TaskOutcome::Failed => {
            eprintln!("Download failed");
            std::process::exit(1);
        }
    }
}

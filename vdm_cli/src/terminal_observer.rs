use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

use vdm_core::progress::events::ProgressUpdate;
use vdm_core::progress::observer::TaskObserver;

/// Renders one task's row as an indicatif spinner line.
///
/// The task pre-formats size/eta/speed, so this observer only lays the
/// fields out; status messages print above the live line.
pub struct TerminalObserver {
    bar: ProgressBar,
    /// Set once the row is retired; later updates are dropped.
    retired: Mutex<bool>,
}

impl TerminalObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            retired: Mutex::new(false),
        }
    }
}

#[async_trait]
impl TaskObserver for TerminalObserver {
    async fn on_status_message(&self, text: &str) {
        self.bar.println(text);
    }

    async fn on_remove_source(&self, url: &str) {
        log::debug!("[terminal_observer] source retired: {}", url);
    }

    async fn on_remove_row(&self) {
        let mut retired = self.retired.lock().unwrap();
        if !*retired {
            *retired = true;
            self.bar.finish_and_clear();
        }
    }

    async fn on_progress(&self, update: &ProgressUpdate) {
        if *self.retired.lock().unwrap() {
            return;
        }
        self.bar.set_message(format!(
            "{}  {}  ETA {}  {}  [{}]",
            update.name, update.size, update.eta, update.speed, update.status
        ));
    }

    async fn on_finished(&self) {
        let mut retired = self.retired.lock().unwrap();
        if !*retired {
            *retired = true;
            self.bar.finish();
        }
    }
}

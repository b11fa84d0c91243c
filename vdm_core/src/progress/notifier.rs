use tokio::sync::mpsc;

use super::events::TaskEvent;
use super::observer::TaskObserver;

/// Consumes `TaskEvent`s from a task's channel and fans them out to all
/// registered observers.
///
/// Events are delivered in emission order; observers are invoked in
/// registration order for each event. `run` returns once the channel closes,
/// which the task arranges to happen only after its final `Finished` event.
pub struct EventNotifier {
    observers: Vec<Box<dyn TaskObserver>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Register an observer. Must be called before `run()`.
    pub fn add_observer(&mut self, observer: Box<dyn TaskObserver>) {
        self.observers.push(observer);
    }

    /// Drain events until all senders are dropped.
    pub async fn run(self, mut events_rx: mpsc::UnboundedReceiver<TaskEvent>) {
        while let Some(event) = events_rx.recv().await {
            self.dispatch(&event).await;
        }
    }

    async fn dispatch(&self, event: &TaskEvent) {
        for observer in &self.observers {
            match event {
                TaskEvent::StatusMessage(text) => observer.on_status_message(text).await,
                TaskEvent::RemoveSource { url } => observer.on_remove_source(url).await,
                TaskEvent::RemoveRow => observer.on_remove_row().await,
                TaskEvent::Progress(update) => observer.on_progress(update).await,
                TaskEvent::Finished => observer.on_finished().await,
            }
        }
    }
}

impl Default for EventNotifier {
    fn default() -> Self {
        Self::new()
    }
}

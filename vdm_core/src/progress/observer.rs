use async_trait::async_trait;

use super::events::ProgressUpdate;

/// Trait for anything that wants to observe a download task.
///
/// The `EventNotifier` calls these methods, in per-task emission order, as it
/// drains the task's event channel. All methods run on the notifier's own
/// task, never on a UI context; implementations marshal to their own
/// context as needed.
///
/// Lifecycle:
/// - `on_progress` is called for every row update, including the initial
///   `Starting` one and the terminal `Finished` one.
/// - `on_status_message` may be called any number of times.
/// - `on_remove_source` / `on_remove_row` retire the source URL and the
///   observer-visible row.
/// - `on_finished` is called exactly once per task execution, on every
///   terminal path.
#[async_trait]
pub trait TaskObserver: Send + Sync + 'static {
    async fn on_status_message(&self, text: &str);

    async fn on_remove_source(&self, url: &str);

    async fn on_remove_row(&self);

    async fn on_progress(&self, update: &ProgressUpdate);

    async fn on_finished(&self);
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use vdm_core::progress::events::{ProgressUpdate, StatusLabel, TaskEvent};
use vdm_core::progress::notifier::EventNotifier;
use vdm_core::progress::observer::TaskObserver;
use vdm_core::types::types::RowId;

/// Collapses every callback into a short tag so ordering is easy to assert.
struct TaggingObserver {
    tags: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TaskObserver for TaggingObserver {
    async fn on_status_message(&self, text: &str) {
        self.tags.lock().unwrap().push(format!("status:{}", text));
    }

    async fn on_remove_source(&self, url: &str) {
        self.tags.lock().unwrap().push(format!("remove-source:{}", url));
    }

    async fn on_remove_row(&self) {
        self.tags.lock().unwrap().push("remove-row".to_string());
    }

    async fn on_progress(&self, update: &ProgressUpdate) {
        self.tags
            .lock()
            .unwrap()
            .push(format!("progress:{}", update.status));
    }

    async fn on_finished(&self) {
        self.tags.lock().unwrap().push("finished".to_string());
    }
}

fn sample_update(status: StatusLabel) -> ProgressUpdate {
    ProgressUpdate {
        row: RowId(1),
        name: "clip".to_string(),
        size: "1.00MiB".to_string(),
        eta: "00:10".to_string(),
        speed: " 1.00KiB/s".to_string(),
        status,
    }
}

#[tokio::test]
async fn test_events_reach_observer_in_emission_order() {
    let tags = Arc::new(Mutex::new(Vec::new()));
    let mut notifier = EventNotifier::new();
    notifier.add_observer(Box::new(TaggingObserver { tags: tags.clone() }));

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(TaskEvent::Progress(sample_update(StatusLabel::Starting)))
        .unwrap();
    tx.send(TaskEvent::Progress(sample_update(StatusLabel::Engine(
        "downloading".to_string(),
    ))))
    .unwrap();
    tx.send(TaskEvent::StatusMessage("Done!".to_string())).unwrap();
    tx.send(TaskEvent::RemoveSource {
        url: "https://media.example/v".to_string(),
    })
    .unwrap();
    tx.send(TaskEvent::RemoveRow).unwrap();
    tx.send(TaskEvent::Finished).unwrap();
    drop(tx);

    notifier.run(rx).await;

    assert_eq!(
        *tags.lock().unwrap(),
        vec![
            "progress:Starting".to_string(),
            "progress:downloading".to_string(),
            "status:Done!".to_string(),
            "remove-source:https://media.example/v".to_string(),
            "remove-row".to_string(),
            "finished".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_every_observer_sees_every_event() {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let mut notifier = EventNotifier::new();
    notifier.add_observer(Box::new(TaggingObserver { tags: first.clone() }));
    notifier.add_observer(Box::new(TaggingObserver {
        tags: second.clone(),
    }));

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(TaskEvent::StatusMessage("Already Downloaded".to_string()))
        .unwrap();
    tx.send(TaskEvent::Finished).unwrap();
    drop(tx);

    notifier.run(rx).await;

    let expected = vec![
        "status:Already Downloaded".to_string(),
        "finished".to_string(),
    ];
    assert_eq!(*first.lock().unwrap(), expected);
    assert_eq!(*second.lock().unwrap(), expected);
}

#[tokio::test]
async fn test_run_returns_once_channel_closes() {
    let notifier = EventNotifier::new();
    let (tx, rx) = mpsc::unbounded_channel::<TaskEvent>();
    drop(tx);
    // No observers, no events: run must still terminate cleanly.
    notifier.run(rx).await;
}

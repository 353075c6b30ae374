//! Keeps an ordered task list in sync from realtime database child events.
//!
//! The child events are pushed by hand through a `MemorySource`, the way an
//! `on_child_*` listener would deliver them, and the resulting list is read
//! back as a stream.

use firebase_rs_rx::changes::ListenOptions;
use firebase_rs_rx::database::{list_val, ChildEvent, ChildEventType, DataSnapshot};
use firebase_rs_rx::observable::{MemorySource, Observable};
use futures::StreamExt;
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tasks = MemorySource::new();
    let mut list = list_val(
        Observable::from_source(tasks.clone()),
        &ListenOptions::default(),
        Some("key".to_string()),
    )
    .into_stream();

    tasks.emit(ChildEvent::initial_batch(vec![
        DataSnapshot::new("t1", json!({ "title": "Write the report" })),
        DataSnapshot::new("t2", json!({ "title": "Review pull requests" })),
    ]));
    tasks.emit(vec![ChildEvent::new(
        ChildEventType::Added,
        DataSnapshot::new("t3", json!({ "title": "Plan the sprint" })),
        None,
    )]);
    tasks.emit(vec![ChildEvent::new(
        ChildEventType::Moved,
        DataSnapshot::new("t1", json!({ "title": "Write the report" })),
        Some("t2".to_string()),
    )]);

    for _ in 0..3 {
        let Some(items) = list.next().await else {
            break;
        };
        let titles: Vec<String> = items?
            .iter()
            .map(|item| format!("{} ({})", item["title"], item["key"]))
            .collect();
        println!("tasks: {}", titles.join(", "));
    }

    Ok(())
}

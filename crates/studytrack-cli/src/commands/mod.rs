pub mod challenge;
pub mod config;
pub mod level;
pub mod session;
pub mod stats;
pub mod streak;
pub mod task;
pub mod timer;

use std::error::Error;
use std::sync::Arc;

use studytrack_core::{Config, Event, LogNotifier, SqliteStore, StudyTracker, SystemClock};

pub type CmdResult = Result<(), Box<dyn Error>>;

/// Restore the tracker, catch up on time spent since the last command,
/// run `f`, then record the suspension instant for the next invocation.
pub fn with_tracker<F>(f: F) -> CmdResult
where
    F: FnOnce(&mut StudyTracker) -> CmdResult,
{
    let config = Config::load()?;
    let store = SqliteStore::open()?;
    let notifier = LogNotifier::new(config.notifications.enabled);
    let mut tracker = StudyTracker::new(
        config,
        Arc::new(SystemClock),
        Arc::new(notifier),
        Arc::new(store),
    );

    tracker.on_foreground();
    let result = f(&mut tracker);
    tracker.enter_background();

    for event in tracker.drain_events() {
        tracing::info!(?event, "unreported event");
    }
    result
}

pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print every pending event as JSON.
pub fn print_events(tracker: &mut StudyTracker) -> CmdResult {
    let events: Vec<Event> = tracker.drain_events();
    if !events.is_empty() {
        print_json(&events)?;
    }
    Ok(())
}

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::Notifier;
use crate::error::NotifyError;

/// One request received by a [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifierCall {
    OneShot {
        id: String,
        delay_secs: u64,
        title: String,
        body: String,
    },
    Cancel {
        id: String,
    },
    Immediate {
        title: String,
        body: String,
    },
    Daily {
        id: String,
        hour: u32,
        minute: u32,
        title: String,
        body: String,
    },
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<NotifierCall>,
    /// One-shots scheduled and not yet cancelled, by id.
    pending: BTreeMap<String, u64>,
    daily: BTreeMap<String, (u32, u32)>,
}

/// Notifier that remembers every call and which one-shots are pending.
///
/// Scheduling an id that is already pending replaces it, as a platform
/// notification centre does.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    inner: Mutex<Recorded>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Recorded) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.with(|r| r.calls.clone())
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.with(|r| r.pending.contains_key(id))
    }

    /// Delay of a pending one-shot, if any.
    pub fn pending_delay(&self, id: &str) -> Option<u64> {
        self.with(|r| r.pending.get(id).copied())
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.with(|r| r.pending.keys().cloned().collect())
    }

    pub fn daily_ids(&self) -> Vec<String> {
        self.with(|r| r.daily.keys().cloned().collect())
    }

    /// Bodies of every immediate notification, in order.
    pub fn immediate_bodies(&self) -> Vec<String> {
        self.with(|r| {
            r.calls
                .iter()
                .filter_map(|c| match c {
                    NotifierCall::Immediate { body, .. } => Some(body.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    pub fn clear(&self) {
        self.with(|r| *r = Recorded::default());
    }
}

impl Notifier for RecordingNotifier {
    fn schedule_one_shot(
        &self,
        id: &str,
        delay_secs: u64,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        self.with(|r| {
            r.pending.insert(id.to_string(), delay_secs);
            r.calls.push(NotifierCall::OneShot {
                id: id.to_string(),
                delay_secs,
                title: title.to_string(),
                body: body.to_string(),
            });
        });
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), NotifyError> {
        self.with(|r| {
            r.pending.remove(id);
            r.daily.remove(id);
            r.calls.push(NotifierCall::Cancel { id: id.to_string() });
        });
        Ok(())
    }

    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.with(|r| {
            r.calls.push(NotifierCall::Immediate {
                title: title.to_string(),
                body: body.to_string(),
            })
        });
        Ok(())
    }

    fn schedule_daily(
        &self,
        id: &str,
        hour: u32,
        minute: u32,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        self.with(|r| {
            r.daily.insert(id.to_string(), (hour, minute));
            r.calls.push(NotifierCall::Daily {
                id: id.to_string(),
                hour,
                minute,
                title: title.to_string(),
                body: body.to_string(),
            });
        });
        Ok(())
    }
}

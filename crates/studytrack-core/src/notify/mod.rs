//! Fire-and-forget user notifications.
//!
//! The core never observes delivery. Every call goes through [`deliver`],
//! which logs a failure and moves on.

mod recording;
pub mod reminders;

pub use recording::{NotifierCall, RecordingNotifier};

use crate::error::NotifyError;

/// Identifier of the pending "focus phase complete" notification.
pub const FOCUS_TIMER_ID: &str = "focus_timer";
/// Identifier of the pending "break phase complete" notification.
pub const BREAK_TIMER_ID: &str = "break_timer";

/// Host notification capability.
pub trait Notifier: Send + Sync {
    fn schedule_one_shot(
        &self,
        id: &str,
        delay_secs: u64,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;

    fn cancel(&self, id: &str) -> Result<(), NotifyError>;

    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError>;

    fn schedule_daily(
        &self,
        id: &str,
        hour: u32,
        minute: u32,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError>;
}

/// Swallow a notifier result, logging failures.
pub fn deliver(what: &str, result: Result<(), NotifyError>) {
    if let Err(e) = result {
        tracing::warn!(what, error = %e, "notification dropped");
    }
}

/// Send a celebration message right away.
pub fn celebrate(notifier: &dyn Notifier, message: &str) {
    deliver("celebration", notifier.send_immediate("Congratulations!", message));
}

/// Notifier that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn schedule_one_shot(&self, _: &str, _: u64, _: &str, _: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn cancel(&self, _: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn send_immediate(&self, _: &str, _: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn schedule_daily(&self, _: &str, _: u32, _: u32, _: &str, _: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Notifier that writes every request to the `tracing` log.
///
/// Used by the CLI, which has no notification centre to hand off to.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier {
    pub enabled: bool,
}

impl LogNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn check(&self) -> Result<(), NotifyError> {
        if self.enabled {
            Ok(())
        } else {
            Err(NotifyError::Disabled)
        }
    }
}

impl Notifier for LogNotifier {
    fn schedule_one_shot(
        &self,
        id: &str,
        delay_secs: u64,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        self.check()?;
        tracing::info!(id, delay_secs, title, body, "notification scheduled");
        Ok(())
    }

    fn cancel(&self, id: &str) -> Result<(), NotifyError> {
        tracing::debug!(id, "notification cancelled");
        Ok(())
    }

    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.check()?;
        tracing::info!(title, body, "notification sent");
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
        self.check()?;
        tracing::info!(id, hour, minute, title, body, "daily notification scheduled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_log_notifier_rejects_but_deliver_swallows() {
        let notifier = LogNotifier::new(false);
        assert!(matches!(
            notifier.send_immediate("t", "b"),
            Err(NotifyError::Disabled)
        ));
        deliver("test", notifier.send_immediate("t", "b"));
        assert!(notifier.cancel(FOCUS_TIMER_ID).is_ok());
    }
}

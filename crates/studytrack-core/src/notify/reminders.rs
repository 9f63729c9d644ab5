//! Recurring daily reminders.

use super::{deliver, Notifier};
use crate::storage::NotificationsConfig;

pub const MORNING_MOTIVATION_ID: &str = "morning_motivation";
pub const LUNCH_REMINDER_ID: &str = "lunch_reminder";
pub const EVENING_PUSH_ID: &str = "evening_push";
pub const STREAK_PROTECTION_ID: &str = "streak_protection";

/// Schedule the motivation, lunch and evening reminders, plus the streak
/// protection reminder when there is a streak to protect.
pub fn schedule_daily_reminders(
    notifier: &dyn Notifier,
    config: &NotificationsConfig,
    current_streak: u32,
) {
    if !config.enabled || !config.daily_reminders {
        return;
    }
    deliver(
        MORNING_MOTIVATION_ID,
        notifier.schedule_daily(
            MORNING_MOTIVATION_ID,
            config.morning_hour,
            0,
            "Good morning!",
            "Ready to start? Your brain is at peak energy right now.",
        ),
    );
    deliver(
        LUNCH_REMINDER_ID,
        notifier.schedule_daily(
            LUNCH_REMINDER_ID,
            config.lunch_hour,
            0,
            "Lunch time",
            "How about 25 minutes of study after lunch?",
        ),
    );
    deliver(
        EVENING_PUSH_ID,
        notifier.schedule_daily(
            EVENING_PUSH_ID,
            config.evening_hour,
            0,
            "Don't forget your daily goal!",
            "There is still time to keep your streak alive today.",
        ),
    );
    refresh_streak_protection(notifier, config, current_streak);
}

/// Replace the evening streak-protection reminder so it quotes the
/// current streak. A zero streak has nothing to protect.
pub fn refresh_streak_protection(
    notifier: &dyn Notifier,
    config: &NotificationsConfig,
    current_streak: u32,
) {
    deliver(STREAK_PROTECTION_ID, notifier.cancel(STREAK_PROTECTION_ID));
    if !config.enabled || current_streak == 0 {
        return;
    }
    let body = format!(
        "You have a {current_streak}-day streak. Study now so you don't lose it!"
    );
    deliver(
        STREAK_PROTECTION_ID,
        notifier.schedule_daily(
            STREAK_PROTECTION_ID,
            config.streak_protection_hour,
            0,
            "Your streak is at risk!",
            &body,
        ),
    );
}

pub fn cancel_daily_reminders(notifier: &dyn Notifier) {
    for id in [
        MORNING_MOTIVATION_ID,
        LUNCH_REMINDER_ID,
        EVENING_PUSH_ID,
        STREAK_PROTECTION_ID,
    ] {
        deliver(id, notifier.cancel(id));
    }
}

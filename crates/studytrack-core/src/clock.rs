//! Time and calendar-day semantics.
//!
//! Every engine asks the injected [`Clock`] for "now" and for calendar-day
//! boundaries instead of calling `Utc::now()` directly. Timestamps are
//! always stored in UTC; the clock decides which local calendar day a
//! timestamp falls on.

use std::sync::Mutex;

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
    Timelike, Utc,
};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Local calendar day containing `at`.
    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate;

    /// Instant of local midnight at the start of `day`.
    fn start_of_date(&self, day: NaiveDate) -> DateTime<Utc>;

    /// Local wall-clock hour (0-23) of `at`.
    fn hour_of(&self, at: DateTime<Utc>) -> u32;

    fn today(&self) -> NaiveDate {
        self.day_of(self.now())
    }

    fn start_of_day(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        self.start_of_date(self.day_of(at))
    }

    /// First instant of the local day after the one containing `at`.
    fn next_midnight(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let day = self.day_of(at);
        match day.succ_opt() {
            Some(next) => self.start_of_date(next),
            None => at + Duration::days(1),
        }
    }

    fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.day_of(a) == self.day_of(b)
    }

    /// Whole calendar days from `a` to `b` (negative when `b` is earlier).
    fn days_between(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
        (self.day_of(b) - self.day_of(a)).num_days()
    }
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// Wall clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    fn start_of_date(&self, day: NaiveDate) -> DateTime<Utc> {
        let local = midnight(day);
        // A DST jump can skip local midnight; fall back to the UTC reading.
        Local
            .from_local_datetime(&local)
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }

    fn hour_of(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&Local).hour()
    }
}

/// Manually driven clock with a fixed UTC offset.
///
/// Used by tests and by hosts that replay time deterministically.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at `start`, with calendar days in UTC.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::with_offset(start, 0)
    }

    /// Clock frozen at `start`, with calendar days computed at
    /// `offset_secs` east of UTC. Out-of-range offsets fall back to UTC.
    pub fn with_offset(start: DateTime<Utc>, offset_secs: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
        Self {
            now: Mutex::new(start),
            offset,
        }
    }

    /// Clock at `hour:minute` local time on `day`.
    pub fn on_day(day: NaiveDate, hour: u32, minute: u32) -> Self {
        let naive = day
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| midnight(day));
        Self::new(Utc.from_utc_datetime(&naive))
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    fn start_of_date(&self, day: NaiveDate) -> DateTime<Utc> {
        let shifted = midnight(day) - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&shifted)
    }

    fn hour_of(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.offset).hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_boundaries_follow_offset() {
        // 2025-10-20 23:30 UTC is already the 21st at UTC+2.
        let at = Utc.with_ymd_and_hms(2025, 10, 20, 23, 30, 0).unwrap();
        let utc = ManualClock::new(at);
        let east = ManualClock::with_offset(at, 2 * 3600);

        assert_eq!(utc.today(), ymd(2025, 10, 20));
        assert_eq!(east.today(), ymd(2025, 10, 21));
        assert_eq!(
            east.start_of_day(at),
            Utc.with_ymd_and_hms(2025, 10, 20, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn days_between_counts_calendar_days() {
        let clock = ManualClock::new(Utc::now());
        let a = Utc.with_ymd_and_hms(2025, 10, 20, 23, 59, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 10, 21, 0, 1, 0).unwrap();
        assert_eq!(clock.days_between(a, b), 1);
        assert_eq!(clock.days_between(b, a), -1);
        assert!(!clock.is_same_day(a, b));
    }

    #[test]
    fn next_midnight_is_start_of_following_day() {
        let clock = ManualClock::on_day(ymd(2025, 12, 31), 15, 0);
        assert_eq!(
            clock.next_midnight(clock.now()),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn advance_moves_now() {
        let clock = ManualClock::on_day(ymd(2025, 10, 20), 9, 0);
        clock.advance_days(1);
        clock.advance_secs(90);
        assert_eq!(clock.today(), ymd(2025, 10, 21));
        assert_eq!(clock.hour_of(clock.now()), 9);
    }
}

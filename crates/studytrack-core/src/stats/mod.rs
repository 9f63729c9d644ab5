//! Chart and heatmap aggregation over the session history.
//!
//! Everything here is a pure function of the recorded sessions and the
//! clock's notion of local days and hours.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::history::StudySession;

/// Hours of study that saturate a heatmap cell.
pub const HEATMAP_FULL_HOURS: f64 = 6.0;
/// Days shown by the activity heatmap.
pub const HEATMAP_DAYS: usize = 28;
/// First and last hour of day shown by the hourly distribution.
pub const HOURLY_RANGE: std::ops::RangeInclusive<u32> = 8..=22;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Week,
    Month,
    Year,
}

impl std::str::FromStr for TimeRange {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "year" => Ok(TimeRange::Year),
            _ => Err(crate::error::ValidationError::InvalidValue {
                field: "range".to_string(),
                message: format!("expected week, month or year, got {s:?}"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatCell {
    pub day: NaiveDate,
    pub hours: f64,
    /// 0.0 ..= 1.0
    pub intensity: f64,
}

/// Read-only statistics view.
pub struct Stats<'a> {
    sessions: &'a [StudySession],
    clock: &'a dyn Clock,
}

impl<'a> Stats<'a> {
    pub fn new(sessions: &'a [StudySession], clock: &'a dyn Clock) -> Self {
        Self { sessions, clock }
    }

    fn seconds_by_day(&self) -> BTreeMap<NaiveDate, u64> {
        let mut days = BTreeMap::new();
        for session in self.sessions {
            *days.entry(self.clock.day_of(session.occurred_at)).or_insert(0) +=
                session.duration_secs;
        }
        days
    }

    pub fn hours_on(&self, day: NaiveDate) -> f64 {
        self.hours_between(day, day)
    }

    /// Hours studied from `first` to `last`, both inclusive.
    pub fn hours_between(&self, first: NaiveDate, last: NaiveDate) -> f64 {
        let secs: u64 = self
            .seconds_by_day()
            .range(first..=last)
            .map(|(_, secs)| *secs)
            .sum();
        secs as f64 / 3600.0
    }

    /// Hours studied on each day that has any study.
    pub fn hours_per_day(&self) -> BTreeMap<NaiveDate, f64> {
        self.seconds_by_day()
            .into_iter()
            .map(|(day, secs)| (day, secs as f64 / 3600.0))
            .collect()
    }

    pub fn chart(&self, range: TimeRange) -> Vec<ChartPoint> {
        match range {
            TimeRange::Week => self.week_chart(),
            TimeRange::Month => self.month_chart(),
            TimeRange::Year => self.year_chart(),
        }
    }

    /// Last seven days, oldest first, labelled by weekday.
    pub fn week_chart(&self) -> Vec<ChartPoint> {
        let today = self.clock.today();
        (0..7i64)
            .rev()
            .map(|ago| {
                let day = today - Duration::days(ago);
                ChartPoint {
                    label: day.weekday().to_string(),
                    hours: self.hours_on(day),
                }
            })
            .collect()
    }

    /// Last four 7-day windows ending today, oldest first, labelled by
    /// the window's first day (`dd/mm`).
    pub fn month_chart(&self) -> Vec<ChartPoint> {
        let today = self.clock.today();
        (0..4i64)
            .rev()
            .map(|weeks_ago| {
                let last = today - Duration::days(weeks_ago * 7);
                let first = last - Duration::days(6);
                ChartPoint {
                    label: first.format("%d/%m").to_string(),
                    hours: self.hours_between(first, last),
                }
            })
            .collect()
    }

    /// Last twelve calendar months including the current one, oldest
    /// first.
    pub fn year_chart(&self) -> Vec<ChartPoint> {
        let today = self.clock.today();
        let current = today.year() * 12 + today.month0() as i32;
        let mut totals: BTreeMap<i32, u64> = BTreeMap::new();
        for (day, secs) in self.seconds_by_day() {
            *totals.entry(day.year() * 12 + day.month0() as i32).or_insert(0) += secs;
        }
        (0..12)
            .rev()
            .map(|ago| {
                let index = current - ago;
                let month0 = index.rem_euclid(12) as usize;
                ChartPoint {
                    label: MONTH_LABELS[month0].to_string(),
                    hours: totals.get(&index).copied().unwrap_or(0) as f64 / 3600.0,
                }
            })
            .collect()
    }

    /// Heatmap of the last [`HEATMAP_DAYS`] days, oldest first.
    pub fn heatmap(&self) -> Vec<HeatCell> {
        let today = self.clock.today();
        (0..HEATMAP_DAYS as i64)
            .rev()
            .map(|ago| {
                let day = today - Duration::days(ago);
                let hours = self.hours_on(day);
                HeatCell {
                    day,
                    hours,
                    intensity: heat_intensity(hours),
                }
            })
            .collect()
    }

    /// Hours studied per local hour of day, over all sessions.
    pub fn hourly_distribution(&self) -> Vec<ChartPoint> {
        let mut by_hour: BTreeMap<u32, u64> = BTreeMap::new();
        for session in self.sessions {
            *by_hour
                .entry(self.clock.hour_of(session.occurred_at))
                .or_insert(0) += session.duration_secs;
        }
        HOURLY_RANGE
            .map(|hour| ChartPoint {
                label: format!("{hour}h"),
                hours: by_hour.get(&hour).copied().unwrap_or(0) as f64 / 3600.0,
            })
            .collect()
    }
}

pub fn heat_intensity(hours: f64) -> f64 {
    (hours / HEATMAP_FULL_HOURS).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn session(clock: &ManualClock, days_ago: i64, hour: u32, minutes: u64) -> StudySession {
        let day = clock.today() - Duration::days(days_ago);
        StudySession {
            id: Uuid::new_v4(),
            duration_secs: minutes * 60,
            category: "Pomodoro".into(),
            occurred_at: Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap()),
        }
    }

    fn clock() -> ManualClock {
        // Monday
        ManualClock::on_day(NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(), 20, 0)
    }

    #[test]
    fn week_chart_ends_today() {
        let clock = clock();
        let sessions = vec![session(&clock, 0, 9, 90), session(&clock, 6, 9, 60)];
        let chart = Stats::new(&sessions, &clock).week_chart();
        assert_eq!(chart.len(), 7);
        assert_eq!(chart[0].label, "Tue");
        assert_eq!(chart[0].hours, 1.0);
        assert_eq!(chart[6].label, "Mon");
        assert_eq!(chart[6].hours, 1.5);
    }

    #[test]
    fn month_chart_sums_windows() {
        let clock = clock();
        let sessions = vec![
            session(&clock, 0, 9, 60),
            session(&clock, 6, 9, 60),
            session(&clock, 7, 9, 120),
            session(&clock, 30, 9, 600),
        ];
        let chart = Stats::new(&sessions, &clock).month_chart();
        assert_eq!(chart.len(), 4);
        assert_eq!(chart[3].label, "14/10");
        assert_eq!(chart[3].hours, 2.0);
        assert_eq!(chart[2].hours, 2.0);
        assert_eq!(chart[0].hours, 0.0);
    }

    #[test]
    fn year_chart_wraps_months() {
        let clock = clock();
        let sessions = vec![session(&clock, 0, 9, 60), session(&clock, 300, 9, 120)];
        let chart = Stats::new(&sessions, &clock).year_chart();
        assert_eq!(chart.len(), 12);
        assert_eq!(chart[0].label, "Nov");
        assert_eq!(chart[11].label, "Oct");
        assert_eq!(chart[11].hours, 1.0);
        // 300 days before 2025-10-20 is 2024-12-24.
        assert_eq!(chart[1].label, "Dec");
        assert_eq!(chart[1].hours, 2.0);
    }

    #[test]
    fn heatmap_clamps_intensity() {
        let clock = clock();
        let sessions = vec![session(&clock, 0, 9, 600), session(&clock, 1, 9, 180)];
        let heatmap = Stats::new(&sessions, &clock).heatmap();
        assert_eq!(heatmap.len(), HEATMAP_DAYS);
        assert_eq!(heatmap[27].intensity, 1.0);
        assert_eq!(heatmap[26].intensity, 0.5);
        assert_eq!(heatmap[0].intensity, 0.0);
    }

    #[test]
    fn hourly_distribution_covers_working_hours() {
        let clock = clock();
        let sessions = vec![
            session(&clock, 0, 9, 30),
            session(&clock, 3, 9, 30),
            session(&clock, 0, 23, 60),
        ];
        let hourly = Stats::new(&sessions, &clock).hourly_distribution();
        assert_eq!(hourly.len(), 15);
        assert_eq!(hourly[0].label, "8h");
        assert_eq!(hourly[1].hours, 1.0);
        assert_eq!(hourly.iter().map(|p| p.hours).sum::<f64>(), 1.0);
    }

    #[test]
    fn parses_range() {
        assert_eq!("Week".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert!("decade".parse::<TimeRange>().is_err());
    }
}

//! Alert Scheduling
//!
//! Alert-type accounts are billed on a future date chosen by the donor. Each
//! account carries the rules that decide which dates can be offered: a
//! minimum notice period, a daily cut-off time after which today no longer
//! counts, the weekdays the account runs on, and backend-supplied blocked
//! ranges (holidays, closures).

use std::str::FromStr;

use jiff::{
    Span,
    civil::{Date, DateTime, Time, Weekday},
};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while parsing scheduling metadata from the catalog.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The week schedule was not seven `0`/`1` flags.
    #[error("week schedule must be seven 0/1 flags, got {0:?}")]
    InvalidWeekSchedule(String),

    /// The cut-off time was not a valid time of day.
    #[error("invalid cut-off time {0:?}")]
    InvalidCutOffTime(String),
}

/// Weekdays an alert account runs on, indexed from Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSchedule([bool; 7]);

impl WeekSchedule {
    /// A schedule that allows every weekday.
    #[must_use]
    pub const fn every_day() -> Self {
        Self([true; 7])
    }

    /// Whether alerts may fall on the given weekday.
    #[must_use]
    pub fn allows(self, weekday: Weekday) -> bool {
        usize::try_from(weekday.to_sunday_zero_offset())
            .ok()
            .and_then(|index| self.0.get(index).copied())
            .unwrap_or(false)
    }
}

impl Default for WeekSchedule {
    fn default() -> Self {
        Self::every_day()
    }
}

impl FromStr for WeekSchedule {
    type Err = ScheduleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidWeekSchedule(value.to_string());

        let trimmed = value.trim();

        if trimmed.chars().count() != 7 {
            return Err(invalid());
        }

        let mut days = [false; 7];

        for (slot, flag) in days.iter_mut().zip(trimmed.chars()) {
            *slot = match flag {
                '1' => true,
                '0' => false,
                _ => return Err(invalid()),
            };
        }

        Ok(Self(days))
    }
}

/// Parse an `HH:MM[:SS]` cut-off time. Blank input means no cut-off.
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidCutOffTime`] when the value is not a time of day.
pub fn parse_cut_off_time(value: &str) -> Result<Option<Time>, ScheduleError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<Time>()
        .map(Some)
        .map_err(|_parse_error| ScheduleError::InvalidCutOffTime(value.to_string()))
}

/// Parse a comma-separated list of preset donation amounts.
///
/// Entries that are not numbers are dropped.
#[must_use]
pub fn parse_default_values(value: &str) -> Vec<Decimal> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| entry.parse::<Decimal>().ok())
        .collect()
}

/// Format an alert date the way the payments endpoint expects it.
#[must_use]
pub fn format_alert_date(date: Date) -> String {
    date.strftime("%Y-%m-%d").to_string()
}

/// An inclusive range of dates on which alerts cannot be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedRange {
    /// First blocked date.
    pub start: Date,

    /// Last blocked date.
    pub end: Date,
}

impl BlockedRange {
    /// Whether `date` falls within this range.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Scheduling metadata carried by a catalog account and its cart lines.
///
/// The cart never interprets these values; they travel with the line so a
/// date picker can be re-opened when the operator edits the item.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingMetadata {
    /// Minimum number of days between today and the alert date.
    pub advance_notice_days: u32,

    /// Time of day after which today no longer counts towards the notice period.
    pub cut_off_time: Option<Time>,

    /// Weekdays the account accepts alerts on.
    pub week_schedule: WeekSchedule,

    /// Preset amounts offered on the amount keypad.
    pub default_values: Vec<Decimal>,
}

impl Default for SchedulingMetadata {
    fn default() -> Self {
        Self {
            advance_notice_days: 0,
            cut_off_time: None,
            week_schedule: WeekSchedule::every_day(),
            default_values: Vec::new(),
        }
    }
}

impl SchedulingMetadata {
    /// The earliest date an alert may be scheduled for, as seen at `now`.
    #[must_use]
    pub fn earliest_date(&self, now: DateTime) -> Date {
        let mut days = i64::from(self.advance_notice_days);

        if self.cut_off_time.is_some_and(|cut_off| now.time() > cut_off) {
            days += 1;
        }

        Span::new()
            .try_days(days)
            .and_then(|span| now.date().checked_add(span))
            .unwrap_or(Date::MAX)
    }

    /// Whether `date` can be offered as an alert date at `now`.
    ///
    /// Blocked ranges that ended before today are ignored.
    #[must_use]
    pub fn permits(&self, date: Date, now: DateTime, blocked: &[BlockedRange]) -> bool {
        if date < self.earliest_date(now) {
            return false;
        }

        if !self.week_schedule.allows(date.weekday()) {
            return false;
        }

        let today = now.date();

        !blocked
            .iter()
            .any(|range| range.end > today && range.contains(date))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, datetime, time};
    use testresult::TestResult;

    use super::*;

    fn weekdays_only() -> TestResult<SchedulingMetadata> {
        Ok(SchedulingMetadata {
            advance_notice_days: 2,
            cut_off_time: Some(time(17, 0, 0, 0)),
            week_schedule: "0111110".parse()?,
            default_values: Vec::new(),
        })
    }

    #[test]
    fn week_schedule_rejects_wrong_length_and_characters() {
        assert!("111".parse::<WeekSchedule>().is_err());
        assert!("11111x1".parse::<WeekSchedule>().is_err());
    }

    #[test]
    fn week_schedule_is_indexed_from_sunday() -> TestResult {
        let schedule: WeekSchedule = "1000000".parse()?;

        assert!(schedule.allows(Weekday::Sunday));
        assert!(!schedule.allows(Weekday::Monday));
        assert!(!schedule.allows(Weekday::Saturday));

        Ok(())
    }

    #[test]
    fn cut_off_time_accepts_blank_and_rejects_garbage() -> TestResult {
        assert_eq!(parse_cut_off_time("")?, None);
        assert_eq!(parse_cut_off_time("17:30:00")?, Some(time(17, 30, 0, 0)));
        assert!(parse_cut_off_time("late").is_err());

        Ok(())
    }

    #[test]
    fn default_values_skip_unparseable_entries() {
        let values = parse_default_values("10, 25,abc,,100.50");

        assert_eq!(
            values,
            vec![Decimal::from(10), Decimal::from(25), Decimal::new(10050, 2)]
        );
    }

    #[test]
    fn earliest_date_adds_notice_days() -> TestResult {
        let schedule = weekdays_only()?;

        // Monday morning, before the cut-off.
        let now = datetime(2025, 3, 3, 9, 0, 0, 0);

        assert_eq!(schedule.earliest_date(now), date(2025, 3, 5));

        Ok(())
    }

    #[test]
    fn earliest_date_moves_a_day_after_cut_off() -> TestResult {
        let schedule = weekdays_only()?;

        let now = datetime(2025, 3, 3, 18, 0, 0, 0);

        assert_eq!(schedule.earliest_date(now), date(2025, 3, 6));

        Ok(())
    }

    #[test]
    fn permits_checks_notice_weekday_and_blocked_ranges() -> TestResult {
        let schedule = weekdays_only()?;
        let now = datetime(2025, 3, 3, 9, 0, 0, 0);

        let blocked = [BlockedRange {
            start: date(2025, 3, 10),
            end: date(2025, 3, 11),
        }];

        assert!(!schedule.permits(date(2025, 3, 4), now, &blocked), "inside notice period");
        assert!(schedule.permits(date(2025, 3, 5), now, &blocked), "wednesday is open");
        assert!(!schedule.permits(date(2025, 3, 8), now, &blocked), "saturday is closed");
        assert!(!schedule.permits(date(2025, 3, 10), now, &blocked), "blocked range");
        assert!(schedule.permits(date(2025, 3, 12), now, &blocked), "after blocked range");

        Ok(())
    }

    #[test]
    fn past_blocked_ranges_are_ignored() {
        let schedule = SchedulingMetadata::default();
        let now = datetime(2025, 3, 3, 9, 0, 0, 0);

        let blocked = [BlockedRange {
            start: date(2025, 3, 1),
            end: date(2025, 3, 3),
        }];

        assert!(schedule.permits(date(2025, 3, 3), now, &blocked));
    }

    #[test]
    fn alert_dates_format_as_iso_calendar_dates() {
        assert_eq!(format_alert_date(date(2025, 3, 5)), "2025-03-05");
    }
}

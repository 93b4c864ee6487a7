use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u8 = 24;
pub const DAYS_PER_WEEK: u8 = 7;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("open hour {open} must precede close hour {close}")]
    InvertedHours { open: u8, close: u8 },
    #[error("hour {0} is past the end of the day")]
    HourOutOfRange(u8),
    #[error("weekday index {0} is outside 0..=6")]
    InvalidWeekday(u8),
    #[error("no open days configured")]
    NoOpenDays,
}

/// Weekday index of a date, 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Set of open weekdays as a 7-bit mask (bit 0 = Sunday).
///
/// Serialized as a list of weekday indices so it reads naturally in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct OpenDays(u8);

impl OpenDays {
    pub fn from_indices(days: &[u8]) -> Result<Self, ScheduleError> {
        let mut mask = 0u8;
        for &day in days {
            if day >= DAYS_PER_WEEK {
                return Err(ScheduleError::InvalidWeekday(day));
            }
            mask |= 1 << day;
        }
        if mask == 0 {
            return Err(ScheduleError::NoOpenDays);
        }
        Ok(Self(mask))
    }

    pub fn sunday_to_thursday() -> Self {
        Self(0b0001_1111)
    }

    pub fn contains(&self, day: u8) -> bool {
        day < DAYS_PER_WEEK && self.0 & (1 << day) != 0
    }

    pub fn indices(&self) -> Vec<u8> {
        (0..DAYS_PER_WEEK).filter(|d| self.contains(*d)).collect()
    }

    /// Days from `today` to the next open weekday strictly after it, in 1..=7.
    /// Never zero: a week later is always an open day because the set is non-empty.
    pub fn days_until_next_after(&self, today: u8) -> u8 {
        (1..=DAYS_PER_WEEK)
            .find(|offset| self.contains((today % DAYS_PER_WEEK + offset) % DAYS_PER_WEEK))
            .unwrap_or(DAYS_PER_WEEK)
    }
}

impl Default for OpenDays {
    fn default() -> Self {
        Self::sunday_to_thursday()
    }
}

impl TryFrom<Vec<u8>> for OpenDays {
    type Error = ScheduleError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(&days)
    }
}

impl From<OpenDays> for Vec<u8> {
    fn from(days: OpenDays) -> Self {
        days.indices()
    }
}

/// Fixed opening hours: `[open_hour, close_hour)` on every open day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub open_hour: u8,
    pub close_hour: u8,
    pub open_days: OpenDays,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            open_hour: 12,
            close_hour: 18,
            open_days: OpenDays::sunday_to_thursday(),
        }
    }
}

impl ScheduleConfig {
    pub fn new(open_hour: u8, close_hour: u8, open_days: OpenDays) -> Result<Self, ScheduleError> {
        let cfg = Self {
            open_hour,
            close_hour,
            open_days,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.close_hour > HOURS_PER_DAY {
            return Err(ScheduleError::HourOutOfRange(self.close_hour));
        }
        if self.open_hour >= self.close_hour {
            return Err(ScheduleError::InvertedHours {
                open: self.open_hour,
                close: self.close_hour,
            });
        }
        Ok(())
    }

    fn open_minute(&self) -> u32 {
        self.open_hour as u32 * MINUTES_PER_HOUR
    }

    fn close_minute(&self) -> u32 {
        self.close_hour as u32 * MINUTES_PER_HOUR
    }

    /// Opening instant on `date`.
    pub fn opens_on(&self, date: NaiveDate) -> NaiveDateTime {
        at_minute(date, self.open_minute())
    }

    /// Closing instant on `date`; a close hour of 24 lands on the next midnight.
    pub fn closes_on(&self, date: NaiveDate) -> NaiveDateTime {
        at_minute(date, self.close_minute())
    }
}

fn at_minute(date: NaiveDate, minute_of_day: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::default()) + Duration::minutes(minute_of_day as i64)
}

fn minute_of_day(now: NaiveDateTime) -> u32 {
    now.hour() * MINUTES_PER_HOUR + now.minute()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextOpening {
    LaterToday,
    NextWorkday,
}

impl fmt::Display for NextOpening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextOpening::LaterToday => f.write_str("later today"),
            NextOpening::NextWorkday => f.write_str("next workday"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStatus {
    Open {
        remaining_hours: u32,
        remaining_minutes: u32,
        closes_at: NaiveDateTime,
    },
    Closed {
        next_open: NaiveDateTime,
        when: NextOpening,
    },
}

impl ScheduleStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, ScheduleStatus::Open { .. })
    }
}

/// Open/closed status at local wall-clock time `now`.
///
/// Only hour and minute count toward the fractional hour; seconds are ignored,
/// so the remaining time is floored to whole minutes.
pub fn compute(config: &ScheduleConfig, now: NaiveDateTime) -> ScheduleStatus {
    let today = weekday_index(now.date());
    let minute = minute_of_day(now);
    let open_today = config.open_days.contains(today);

    if open_today && (config.open_minute()..config.close_minute()).contains(&minute) {
        let remaining = config.close_minute() - minute;
        return ScheduleStatus::Open {
            remaining_hours: remaining / MINUTES_PER_HOUR,
            remaining_minutes: remaining % MINUTES_PER_HOUR,
            closes_at: config.closes_on(now.date()),
        };
    }

    let days_to_add = if open_today && minute < config.open_minute() {
        0
    } else {
        config.open_days.days_until_next_after(today)
    };
    let when = if days_to_add == 0 {
        NextOpening::LaterToday
    } else {
        NextOpening::NextWorkday
    };
    let date = now.date() + Duration::days(days_to_add as i64);
    ScheduleStatus::Closed {
        next_open: config.opens_on(date),
        when,
    }
}

/// Opening window shown in the hours line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub opens_at: NaiveDateTime,
    pub closes_at: NaiveDateTime,
}

/// Today's window while it has not ended on an open day, otherwise the next open day's.
pub fn hours_window(config: &ScheduleConfig, now: NaiveDateTime) -> ScheduleWindow {
    let today = weekday_index(now.date());
    let date = if config.open_days.contains(today) && minute_of_day(now) < config.close_minute() {
        now.date()
    } else {
        now.date() + Duration::days(config.open_days.days_until_next_after(today) as i64)
    };
    ScheduleWindow {
        opens_at: config.opens_on(date),
        closes_at: config.closes_on(date),
    }
}

/// Renders a clock time for display.
pub trait ClockFormat {
    fn format_time(&self, at: NaiveDateTime) -> String;
}

/// `12:00 PM` style, two-digit hour.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwelveHourClock;

impl ClockFormat for TwelveHourClock {
    fn format_time(&self, at: NaiveDateTime) -> String {
        at.format("%I:%M %p").to_string()
    }
}

pub fn render_status(status: &ScheduleStatus, clock: &dyn ClockFormat) -> String {
    match status {
        ScheduleStatus::Open {
            remaining_hours,
            remaining_minutes,
            ..
        } => format!("Open, closes in {remaining_hours}h {remaining_minutes}m"),
        ScheduleStatus::Closed { next_open, when } => {
            format!("Closed, opens {when} at {}", clock.format_time(*next_open))
        }
    }
}

pub fn render_hours(window: &ScheduleWindow, clock: &dyn ClockFormat) -> String {
    format!(
        "Work time: {} → {} (your local time)",
        clock.format_time(window.opens_at),
        clock.format_time(window.closes_at)
    )
}

/// Both display strings for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleText {
    pub hours: String,
    pub status: String,
}

pub fn describe(config: &ScheduleConfig, now: NaiveDateTime, clock: &dyn ClockFormat) -> ScheduleText {
    ScheduleText {
        hours: render_hours(&hours_window(config, now), clock),
        status: render_status(&compute(config, now), clock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-07 is a Sunday.
    fn at(day_of_jan: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day_of_jan)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    const TUE: u32 = 2;
    const WED: u32 = 3;
    const THU: u32 = 4;
    const FRI: u32 = 5;
    const SAT: u32 = 6;
    const SUN: u32 = 7;

    fn status_text(now: NaiveDateTime) -> String {
        render_status(&compute(&ScheduleConfig::default(), now), &TwelveHourClock)
    }

    #[test]
    fn weekday_indices_start_on_sunday() {
        assert_eq!(weekday_index(at(SUN, 0, 0).date()), 0);
        assert_eq!(weekday_index(at(TUE, 0, 0).date()), 2);
        assert_eq!(weekday_index(at(SAT, 0, 0).date()), 6);
    }

    #[test]
    fn tuesday_afternoon_is_open() {
        assert_eq!(status_text(at(TUE, 13, 0)), "Open, closes in 5h 0m");
    }

    #[test]
    fn remaining_time_is_floored_to_minutes() {
        let now = at(TUE, 15, 17).with_second(59).unwrap();
        assert_eq!(status_text(now), "Open, closes in 2h 43m");
    }

    #[test]
    fn friday_morning_waits_for_sunday() {
        let status = compute(&ScheduleConfig::default(), at(FRI, 10, 0));
        assert_eq!(
            status,
            ScheduleStatus::Closed {
                next_open: at(SUN, 12, 0),
                when: NextOpening::NextWorkday,
            }
        );
        assert_eq!(
            render_status(&status, &TwelveHourClock),
            "Closed, opens next workday at 12:00 PM"
        );
    }

    #[test]
    fn wednesday_evening_rolls_to_thursday() {
        let status = compute(&ScheduleConfig::default(), at(WED, 19, 0));
        assert_eq!(
            status,
            ScheduleStatus::Closed {
                next_open: at(THU, 12, 0),
                when: NextOpening::NextWorkday,
            }
        );
        assert_eq!(status_text(at(WED, 19, 0)), "Closed, opens next workday at 12:00 PM");
    }

    #[test]
    fn thursday_evening_skips_the_weekend() {
        match compute(&ScheduleConfig::default(), at(THU, 18, 30)) {
            ScheduleStatus::Closed { next_open, .. } => assert_eq!(next_open, at(SUN, 12, 0)),
            other => panic!("expected closed, got {other:?}"),
        }
    }

    #[test]
    fn before_opening_on_open_day_is_later_today() {
        assert_eq!(
            status_text(at(TUE, 9, 5)),
            "Closed, opens later today at 12:00 PM"
        );
    }

    #[test]
    fn boundaries_are_half_open() {
        assert!(compute(&ScheduleConfig::default(), at(TUE, 12, 0)).is_open());
        assert!(compute(&ScheduleConfig::default(), at(TUE, 17, 59)).is_open());
        assert!(!compute(&ScheduleConfig::default(), at(TUE, 18, 0)).is_open());
        assert!(!compute(&ScheduleConfig::default(), at(TUE, 11, 59)).is_open());
    }

    #[test]
    fn saturday_wraps_to_sunday() {
        let cfg = ScheduleConfig::default();
        assert_eq!(cfg.open_days.days_until_next_after(6), 1);
        match compute(&cfg, at(SAT, 23, 59)) {
            ScheduleStatus::Closed { next_open, when } => {
                assert_eq!(next_open, at(SUN, 12, 0));
                assert_eq!(when, NextOpening::NextWorkday);
            }
            other => panic!("expected closed, got {other:?}"),
        }
    }

    #[test]
    fn single_open_day_waits_a_full_week() {
        let cfg = ScheduleConfig::new(9, 17, OpenDays::from_indices(&[2]).unwrap()).unwrap();
        match compute(&cfg, at(TUE, 17, 0)) {
            ScheduleStatus::Closed { next_open, .. } => {
                assert_eq!(next_open, at(TUE, 9, 0) + Duration::days(7));
            }
            other => panic!("expected closed, got {other:?}"),
        }
    }

    #[test]
    fn every_minute_of_a_week_is_consistent() {
        let cfg = ScheduleConfig::default();
        let start = at(SUN, 0, 0);
        for step in 0..(7 * 24 * 60) {
            let now = start + Duration::minutes(step);
            let day = weekday_index(now.date());
            let frac = now.hour() as f64 + now.minute() as f64 / 60.0;
            let expect_open = cfg.open_days.contains(day) && (12.0..18.0).contains(&frac);
            match compute(&cfg, now) {
                ScheduleStatus::Open {
                    remaining_hours,
                    remaining_minutes,
                    ..
                } => {
                    assert!(expect_open, "{now} reported open");
                    let expected = ((18.0 - frac) * 60.0).round() as u32;
                    assert_eq!(remaining_hours * 60 + remaining_minutes, expected);
                }
                ScheduleStatus::Closed { next_open, when } => {
                    assert!(!expect_open, "{now} reported closed");
                    assert!(next_open > now);
                    assert!(cfg.open_days.contains(weekday_index(next_open.date())));
                    assert_eq!(next_open.hour(), 12);
                    assert_eq!(when == NextOpening::LaterToday, next_open.date() == now.date());
                    assert!(next_open - now <= Duration::days(7));
                }
            }
        }
    }

    #[test]
    fn same_instant_gives_identical_text() {
        let cfg = ScheduleConfig::default();
        let now = at(WED, 16, 42);
        assert_eq!(
            describe(&cfg, now, &TwelveHourClock),
            describe(&cfg, now, &TwelveHourClock)
        );
    }

    #[test]
    fn hours_line_uses_next_window_after_close() {
        let cfg = ScheduleConfig::default();
        let window = hours_window(&cfg, at(THU, 20, 0));
        assert_eq!(window.opens_at, at(SUN, 12, 0));
        assert_eq!(window.closes_at, at(SUN, 18, 0));
        assert_eq!(
            render_hours(&window, &TwelveHourClock),
            "Work time: 12:00 PM → 06:00 PM (your local time)"
        );
        assert_eq!(hours_window(&cfg, at(TUE, 13, 0)).opens_at, at(TUE, 12, 0));
    }

    #[test]
    fn close_at_midnight_is_allowed() {
        let cfg = ScheduleConfig::new(20, 24, OpenDays::default()).unwrap();
        assert_eq!(
            render_status(&compute(&cfg, at(TUE, 23, 30)), &TwelveHourClock),
            "Open, closes in 0h 30m"
        );
        assert_eq!(cfg.closes_on(at(TUE, 0, 0).date()), at(WED, 0, 0));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert_eq!(
            ScheduleConfig::new(18, 12, OpenDays::default()),
            Err(ScheduleError::InvertedHours { open: 18, close: 12 })
        );
        assert_eq!(
            ScheduleConfig::new(12, 25, OpenDays::default()),
            Err(ScheduleError::HourOutOfRange(25))
        );
        assert_eq!(OpenDays::from_indices(&[]), Err(ScheduleError::NoOpenDays));
        assert_eq!(OpenDays::from_indices(&[7]), Err(ScheduleError::InvalidWeekday(7)));
    }

    #[test]
    fn open_days_serialize_as_indices() {
        let json = serde_json::to_string(&OpenDays::sunday_to_thursday()).unwrap();
        assert_eq!(json, "[0,1,2,3,4]");
        let parsed: OpenDays = serde_json::from_str("[1,3,5]").unwrap();
        assert!(parsed.contains(3) && !parsed.contains(0));
        assert!(serde_json::from_str::<OpenDays>("[]").is_err());
    }
}

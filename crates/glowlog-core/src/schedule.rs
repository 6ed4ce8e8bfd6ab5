//! Recurrence schedules and the "is this step due today" predicate.
//!
//! A [`Schedule`] is one of three recurrence models:
//!
//! - **weekly**: active on a fixed set of weekdays
//! - **cycle**: active on chosen days of a repeating N-day cycle anchored at a
//!   start date (day 1)
//! - **interval**: active on the start date and every N-th day after it
//!
//! Dates are naive calendar days. Day differences are computed with civil
//! date arithmetic, so daylight-saving transitions never shift a result.
//!
//! The predicate fails closed: a schedule that cannot produce a meaningful
//! answer (empty day set, a cycle shorter than two days, a zero interval) is
//! simply never active. It never panics and never returns an error.
//!
//! # Storage form
//!
//! Persisted steps carry their schedule as a flat [`ScheduleRecord`] whose
//! fields are all optional. Records written before schedule types existed have
//! no `schedule_type` and decode as weekly schedules, so [`Schedule`]
//! serializes through that record.
//!
//! ```rust
//! use glowlog_core::schedule::Schedule;
//! use jiff::civil::date;
//!
//! let schedule = Schedule::interval(3, date(2024, 1, 1));
//! assert!(schedule.is_active_on(date(2024, 1, 4)));
//! assert!(!schedule.is_active_on(date(2024, 1, 5)));
//! ```

use std::{collections::BTreeSet, fmt, str::FromStr};

use jiff::civil::{Date, Weekday};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::RoutineStep;

/// Day of the week, ordered Sunday first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// All seven days, Sunday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    /// Zero-based index with Sunday = 0.
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Full lowercase name, as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }

    /// Three-letter label used in schedule descriptions.
    pub fn short_name(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sun",
            DayOfWeek::Monday => "Mon",
            DayOfWeek::Tuesday => "Tue",
            DayOfWeek::Wednesday => "Wed",
            DayOfWeek::Thursday => "Thu",
            DayOfWeek::Friday => "Fri",
            DayOfWeek::Saturday => "Sat",
        }
    }

    /// The weekday a calendar date falls on.
    pub fn of(date: Date) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sunday => DayOfWeek::Sunday,
            Weekday::Monday => DayOfWeek::Monday,
            Weekday::Tuesday => DayOfWeek::Tuesday,
            Weekday::Wednesday => DayOfWeek::Wednesday,
            Weekday::Thursday => DayOfWeek::Thursday,
            Weekday::Friday => DayOfWeek::Friday,
            Weekday::Saturday => DayOfWeek::Saturday,
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sun" | "sunday" => Ok(DayOfWeek::Sunday),
            "mon" | "monday" => Ok(DayOfWeek::Monday),
            "tue" | "tues" | "tuesday" => Ok(DayOfWeek::Tuesday),
            "wed" | "wednesday" => Ok(DayOfWeek::Wednesday),
            "thu" | "thurs" | "thursday" => Ok(DayOfWeek::Thursday),
            "fri" | "friday" => Ok(DayOfWeek::Friday),
            "sat" | "saturday" => Ok(DayOfWeek::Saturday),
            _ => Err(format!("Invalid day of week: {s}")),
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recurrence model of a routine step. Exactly one shape is ever populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScheduleRecord", into = "ScheduleRecord")]
pub enum Schedule {
    /// Active on the listed weekdays.
    Weekly { days: BTreeSet<DayOfWeek> },
    /// Active on the listed 1-based days of a `length`-day cycle whose day 1
    /// is `start`.
    Cycle {
        length: u32,
        days: BTreeSet<u32>,
        start: Date,
    },
    /// Active on `start` and every `every`-th day after it.
    Interval { every: u32, start: Date },
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::Weekly {
            days: BTreeSet::new(),
        }
    }
}

impl Schedule {
    /// Weekly schedule on the given days.
    pub fn weekly(days: impl IntoIterator<Item = DayOfWeek>) -> Self {
        Schedule::Weekly {
            days: days.into_iter().collect(),
        }
    }

    /// Weekly schedule active on every day.
    pub fn daily() -> Self {
        Self::weekly(DayOfWeek::ALL)
    }

    /// Cycle schedule of `length` days, active on `days`, anchored at `start`.
    pub fn cycle(length: u32, days: impl IntoIterator<Item = u32>, start: Date) -> Self {
        Schedule::Cycle {
            length,
            days: days.into_iter().collect(),
            start,
        }
    }

    /// Interval schedule every `every` days from `start`.
    pub fn interval(every: u32, start: Date) -> Self {
        Schedule::Interval { every, start }
    }

    /// Stored name of the schedule shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Schedule::Weekly { .. } => "weekly",
            Schedule::Cycle { .. } => "cycle",
            Schedule::Interval { .. } => "interval",
        }
    }

    /// Whether the schedule is due on `date`.
    pub fn is_active_on(&self, date: Date) -> bool {
        match self {
            Schedule::Weekly { days } => days.contains(&DayOfWeek::of(date)),
            Schedule::Cycle {
                length,
                days,
                start,
            } => {
                if *length < 2 || days.is_empty() {
                    return false;
                }
                match days_between(*start, date) {
                    Some(elapsed) if elapsed >= 0 => {
                        let cycle_day = elapsed % i64::from(*length) + 1;
                        u32::try_from(cycle_day).is_ok_and(|day| days.contains(&day))
                    }
                    _ => false,
                }
            }
            Schedule::Interval { every, start } => {
                if *every == 0 {
                    return false;
                }
                match days_between(*start, date) {
                    Some(elapsed) if elapsed >= 0 => elapsed % i64::from(*every) == 0,
                    _ => false,
                }
            }
        }
    }

    /// First date in `[from, from + horizon_days)` on which the schedule is
    /// active.
    pub fn next_on_or_after(&self, from: Date, horizon_days: u32) -> Option<Date> {
        let mut day = from;
        for _ in 0..horizon_days {
            if self.is_active_on(day) {
                return Some(day);
            }
            day = day.tomorrow().ok()?;
        }
        None
    }
}

/// Whole calendar days from `start` to `end`; negative when `end` is earlier.
///
/// Returns `None` only if the span cannot be represented.
pub fn days_between(start: Date, end: Date) -> Option<i64> {
    start
        .until(end)
        .ok()
        .map(|span| i64::from(span.get_days()))
}

/// Whether `step` is due on `date`.
pub fn is_active_on_date(step: &RoutineStep, date: Date) -> bool {
    step.schedule.is_active_on(date)
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Weekly { days } if days.is_empty() => write!(f, "Never"),
            Schedule::Weekly { days } if days.len() == 7 => write!(f, "Every day"),
            Schedule::Weekly { days } => {
                let names: Vec<&str> = days.iter().map(DayOfWeek::short_name).collect();
                write!(f, "{}", names.join(", "))
            }
            Schedule::Cycle {
                length,
                days,
                start,
            } => {
                let list: Vec<String> = days.iter().map(u32::to_string).collect();
                let label = if days.len() == 1 { "Day" } else { "Days" };
                write!(
                    f,
                    "{label} {} of a {length}-day cycle starting {start}",
                    list.join(", ")
                )
            }
            Schedule::Interval { every: 1, start } => write!(f, "Every day from {start}"),
            Schedule::Interval { every, start } => write!(f, "Every {every} days from {start}"),
        }
    }
}

/// Flat, all-optional storage form of a [`Schedule`].
///
/// Field names match the stored column/key names. Decoding is lenient:
/// unknown day names and malformed dates are dropped, and a cycle or interval
/// missing a required field decodes as an empty weekly schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_days: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_start_date: Option<String>,
}

fn parse_date(field: &str, value: Option<&str>) -> Option<Date> {
    let raw = value?;
    match raw.parse::<Date>() {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring malformed {field} '{raw}': {e}");
            None
        }
    }
}

fn parse_days(days: Option<&[String]>) -> BTreeSet<DayOfWeek> {
    days.unwrap_or_default()
        .iter()
        .filter_map(|name| match name.parse::<DayOfWeek>() {
            Ok(day) => Some(day),
            Err(e) => {
                warn!("{e}");
                None
            }
        })
        .collect()
}

impl From<ScheduleRecord> for Schedule {
    fn from(record: ScheduleRecord) -> Self {
        match record.schedule_type.as_deref() {
            Some("cycle") => {
                let start = parse_date("cycle_start_date", record.cycle_start_date.as_deref());
                match (record.cycle_length, record.cycle_days, start) {
                    (Some(length), Some(days), Some(start)) => Schedule::cycle(length, days, start),
                    _ => {
                        warn!("Cycle schedule is missing required fields; treating as never active");
                        Schedule::default()
                    }
                }
            }
            Some("interval") => {
                let start =
                    parse_date("interval_start_date", record.interval_start_date.as_deref());
                match (record.interval_days, start) {
                    (Some(every), Some(start)) => Schedule::interval(every, start),
                    _ => {
                        warn!(
                            "Interval schedule is missing required fields; treating as never active"
                        );
                        Schedule::default()
                    }
                }
            }
            // Records without a schedule type predate cycles and intervals.
            _ => Schedule::Weekly {
                days: parse_days(record.days.as_deref()),
            },
        }
    }
}

impl From<Schedule> for ScheduleRecord {
    fn from(schedule: Schedule) -> Self {
        let mut record = ScheduleRecord {
            schedule_type: Some(schedule.kind().to_string()),
            ..Default::default()
        };
        match schedule {
            Schedule::Weekly { days } => {
                record.days = Some(days.iter().map(|d| d.as_str().to_string()).collect());
            }
            Schedule::Cycle {
                length,
                days,
                start,
            } => {
                record.cycle_length = Some(length);
                record.cycle_days = Some(days.into_iter().collect());
                record.cycle_start_date = Some(start.to_string());
            }
            Schedule::Interval { every, start } => {
                record.interval_days = Some(every);
                record.interval_start_date = Some(start.to_string());
            }
        }
        record
    }
}

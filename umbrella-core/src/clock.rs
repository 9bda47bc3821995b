//! Clock-time phrases such as "9 PM", "6:30 am" or "14:00".
//!
//! A phrase only names a time of day. [`ClockTime::on_or_after`] pins it to
//! the next matching instant at or after "now", rolling over to tomorrow
//! when today's occurrence has already passed.

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Offset, TimeZone};
use regex::Regex;

use crate::error::UmbrellaError;

static PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?::(\d{2}))?\s*(?i:(am|pm))?$").expect("clock phrase regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// A validated 24-hour time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u32,
    minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    fn naive_time(&self) -> NaiveTime {
        // Fields are range-checked in `new`.
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }

    /// The first instant at this time of day that is not earlier than `now`,
    /// in `now`'s time zone.
    ///
    /// A wall-clock time skipped by a DST gap maps forward by the length of
    /// the gap ("2:30" on a spring-forward night becomes 03:30).
    pub fn on_or_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let today = now.date_naive();

        let candidate = localize(&tz, today.and_time(self.naive_time()))?;
        if candidate >= *now {
            return Some(candidate);
        }

        localize(&tz, today.succ_opt()?.and_time(self.naive_time()))
    }
}

fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return Some(dt);
    }

    // Skipped by a DST gap: read the wall clock with the offset in force a day earlier.
    let before = tz.from_local_datetime(&(naive - Duration::days(1))).earliest()?;
    let offset = before.offset().fix().local_minus_utc();
    Some(tz.from_utc_datetime(&(naive - Duration::seconds(offset.into()))))
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = UmbrellaError;

    fn from_str(phrase: &str) -> Result<Self, Self::Err> {
        let invalid = || UmbrellaError::InvalidTimeFormat(phrase.to_string());

        let caps = PHRASE.captures(phrase.trim()).ok_or_else(invalid)?;

        let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| invalid())?,
            None => 0,
        };

        let meridiem = caps.get(3).map(|m| {
            if m.as_str().eq_ignore_ascii_case("pm") {
                Meridiem::Pm
            } else {
                Meridiem::Am
            }
        });

        let hour = match meridiem {
            Some(_) if !(1..=12).contains(&hour) => return Err(invalid()),
            Some(Meridiem::Am) if hour == 12 => 0,
            Some(Meridiem::Pm) if hour != 12 => hour + 12,
            _ => hour,
        };

        ClockTime::new(hour, minute).ok_or_else(invalid)
    }
}

/// Parse `phrase` and resolve it against `now`.
///
/// The result is always `>= now`: a time of day that has already passed
/// today resolves to the same time tomorrow.
pub fn resolve_end_time<Tz: TimeZone>(now: &DateTime<Tz>, phrase: &str) -> Result<DateTime<Tz>, UmbrellaError> {
    let clock: ClockTime = phrase.parse()?;
    let end = clock
        .on_or_after(now)
        .ok_or_else(|| UmbrellaError::InvalidTimeFormat(phrase.to_string()))?;
    tracing::debug!(
        hour = clock.hour(),
        minute = clock.minute(),
        phrase,
        "resolved end time"
    );
    Ok(end)
}

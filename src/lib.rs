mod blocked;
mod clock;
mod config;
mod consts;
mod engine;
mod handoff;
mod prelude;
mod range;
mod source;
mod types;

#[cfg(test)]
mod test_utils;

pub use blocked::{BlockKind, BlockedDate, BlockedDateSet};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CalendarConfig, ConfigError};
pub use consts::*;
pub use engine::{AvailabilityEngine, BookingError, Selection};
pub use handoff::{BookingLink, nights_label};
pub use range::{DateRange, Days, RangeError};
pub use source::{CalendarSource, SourceError, StaticSource, TomlSource};
pub use types::{Day, Month, Year};

use crate::consts::TIMESTAMP_FORMATS;
use crate::prelude::*;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone};
use std::str::FromStr;

/// A day-granularity calendar date with no time-of-day component.
///
/// Two values are equal iff they denote the same calendar day; ordering is
/// chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{}-{}-{}", year, month, day)]
pub struct CalendarDate {
    year: Year,
    month: Month,
    day: Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DateError {
    #[display(fmt = "Invalid date format: {_0}")]
    InvalidFormat(String),
    #[display(fmt = "Invalid year: {} (must be {}-{})", "_0", MIN_YEAR, MAX_YEAR)]
    InvalidYear(u16),
    #[display(fmt = "Invalid month: {} (must be 1-{})", "_0", MAX_MONTH)]
    InvalidMonth(u8),
    #[display(fmt = "Invalid day {day} for month {year:04}-{month:02}")]
    InvalidDay { year: u16, month: u8, day: u8 },
    #[display(fmt = "Day number {_0} is outside the supported calendar")]
    OutOfRange(i64),
    #[display(fmt = "Empty date string")]
    EmptyInput,
}

impl std::error::Error for DateError {}

impl CalendarDate {
    /// 0001-01-01
    pub const MIN: Self = Self {
        year: Year::MIN,
        month: Month::JANUARY,
        day: Day::FIRST,
    };

    /// Creates a date from raw components.
    ///
    /// # Errors
    /// Returns the `DateError` of the first component that fails validation.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, DateError> {
        let year = Year::new(year)?;
        let month = Month::new(month)?;
        let day = Day::new(day, year, month)?;
        Ok(Self { year, month, day })
    }

    /// Creates a date from already validated year and month.
    ///
    /// # Errors
    /// Returns `DateError::InvalidDay` if `day` does not exist in that month.
    pub fn from_parts(year: Year, month: Month, day: u8) -> Result<Self, DateError> {
        Ok(Self {
            year,
            month,
            day: Day::new(day, year, month)?,
        })
    }

    /// 9999-12-31
    pub fn max() -> Self {
        Self {
            year: Year::MAX,
            month: Month::DECEMBER,
            day: Day::last_of(Year::MAX, Month::DECEMBER),
        }
    }

    /// Returns the year component
    pub const fn year(&self) -> Year {
        self.year
    }

    /// Returns the month component
    pub const fn month(&self) -> Month {
        self.month
    }

    /// Returns the day-of-month component
    pub const fn day(&self) -> Day {
        self.day
    }

    /// Days since the start of the common era, 0001-01-01 being day 1.
    ///
    /// Pure calendar arithmetic: the difference between two day numbers is
    /// the number of midnights between them, unaffected by DST.
    pub fn day_number(&self) -> i64 {
        i64::from(NaiveDate::from(*self).num_days_from_ce())
    }

    /// Inverse of [`CalendarDate::day_number`].
    ///
    /// # Errors
    /// Returns `DateError::OutOfRange` if the day falls outside years `1..=9999`.
    pub fn from_day_number(number: i64) -> Result<Self, DateError> {
        let out_of_range = || DateError::OutOfRange(number);
        let days = i32::try_from(number).map_err(|_| out_of_range())?;
        let date = NaiveDate::from_num_days_from_ce_opt(days).ok_or_else(out_of_range)?;
        Self::try_from(date).map_err(|_| out_of_range())
    }

    /// The next calendar day.
    ///
    /// # Errors
    /// Returns `DateError::OutOfRange` after 9999-12-31.
    pub fn succ(&self) -> Result<Self, DateError> {
        self.add_days(1)
    }

    /// The previous calendar day.
    ///
    /// # Errors
    /// Returns `DateError::OutOfRange` before 0001-01-01.
    pub fn pred(&self) -> Result<Self, DateError> {
        self.add_days(-1)
    }

    /// Shifts the date by a whole number of calendar days.
    ///
    /// # Errors
    /// Returns `DateError::OutOfRange` if the result leaves the supported calendar.
    pub fn add_days(&self, days: i64) -> Result<Self, DateError> {
        let out_of_range = || DateError::OutOfRange(self.day_number().saturating_add(days));
        let date = NaiveDate::from(*self);
        let step = chrono::Days::new(days.unsigned_abs());
        let shifted = if days < 0 {
            date.checked_sub_days(step)
        } else {
            date.checked_add_days(step)
        };
        let shifted = shifted.ok_or_else(out_of_range)?;
        Self::try_from(shifted).map_err(|_| out_of_range())
    }

    /// Signed count of calendar days from `self` to `other`.
    pub fn days_until(&self, other: &Self) -> i64 {
        NaiveDate::from(*other)
            .signed_duration_since(NaiveDate::from(*self))
            .num_days()
    }

    /// Iterates `self..end`, one day at a time.
    pub fn iter_until(self, end: Self) -> Days {
        Days::new(self, end)
    }

    /// The local calendar day of a zoned timestamp.
    ///
    /// # Errors
    /// Returns `DateError::InvalidYear` for years outside `1..=9999`.
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Result<Self, DateError> {
        Self::try_from(datetime.date_naive())
    }

    fn parse_component<T: FromStr>(s: &str) -> Result<T, DateError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateError::InvalidFormat(s.to_owned()));
        }
        s.parse::<T>().map_err(|_| DateError::InvalidFormat(s.to_owned()))
    }

    fn parse_date(s: &str) -> Result<Self, DateError> {
        let parts: Vec<&str> = s.split(DATE_SEPARATOR).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(DateError::InvalidFormat(format!(
                "Expected YYYY{DATE_SEPARATOR}MM{DATE_SEPARATOR}DD, found {} component(s): {s}",
                parts.len()
            )));
        };

        Self::new(
            Self::parse_component(year)?,
            Self::parse_component(month)?,
            Self::parse_component(day)?,
        )
    }

    /// Accepts an RFC 3339 timestamp or a naive one with minute or finer precision.
    fn validate_timestamp(s: &str) -> Result<(), DateError> {
        if DateTime::parse_from_rfc3339(s).is_ok()
            || TIMESTAMP_FORMATS
                .iter()
                .any(|format| NaiveDateTime::parse_from_str(s, format).is_ok())
        {
            return Ok(());
        }
        Err(DateError::InvalidFormat(format!("Invalid timestamp: {s}")))
    }
}

impl FromStr for CalendarDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DateError::EmptyInput);
        }

        // A trailing time-of-day is validated and then dropped.
        match trimmed.split_once(TIME_SEPARATORS) {
            Some((date, _)) => {
                let parsed = Self::parse_date(date)?;
                Self::validate_timestamp(trimmed)?;
                Ok(parsed)
            }
            None => Self::parse_date(trimmed),
        }
    }
}

impl From<CalendarDate> for NaiveDate {
    fn from(date: CalendarDate) -> Self {
        // Every validated date lies inside chrono's range.
        Self::from_ymd_opt(
            i32::from(date.year.get()),
            u32::from(date.month.get()),
            u32::from(date.day.get()),
        )
        .unwrap_or(Self::MIN)
    }
}

impl TryFrom<NaiveDate> for CalendarDate {
    type Error = DateError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        let year = date.year();
        let year = u16::try_from(year).map_err(|_| DateError::InvalidYear(0))?;
        // Month and day from chrono always fit in u8.
        let month = u8::try_from(date.month()).map_err(|_| DateError::InvalidMonth(0))?;
        let day = u8::try_from(date.day()).map_err(|_| DateError::InvalidFormat(date.to_string()))?;
        Self::new(year, month, day)
    }
}

impl TryFrom<NaiveDateTime> for CalendarDate {
    type Error = DateError;

    fn try_from(datetime: NaiveDateTime) -> Result<Self, Self::Error> {
        Self::try_from(datetime.date())
    }
}

impl serde::Serialize for CalendarDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for CalendarDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

use std::{iter::FusedIterator, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{CalendarDate, DateError, RANGE_SEPARATOR, prelude::*};

/// A stay from check-in to check-out.
///
/// Check-in is strictly before check-out, so every range covers at least one
/// night. The check-out day itself is not a night of the stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[display(fmt = "{check_in}/{check_out}")]
pub struct DateRange {
    check_in: CalendarDate,
    check_out: CalendarDate,
}

/// Error type for date range operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Check-in and check-out fall on the same day.
    #[error("Empty stay: check-in and check-out are both {0}")]
    Empty(CalendarDate),

    /// Check-in is after check-out.
    #[error("Invalid stay: check-in ({check_in}) is after check-out ({check_out})")]
    Reversed {
        check_in: CalendarDate,
        check_out: CalendarDate,
    },

    #[error(transparent)]
    Date(#[from] DateError),

    #[error("Invalid range format: {0}")]
    InvalidFormat(String),
}

impl DateRange {
    /// Creates a stay of at least one night.
    ///
    /// # Errors
    /// Returns `RangeError::Empty` if both days are equal and
    /// `RangeError::Reversed` if check-in is after check-out.
    pub fn new(check_in: CalendarDate, check_out: CalendarDate) -> Result<Self, RangeError> {
        match check_in.cmp(&check_out) {
            std::cmp::Ordering::Less => Ok(Self {
                check_in,
                check_out,
            }),
            std::cmp::Ordering::Equal => Err(RangeError::Empty(check_in)),
            std::cmp::Ordering::Greater => Err(RangeError::Reversed {
                check_in,
                check_out,
            }),
        }
    }

    /// Returns the arrival day
    pub const fn check_in(&self) -> CalendarDate {
        self.check_in
    }

    /// Returns the departure day
    pub const fn check_out(&self) -> CalendarDate {
        self.check_out
    }

    /// Number of nights, always at least one.
    pub fn nights(&self) -> u32 {
        // check_in < check_out, and the calendar spans far fewer than u32::MAX days.
        u32::try_from(self.check_in.days_until(&self.check_out)).unwrap_or(u32::MAX)
    }

    /// Days strictly between check-in and check-out.
    ///
    /// These are the days that must all be free for the stay to be bookable;
    /// the endpoints are turnover days shared with neighbouring stays.
    pub fn interior(&self) -> Days {
        match self.check_in.succ() {
            Ok(first) => Days::new(first, self.check_out),
            Err(_) => Days::empty(),
        }
    }

    /// The occupied nights, from check-in up to but excluding check-out.
    pub fn stay_nights(&self) -> Days {
        Days::new(self.check_in, self.check_out)
    }

    /// Whether the guest sleeps at the property on the night starting at `date`.
    pub fn contains_night(&self, date: &CalendarDate) -> bool {
        self.check_in <= *date && *date < self.check_out
    }

    /// Whether two stays share at least one night.
    ///
    /// One guest checking out on the day another checks in is not an overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl FromStr for DateRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let separator_count = trimmed.matches(RANGE_SEPARATOR).count();
        match separator_count {
            0 => Err(RangeError::InvalidFormat(format!(
                "No range separator found (expected '{RANGE_SEPARATOR}'): {s}"
            ))),
            1 => {
                let (check_in, check_out) = trimmed.split_once(RANGE_SEPARATOR).ok_or_else(|| {
                    RangeError::InvalidFormat(format!(
                        "Separator '{RANGE_SEPARATOR}' not found despite count == 1"
                    ))
                })?;
                Self::new(check_in.parse()?, check_out.parse()?)
            }
            _ => Err(RangeError::InvalidFormat(format!(
                "Too many '{RANGE_SEPARATOR}' separators: expected 1, found {separator_count}"
            ))),
        }
    }
}

impl Serialize for DateRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Consecutive calendar days over a half-open span `start..end`.
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<CalendarDate>,
    end: CalendarDate,
}

impl Days {
    pub(crate) fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self {
            next: (start < end).then_some(start),
            end,
        }
    }

    pub(crate) const fn empty() -> Self {
        Self {
            next: None,
            end: CalendarDate::MIN,
        }
    }
}

impl Iterator for Days {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.succ().ok().filter(|next| *next < self.end);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map_or(0, |next| usize::try_from(next.days_until(&self.end)).unwrap_or(0));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Days {}

impl FusedIterator for Days {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{date, stay};

    #[test]
    fn test_new_range_cases() {
        struct TestCase {
            check_in: CalendarDate,
            check_out: CalendarDate,
            should_succeed: bool,
            description: &'static str,
        }

        let cases = [
            TestCase {
                check_in: date(2025, 6, 5),
                check_out: date(2025, 6, 9),
                should_succeed: true,
                description: "four nights",
            },
            TestCase {
                check_in: date(2025, 6, 5),
                check_out: date(2025, 6, 6),
                should_succeed: true,
                description: "single night",
            },
            TestCase {
                check_in: date(2025, 6, 5),
                check_out: date(2025, 6, 5),
                should_succeed: false,
                description: "zero nights",
            },
            TestCase {
                check_in: date(2025, 6, 9),
                check_out: date(2025, 6, 5),
                should_succeed: false,
                description: "reversed",
            },
        ];

        for case in &cases {
            let range = DateRange::new(case.check_in, case.check_out);
            assert_eq!(
                range.is_ok(),
                case.should_succeed,
                "Unexpected result for: {}",
                case.description
            );
        }
    }

    #[test]
    fn test_error_variants() {
        let d = date(2025, 6, 5);
        assert_eq!(DateRange::new(d, d), Err(RangeError::Empty(d)));
        assert_eq!(
            DateRange::new(date(2025, 6, 9), d),
            Err(RangeError::Reversed {
                check_in: date(2025, 6, 9),
                check_out: d,
            })
        );
    }

    #[test]
    fn test_nights_across_month_and_year() {
        assert_eq!(stay(date(2025, 6, 5), date(2025, 6, 9)).nights(), 4);
        assert_eq!(stay(date(2025, 6, 28), date(2025, 7, 3)).nights(), 5);
        assert_eq!(stay(date(2025, 12, 30), date(2026, 1, 2)).nights(), 3);
        assert_eq!(stay(date(2024, 2, 28), date(2024, 3, 1)).nights(), 2);
    }

    #[test]
    fn test_interior_excludes_both_endpoints() {
        let range = stay(date(2025, 6, 8), date(2025, 6, 12));
        let interior: Vec<_> = range.interior().collect();
        assert_eq!(interior, vec![date(2025, 6, 9), date(2025, 6, 10), date(2025, 6, 11)]);
        assert_eq!(range.interior().len(), 3);

        let one_night = stay(date(2025, 6, 8), date(2025, 6, 9));
        assert_eq!(one_night.interior().count(), 0);
    }

    #[test]
    fn test_stay_nights_include_check_in_only() {
        let range = stay(date(2025, 6, 30), date(2025, 7, 2));
        let nights: Vec<_> = range.stay_nights().collect();
        assert_eq!(nights, vec![date(2025, 6, 30), date(2025, 7, 1)]);
        assert!(range.contains_night(&date(2025, 6, 30)));
        assert!(!range.contains_night(&date(2025, 7, 2)));
    }

    #[test]
    fn test_turnover_day_is_not_an_overlap() {
        let first = stay(date(2025, 6, 5), date(2025, 6, 9));
        let turnover = stay(date(2025, 6, 9), date(2025, 6, 12));
        let clash = stay(date(2025, 6, 8), date(2025, 6, 10));

        assert!(!first.overlaps(&turnover));
        assert!(!turnover.overlaps(&first));
        assert!(first.overlaps(&clash));
        assert!(clash.overlaps(&turnover));
    }

    #[test]
    fn test_display_and_parse() {
        let range = stay(date(2025, 6, 5), date(2025, 6, 9));
        assert_eq!(range.to_string(), "2025-06-05/2025-06-09");
        assert_eq!("2025-06-05/2025-06-09".parse::<DateRange>(), Ok(range));
        assert_eq!(" 2025-06-05 / 2025-06-09 ".parse::<DateRange>(), Ok(range));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("2025-06-05".parse::<DateRange>(), Err(RangeError::InvalidFormat(_))));
        assert!(matches!(
            "2025-06-05/2025-06-09/2025-06-12".parse::<DateRange>(),
            Err(RangeError::InvalidFormat(_))
        ));
        assert!(matches!("2025-06-05/2025-06-31".parse::<DateRange>(), Err(RangeError::Date(_))));
        assert!(matches!(
            "2025-06-09/2025-06-05".parse::<DateRange>(),
            Err(RangeError::Reversed { .. })
        ));
    }

    #[test]
    fn test_serde_string_format() {
        let range = stay(date(2025, 6, 5), date(2025, 6, 9));
        let json = serde_json::to_string(&range).expect("serialize range");
        assert_eq!(json, r#""2025-06-05/2025-06-09""#);

        let parsed: DateRange = serde_json::from_str(&json).expect("deserialize range");
        assert_eq!(parsed, range);
    }

    #[test]
    fn test_days_iterator_bounds() {
        let days: Vec<_> = date(2025, 12, 30).iter_until(date(2026, 1, 2)).collect();
        assert_eq!(days, vec![date(2025, 12, 30), date(2025, 12, 31), date(2026, 1, 1)]);
        assert_eq!(date(2025, 6, 9).iter_until(date(2025, 6, 5)).count(), 0);
        assert_eq!(Days::empty().count(), 0);

        let last = CalendarDate::max();
        let tail: Vec<_> = last.iter_until(last).collect();
        assert!(tail.is_empty());
    }
}

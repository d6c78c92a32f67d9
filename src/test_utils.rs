use crate::{BlockedDateSet, CalendarDate, DateRange};

pub fn date(year: u16, month: u8, day: u8) -> CalendarDate {
    CalendarDate::new(year, month, day).expect("test date must be valid")
}

pub fn stay(check_in: CalendarDate, check_out: CalendarDate) -> DateRange {
    DateRange::new(check_in, check_out).expect("test range must be at least one night")
}

pub fn blocked(dates: &[CalendarDate]) -> BlockedDateSet {
    dates.iter().copied().collect()
}

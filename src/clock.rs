use std::cell::Cell;

use chrono::Local;

use crate::CalendarDate;

/// Supplies the current calendar day.
///
/// Implementations must answer fresh on every call so a calendar left open
/// across midnight moves on to the new day.
pub trait Clock {
    /// Returns the current calendar day
    fn today(&self) -> CalendarDate;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> CalendarDate {
        (**self).today()
    }
}

/// The local calendar day of the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> CalendarDate {
        // A system clock outside years 1..=9999 makes every day look past.
        CalendarDate::try_from(Local::now().date_naive())
            .unwrap_or_else(|_| CalendarDate::max())
    }
}

/// A clock that stays on one day until moved.
#[derive(Debug, Clone)]
pub struct FixedClock {
    today: Cell<CalendarDate>,
}

impl FixedClock {
    /// Creates a clock that reports `today` until [`FixedClock::set`] moves it
    pub const fn new(today: CalendarDate) -> Self {
        Self {
            today: Cell::new(today),
        }
    }

    /// Moves the clock to another day
    pub fn set(&self, today: CalendarDate) {
        self.today.set(today);
    }
}

impl Clock for FixedClock {
    fn today(&self) -> CalendarDate {
        self.today.get()
    }
}

use tracing::{debug, info, instrument, warn};

use crate::{
    BlockedDateSet, CalendarConfig, CalendarDate, CalendarSource, Clock, DateRange, Days,
    MIN_NIGHTS, RangeError, SourceError, SystemClock,
};

/// Progress of the two-step selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Nothing picked yet.
    Empty,
    /// A check-in is pending and no check-out goes with it.
    CheckInOnly(CalendarDate),
    /// Both days are picked and form a stay of at least the minimum length.
    Complete(DateRange),
}

/// Why a selection cannot be handed off for booking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("The availability calendar has not been loaded yet")]
    NotLoaded,

    #[error("Select both a check-in and a check-out date")]
    Incomplete,

    #[error("The stay {range} includes unavailable dates")]
    BlockedInside { range: DateRange },

    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Check-in/check-out selection against a set of unavailable days.
///
/// The engine owns the blocked days and the pending two-step selection, and
/// every query is a synchronous computation over that state. Until a blocked
/// set has been loaded the engine is fail-closed: no day is available and no
/// non-empty range is valid.
///
/// Ranges are checked exclusive on both ends. Check-in and check-out are
/// turnover days shared with neighbouring stays, so only the days strictly
/// inside a stay can invalidate it.
#[derive(Debug)]
pub struct AvailabilityEngine<C = SystemClock> {
    clock: C,
    blocked: Option<BlockedDateSet>,
    min_nights: u32,
    check_in: Option<CalendarDate>,
    check_out: Option<CalendarDate>,
}

impl AvailabilityEngine<SystemClock> {
    /// An unloaded engine reading "today" from the system clock.
    pub const fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> AvailabilityEngine<C> {
    /// An engine that has not received its blocked days yet.
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            blocked: None,
            min_nights: MIN_NIGHTS,
            check_in: None,
            check_out: None,
        }
    }

    /// An engine that starts out loaded with `blocked`.
    pub const fn with_blocked(clock: C, blocked: BlockedDateSet) -> Self {
        Self {
            clock,
            blocked: Some(blocked),
            min_nights: MIN_NIGHTS,
            check_in: None,
            check_out: None,
        }
    }

    /// An unloaded engine using the listing's minimum stay.
    pub fn from_config(clock: C, config: &CalendarConfig) -> Self {
        Self::new(clock).with_min_nights(config.min_nights)
    }

    /// Sets the shortest acceptable stay; values below one night are raised to one.
    ///
    /// A pending check-out that is now too close to the check-in is dropped.
    #[must_use]
    pub fn with_min_nights(mut self, min_nights: u32) -> Self {
        self.min_nights = min_nights.max(MIN_NIGHTS);
        self.revalidate_check_out();
        self
    }

    /// Returns the shortest acceptable stay in nights
    pub const fn min_nights(&self) -> u32 {
        self.min_nights
    }

    /// Whether a blocked set has been installed.
    pub const fn is_loaded(&self) -> bool {
        self.blocked.is_some()
    }

    /// The installed blocked set, `None` until loaded.
    pub const fn blocked(&self) -> Option<&BlockedDateSet> {
        self.blocked.as_ref()
    }

    /// Installs or replaces the blocked days.
    ///
    /// A pending check-out that the new set invalidates is dropped.
    pub fn load(&mut self, blocked: BlockedDateSet) {
        info!(n_blocked = blocked.len(), "Loaded the availability calendar");
        self.blocked = Some(blocked);
        self.revalidate_check_out();
    }

    /// Fetches the blocked days from `source` and installs them.
    ///
    /// On failure the engine keeps whatever it had: fail-closed if nothing was
    /// loaded yet, the previous set otherwise.
    ///
    /// # Errors
    /// Returns the source's `SourceError`.
    #[instrument(skip_all, name = "Syncing the availability calendar…")]
    pub fn load_from<S: CalendarSource + ?Sized>(&mut self, source: &S) -> Result<(), SourceError> {
        match source.fetch() {
            Ok(blocked) => {
                self.load(blocked);
                Ok(())
            }
            Err(error) => {
                warn!(
                    %error,
                    is_loaded = self.is_loaded(),
                    "Failed to sync the availability calendar",
                );
                Err(error)
            }
        }
    }

    /// Whether `date` is one of the blocked days. Always true until loaded.
    pub fn is_blocked(&self, date: CalendarDate) -> bool {
        self.blocked
            .as_ref()
            .is_none_or(|blocked| blocked.contains(&date))
    }

    /// Whether `date` can be picked: today or later, and not blocked.
    pub fn is_available(&self, date: CalendarDate) -> bool {
        date >= self.clock.today() && !self.is_blocked(date)
    }

    /// Whether any blocked day lies strictly between `start` and `end`.
    ///
    /// A missing endpoint or `start >= end` is vacuously unblocked. Any other
    /// span counts as blocked until the calendar is loaded.
    pub fn has_blocked_between(
        &self,
        start: Option<CalendarDate>,
        end: Option<CalendarDate>,
    ) -> bool {
        let (Some(start), Some(end)) = (start, end) else {
            return false;
        };
        if start >= end {
            return false;
        }
        self.blocked
            .as_ref()
            .is_none_or(|blocked| blocked.any_between(&start, &end))
    }

    /// Whether the pair is an ordered, long enough stay with no blocked night inside.
    pub fn is_valid_range(
        &self,
        check_in: Option<CalendarDate>,
        check_out: Option<CalendarDate>,
    ) -> bool {
        let (Some(start), Some(end)) = (check_in, check_out) else {
            return false;
        };
        self.is_long_enough(start, end) && !self.has_blocked_between(check_in, check_out)
    }

    /// Sets the pending check-in.
    ///
    /// A pending check-out that is no longer a valid pair with the new
    /// check-in is cleared. `None` clears the whole selection.
    pub fn select_check_in(&mut self, date: Option<CalendarDate>) {
        debug!(check_in = ?date, "Selected check-in");
        self.check_in = date;
        if date.is_none() {
            self.check_out = None;
        }
        self.revalidate_check_out();
    }

    /// Sets the pending check-out if a check-in is pending and `date` is at
    /// least the minimum stay after it. Returns whether the selection changed.
    ///
    /// `None` clears the pending check-out.
    pub fn select_check_out(&mut self, date: Option<CalendarDate>) -> bool {
        let Some(date) = date else {
            let changed = self.check_out.is_some();
            self.check_out = None;
            return changed;
        };
        match self.check_in {
            Some(check_in) if self.is_long_enough(check_in, date) => {
                debug!(%check_in, check_out = %date, "Selected check-out");
                self.check_out = Some(date);
                true
            }
            _ => {
                debug!(
                    check_in = ?self.check_in,
                    check_out = %date,
                    min_nights = self.min_nights,
                    "Ignored check-out",
                );
                false
            }
        }
    }

    /// Whether the check-out picker may offer `date` for the pending check-in.
    pub fn is_check_out_candidate_available(&self, date: CalendarDate) -> bool {
        let Some(check_in) = self.check_in else {
            return false;
        };
        self.is_available(date)
            && self.is_long_enough(check_in, date)
            && !self.has_blocked_between(Some(check_in), Some(date))
    }

    /// Whole calendar days between check-in and check-out, or 0 if either is unset.
    pub fn nights(&self) -> u32 {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => {
                u32::try_from(check_in.days_until(&check_out)).unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Drops both pending days.
    pub fn clear(&mut self) {
        debug!("Cleared the selection");
        self.check_in = None;
        self.check_out = None;
    }

    /// Returns the pending check-in
    pub const fn check_in(&self) -> Option<CalendarDate> {
        self.check_in
    }

    /// Returns the pending check-out
    pub const fn check_out(&self) -> Option<CalendarDate> {
        self.check_out
    }

    /// Where the two-step selection currently stands.
    pub fn selection(&self) -> Selection {
        match (self.check_in, self.check_out) {
            (None, _) => Selection::Empty,
            (Some(check_in), None) => Selection::CheckInOnly(check_in),
            (Some(check_in), Some(check_out)) => DateRange::new(check_in, check_out)
                .ok()
                .filter(|range| range.nights() >= self.min_nights)
                .map_or(Selection::CheckInOnly(check_in), Selection::Complete),
        }
    }

    /// Earliest day the check-out picker should show for the pending check-in.
    pub fn minimum_check_out(&self) -> Option<CalendarDate> {
        self.check_in
            .and_then(|check_in| check_in.add_days(i64::from(self.min_nights)).ok())
    }

    /// The selected stay, if it may be handed off for booking.
    ///
    /// # Errors
    /// Returns `BookingError` describing why the selection is not bookable.
    pub fn confirm(&self) -> Result<DateRange, BookingError> {
        let Some(blocked) = &self.blocked else {
            return Err(BookingError::NotLoaded);
        };
        let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) else {
            return Err(BookingError::Incomplete);
        };

        let range = DateRange::new(check_in, check_out)?;
        if blocked.any_between(&check_in, &check_out) {
            return Err(BookingError::BlockedInside { range });
        }
        info!(%range, nights = range.nights(), "Confirmed the stay");
        Ok(range)
    }

    /// Days in `from..to` the check-in picker may offer.
    pub fn check_in_candidates(
        &self,
        from: CalendarDate,
        to: CalendarDate,
    ) -> impl Iterator<Item = CalendarDate> + '_ {
        Days::new(from, to).filter(|date| self.is_available(*date))
    }

    /// Days up to (excluding) `to` the check-out picker may offer.
    pub fn check_out_candidates(
        &self,
        to: CalendarDate,
    ) -> impl Iterator<Item = CalendarDate> + '_ {
        let first = self.minimum_check_out().unwrap_or(to);
        Days::new(first, to).filter(|date| self.is_check_out_candidate_available(*date))
    }

    fn is_long_enough(&self, check_in: CalendarDate, check_out: CalendarDate) -> bool {
        check_in < check_out && check_in.days_until(&check_out) >= i64::from(self.min_nights)
    }

    fn revalidate_check_out(&mut self) {
        let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) else {
            return;
        };
        if !self.is_valid_range(Some(check_in), Some(check_out)) {
            debug!(
                %check_in,
                %check_out,
                "Cleared a check-out that no longer forms a valid stay",
            );
            self.check_out = None;
        }
    }
}

use std::collections::BTreeMap;
use std::ops::Bound::Excluded;

use serde::{Deserialize, Serialize};

use crate::{CalendarDate, DateRange, prelude::*};

/// Why a day is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// Taken by a guest reservation.
    #[default]
    #[display(fmt = "booked")]
    Booked,
    /// Held unavailable by the owner.
    #[display(fmt = "blocked")]
    Blocked,
}

/// One unavailable day as delivered by a calendar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockedDate {
    pub date: CalendarDate,
    #[serde(default)]
    pub kind: BlockKind,
}

impl BlockedDate {
    /// A day taken by a reservation.
    pub const fn booked(date: CalendarDate) -> Self {
        Self {
            date,
            kind: BlockKind::Booked,
        }
    }

    /// A day held by the owner.
    pub const fn blocked(date: CalendarDate) -> Self {
        Self {
            date,
            kind: BlockKind::Blocked,
        }
    }
}

/// The days on which a stay may not include a night.
///
/// Immutable once built. Lookups are by calendar day, so the order and
/// repetition of the input do not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<BlockedDate>", into = "Vec<BlockedDate>")]
pub struct BlockedDateSet {
    days: BTreeMap<CalendarDate, BlockKind>,
}

impl BlockedDateSet {
    /// Builds the set from entries in any order, duplicates included.
    pub fn new(entries: impl IntoIterator<Item = BlockedDate>) -> Self {
        let mut days = BTreeMap::new();
        for BlockedDate { date, kind } in entries {
            // A reservation outranks an owner hold on the same day.
            days.entry(date)
                .and_modify(|existing| {
                    if kind == BlockKind::Booked {
                        *existing = kind;
                    }
                })
                .or_insert(kind);
        }
        Self { days }
    }

    /// A loaded calendar with nothing blocked.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether `date` is unavailable.
    pub fn contains(&self, date: &CalendarDate) -> bool {
        self.days.contains_key(date)
    }

    /// Why `date` is unavailable, if it is.
    pub fn kind(&self, date: &CalendarDate) -> Option<BlockKind> {
        self.days.get(date).copied()
    }

    /// Whether any unavailable day lies strictly between `start` and `end`.
    ///
    /// Spans where `start >= end` contain no days and return `false`.
    pub fn any_between(&self, start: &CalendarDate, end: &CalendarDate) -> bool {
        if start >= end {
            return false;
        }
        self.days.range((Excluded(start), Excluded(end))).next().is_some()
    }

    /// Unavailable days that fall on nights of `range`.
    pub fn blocked_in(&self, range: &DateRange) -> impl Iterator<Item = BlockedDate> + '_ {
        self.days
            .range(range.check_in()..range.check_out())
            .map(|(date, kind)| BlockedDate {
                date: *date,
                kind: *kind,
            })
    }

    /// All entries in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = BlockedDate> + '_ {
        self.days.iter().map(|(date, kind)| BlockedDate {
            date: *date,
            kind: *kind,
        })
    }

    /// Returns the number of distinct unavailable days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

impl FromIterator<CalendarDate> for BlockedDateSet {
    fn from_iter<I: IntoIterator<Item = CalendarDate>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(BlockedDate::booked))
    }
}

impl FromIterator<BlockedDate> for BlockedDateSet {
    fn from_iter<I: IntoIterator<Item = BlockedDate>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<BlockedDate>> for BlockedDateSet {
    fn from(entries: Vec<BlockedDate>) -> Self {
        Self::new(entries)
    }
}

impl From<BlockedDateSet> for Vec<BlockedDate> {
    fn from(set: BlockedDateSet) -> Self {
        set.iter().collect()
    }
}

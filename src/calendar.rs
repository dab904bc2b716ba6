use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Working hours carried by a single half-day slot.
pub const SLOT_HOURS: f64 = 3.0;

/// Half of a working day. Mornings run 09:00-12:00, afternoons 14:00-17:00;
/// only the ordering matters to the scheduler, the wall-clock times are a
/// display convention.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Afternoon,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "morning",
            Period::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schedulable half-day interval. Slots are totally ordered by
/// (date, morning before afternoon); the derived order relies on field order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Slot {
    pub date: NaiveDate,
    pub period: Period,
}

impl Slot {
    pub fn new(date: NaiveDate, period: Period) -> Self {
        Self { date, period }
    }

    pub fn morning(date: NaiveDate) -> Self {
        Self::new(date, Period::Morning)
    }

    pub fn afternoon(date: NaiveDate) -> Self {
        Self::new(date, Period::Afternoon)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.period)
    }
}

/// Enumerates the working half-day slots of a sprint window.
///
/// Both bounds are inclusive calendar dates; Saturdays and Sundays are never
/// working days. Each working day contributes a morning and an afternoon
/// slot of [`SLOT_HOURS`] hours each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintCalendar {
    start: NaiveDate,
    end: NaiveDate,
}

impl SprintCalendar {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        date >= self.start
            && date <= self.end
            && !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// All working slots of the window, in slot order.
    pub fn slots(&self) -> Vec<Slot> {
        let mut slots = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            if self.is_working_day(current) {
                slots.push(Slot::morning(current));
                slots.push(Slot::afternoon(current));
            }
            current = current + Duration::days(1);
        }
        slots
    }

    /// The earliest working slot, if the window has any.
    pub fn first_slot(&self) -> Option<Slot> {
        self.slots().into_iter().next()
    }

    /// Working slots at or after `from`, in slot order.
    pub fn slots_from(&self, from: Slot) -> Vec<Slot> {
        self.slots().into_iter().filter(|s| *s >= from).collect()
    }

    pub fn contains(&self, slot: Slot) -> bool {
        self.is_working_day(slot.date)
    }

    pub fn working_day_count(&self) -> usize {
        self.slots().len() / 2
    }
}

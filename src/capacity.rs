use crate::calendar::{Slot, SprintCalendar, SLOT_HOURS};
use crate::executor::{DayOff, DayOffPeriod, Executor};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::warn;

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct CapacityError {
    message: String,
}

impl CapacityError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CapacityError {}

/// Remaining working hours per executor per slot.
///
/// Seeded with [`SLOT_HOURS`] for every working slot of the window, reduced
/// by day-offs at build time, and consumed monotonically while placements
/// are committed. Day-offs outside the window are ignored; day-offs for
/// emails with no configured executor are warned about and skipped.
#[derive(Debug, Clone)]
pub struct CapacityLedger {
    hours: HashMap<String, BTreeMap<Slot, f64>>,
}

impl CapacityLedger {
    pub fn build(
        calendar: &SprintCalendar,
        executors: &[Executor],
        dayoffs: &BTreeMap<String, Vec<DayOff>>,
    ) -> Self {
        let slots = calendar.slots();
        let mut hours: HashMap<String, BTreeMap<Slot, f64>> = HashMap::new();
        for executor in executors {
            let per_slot = slots.iter().map(|slot| (*slot, SLOT_HOURS)).collect();
            hours.insert(executor.email.clone(), per_slot);
        }

        for (email, entries) in dayoffs {
            let key = email.to_lowercase();
            let per_slot = match hours.get_mut(&key) {
                Some(per_slot) => per_slot,
                None => {
                    warn!(email = %email, "day-off for unknown executor ignored");
                    continue;
                }
            };
            for dayoff in entries {
                for slot in dayoff_slots(dayoff) {
                    // Slots outside the window never entered the map.
                    if let Some(remaining) = per_slot.get_mut(&slot) {
                        *remaining = 0.0;
                    }
                }
            }
        }

        Self { hours }
    }

    /// Remaining hours of `email` in `slot`; zero for unknown pairs.
    pub fn remaining(&self, email: &str, slot: Slot) -> f64 {
        self.hours
            .get(email)
            .and_then(|per_slot| per_slot.get(&slot))
            .copied()
            .unwrap_or(0.0)
    }

    /// Remaining hours of `email` across the whole window.
    pub fn total_remaining(&self, email: &str) -> f64 {
        self.hours
            .get(email)
            .map(|per_slot| per_slot.values().sum())
            .unwrap_or(0.0)
    }

    /// Debits `hours` from the slot. Fails when the slot holds less than
    /// the requested amount.
    pub fn consume(&mut self, email: &str, slot: Slot, hours: f64) -> Result<(), CapacityError> {
        let remaining = self
            .hours
            .get_mut(email)
            .and_then(|per_slot| per_slot.get_mut(&slot))
            .ok_or_else(|| CapacityError::new(format!("no capacity entry for {email} at {slot}")))?;
        if hours > *remaining + EPSILON {
            return Err(CapacityError::new(format!(
                "cannot consume {hours}h from {email} at {slot}: only {remaining}h remaining"
            )));
        }
        *remaining = (*remaining - hours).max(0.0);
        Ok(())
    }
}

fn dayoff_slots(dayoff: &DayOff) -> Vec<Slot> {
    match dayoff.period {
        DayOffPeriod::Full => vec![Slot::morning(dayoff.date), Slot::afternoon(dayoff.date)],
        DayOffPeriod::Morning => vec![Slot::morning(dayoff.date)],
        DayOffPeriod::Afternoon => vec![Slot::afternoon(dayoff.date)],
    }
}

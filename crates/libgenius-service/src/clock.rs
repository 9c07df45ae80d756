//! # Clock
//!
//! Source of "today" for lending transitions. Core functions take the date
//! as an argument; the service asks its clock once per operation.

use std::fmt;
use std::sync::RwLock;

use chrono::{Days, NaiveDate, Utc};

/// Supplies the current calendar date.
pub trait Clock: Send + Sync + fmt::Debug {
    fn today(&self) -> NaiveDate;
}

/// Wall clock. Dates are UTC calendar days.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        FixedClock {
            today: RwLock::new(today),
        }
    }

    pub fn set(&self, today: NaiveDate) {
        let mut guard = self.today.write().unwrap_or_else(|e| e.into_inner());
        *guard = today;
    }

    /// Moves the clock forward by `days`. Saturates at the calendar limit.
    pub fn advance(&self, days: u64) {
        let mut guard = self.today.write().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = guard.checked_add_days(Days::new(days)) {
            *guard = next;
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 30).unwrap());
        clock.advance(3);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());

        clock.set(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_system_clock_is_a_real_date() {
        assert!(SystemClock.today() > NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }
}

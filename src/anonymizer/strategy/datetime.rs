//! Whole-value datetime replacement.

use super::{Strategy, TypeClass, ValueError};
use chrono::NaiveDate;
use rand::{Rng, RngCore};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Replace a datetime with a random, well-formed `YYYY-MM-DD HH:MM:SS`.
///
/// Days stop at 28 so every month is valid; hours are in `0..=23`.
#[derive(Debug, Clone)]
pub struct DateTimeStrategy {
    min_year: i32,
    max_year: i32,
}

impl DateTimeStrategy {
    pub fn new(min_year: i32, max_year: i32) -> Self {
        Self {
            min_year: min_year.min(max_year),
            max_year: max_year.max(min_year),
        }
    }
}

impl Default for DateTimeStrategy {
    fn default() -> Self {
        Self::new(1971, 2013)
    }
}

impl Strategy for DateTimeStrategy {
    fn apply(&self, _value: &str, rng: &mut dyn RngCore) -> Result<String, ValueError> {
        let year = rng.random_range(self.min_year..=self.max_year);
        let month = rng.random_range(1..=12);
        let day = rng.random_range(1..=28);
        let hour = rng.random_range(0..=23);
        let minute = rng.random_range(0..=59);
        let second = rng.random_range(0..=59);

        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .map(|dt| dt.format(DATETIME_FORMAT).to_string())
            .ok_or_else(|| ValueError::new(TypeClass::DateTime, "generated an invalid date"))
    }

    fn class(&self) -> TypeClass {
        TypeClass::DateTime
    }
}

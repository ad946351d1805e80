//! Monthly game calendar.

use chrono::{Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MONTHS_PER_YEAR: u8 = 12;

const MONTHS: [Month; MONTHS_PER_YEAR as usize] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Current year and zero-based month (0 = January, 11 = December).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Calendar {
    pub year: i32,
    pub month_index: u8,
}

impl Calendar {
    /// January of `year`.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            month_index: 0,
        }
    }

    /// One-based month number, comparable with a varietal's ripening month.
    pub fn month_number(&self) -> u8 {
        self.month_index + 1
    }

    pub fn month(&self) -> Month {
        MONTHS[usize::from(self.month_index % MONTHS_PER_YEAR)]
    }

    pub fn month_name(&self) -> &'static str {
        self.month().name()
    }

    /// Move to the next month. Returns `true` when the year rolled over.
    pub fn advance(&mut self) -> bool {
        self.month_index += 1;
        if self.month_index >= MONTHS_PER_YEAR {
            self.month_index = 0;
            self.year += 1;
            return true;
        }
        false
    }

    /// First day of the current month, if the year is representable.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month_number()), 1)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn december_rolls_into_january() {
        let mut cal = Calendar {
            year: 2025,
            month_index: 11,
        };
        assert_eq!(cal.month_name(), "December");
        assert!(cal.advance());
        assert_eq!(cal, Calendar::new(2026));
        assert_eq!(cal.to_string(), "January 2026");
    }

    #[test]
    fn first_day_matches_month() {
        let cal = Calendar {
            year: 2025,
            month_index: 8,
        };
        assert_eq!(cal.month_number(), 9);
        assert_eq!(cal.first_day(), NaiveDate::from_ymd_opt(2025, 9, 1));
    }

    proptest! {
        #[test]
        fn advancing_n_months_is_division(start in 0u8..12, n in 0u32..500) {
            let mut cal = Calendar { year: 2000, month_index: start };
            let mut rollovers = 0;
            for _ in 0..n {
                if cal.advance() {
                    rollovers += 1;
                }
            }
            let total = u32::from(start) + n;
            prop_assert!(cal.month_index < MONTHS_PER_YEAR);
            prop_assert_eq!(u32::from(cal.month_index), total % 12);
            prop_assert_eq!(cal.year, 2000 + (total / 12) as i32);
            prop_assert_eq!(rollovers, total / 12);
        }
    }
}

use std::fmt;

use crate::error::{Error, Result};

/// Cumulative day count at the start of each month of a non-leap year,
/// `daysOfMonth[m-1]` giving the day offset of month `m`.
const DAYS_BEFORE_MONTH: [i32; 13] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366];

/// A minute-resolution timestamp packed into a single `i32`: minutes
/// since January 1st of an implicit year, used throughout the ticketing
/// domain for train schedules, sale windows and order timestamps.
///
/// Stored as a plain ordinal rather than a calendar type so it has the
/// same fixed 4-byte binary layout whether it sits in a page or is passed
/// across the domain API.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct DateTime {
    minutes: i32,
}

impl DateTime {
    pub fn from_minutes(minutes: i32) -> Self {
        Self { minutes }
    }

    pub fn from_parts(month: u32, day: u32, hour: u32, minute: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidArgument(format!("month {} out of range", month)));
        }
        let days_in_month = DAYS_BEFORE_MONTH[month as usize] - DAYS_BEFORE_MONTH[month as usize - 1];
        if day == 0 || day as i32 > days_in_month {
            return Err(Error::InvalidArgument(format!("day {} out of range for month {}", day, month)));
        }
        if hour > 23 || minute > 59 {
            return Err(Error::InvalidArgument(format!("time {}:{} out of range", hour, minute)));
        }
        let minutes = (DAYS_BEFORE_MONTH[month as usize - 1] + day as i32 - 1) * 24 * 60
            + hour as i32 * 60
            + minute as i32;
        Ok(Self { minutes })
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    /// Truncates to the start of the calendar day, used to key a train's
    /// per-day seat availability by sale date regardless of departure time.
    pub fn at_midnight(&self) -> Self {
        Self { minutes: self.minutes / (24 * 60) * (24 * 60) }
    }

    /// Day-of-year ordinal (days since January 1st), used as the index into
    /// a train's per-day seat and schedule arrays.
    pub fn day_ordinal(&self) -> i32 {
        self.minutes.div_euclid(24 * 60)
    }

    pub fn minute_of_day(&self) -> i32 {
        self.minutes.rem_euclid(24 * 60)
    }

    pub fn checked_add_days(&self, days: i32) -> Self {
        Self { minutes: self.minutes + days * 24 * 60 }
    }
}

impl std::ops::Sub for DateTime {
    type Output = i32;

    fn sub(self, rhs: Self) -> i32 {
        self.minutes - rhs.minutes
    }
}

impl std::ops::Add<i32> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: i32) -> DateTime {
        DateTime { minutes: self.minutes + rhs }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let day_ordinal = self.day_ordinal();
        let mut month = 1usize;
        while DAYS_BEFORE_MONTH[month] <= day_ordinal {
            month += 1;
        }
        let day = day_ordinal - DAYS_BEFORE_MONTH[month - 1] + 1;
        let minute_of_day = self.minute_of_day();
        write!(
            f,
            "{:02}-{:02} {:02}:{:02}",
            month,
            day,
            minute_of_day / 60,
            minute_of_day % 60
        )
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "DateTime({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_the_original_tool() {
        let dt = DateTime::from_parts(6, 1, 8, 30).unwrap();
        assert_eq!(dt.to_string(), "06-01 08:30");
    }

    #[test]
    fn orders_chronologically() {
        let a = DateTime::from_parts(6, 1, 8, 0).unwrap();
        let b = DateTime::from_parts(6, 1, 9, 0).unwrap();
        assert!(a < b);
    }

    #[test]
    fn midnight_truncates_time_of_day() {
        let dt = DateTime::from_parts(7, 4, 13, 45).unwrap();
        assert_eq!(dt.at_midnight().minute_of_day(), 0);
        assert_eq!(dt.at_midnight().day_ordinal(), dt.day_ordinal());
    }

    #[test]
    fn rejects_invalid_parts() {
        assert!(DateTime::from_parts(13, 1, 0, 0).is_err());
        assert!(DateTime::from_parts(2, 30, 0, 0).is_err());
        assert!(DateTime::from_parts(1, 1, 24, 0).is_err());
    }
}

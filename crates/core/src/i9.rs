//! Form I-9 federal deadlines.
//!
//! Section 1 must be completed by the employee no later than the first day
//! of employment. Section 2 must be completed by the employer within three
//! business days of the start date. Only Saturday and Sunday are skipped;
//! federal holidays are not considered.

use chrono::{Datelike, Weekday};
use serde::Serialize;

use crate::types::Date;

/// Business days allowed for Section 2 after the start date.
pub const SECTION2_BUSINESS_DAYS: u32 = 3;

/// Both I-9 deadlines for a given start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct I9Deadlines {
    pub section1: Date,
    pub section2: Date,
}

fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advance `start` by `days` business days, skipping weekends.
///
/// With `days == 0` the start date is returned unchanged, even when it
/// falls on a weekend.
pub fn add_business_days(start: Date, days: u32) -> Date {
    let mut current = start;
    let mut remaining = days;
    while remaining > 0 {
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    current
}

pub fn section1_deadline(start_date: Date) -> Date {
    start_date
}

pub fn section2_deadline(start_date: Date) -> Date {
    add_business_days(start_date, SECTION2_BUSINESS_DAYS)
}

pub fn deadlines_for(start_date: Date) -> I9Deadlines {
    I9Deadlines {
        section1: section1_deadline(start_date),
        section2: section2_deadline(start_date),
    }
}

/// Where an employee stands against a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    Complete,
    OnTrack,
    DueToday,
    Overdue,
}

pub fn deadline_status(deadline: Date, today: Date, completed: bool) -> DeadlineStatus {
    if completed {
        DeadlineStatus::Complete
    } else if today > deadline {
        DeadlineStatus::Overdue
    } else if today == deadline {
        DeadlineStatus::DueToday
    } else {
        DeadlineStatus::OnTrack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn friday_start_lands_on_wednesday() {
        // 2026-10-16 is a Friday.
        let start = d(2026, 10, 16);
        assert_eq!(start.weekday(), Weekday::Fri);
        let deadline = section2_deadline(start);
        assert_eq!(deadline, d(2026, 10, 21));
        assert_eq!(deadline.weekday(), Weekday::Wed);
    }

    #[test]
    fn monday_start_lands_on_thursday() {
        assert_eq!(section2_deadline(d(2026, 10, 12)), d(2026, 10, 15));
    }

    #[test]
    fn wednesday_start_crosses_weekend() {
        // Wed -> Thu, Fri, Mon
        assert_eq!(section2_deadline(d(2026, 10, 14)), d(2026, 10, 19));
    }

    #[test]
    fn saturday_start_counts_from_monday() {
        // Sat -> Mon, Tue, Wed
        assert_eq!(section2_deadline(d(2026, 10, 17)), d(2026, 10, 21));
    }

    #[test]
    fn holidays_are_not_skipped() {
        // 2026-12-24 is a Thursday; Christmas Friday still counts.
        assert_eq!(section2_deadline(d(2026, 12, 24)), d(2026, 12, 29));
    }

    #[test]
    fn section1_is_start_date() {
        let start = d(2026, 11, 2);
        let deadlines = deadlines_for(start);
        assert_eq!(deadlines.section1, start);
        assert_eq!(deadlines.section2, d(2026, 11, 5));
    }

    #[test]
    fn zero_business_days_is_identity() {
        let sunday = d(2026, 10, 18);
        assert_eq!(add_business_days(sunday, 0), sunday);
    }

    #[test]
    fn deadline_status_transitions() {
        let deadline = d(2026, 10, 21);
        assert_eq!(deadline_status(deadline, d(2026, 10, 20), false), DeadlineStatus::OnTrack);
        assert_eq!(deadline_status(deadline, deadline, false), DeadlineStatus::DueToday);
        assert_eq!(deadline_status(deadline, d(2026, 10, 22), false), DeadlineStatus::Overdue);
        assert_eq!(deadline_status(deadline, d(2026, 10, 22), true), DeadlineStatus::Complete);
    }
}

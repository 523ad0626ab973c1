use chrono::{Datelike, Months, NaiveDate};

use crate::errors::{LedgerError, Result};

/// number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = shift_month(year, month, 1);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// move a (year, month) pair by `delta` months
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), (index.rem_euclid(12) + 1) as u32)
}

/// date for `day` in the month, clamped to the month's last day
pub fn clamped_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| LedgerError::InvalidDate {
        message: format!("{}-{:02}-{:02} is out of range", year, month, day),
    })
}

/// add calendar months, clamping the day to the target month's length
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LedgerError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

pub fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt().ok_or_else(|| LedgerError::InvalidDate {
        message: format!("no day after {}", date),
    })
}

pub fn previous_day(date: NaiveDate) -> Result<NaiveDate> {
    date.pred_opt().ok_or_else(|| LedgerError::InvalidDate {
        message: format!("no day before {}", date),
    })
}

pub mod calendar;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{LedgerError, Result};

use calendar::{clamped_date, next_day, previous_day, shift_month};

/// a card's statement period; both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cycle {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl Cycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// number of calendar days in the period
    pub fn length_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// resolves statement periods from a card's closing and billing days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleCalculator {
    closing_day: u32,
    billing_day: u32,
}

impl CycleCalculator {
    pub fn new(closing_day: u32, billing_day: u32) -> Result<Self> {
        validate_day("closing_day", closing_day)?;
        validate_day("billing_day", billing_day)?;
        Ok(Self { closing_day, billing_day })
    }

    pub fn closing_day(&self) -> u32 {
        self.closing_day
    }

    pub fn billing_day(&self) -> u32 {
        self.billing_day
    }

    /// cycle containing `reference_date`
    pub fn resolve(&self, reference_date: NaiveDate) -> Result<Cycle> {
        let (year, month) = (reference_date.year(), reference_date.month());
        let closing_this_month = clamped_date(year, month, self.closing_day)?;

        let (previous_closing, end_date) = if reference_date > closing_this_month {
            let (ny, nm) = shift_month(year, month, 1);
            (closing_this_month, clamped_date(ny, nm, self.closing_day)?)
        } else {
            let (py, pm) = shift_month(year, month, -1);
            (clamped_date(py, pm, self.closing_day)?, closing_this_month)
        };

        let start_date = next_day(previous_closing)?;
        let due_date = self.due_date_for(end_date)?;

        Ok(Cycle { start_date, end_date, due_date })
    }

    /// the cycle right after `cycle`
    pub fn next(&self, cycle: &Cycle) -> Result<Cycle> {
        self.resolve(next_day(cycle.end_date)?)
    }

    /// the cycle right before `cycle`
    pub fn previous(&self, cycle: &Cycle) -> Result<Cycle> {
        self.resolve(previous_day(cycle.start_date)?)
    }

    /// the cycle `steps` periods after the one containing `reference_date`
    pub fn advance(&self, reference_date: NaiveDate, steps: u32) -> Result<Cycle> {
        let mut cycle = self.resolve(reference_date)?;
        for _ in 0..steps {
            cycle = self.next(&cycle)?;
        }
        Ok(cycle)
    }

    /// consecutive cycles covering `from..=to`
    pub fn cycles_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Cycle>> {
        let mut cycles = Vec::new();
        if to < from {
            return Ok(cycles);
        }

        let mut cycle = self.resolve(from)?;
        cycles.push(cycle);
        while cycle.end_date < to {
            cycle = self.next(&cycle)?;
            cycles.push(cycle);
        }
        Ok(cycles)
    }

    // first billing day strictly after the closing date
    fn due_date_for(&self, end_date: NaiveDate) -> Result<NaiveDate> {
        let same_month = clamped_date(end_date.year(), end_date.month(), self.billing_day)?;
        if same_month > end_date {
            return Ok(same_month);
        }
        let (year, month) = shift_month(end_date.year(), end_date.month(), 1);
        clamped_date(year, month, self.billing_day)
    }
}

/// resolve the cycle containing `reference_date` for the given card days
pub fn resolve_cycle(closing_day: u32, billing_day: u32, reference_date: NaiveDate) -> Result<Cycle> {
    let cycle = CycleCalculator::new(closing_day, billing_day)?.resolve(reference_date)?;
    debug!(
        closing_day,
        billing_day,
        %reference_date,
        start = %cycle.start_date,
        end = %cycle.end_date,
        due = %cycle.due_date,
        "resolved billing cycle"
    );
    Ok(cycle)
}

fn validate_day(field: &'static str, value: u32) -> Result<()> {
    if (1..=31).contains(&value) {
        Ok(())
    } else {
        Err(LedgerError::InvalidCardConfig { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reference_after_closing_day() {
        let cycle = resolve_cycle(10, 15, date(2024, 3, 25)).unwrap();
        assert_eq!(cycle.start_date, date(2024, 3, 11));
        assert_eq!(cycle.end_date, date(2024, 4, 10));
        assert_eq!(cycle.due_date, date(2024, 4, 15));
    }

    #[test]
    fn test_reference_on_closing_day_belongs_to_closing_cycle() {
        let cycle = resolve_cycle(10, 15, date(2024, 3, 10)).unwrap();
        assert_eq!(cycle.start_date, date(2024, 2, 11));
        assert_eq!(cycle.end_date, date(2024, 3, 10));

        let after = resolve_cycle(10, 15, date(2024, 3, 11)).unwrap();
        assert_eq!(after.start_date, date(2024, 3, 11));
    }

    #[test]
    fn test_billing_before_closing_is_due_next_month() {
        // closes on the 25th, due on the 5th of the following month
        let cycle = resolve_cycle(25, 5, date(2024, 3, 20)).unwrap();
        assert_eq!(cycle.start_date, date(2024, 2, 26));
        assert_eq!(cycle.end_date, date(2024, 3, 25));
        assert_eq!(cycle.due_date, date(2024, 4, 5));
    }

    #[test]
    fn test_year_rollover() {
        let cycle = resolve_cycle(20, 28, date(2024, 12, 22)).unwrap();
        assert_eq!(cycle.start_date, date(2024, 12, 21));
        assert_eq!(cycle.end_date, date(2025, 1, 20));
        assert_eq!(cycle.due_date, date(2025, 1, 28));

        let cycle = resolve_cycle(20, 5, date(2024, 12, 22)).unwrap();
        assert_eq!(cycle.due_date, date(2025, 2, 5));
    }

    #[test]
    fn test_closing_day_31_clamps_short_months() {
        let feb = resolve_cycle(31, 10, date(2024, 2, 15)).unwrap();
        assert_eq!(feb.start_date, date(2024, 2, 1));
        assert_eq!(feb.end_date, date(2024, 2, 29));
        assert_eq!(feb.due_date, date(2024, 3, 10));

        let apr = resolve_cycle(31, 10, date(2024, 4, 30)).unwrap();
        assert_eq!(apr.start_date, date(2024, 4, 1));
        assert_eq!(apr.end_date, date(2024, 4, 30));
    }

    #[test]
    fn test_closing_day_30_in_february() {
        // february closes on the 29th, so march 1st opens the next cycle
        let calc = CycleCalculator::new(30, 7).unwrap();
        let feb = calc.resolve(date(2024, 2, 29)).unwrap();
        assert_eq!(feb.start_date, date(2024, 1, 31));
        assert_eq!(feb.end_date, date(2024, 2, 29));

        let mar = calc.next(&feb).unwrap();
        assert_eq!(mar.start_date, date(2024, 3, 1));
        assert_eq!(mar.end_date, date(2024, 3, 30));
    }

    #[test]
    fn test_billing_day_clamped() {
        let cycle = resolve_cycle(5, 31, date(2024, 4, 2)).unwrap();
        assert_eq!(cycle.end_date, date(2024, 4, 5));
        assert_eq!(cycle.due_date, date(2024, 4, 30));

        // clamped billing day lands on the closing date, so it rolls over
        let feb = resolve_cycle(28, 30, date(2023, 2, 20)).unwrap();
        assert_eq!(feb.end_date, date(2023, 2, 28));
        assert_eq!(feb.due_date, date(2023, 3, 30));
    }

    #[test]
    fn test_invalid_days_rejected() {
        assert_eq!(
            resolve_cycle(0, 10, date(2024, 1, 1)),
            Err(LedgerError::InvalidCardConfig { field: "closing_day", value: 0 })
        );
        assert_eq!(
            resolve_cycle(10, 32, date(2024, 1, 1)),
            Err(LedgerError::InvalidCardConfig { field: "billing_day", value: 32 })
        );
    }

    #[test]
    fn test_next_previous_and_advance() {
        let calc = CycleCalculator::new(10, 15).unwrap();
        let cycle = calc.resolve(date(2024, 3, 25)).unwrap();

        let next = calc.next(&cycle).unwrap();
        assert_eq!(next.start_date, date(2024, 4, 11));
        assert_eq!(calc.previous(&next).unwrap(), cycle);

        let third = calc.advance(date(2024, 3, 25), 2).unwrap();
        assert_eq!(third.start_date, date(2024, 5, 11));
        assert_eq!(third.due_date, date(2024, 6, 15));
    }

    #[test]
    fn test_cycles_between_are_contiguous() {
        let calc = CycleCalculator::new(31, 5).unwrap();
        let cycles = calc.cycles_between(date(2024, 1, 15), date(2024, 12, 31)).unwrap();
        assert_eq!(cycles.len(), 12);
        for pair in cycles.windows(2) {
            assert_eq!(next_day(pair[0].end_date).unwrap(), pair[1].start_date);
        }
        assert!(calc.cycles_between(date(2024, 2, 1), date(2024, 1, 1)).unwrap().is_empty());
    }
}

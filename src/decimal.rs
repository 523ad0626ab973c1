use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// money held at the currency's minor unit (BRL, 2 decimal places)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    /// decimal places of the minor unit
    pub const SCALE: u32 = 2;
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal, rounding half away from zero to cents
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round_cents(d))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(round_cents(Decimal::from_str(s)?)))
    }

    /// create from integer amount (reais)
    pub fn from_major(amount: i64) -> Self {
        Money(round_cents(Decimal::from(amount)))
    }

    /// create from minor amount (centavos)
    pub fn from_minor(cents: i64) -> Self {
        Money(Decimal::new(cents, Self::SCALE))
    }

    /// amount in centavos, `None` when it does not fit in an i64
    pub fn to_minor(&self) -> Option<i64> {
        self.0.checked_mul(Decimal::ONE_HUNDRED)?.trunc().to_i64()
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// `self / parts`, truncated to whole cents toward zero
    pub fn floor_div(&self, parts: u32) -> Money {
        if parts == 0 {
            return Money::ZERO;
        }
        let share = self.0 / Decimal::from(parts);
        Money(share.round_dp_with_strategy(Self::SCALE, RoundingStrategy::ToZero))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }
}

fn round_cents(d: Decimal) -> Decimal {
    let mut rounded = d.round_dp_with_strategy(Money::SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(Money::SCALE);
    rounded
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(round_cents(self.0 + other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = round_cents(self.0 + other.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(round_cents(self.0 - other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = round_cents(self.0 - other.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

/// percentage expressed in points (60 means 60%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Percentage(Decimal);

impl Percentage {
    pub const ZERO: Percentage = Percentage(Decimal::ZERO);
    pub const HUNDRED: Percentage = Percentage(Decimal::ONE_HUNDRED);

    /// create from points (e.g., 60 for 60%)
    pub fn from_points(points: Decimal) -> Self {
        Percentage(points)
    }

    /// create from whole points
    pub fn from_whole(points: u32) -> Self {
        Percentage(Decimal::from(points))
    }

    pub fn as_points(&self) -> Decimal {
        self.0
    }

    /// as a ratio (0.6 for 60%)
    pub fn as_ratio(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    /// unrounded share of an amount
    pub fn of(&self, amount: Money) -> Decimal {
        amount.as_decimal() * self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl From<Decimal> for Percentage {
    fn from(d: Decimal) -> Self {
        Percentage::from_points(d)
    }
}

impl Sum for Percentage {
    fn sum<I: Iterator<Item = Percentage>>(iter: I) -> Percentage {
        Percentage(iter.map(|p| p.0).sum())
    }
}

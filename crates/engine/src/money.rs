use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Signed money amount represented as **integer cents** of Brazilian real.
///
/// Every amount the engine stores or computes is an integer number of cents,
/// so splitting and summing never drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(123_456);
/// assert_eq!(amount.cents(), 123456);
/// assert_eq!(amount.to_string(), "R$ 1.234,56");
/// ```
///
/// Parsing accepts what a user types in a currency field:
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("R$ 1.234,56".parse::<MoneyCents>().unwrap().cents(), 123456);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("".parse::<MoneyCents>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Clamps negative amounts to zero (display of available limits).
    #[must_use]
    pub const fn floor_zero(self) -> Self {
        if self.0 < 0 { Self(0) } else { self }
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Checked multiplication by an occurrence count.
    #[must_use]
    pub fn checked_mul(self, times: i64) -> Option<MoneyCents> {
        self.0.checked_mul(times).map(MoneyCents)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let reais = (abs / 100).to_string();
        let cents = abs % 100;

        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, digit) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        write!(f, "{sign}R$ {grouped},{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sub for MoneyCents {
    type Output = MoneyCents;

    fn sub(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 - rhs.0)
    }
}

impl SubAssign for MoneyCents {
    fn sub_assign(&mut self, rhs: MoneyCents) {
        self.0 -= rhs.0;
    }
}

impl Neg for MoneyCents {
    type Output = MoneyCents;

    fn neg(self) -> Self::Output {
        MoneyCents(-self.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_brl_to_cents(s).map(MoneyCents)
    }
}

/// Converts a BRL string (`"R$ 1.234,56"`, `"1234,56"`, `"15"`) into cents.
///
/// Only digits and the decimal comma are significant: currency symbol,
/// spaces, signs and the `.` thousands separator are dropped. A third
/// fractional digit rounds half-up, further digits are ignored.
pub fn parse_brl_to_cents(value: &str) -> ResultEngine<i64> {
    let invalid = |msg: &str| EngineError::Validation(format!("invalid amount '{value}': {msg}"));

    let clean: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',')
        .collect();

    let mut parts = clean.split(',');
    let reais_str = parts.next().unwrap_or_default();
    let frac_str = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(invalid("more than one decimal separator"));
    }
    if reais_str.is_empty() && frac_str.is_empty() {
        return Err(invalid("empty amount"));
    }

    let reais: i64 = if reais_str.is_empty() {
        0
    } else {
        reais_str.parse().map_err(|_| invalid("amount too large"))?
    };

    let digits: Vec<i64> = frac_str
        .bytes()
        .take(3)
        .map(|b| i64::from(b - b'0'))
        .collect();
    let tenths = digits.first().copied().unwrap_or(0);
    let hundredths = digits.get(1).copied().unwrap_or(0);
    let round_up = digits.get(2).is_some_and(|d| *d >= 5);
    let cents = tenths * 10 + hundredths + i64::from(round_up);

    reais
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(|| invalid("amount too large"))
}

/// Formats a date the Brazilian way (`dd/mm/yyyy`).
#[must_use]
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

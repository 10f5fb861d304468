//! A monetary amount stored as integer cents.
//!
//! Storing cents in an `i64` keeps sums and differences exact for
//! two-decimal-place currency values, which floating point cannot guarantee.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// A monetary amount in cents (hundredths of the currency unit).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Zero dollars and zero cents.
    pub const ZERO: Money = Money(0);

    /// Create an amount from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a number of cents.
    pub const fn as_cents(&self) -> i64 {
        self.0
    }

    /// Whether the amount is exactly zero.
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse an amount from a decimal string such as "12.34", "12.3" or "12".
    ///
    /// A leading dollar sign is accepted since users tend to type one.
    ///
    /// # Errors
    /// Returns an [Error::InvalidAmount] if the string is not a decimal number
    /// with at most two fractional digits.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let input = text.trim();
        let unsigned = input.strip_prefix('-').unwrap_or(input);
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);

        let (dollars_text, cents_text) = match unsigned.split_once('.') {
            Some((dollars, cents)) => (dollars, cents),
            None => (unsigned, ""),
        };

        if dollars_text.is_empty() && cents_text.is_empty() {
            return Err(Error::InvalidAmount(text.to_owned()));
        }

        let dollars: i64 = match dollars_text {
            "" => 0,
            digits => digits
                .parse()
                .map_err(|_| Error::InvalidAmount(text.to_owned()))?,
        };

        let cents: i64 = match cents_text.len() {
            0 => 0,
            1 | 2 => {
                let parsed: i64 = cents_text
                    .parse()
                    .map_err(|_| Error::InvalidAmount(text.to_owned()))?;

                if cents_text.len() == 1 { parsed * 10 } else { parsed }
            }
            _ => return Err(Error::InvalidAmount(text.to_owned())),
        };

        let total = dollars * 100 + cents;

        if input.starts_with('-') {
            Ok(Self(-total))
        } else {
            Ok(Self(total))
        }
    }

    /// Parse an amount that must be at least one cent.
    ///
    /// Transactions and budgets record money that actually moved or is
    /// planned, so zero and negative amounts are rejected.
    ///
    /// # Errors
    /// Returns an [Error::InvalidAmount] if parsing fails or the amount is
    /// below $0.01.
    pub fn parse_positive(text: &str) -> Result<Self, Error> {
        let amount = Self::parse(text)?;

        if amount.0 < 1 {
            return Err(Error::InvalidAmount(text.to_owned()));
        }

        Ok(amount)
    }

    /// The amount as a plain decimal string, e.g. "12.34" or "-0.05".
    ///
    /// Used for serialization and CSV output where a currency symbol would
    /// get in the way.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();

        format!("{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();

        write!(f, "{}${}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |total, amount| total + amount)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        Money::parse(&text).map_err(|error| de::Error::custom(error.to_string()))
    }
}

impl ToSql for Money {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Money {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(cents) => Ok(Money(cents)),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

#[cfg(test)]
mod parse_tests {
    use crate::{Error, money::Money};

    #[test]
    fn parses_dollars_and_cents() {
        assert_eq!(Money::parse("10.50"), Ok(Money::from_cents(1050)));
        assert_eq!(Money::parse("$10.50"), Ok(Money::from_cents(1050)));
        assert_eq!(Money::parse("10"), Ok(Money::from_cents(1000)));
        assert_eq!(Money::parse("10.5"), Ok(Money::from_cents(1050)));
        assert_eq!(Money::parse("0.05"), Ok(Money::from_cents(5)));
        assert_eq!(Money::parse(".05"), Ok(Money::from_cents(5)));
        assert_eq!(Money::parse("-3.25"), Ok(Money::from_cents(-325)));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", " ", "ten", "10.123", "1.2.3", "$"] {
            assert_eq!(
                Money::parse(input),
                Err(Error::InvalidAmount(input.to_owned())),
                "want parse of {input:?} to fail"
            );
        }
    }

    #[test]
    fn parse_positive_rejects_zero_and_negative() {
        assert_eq!(
            Money::parse_positive("0.00"),
            Err(Error::InvalidAmount("0.00".to_owned()))
        );
        assert_eq!(
            Money::parse_positive("-1.00"),
            Err(Error::InvalidAmount("-1.00".to_owned()))
        );
        assert_eq!(Money::parse_positive("0.01"), Ok(Money::from_cents(1)));
    }
}

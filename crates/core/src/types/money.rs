//! Minor-unit money representation.
//!
//! All monetary amounts in the catalog and checkout pipeline are integer
//! minor currency units (cents for USD). Arithmetic never leaves integers;
//! [`rust_decimal`] is used only to render a human-readable dollar amount.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in minor currency units (cents).
///
/// ## Examples
///
/// ```
/// use clementine_core::Cents;
///
/// let price = Cents::new(1999);
/// assert_eq!(price.to_string(), "$19.99");
/// assert!(price.is_positive());
///
/// let total: Cents = [Cents::new(500), Cents::new(1000)].into_iter().sum();
/// assert_eq!(total, Cents::new(1500));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw minor-unit count.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the raw minor-unit count.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is negative (invalid for prices and shipping rates).
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Self(sum)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Convert to a decimal amount in major units (e.g. `1999` -> `19.99`).
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}", self.to_decimal().abs())
        } else {
            write!(f, "${}", self.to_decimal())
        }
    }
}

impl Add for Cents {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Cents {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Cents> for i64 {
    fn from(amount: Cents) -> Self {
        amount.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Cents {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Cents {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Cents {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats_dollars() {
        assert_eq!(Cents::new(0).to_string(), "$0.00");
        assert_eq!(Cents::new(5).to_string(), "$0.05");
        assert_eq!(Cents::new(1999).to_string(), "$19.99");
        assert_eq!(Cents::new(250_000).to_string(), "$2500.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Cents::new(-150).to_string(), "-$1.50");
    }

    #[test]
    fn test_sum_over_line_items() {
        let total: Cents = [Cents::new(500), Cents::ZERO, Cents::new(1000)]
            .into_iter()
            .sum();
        assert_eq!(total.as_i64(), 1500);
    }

    #[test]
    fn test_checked_add_overflow() {
        assert!(Cents::new(i64::MAX).checked_add(Cents::new(1)).is_none());
        assert_eq!(
            Cents::new(1).checked_add(Cents::new(2)),
            Some(Cents::new(3))
        );
    }

    #[test]
    fn test_is_positive() {
        assert!(Cents::new(1).is_positive());
        assert!(!Cents::ZERO.is_positive());
        assert!(!Cents::new(-1).is_positive());
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Cents::new(1234)).unwrap();
        assert_eq!(json, "1234");

        let parsed: Cents = serde_json::from_str("1234").unwrap();
        assert_eq!(parsed, Cents::new(1234));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Cents::new(1999).to_decimal(), Decimal::new(1999, 2));
    }
}

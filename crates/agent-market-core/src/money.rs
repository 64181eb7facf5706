use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Ten-thousandths of a currency unit per [`Money`] step.
const SCALE: i64 = 10_000;

/// Fixed-point currency amount.
///
/// Stored as a count of ten-thousandths so per-unit rates like $0.0025 stay
/// exact. Totals are shown rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_raw(raw: i64) -> Self {
        Money(raw)
    }

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents.saturating_mul(SCALE / 100))
    }

    pub const fn from_units(units: i64) -> Self {
        Money(units.saturating_mul(SCALE))
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert a decimal amount, rounding to the nearest ten-thousandth.
    /// Returns `None` for NaN or infinite input.
    pub fn from_f64(v: f64) -> Option<Self> {
        if !v.is_finite() {
            return None;
        }
        let scaled = (v * SCALE as f64).round();
        if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
            return None;
        }
        Some(Money(scaled as i64))
    }

    /// Parse "0.10", "$49", " 12.5 " and the like.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('$').unwrap_or(s).trim();
        if s.is_empty() {
            return None;
        }
        let v: f64 = s.parse().ok()?;
        Self::from_f64(v)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Whole cents, rounding half away from zero.
    pub fn cents(self) -> i64 {
        let step = SCALE / 100;
        let half = step / 2;
        if self.0 >= 0 {
            (self.0 + half) / step
        } else {
            (self.0 - half) / step
        }
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Multiply by a usage quantity. Saturates instead of overflowing.
    pub fn times(self, quantity: u64) -> Money {
        let q = i64::try_from(quantity).unwrap_or(i64::MAX);
        Money(self.0.saturating_mul(q))
    }

    /// Rate formatting: at least two decimals, up to four when the rate
    /// has sub-cent precision ("$0.10", "$0.0025").
    pub fn fmt_rate(self) -> String {
        if self.0 % (SCALE / 100) == 0 {
            return self.to_string();
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / SCALE as u64;
        let frac = format!("{:04}", abs % SCALE as u64);
        let frac = frac.trim_end_matches('0');
        format!("{sign}${whole}.{frac:0<2}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a finite amount as a number or numeric string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money::from_units(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("amount out of range"))?;
        Ok(Money::from_units(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_f64(v).ok_or_else(|| E::custom("amount must be finite"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        Money::parse(v).ok_or_else(|| E::custom(format!("not an amount: {v:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!(Money::parse("0.10").unwrap().to_string(), "$0.10");
        assert_eq!(Money::parse("$49").unwrap().to_string(), "$49.00");
        assert_eq!(Money::parse(" 299.5 ").unwrap().to_string(), "$299.50");
        assert!(Money::parse("abc").is_none());
        assert!(Money::parse("").is_none());
        assert!(Money::parse("NaN").is_none());
        assert!(Money::parse("inf").is_none());
    }

    #[test]
    fn f64_conversion_is_exact_for_common_rates() {
        // 0.1 is not representable in binary; rounding must absorb that.
        assert_eq!(Money::from_f64(0.1).unwrap().raw(), 1_000);
        assert_eq!(Money::from_f64(0.0025).unwrap().raw(), 25);
        assert!(Money::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn times_and_cents() {
        let rate = Money::from_f64(0.10).unwrap();
        assert_eq!(rate.times(200), Money::from_units(20));
        assert_eq!(rate.times(150).cents(), 1_500);
        assert_eq!(Money::from_raw(i64::MAX).times(2), Money::from_raw(i64::MAX));
    }

    #[test]
    fn cents_round_half_up() {
        assert_eq!(Money::from_raw(50).cents(), 1); // $0.005
        assert_eq!(Money::from_raw(49).cents(), 0);
        assert_eq!(Money::from_raw(-50).cents(), -1);
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(Money::from_f64(0.10).unwrap().fmt_rate(), "$0.10");
        assert_eq!(Money::from_f64(0.0025).unwrap().fmt_rate(), "$0.0025");
        assert_eq!(Money::from_f64(0.125).unwrap().fmt_rate(), "$0.125");
        assert_eq!(Money::from_units(49).fmt_rate(), "$49.00");
    }

    #[test]
    fn deserialize_number_or_string() {
        let m: Money = serde_json::from_str("0.1").unwrap();
        assert_eq!(m.raw(), 1_000);
        let m: Money = serde_json::from_str("49").unwrap();
        assert_eq!(m, Money::from_units(49));
        let m: Money = serde_json::from_str("\"12.34\"").unwrap();
        assert_eq!(m.cents(), 1_234);
        assert!(serde_json::from_str::<Money>("\"twelve\"").is_err());
    }
}

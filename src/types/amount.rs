//! Exact money amounts.
//!
//! [`Amount`] counts paise (hundredths of a rupee) in an `i64`, so fractional
//! prices such as `49.5` add up exactly. On the wire an amount is a plain
//! JSON number in rupees: whole amounts serialize as integers (`793`),
//! anything else as a decimal (`1197.5`).

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Paise per rupee
const SCALE: i64 = 100;

/// Money amount, stored in paise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Zero
    pub const ZERO: Amount = Amount(0);
    /// Largest representable amount
    pub const MAX: Amount = Amount(i64::MAX);

    /// Amount of whole rupees (saturating at the representable range)
    pub const fn rupees(rupees: i64) -> Self {
        Amount(rupees.saturating_mul(SCALE))
    }

    /// Amount of paise
    pub const fn from_paise(paise: i64) -> Self {
        Amount(paise)
    }

    /// Amount in rupees, rounded to the nearest paisa
    ///
    /// Returns `None` for NaN and infinities; finite values outside the
    /// representable range saturate.
    pub fn from_f64(rupees: f64) -> Option<Self> {
        if !rupees.is_finite() {
            return None;
        }
        // float-to-int `as` saturates
        Some(Amount((rupees * SCALE as f64).round() as i64))
    }

    /// Value in paise
    pub const fn paise(self) -> i64 {
        self.0
    }

    /// Value in rupees as a float
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Whether this is a whole number of rupees
    pub const fn is_whole(self) -> bool {
        self.0 % SCALE == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn checked_mul(self, factor: i64) -> Option<Amount> {
        self.0.checked_mul(factor).map(Amount)
    }

    /// `percent`% of this amount, rounded half away from zero to whole rupees
    pub fn percent_rounded(self, percent: i64) -> Option<Amount> {
        // paise * percent is in units of 1/10_000 rupee
        let scaled = self.0.checked_mul(percent)?;
        let unit = SCALE * 100;
        let rupees = if scaled >= 0 {
            scaled.checked_add(unit / 2)? / unit
        } else {
            scaled.checked_sub(unit / 2)? / unit
        };
        Some(Amount::rupees(rupees))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE as u64;
        if abs % scale == 0 {
            write!(f, "{}{}", sign, abs / scale)
        } else {
            write!(f, "{}{}.{:02}", sign, abs / scale, abs % scale)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole() {
            serializer.serialize_i64(self.0 / SCALE)
        } else {
            serializer.serialize_f64(self.to_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in rupees")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(SCALE)
            .map(Amount)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("amount out of range"))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).ok_or_else(|| E::custom("amount is not a finite number"))
    }
}

//! Peso amounts.
//!
//! Amounts are held as whole centavos so fee thresholds compare exactly, and
//! are unsigned so a negative cart total cannot reach the rules.

use std::{
    fmt::{self, Display, Formatter},
    iter::Sum,
    ops::Add,
    str::FromStr,
};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::AmountError;

const CENTAVOS_PER_PESO: u64 = 100;

/// Largest centavo count (2^50) exchanged as a float, in either direction.
/// Below it, pesos as `f64` convert back to the exact centavo.
const MAX_FLOAT_CENTAVOS: u64 = 1 << 50;

/// A non-negative amount of Philippine pesos.
///
/// Serialises exactly: whole pesos as an integer, fractional amounts as a
/// float while that is lossless, and as a decimal string beyond that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "AmountRepr")]
pub struct Amount {
    centavos: u64,
}

impl Amount {
    pub const ZERO: Self = Self { centavos: 0 };

    #[must_use]
    pub const fn from_pesos(pesos: u64) -> Self {
        Self {
            centavos: pesos.saturating_mul(CENTAVOS_PER_PESO),
        }
    }

    #[must_use]
    pub const fn from_centavos(centavos: u64) -> Self {
        Self { centavos }
    }

    #[must_use]
    pub const fn centavos(self) -> u64 {
        self.centavos
    }

    /// Whole pesos, discarding centavos.
    #[must_use]
    pub const fn pesos(self) -> u64 {
        self.centavos / CENTAVOS_PER_PESO
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.centavos == 0
    }

    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.centavos.checked_add(other.centavos) {
            Some(centavos) => Some(Self { centavos }),
            None => None,
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            centavos: self.centavos.saturating_add(other.centavos),
        }
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let digits = self.pesos().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

        for (index, digit) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        write!(f, "₱{grouped}.{:02}", self.centavos % CENTAVOS_PER_PESO)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts `1000`, `999.5`, `₱1,000.00` and `PHP 150`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let number = trimmed
            .strip_prefix('₱')
            .or_else(|| trimmed.strip_prefix("PHP"))
            .unwrap_or(trimmed)
            .trim();

        if number.starts_with('-') {
            return Err(AmountError::Negative(input.to_string()));
        }

        let number: String = number.chars().filter(|c| *c != ',').collect();
        let (whole, fraction) = number.split_once('.').unwrap_or((number.as_str(), ""));

        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(AmountError::Malformed(input.to_string()));
        }

        let fraction = match fraction.len() {
            0 => 0,
            1 => u64::from(fraction.as_bytes()[0] - b'0') * 10,
            2 => fraction
                .parse::<u64>()
                .map_err(|_| AmountError::Malformed(input.to_string()))?,
            _ => return Err(AmountError::TooPrecise(input.to_string())),
        };

        let whole = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<u64>()
                .map_err(|_| AmountError::Overflow(input.to_string()))?
        };

        whole
            .checked_mul(CENTAVOS_PER_PESO)
            .and_then(|centavos| centavos.checked_add(fraction))
            .map(Self::from_centavos)
            .ok_or_else(|| AmountError::Overflow(input.to_string()))
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountError;

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        reason = "Range and sign are checked before the cast, and 2^50 is exact in f64"
    )]
    fn try_from(pesos: f64) -> Result<Self, Self::Error> {
        if !pesos.is_finite() {
            return Err(AmountError::Malformed(pesos.to_string()));
        }
        if pesos < 0.0 {
            return Err(AmountError::Negative(pesos.to_string()));
        }

        let centavos = (pesos * 100.0).round();
        if centavos > MAX_FLOAT_CENTAVOS as f64 {
            return Err(AmountError::Overflow(pesos.to_string()));
        }

        Ok(Self::from_centavos(centavos as u64))
    }
}

impl From<Amount> for f64 {
    #[allow(
        clippy::cast_precision_loss,
        reason = "Exact up to MAX_FLOAT_CENTAVOS, which is all serialisation relies on"
    )]
    fn from(amount: Amount) -> Self {
        amount.centavos as Self / 100.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let centavos = self.centavos % CENTAVOS_PER_PESO;

        if centavos == 0 {
            serializer.serialize_u64(self.pesos())
        } else if self.centavos <= MAX_FLOAT_CENTAVOS {
            serializer.serialize_f64(f64::from(*self))
        } else {
            serializer.collect_str(&format_args!("{}.{centavos:02}", self.pesos()))
        }
    }
}

/// Configuration files may spell an amount as an integer, a float or a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Whole(u64),
    Fractional(f64),
    Text(String),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = AmountError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Whole(pesos) => pesos
                .checked_mul(CENTAVOS_PER_PESO)
                .map(Self::from_centavos)
                .ok_or_else(|| AmountError::Overflow(pesos.to_string())),
            AmountRepr::Fractional(pesos) => Self::try_from(pesos),
            AmountRepr::Text(text) => text.parse(),
        }
    }
}

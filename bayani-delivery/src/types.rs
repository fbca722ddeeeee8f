//! Values produced by the delivery rules

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{amount::Amount, error::ParseDeliveryKindError};

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = MS_PER_SECOND * 60;
const MS_PER_HOUR: u64 = MS_PER_MINUTE * 60;
const MS_PER_DAY: u64 = MS_PER_HOUR * 24;

/// How an order reaches the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryKind {
    Standard,
    SameDay,
}

impl DeliveryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::SameDay => "same-day",
        }
    }
}

impl Display for DeliveryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryKind {
    type Err = ParseDeliveryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "same-day" | "same_day" | "sameday" => Ok(Self::SameDay),
            _ => Err(ParseDeliveryKindError(s.to_string())),
        }
    }
}

/// One way the current order could be delivered, as offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOption {
    pub kind: DeliveryKind,
    pub fee: Amount,
    /// Local time of delivery; for same-day this is the moment of ordering.
    pub delivery_at: NaiveDateTime,
    /// Advertised arrival window, e.g. `4 PM–8 PM`
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window: Option<String>,
    pub available: bool,
    pub description: String,
}

/// Whether orders are still being accepted for the upcoming delivery cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderingState {
    Open,
    Closed,
}

impl Display for OrderingState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

/// The next weekly delivery slot and the last moment to order for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleWindow {
    pub next_delivery: NaiveDateTime,
    pub cutoff: NaiveDateTime,
}

/// Time left until the order cutoff, broken down for a countdown display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Split a duration into whole days, hours, minutes and seconds.
    ///
    /// Anything at or below zero is reported as [`TimeRemaining::ZERO`].
    #[must_use]
    pub fn from_delta(delta: TimeDelta) -> Self {
        let millis = delta.num_milliseconds();
        if millis <= 0 {
            return Self::ZERO;
        }

        let millis = millis.unsigned_abs();
        Self {
            days: millis / MS_PER_DAY,
            hours: (millis % MS_PER_DAY) / MS_PER_HOUR,
            minutes: (millis % MS_PER_HOUR) / MS_PER_MINUTE,
            seconds: (millis % MS_PER_MINUTE) / MS_PER_SECOND,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Display for TimeRemaining {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

/// Everything a countdown display needs, evaluated at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSnapshot {
    pub evaluated_at: NaiveDateTime,
    pub next_delivery: NaiveDateTime,
    pub cutoff: NaiveDateTime,
    pub state: OrderingState,
    pub remaining: TimeRemaining,
}

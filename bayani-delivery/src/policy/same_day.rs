//! Same-day delivery policy.
//!
//! Same-day runs are staffed on weekends only and drivers are dispatched at
//! 14:00, so orders must land strictly before then. Fulfilment capacity
//! shrinks through the afternoon, which is reflected in the ETA text.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::time_of_day;
use crate::{
    amount::Amount,
    error::ConfigError,
    types::{DeliveryKind, DeliveryOption},
};

const EXTENDED_WINDOW_MESSAGE: &str = "Delivery window may be extended";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SameDayPolicy {
    /// Days on which same-day delivery is staffed.
    ///
    /// Default: Saturday and Sunday
    #[serde(default = "defaults::days")]
    pub days: Vec<Weekday>,

    /// Orders must be placed strictly before this local time.
    ///
    /// Default: 14:00
    #[serde(default = "defaults::dispatch_cutoff")]
    pub dispatch_cutoff: NaiveTime,

    /// From this time on the ETA no longer promises a window.
    ///
    /// Between the dispatch cutoff and this time the narrowed window is quoted.
    /// Default: 16:00
    #[serde(default = "defaults::extended_after")]
    pub extended_after: NaiveTime,

    /// Advertised arrival window for orders placed before the cutoff.
    ///
    /// Default: `4 PM–8 PM`
    #[serde(default = "defaults::window")]
    pub window: String,

    /// Window quoted between the dispatch cutoff and `extended_after`.
    ///
    /// Default: `6 PM–8 PM`
    #[serde(default = "defaults::narrowed_window")]
    pub narrowed_window: String,

    /// Flat same-day surcharge.
    ///
    /// Default: ₱150
    #[serde(default = "defaults::fee")]
    pub fee: Amount,

    /// Cart totals at or above this ship same-day for free.
    ///
    /// Default: ₱1,000
    #[serde(default = "defaults::free_threshold")]
    pub free_threshold: Amount,

    /// Product categories that can be fulfilled same-day (case-insensitive).
    ///
    /// Default: `produce`, `vegetables`, `fruits`
    #[serde(default = "defaults::eligible_categories")]
    pub eligible_categories: Vec<String>,
}

impl Default for SameDayPolicy {
    fn default() -> Self {
        Self {
            days: defaults::days(),
            dispatch_cutoff: defaults::dispatch_cutoff(),
            extended_after: defaults::extended_after(),
            window: defaults::window(),
            narrowed_window: defaults::narrowed_window(),
            fee: defaults::fee(),
            free_threshold: defaults::free_threshold(),
            eligible_categories: defaults::eligible_categories(),
        }
    }
}

impl SameDayPolicy {
    /// Whether an order placed at `now` can still go out today.
    #[must_use]
    pub fn is_available(&self, now: NaiveDateTime) -> bool {
        self.days.contains(&now.weekday()) && now.time() < self.dispatch_cutoff
    }

    /// Surcharge for a cart of `cart_total`; does not check availability.
    #[must_use]
    pub fn fee_for(&self, cart_total: Amount) -> Amount {
        if cart_total >= self.free_threshold {
            Amount::ZERO
        } else {
            self.fee
        }
    }

    /// Whether products in `category` may ship same-day at all.
    ///
    /// Unknown categories are never eligible.
    #[must_use]
    pub fn accepts_category(&self, category: &str) -> bool {
        let category = category.trim();
        self.eligible_categories
            .iter()
            .any(|eligible| eligible.eq_ignore_ascii_case(category))
    }

    /// Arrival estimate for an order placed at `now`.
    #[must_use]
    pub fn eta(&self, now: NaiveDateTime) -> String {
        let time = now.time();

        if time < self.dispatch_cutoff {
            format!("{} today", self.window)
        } else if time < self.extended_after {
            format!("{} today", self.narrowed_window)
        } else {
            EXTENDED_WINDOW_MESSAGE.to_string()
        }
    }

    #[must_use]
    pub fn description(&self) -> String {
        format!("Same-day delivery ({} today)", self.window)
    }

    /// Message for a same-day order still due today.
    #[must_use]
    pub fn pending_message(&self) -> String {
        format!("Your order will be delivered today between {}", self.window)
    }

    /// The checkout option for an order placed at `now` with the given fee.
    #[must_use]
    pub fn option(&self, now: NaiveDateTime, fee: Amount) -> DeliveryOption {
        DeliveryOption {
            kind: DeliveryKind::SameDay,
            fee,
            delivery_at: now,
            window: Some(self.window.clone()),
            available: true,
            description: self.description(),
        }
    }

    /// # Errors
    ///
    /// If no days are configured or the ETA boundaries are out of order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::NoSameDayDays);
        }

        if self.dispatch_cutoff > self.extended_after {
            return Err(ConfigError::WindowOrder {
                cutoff: self.dispatch_cutoff.to_string(),
                narrowed: self.extended_after.to_string(),
            });
        }

        Ok(())
    }
}

mod defaults {
    use chrono::{NaiveTime, Weekday};

    use super::time_of_day;
    use crate::amount::Amount;

    pub fn days() -> Vec<Weekday> {
        vec![Weekday::Sat, Weekday::Sun]
    }

    pub fn dispatch_cutoff() -> NaiveTime {
        time_of_day(14)
    }

    pub fn extended_after() -> NaiveTime {
        time_of_day(16)
    }

    pub fn window() -> String {
        "4 PM–8 PM".to_string()
    }

    pub fn narrowed_window() -> String {
        "6 PM–8 PM".to_string()
    }

    pub const fn fee() -> Amount {
        Amount::from_pesos(150)
    }

    pub const fn free_threshold() -> Amount {
        Amount::from_pesos(1000)
    }

    pub fn eligible_categories() -> Vec<String> {
        ["produce", "vegetables", "fruits"]
            .into_iter()
            .map(String::from)
            .collect()
    }
}

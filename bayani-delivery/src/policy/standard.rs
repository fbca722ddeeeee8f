//! Standard delivery policy.
//!
//! Standard orders take two calendar days, except that Friday orders take
//! three so they skip the weekend and arrive on Monday. Weekend orders still
//! take two real days (Saturday lands on Monday, Sunday on Tuesday).

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use super::days_after;
use crate::{
    amount::Amount,
    error::ConfigError,
    types::{DeliveryKind, DeliveryOption},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardPolicy {
    /// Calendar days between ordering and delivery.
    ///
    /// Default: 2
    #[serde(default = "defaults::lead_days")]
    pub lead_days: u32,

    /// Calendar days for orders placed on a Friday.
    ///
    /// Default: 3 (lands on Monday)
    #[serde(default = "defaults::friday_lead_days")]
    pub friday_lead_days: u32,

    /// Shown next to the option at checkout.
    ///
    /// Default: `Standard delivery (2–3 business days)`
    #[serde(default = "defaults::description")]
    pub description: String,
}

impl Default for StandardPolicy {
    fn default() -> Self {
        Self {
            lead_days: defaults::lead_days(),
            friday_lead_days: defaults::friday_lead_days(),
            description: defaults::description(),
        }
    }
}

impl StandardPolicy {
    /// Calendar days to add for an order placed on `weekday`.
    #[must_use]
    pub const fn lead_for(&self, weekday: Weekday) -> u32 {
        match weekday {
            Weekday::Fri => self.friday_lead_days,
            _ => self.lead_days,
        }
    }

    /// Delivery moment for a standard order placed at `now`.
    ///
    /// The time of day is carried over from `now`. Dates past the end of
    /// the calendar stay on its last day.
    #[must_use]
    pub fn delivery_date(&self, now: NaiveDateTime) -> NaiveDateTime {
        days_after(now.date(), self.lead_for(now.weekday())).and_time(now.time())
    }

    /// The always-available, free checkout option.
    #[must_use]
    pub fn option(&self, now: NaiveDateTime) -> DeliveryOption {
        DeliveryOption {
            kind: DeliveryKind::Standard,
            fee: Amount::ZERO,
            delivery_at: self.delivery_date(now),
            window: None,
            available: true,
            description: self.description.clone(),
        }
    }

    /// # Errors
    ///
    /// If either lead time is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.lead_days == 0 {
            return Err(ConfigError::ZeroLeadDays("lead_days"));
        }
        if self.friday_lead_days == 0 {
            return Err(ConfigError::ZeroLeadDays("friday_lead_days"));
        }

        Ok(())
    }
}

mod defaults {
    pub const fn lead_days() -> u32 {
        2
    }

    pub const fn friday_lead_days() -> u32 {
        3
    }

    pub fn description() -> String {
        "Standard delivery (2–3 business days)".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn on(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_business_day_projection() {
        let policy = StandardPolicy::default();

        // (order day, expected delivery day), 2025-10-06 is a Monday
        let table = [
            (6, 8),   // Mon -> Wed
            (7, 9),   // Tue -> Thu
            (8, 10),  // Wed -> Fri
            (9, 11),  // Thu -> Sat
            (10, 13), // Fri -> Mon
            (11, 13), // Sat -> Mon
            (12, 14), // Sun -> Tue
        ];

        for (ordered, expected) in table {
            assert_eq!(
                policy.delivery_date(on(ordered, 10)),
                on(expected, 10),
                "order placed on October {ordered}"
            );
        }
    }

    #[test]
    fn test_time_of_day_is_kept() {
        let policy = StandardPolicy::default();
        assert_eq!(policy.delivery_date(on(12, 15)), on(14, 15));
    }

    #[test]
    fn test_crosses_month_end() {
        let policy = StandardPolicy::default();
        // Friday 2025-10-31 -> Monday 2025-11-03
        let friday = NaiveDate::from_ymd_opt(2025, 10, 31)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(
            policy.delivery_date(friday).date(),
            NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
        );
    }

    #[test]
    fn test_option_is_free_and_available() {
        let option = StandardPolicy::default().option(on(10, 10));
        assert_eq!(option.kind, DeliveryKind::Standard);
        assert_eq!(option.fee, Amount::ZERO);
        assert_eq!(option.delivery_at, on(13, 10));
        assert_eq!(option.window, None);
        assert_eq!(option.description, "Standard delivery (2–3 business days)");
        assert!(option.available);
    }

    #[test]
    fn test_zero_lead_rejected() {
        let policy = StandardPolicy {
            friday_lead_days: 0,
            ..StandardPolicy::default()
        };
        assert_eq!(
            policy.validate(),
            Err(ConfigError::ZeroLeadDays("friday_lead_days"))
        );
    }

    #[test]
    fn test_last_calendar_day_saturates() {
        let policy = StandardPolicy::default();
        let now = NaiveDate::MAX.and_hms_opt(10, 0, 0).unwrap();

        assert_eq!(policy.delivery_date(now), now);

        let eve = NaiveDate::MAX.pred_opt().unwrap().and_hms_opt(10, 0, 0).unwrap();
        assert_eq!(policy.delivery_date(eve), now);
    }
}

//! The delivery rules consulted by the storefront.
//!
//! [`DeliveryRules`] is the single place where checkout, cart, product and
//! order-history views ask delivery questions. Every method takes the
//! reference instant explicitly, so the same inputs always produce the same
//! answer and callers decide where "now" comes from.

use bayani_tracing::traced;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    amount::Amount,
    error::ConfigError,
    format::format_delivery_date,
    policy::{CyclePolicy, SameDayPolicy, StandardPolicy},
    types::{DeliveryKind, DeliveryOption, OrderingState, ScheduleSnapshot, TimeRemaining},
};

/// Delivery rule configuration.
///
/// ```ron
/// rules: (
///     same_day: (fee: 150, free_threshold: 1000),
///     standard: (lead_days: 2, friday_lead_days: 3),
///     cycle: (delivery_day: "Sat", delivery_time: "10:00:00"),
/// ),
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRules {
    #[serde(default)]
    pub same_day: SameDayPolicy,

    #[serde(default)]
    pub standard: StandardPolicy,

    #[serde(default)]
    pub cycle: CyclePolicy,
}

impl DeliveryRules {
    /// # Errors
    ///
    /// The first inconsistency found in any of the policies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.same_day.validate()?;
        self.standard.validate()?;
        self.cycle.validate()
    }

    /// Weekend, and before the dispatch cutoff.
    #[must_use]
    pub fn is_same_day_available(&self, now: NaiveDateTime) -> bool {
        self.same_day.is_available(now)
    }

    /// Checkout options at `now`: standard first, then same-day when offered.
    ///
    /// The same-day option carries the flat fee; use
    /// [`Self::list_delivery_options_for_cart`] to apply the large-basket waiver.
    #[traced(instrument(level = tracing::Level::DEBUG, skip(self), ret), timing(precision = "us"))]
    #[must_use]
    pub fn list_delivery_options(&self, now: NaiveDateTime) -> Vec<DeliveryOption> {
        self.options_with_fee(now, self.same_day.fee)
    }

    /// Checkout options at `now` with the same-day fee worked out for `cart_total`.
    #[traced(instrument(level = tracing::Level::DEBUG, skip(self), fields(cart_total = %cart_total)), timing(precision = "us"))]
    #[must_use]
    pub fn list_delivery_options_for_cart(
        &self,
        now: NaiveDateTime,
        cart_total: Amount,
    ) -> Vec<DeliveryOption> {
        self.options_with_fee(now, self.same_day.fee_for(cart_total))
    }

    fn options_with_fee(&self, now: NaiveDateTime, same_day_fee: Amount) -> Vec<DeliveryOption> {
        let mut options = vec![self.standard.option(now)];

        if self.same_day.is_available(now) {
            options.push(self.same_day.option(now, same_day_fee));
        }

        options
    }

    #[must_use]
    pub fn next_standard_delivery_date(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.standard.delivery_date(now)
    }

    /// Same-day surcharge for `cart_total`.
    ///
    /// This does not check availability: only apply the result to a total
    /// after [`Self::is_same_day_available`] has said yes.
    #[must_use]
    pub fn same_day_fee(&self, cart_total: Amount) -> Amount {
        self.same_day.fee_for(cart_total)
    }

    #[must_use]
    pub fn next_delivery_instant(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.cycle.next_delivery(now)
    }

    #[must_use]
    pub fn order_cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.cycle.cutoff(now)
    }

    #[must_use]
    pub fn is_ordering_open(&self, now: NaiveDateTime) -> bool {
        self.cycle.is_open(now)
    }

    #[must_use]
    pub fn ordering_state(&self, now: NaiveDateTime) -> OrderingState {
        self.cycle.state(now)
    }

    #[must_use]
    pub fn time_until_cutoff(&self, now: NaiveDateTime) -> TimeRemaining {
        self.cycle.remaining(now)
    }

    /// Everything the cutoff countdown shows, evaluated once at `now`.
    #[traced(instrument(level = tracing::Level::TRACE, skip(self)), timing(precision = "ns"))]
    #[must_use]
    pub fn schedule(&self, now: NaiveDateTime) -> ScheduleSnapshot {
        let window = self.cycle.window(now);
        let state = if now < window.cutoff {
            OrderingState::Open
        } else {
            OrderingState::Closed
        };

        ScheduleSnapshot {
            evaluated_at: now,
            next_delivery: window.next_delivery,
            cutoff: window.cutoff,
            state,
            remaining: TimeRemaining::from_delta(window.cutoff - now),
        }
    }

    /// Status line for an order in the order history.
    ///
    /// Standard orders always read as scheduled; hiding the line once an
    /// order has arrived is up to the caller.
    #[must_use]
    pub fn delivery_status_message(
        &self,
        kind: DeliveryKind,
        order_date: NaiveDateTime,
        delivery_date: NaiveDateTime,
        now: NaiveDateTime,
    ) -> String {
        tracing::trace!(%kind, %order_date, %delivery_date, %now, "Composing delivery status");

        match kind {
            DeliveryKind::SameDay if delivery_date.date() == now.date() => {
                self.same_day.pending_message()
            }
            DeliveryKind::SameDay => format!(
                "Same-day delivery completed on {}",
                format_delivery_date(delivery_date, false)
            ),
            DeliveryKind::Standard => format!(
                "Standard delivery on {}",
                format_delivery_date(delivery_date, false)
            ),
        }
    }

    /// Whether a product in `category` can be ordered for same-day delivery
    /// right now. Unknown categories are not eligible.
    #[must_use]
    pub fn is_eligible_for_same_day(&self, category: &str, now: NaiveDateTime) -> bool {
        self.same_day.accepts_category(category) && self.same_day.is_available(now)
    }

    #[must_use]
    pub fn same_day_eta(&self, now: NaiveDateTime) -> String {
        self.same_day.eta(now)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DeliveryRules::default().validate(), Ok(()));
    }

    #[test]
    fn validation_reports_the_failing_policy() {
        let mut rules = DeliveryRules::default();
        rules.cycle.cutoff_lead_days = 0;
        assert_eq!(rules.validate(), Err(ConfigError::ZeroCutoffLead));
    }

    #[test]
    fn cart_listing_waives_fee_for_large_baskets() {
        let rules = DeliveryRules::default();
        let saturday = at(11, 9);

        let small = rules.list_delivery_options_for_cart(saturday, Amount::from_pesos(999));
        let large = rules.list_delivery_options_for_cart(saturday, Amount::from_pesos(1000));

        assert_eq!(small[1].fee, Amount::from_pesos(150));
        assert_eq!(large[1].fee, Amount::ZERO);
        assert_eq!(large[0].fee, Amount::ZERO);
    }

    #[test]
    fn snapshot_agrees_with_individual_queries() {
        let rules = DeliveryRules::default();
        for day in 6..=12 {
            for hour in [0, 9, 14, 18, 23] {
                let now = at(day, hour);
                let snapshot = rules.schedule(now);

                assert_eq!(snapshot.evaluated_at, now);
                assert_eq!(snapshot.next_delivery, rules.next_delivery_instant(now));
                assert_eq!(snapshot.cutoff, rules.order_cutoff(now));
                assert_eq!(snapshot.state, rules.ordering_state(now));
                assert_eq!(snapshot.remaining, rules.time_until_cutoff(now));
            }
        }
    }

    #[test]
    fn status_messages() {
        let rules = DeliveryRules::default();
        let now = at(11, 12);

        assert_eq!(
            rules.delivery_status_message(DeliveryKind::SameDay, at(11, 9), at(11, 9), now),
            "Your order will be delivered today between 4 PM–8 PM"
        );
        assert_eq!(
            rules.delivery_status_message(DeliveryKind::SameDay, at(5, 9), at(5, 9), now),
            "Same-day delivery completed on Sunday, October 5, 2025"
        );
        assert_eq!(
            rules.delivery_status_message(DeliveryKind::Standard, at(1, 9), at(3, 9), now),
            "Standard delivery on Friday, October 3, 2025"
        );
        assert_eq!(
            rules.delivery_status_message(DeliveryKind::Standard, at(11, 9), at(13, 9), now),
            "Standard delivery on Monday, October 13, 2025"
        );
    }

    #[test]
    fn eligibility_needs_category_and_availability() {
        let rules = DeliveryRules::default();
        assert!(rules.is_eligible_for_same_day("Fruits", at(12, 10)));
        assert!(!rules.is_eligible_for_same_day("fruits", at(12, 14)));
        assert!(!rules.is_eligible_for_same_day("fruits", at(10, 10)));
        assert!(!rules.is_eligible_for_same_day("rice", at(12, 10)));
    }

    #[test]
    fn reads_full_ron_config() {
        let rules: DeliveryRules = ron::from_str(
            r#"(
                same_day: (dispatch_cutoff: "13:00:00", fee: 99.5),
                cycle: (delivery_day: "Sun", cutoff_lead_days: 3),
            )"#,
        )
        .unwrap();

        assert_eq!(rules.same_day.fee, Amount::from_centavos(9_950));
        assert!(!rules.is_same_day_available(at(11, 13)));
        assert_eq!(rules.next_delivery_instant(at(11, 9)), at(12, 10));
        assert_eq!(rules.standard, StandardPolicy::default());
        assert_eq!(rules.validate(), Ok(()));
    }
}

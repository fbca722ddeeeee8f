//! Weekly delivery cycle.
//!
//! The farm makes one delivery run a week (Saturday, 10:00). Ordering for a
//! run closes at the end of the day two days before it. On the delivery day
//! itself the run counts as "next" until the day-end boundary (18:00), even
//! after the 10:00 slot has passed.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::{days_after, days_before, end_of_day};
use crate::{
    error::ConfigError,
    types::{CycleWindow, OrderingState, TimeRemaining},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePolicy {
    /// Default: Saturday
    #[serde(default = "defaults::delivery_day")]
    pub delivery_day: Weekday,

    /// Default: 10:00
    #[serde(default = "defaults::delivery_time")]
    pub delivery_time: NaiveTime,

    /// From this time on the delivery day, the following week's run is next.
    ///
    /// Default: 18:00
    #[serde(default = "defaults::day_end")]
    pub day_end: NaiveTime,

    /// Ordering closes at 23:59:59.999 this many days before the run.
    ///
    /// Default: 2
    #[serde(default = "defaults::cutoff_lead_days")]
    pub cutoff_lead_days: u32,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        Self {
            delivery_day: defaults::delivery_day(),
            delivery_time: defaults::delivery_time(),
            day_end: defaults::day_end(),
            cutoff_lead_days: defaults::cutoff_lead_days(),
        }
    }
}

impl CyclePolicy {
    /// The upcoming delivery run as seen from `now`.
    #[must_use]
    pub fn next_delivery(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.weekday().num_days_from_sunday();
        let target = self.delivery_day.num_days_from_sunday();

        let days_ahead = match (target + 7 - today) % 7 {
            0 if now.time() >= self.day_end => 7,
            days => days,
        };

        days_after(now.date(), days_ahead).and_time(self.delivery_time)
    }

    /// The upcoming run together with its order cutoff.
    #[must_use]
    pub fn window(&self, now: NaiveDateTime) -> CycleWindow {
        let next_delivery = self.next_delivery(now);
        let cutoff_day = days_before(next_delivery.date(), self.cutoff_lead_days);

        CycleWindow {
            next_delivery,
            cutoff: end_of_day(cutoff_day),
        }
    }

    /// Last moment to order for the run returned by [`Self::next_delivery`].
    #[must_use]
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.window(now).cutoff
    }

    #[must_use]
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        now < self.cutoff(now)
    }

    #[must_use]
    pub fn state(&self, now: NaiveDateTime) -> OrderingState {
        if self.is_open(now) {
            OrderingState::Open
        } else {
            OrderingState::Closed
        }
    }

    #[must_use]
    pub fn remaining(&self, now: NaiveDateTime) -> TimeRemaining {
        TimeRemaining::from_delta(self.cutoff(now) - now)
    }

    /// # Errors
    ///
    /// If the cutoff falls on the delivery day or the day ends before the run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cutoff_lead_days == 0 {
            return Err(ConfigError::ZeroCutoffLead);
        }

        if self.day_end <= self.delivery_time {
            return Err(ConfigError::DayEndBeforeDelivery {
                delivery: self.delivery_time.to_string(),
                day_end: self.day_end.to_string(),
            });
        }

        Ok(())
    }
}

mod defaults {
    use chrono::{NaiveTime, Weekday};

    use crate::policy::time_of_day;

    pub const fn delivery_day() -> Weekday {
        Weekday::Sat
    }

    pub fn delivery_time() -> NaiveTime {
        time_of_day(10)
    }

    pub fn day_end() -> NaiveTime {
        time_of_day(18)
    }

    pub const fn cutoff_lead_days() -> u32 {
        2
    }
}

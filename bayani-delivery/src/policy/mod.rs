//! Configurable delivery policies.
//!
//! Each policy owns one family of rules and is a plain, deserialisable value
//! whose `Default` is the storefront's production behaviour. The rules only
//! ever look at the instant they are handed; nothing here reads the clock.
//!
//! - [`SameDayPolicy`]: weekend same-day availability, fee waiver, ETA text
//! - [`StandardPolicy`]: business-day projection for standard delivery
//! - [`CyclePolicy`]: the weekly delivery slot and its order cutoff

pub mod cycle;
pub mod same_day;
pub mod standard;

pub use cycle::CyclePolicy;
pub use same_day::SameDayPolicy;
pub use standard::StandardPolicy;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// The last representable millisecond of `date`.
pub(crate) fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let (last_millisecond, _) =
        NaiveTime::MIN.overflowing_sub_signed(TimeDelta::milliseconds(1));
    date.and_time(last_millisecond)
}

/// `date` moved forward by `days`, pinned to the last representable date.
pub(crate) fn days_after(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MAX)
}

/// `date` moved back by `days`, pinned to the first representable date.
pub(crate) fn days_before(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MIN)
}

/// `hours` past midnight.
pub(crate) fn time_of_day(hours: i64) -> NaiveTime {
    NaiveTime::MIN + TimeDelta::hours(hours)
}

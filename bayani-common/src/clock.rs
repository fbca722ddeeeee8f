//! Wall-clock injection.
//!
//! Scheduling rules never read the system time themselves: they are handed a
//! local [`NaiveDateTime`], and only the long-running parts of the process ask a
//! [`Clock`] for one. All local times share a single fixed UTC offset.

use chrono::{FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    /// The current moment expressed in the storefront's local time.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the system clock and shifts it into a fixed local offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// A clock pinned to one instant, for tests and for answering "what if" queries.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Move the pinned instant forward (or backward for a negative delta).
    pub fn advance(&mut self, delta: chrono::TimeDelta) {
        self.now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("UTC offset of {0} minutes is outside ±24 hours")]
    OffsetOutOfRange(i32),
}

/// Clock configuration.
///
/// ```ron
/// clock: (
///     utc_offset_minutes: 480,
/// ),
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Offset of the storefront's local time from UTC, in minutes.
    ///
    /// Default: 480 (UTC+08:00, Philippine Standard Time)
    #[serde(default = "defaults::utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: defaults::utc_offset_minutes(),
        }
    }
}

impl ClockConfig {
    /// # Errors
    ///
    /// If the configured offset is not strictly within a day either side of UTC.
    pub fn offset(&self) -> Result<FixedOffset, ClockError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ClockError::OffsetOutOfRange(self.utc_offset_minutes))
    }

    /// # Errors
    ///
    /// See [`ClockConfig::offset`].
    pub fn system_clock(&self) -> Result<SystemClock, ClockError> {
        self.offset().map(SystemClock::new)
    }
}

mod defaults {
    pub const fn utc_offset_minutes() -> i32 {
        8 * 60
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeDelta};
    use pretty_assertions::assert_eq;

    use super::*;

    fn instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 11)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock::new(instant());
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = FixedClock::new(instant());
        clock.advance(TimeDelta::hours(5));
        assert_eq!(clock.now(), instant() + TimeDelta::hours(5));
    }

    #[test]
    fn default_offset_is_manila() {
        let offset = ClockConfig::default().offset().unwrap();
        assert_eq!(offset.local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn out_of_range_offset_is_rejected() {
        let config = ClockConfig {
            utc_offset_minutes: 24 * 60,
        };
        assert_eq!(config.offset(), Err(ClockError::OffsetOutOfRange(1440)));
    }

    #[test]
    fn system_clock_tracks_utc_plus_offset() {
        let clock = ClockConfig::default().system_clock().unwrap();
        let utc = Utc::now().naive_utc();
        let drift = clock.now() - utc - TimeDelta::hours(8);
        assert!(drift.num_seconds().abs() < 5);
    }

    #[test]
    fn config_reads_from_ron() {
        let config: ClockConfig = ron::from_str("(utc_offset_minutes: -300)").unwrap();
        assert_eq!(config.offset().unwrap().local_minus_utc(), -5 * 3600);

        let config: ClockConfig = ron::from_str("()").unwrap();
        assert_eq!(config.utc_offset_minutes, 480);
    }
}

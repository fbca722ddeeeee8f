//! Live order-cutoff countdown.
//!
//! The rules are pure, so a live countdown is just the schedule re-evaluated
//! on a fixed tick. [`CountdownTicker::serve`] does that and publishes each
//! [`ScheduleSnapshot`] on a watch channel. It stops when a shutdown
//! [`Signal`] arrives or when every subscriber has gone away.

use std::{sync::Arc, time::Duration};

use bayani_common::{Signal, clock::Clock, internal, schedule};
use bayani_tracing::traced;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{broadcast, watch},
    time::MissedTickBehavior,
};

use crate::{
    error::ConfigError,
    rules::DeliveryRules,
    types::{OrderingState, ScheduleSnapshot},
};

/// Countdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// How often the schedule is re-evaluated (in milliseconds)
    ///
    /// Default: 1000 (once a second)
    #[serde(default = "defaults::tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: defaults::tick_interval_ms(),
        }
    }
}

impl CountdownConfig {
    /// # Errors
    ///
    /// If the interval is zero.
    pub const fn tick_interval(&self) -> Result<Duration, ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }

        Ok(Duration::from_millis(self.tick_interval_ms))
    }
}

mod defaults {
    pub const fn tick_interval_ms() -> u64 {
        1000
    }
}

/// Re-evaluates the cycle schedule on every tick and publishes the result.
pub struct CountdownTicker {
    rules: Arc<DeliveryRules>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    sender: watch::Sender<ScheduleSnapshot>,
}

impl CountdownTicker {
    /// Build a ticker and hand back the first subscriber.
    ///
    /// The channel starts out holding the schedule as of construction.
    ///
    /// # Errors
    ///
    /// If the configured tick interval is zero.
    pub fn new(
        rules: Arc<DeliveryRules>,
        clock: Arc<dyn Clock>,
        config: &CountdownConfig,
    ) -> Result<(Self, watch::Receiver<ScheduleSnapshot>), ConfigError> {
        let interval = config.tick_interval()?;
        let (sender, receiver) = watch::channel(rules.schedule(clock.now()));

        Ok((
            Self {
                rules,
                clock,
                interval,
                sender,
            },
            receiver,
        ))
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ScheduleSnapshot> {
        self.sender.subscribe()
    }

    /// Evaluate the schedule once and publish it.
    ///
    /// Returns `false` once nobody is listening any more.
    fn publish(&self, last_state: &mut OrderingState) -> bool {
        let snapshot = self.rules.schedule(self.clock.now());

        if snapshot.state != *last_state {
            schedule!(
                level = INFO,
                "Ordering is now {} (next delivery {}, cutoff {})",
                snapshot.state,
                snapshot.next_delivery,
                snapshot.cutoff
            );
            *last_state = snapshot.state;
        }

        self.sender.send(snapshot).is_ok()
    }

    /// Run until shutdown or until every receiver has been dropped.
    #[traced(instrument(level = tracing::Level::TRACE, skip_all), timing(precision = "s"))]
    pub async fn serve(&self, mut shutdown: broadcast::Receiver<Signal>) {
        internal!(
            level = DEBUG,
            "Countdown ticking every {}ms",
            self.interval.as_millis()
        );

        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut last_state = self.sender.borrow().state;

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    if !self.publish(&mut last_state) {
                        internal!(level = DEBUG, "No countdown subscribers left, stopping");
                        break;
                    }
                }
                sig = shutdown.recv() => {
                    match sig {
                        Ok(Signal::Shutdown | Signal::Finalised) => {
                            internal!("Countdown received shutdown signal");
                            break;
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::debug!("Countdown missed {skipped} signals");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::error!("Countdown shutdown channel closed");
                            break;
                        }
                    }
                }
            }
        }
    }
}

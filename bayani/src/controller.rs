use std::sync::{Arc, LazyLock};

use bayani_common::{Signal, internal, logging, schedule};
use bayani_delivery::{CountdownTicker, ScheduleSnapshot, format_delivery_date};
use bayani_tracing::traced;
use tokio::sync::{broadcast, watch};

use crate::config::Config;

pub static SHUTDOWN_BROADCAST: LazyLock<broadcast::Sender<Signal>> = LazyLock::new(|| {
    let (sender, _receiver) = broadcast::channel(64);
    sender
});

#[traced(instrument(level = tracing::Level::TRACE))]
async fn shutdown() -> anyhow::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            internal!("CTRL+C entered, shutting down");
        }
        _ = terminate.recv() => {
            internal!("Terminate Signal received, shutting down");
        }
    };

    SHUTDOWN_BROADCAST
        .send(Signal::Shutdown)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Interrupted, e.to_string()))?;

    Ok(())
}

/// Log every snapshot the ticker publishes until it stops publishing.
async fn report(mut receiver: watch::Receiver<ScheduleSnapshot>) {
    while receiver.changed().await.is_ok() {
        let snapshot = *receiver.borrow_and_update();

        schedule!(
            level = DEBUG,
            "Ordering {} for {}, {} until cutoff",
            snapshot.state,
            format_delivery_date(snapshot.next_delivery, true),
            snapshot.remaining
        );
    }
}

pub struct Bayani {
    config: Config,
}

impl Bayani {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the countdown until a shutdown signal arrives
    ///
    /// # Errors
    ///
    /// This function will return an error if the configuration is invalid or
    /// the signal handlers can't be installed.
    #[traced(instrument(level = tracing::Level::TRACE, skip_all, err), timing(precision = "s"))]
    pub async fn run(self) -> anyhow::Result<()> {
        logging::init();
        self.config.validate()?;

        let clock = Arc::new(self.config.clock.system_clock()?);
        let rules = Arc::new(self.config.rules);
        let (ticker, receiver) = CountdownTicker::new(rules, clock, &self.config.countdown)?;

        internal!(level = INFO, "Controller running");

        let ret = tokio::select! {
            () = ticker.serve(SHUTDOWN_BROADCAST.subscribe()) => Ok(()),
            () = report(receiver) => Ok(()),
            r = shutdown() => r,
        };

        internal!(level = INFO, "Shutting down...");

        ret
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use bayani_delivery::DeliveryRules;
    use chrono::NaiveDate;

    use super::*;

    #[tokio::test]
    async fn reporter_stops_with_the_ticker() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 8)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let rules = DeliveryRules::default();
        let (sender, receiver) = watch::channel(rules.schedule(now));
        let reporter = tokio::spawn(report(receiver));

        sender.send(rules.schedule(now + chrono::TimeDelta::hours(1))).unwrap();
        drop(sender);

        tokio::time::timeout(Duration::from_secs(5), reporter)
            .await
            .unwrap()
            .unwrap();
    }
}

//! Countdown ticker behaviour against controllable clocks

#![allow(clippy::unwrap_used)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use bayani_common::{
    Signal,
    clock::{Clock, FixedClock},
};
use bayani_delivery::{
    CountdownConfig, CountdownTicker, DeliveryRules, OrderingState, parse_local_instant,
};
use chrono::{NaiveDateTime, TimeDelta};
use pretty_assertions::assert_eq;
use tokio::sync::broadcast;

const WAIT: Duration = Duration::from_secs(5);

fn fast() -> CountdownConfig {
    CountdownConfig {
        tick_interval_ms: 5,
    }
}

/// Moves forward by a fixed step every time it is read.
struct SteppingClock {
    now: Mutex<NaiveDateTime>,
    step: TimeDelta,
}

impl Clock for SteppingClock {
    fn now(&self) -> NaiveDateTime {
        let mut now = self.now.lock().unwrap();
        let current = *now;
        *now += self.step;
        drop(now);
        current
    }
}

#[tokio::test]
async fn publishes_until_shutdown() {
    let now = parse_local_instant("2025-10-07T12:00").unwrap();
    let rules = Arc::new(DeliveryRules::default());
    let (shutdown, _) = broadcast::channel(4);

    let (ticker, mut receiver) =
        CountdownTicker::new(Arc::clone(&rules), Arc::new(FixedClock::new(now)), &fast()).unwrap();
    let signals = shutdown.subscribe();
    let task = tokio::spawn(async move { ticker.serve(signals).await });

    tokio::time::timeout(WAIT, receiver.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(*receiver.borrow_and_update(), rules.schedule(now));

    shutdown.send(Signal::Shutdown).unwrap();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
}

#[tokio::test]
async fn stops_once_nobody_listens() {
    let now = parse_local_instant("2025-10-07T12:00").unwrap();
    let (_shutdown, signals) = broadcast::channel(4);

    let (ticker, receiver) = CountdownTicker::new(
        Arc::new(DeliveryRules::default()),
        Arc::new(FixedClock::new(now)),
        &fast(),
    )
    .unwrap();
    drop(receiver);

    tokio::time::timeout(WAIT, ticker.serve(signals))
        .await
        .unwrap();
}

#[tokio::test]
async fn reports_cutoff_transition() {
    // Thursday evening, an hour per read: the cutoff passes within a few ticks
    let clock = SteppingClock {
        now: Mutex::new(parse_local_instant("2025-10-09T21:30").unwrap()),
        step: TimeDelta::hours(1),
    };
    let (shutdown, _) = broadcast::channel(4);

    let (ticker, mut receiver) = CountdownTicker::new(
        Arc::new(DeliveryRules::default()),
        Arc::new(clock),
        &fast(),
    )
    .unwrap();
    assert_eq!(receiver.borrow().state, OrderingState::Open);

    let signals = shutdown.subscribe();
    let task = tokio::spawn(async move { ticker.serve(signals).await });

    let closed = tokio::time::timeout(
        WAIT,
        receiver.wait_for(|snapshot| snapshot.state == OrderingState::Closed),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert!(closed.remaining.is_zero());
    assert_eq!(
        closed.next_delivery,
        parse_local_instant("2025-10-11T10:00").unwrap()
    );

    shutdown.send(Signal::Shutdown).unwrap();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
}

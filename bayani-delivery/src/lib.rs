//! Delivery scheduling rules for the Bayani storefront
//!
//! This crate decides:
//! - Whether same-day delivery is currently offered, and at what fee
//! - Which day a standard delivery will arrive
//! - Which weekly delivery run is next and when ordering for it closes
//! - The delivery text shown on product, checkout and order-history pages
//!
//! Every rule takes the reference instant as an argument; only the
//! [`CountdownTicker`] reads a [`Clock`](bayani_common::clock::Clock).

mod amount;
pub mod countdown;
mod error;
mod format;
pub mod policy;
mod rules;
mod types;

pub use amount::Amount;
pub use countdown::{CountdownConfig, CountdownTicker};
pub use error::{AmountError, ConfigError, ParseDeliveryKindError};
pub use format::{format_delivery_date, parse_local_instant};
pub use policy::{CyclePolicy, SameDayPolicy, StandardPolicy};
pub use rules::DeliveryRules;
pub use types::{
    CycleWindow, DeliveryKind, DeliveryOption, OrderingState, ScheduleSnapshot, TimeRemaining,
};

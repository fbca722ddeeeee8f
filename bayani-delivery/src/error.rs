//! Error types for the delivery rules.
//!
//! Rule evaluation itself cannot fail; errors only arise when reading
//! configuration or parsing values handed over by the storefront.

use thiserror::Error;

/// Invalid delivery rule configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Same-day delivery is configured without any days to run on.
    #[error("Same-day delivery must be offered on at least one weekday")]
    NoSameDayDays,

    /// The narrowed ETA window starts before the dispatch cutoff.
    #[error("Same-day dispatch cutoff {cutoff} must not be later than the narrowed window start {narrowed}")]
    WindowOrder { cutoff: String, narrowed: String },

    /// A standard delivery lead time of zero would promise same-day service.
    #[error("Standard delivery lead time must be at least one day: {0}")]
    ZeroLeadDays(&'static str),

    /// The weekly order cutoff would not precede the delivery day.
    #[error("Order cutoff must be at least one day before delivery")]
    ZeroCutoffLead,

    /// The delivery day ends before the delivery slot starts.
    #[error("Delivery day end {day_end} must be after the delivery slot {delivery}")]
    DayEndBeforeDelivery { delivery: String, day_end: String },

    /// The countdown would tick continuously.
    #[error("Countdown tick interval must be greater than zero")]
    ZeroTickInterval,
}

/// A currency amount could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must not be negative: {0}")]
    Negative(String),

    #[error("Amount is not a number: {0}")]
    Malformed(String),

    #[error("Amount has more than two decimal places: {0}")]
    TooPrecise(String),

    #[error("Amount is too large: {0}")]
    Overflow(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown delivery type '{0}', expected 'standard' or 'same-day'")]
pub struct ParseDeliveryKindError(pub String);

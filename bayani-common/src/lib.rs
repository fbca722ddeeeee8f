pub mod clock;
pub mod logging;

pub use tracing;

/// Broadcast to long-running tasks when the process is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Shutdown,
    Finalised,
}

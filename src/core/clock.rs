//! Clock trait definition

use std::time::Instant;

/// Monotonic time source
///
/// The session reads time only through this trait so heartbeat, sync-timeout
/// and status-refresh behavior can be driven deterministically in tests.
pub trait Clock: Send {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

//! Core abstractions shared by the link components.
//!
//! - [`clock::Clock`]: Time source for the session timers
//! - `ManualClock`: test clock, available with the `mock` feature

pub mod clock;
#[cfg(any(test, feature = "mock"))]
mod manual_clock;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "mock"))]
pub use manual_clock::ManualClock;

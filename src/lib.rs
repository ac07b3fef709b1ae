//! yas-link - serial control link for the Yamaha YAS-207 soundbar
//!
//! Frames and decodes the soundbar's serial protocol, keeps a live status
//! snapshot and converges the device on caller-submitted desired states.
//!
//! ## Features
//!
//! - `mock`: In-memory `MockTransport` and `ManualClock` for hardware-free testing
//!
//! ```no_run
//! use yas_link::devices::yas207::{Intent, LinkSession, LinkWorker, SessionSettings, WorkerSettings};
//! use yas_link::transport::SerialTransport;
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//!
//! let transport = SerialTransport::open("/dev/rfcomm0", 115_200, true, Duration::from_millis(10))?;
//! let session = LinkSession::new(SessionSettings::default());
//! let handle = session.handle();
//! let mut worker = LinkWorker::new(transport, session, WorkerSettings::default());
//!
//! std::thread::spawn(move || {
//!     // Once synced:
//!     let _ = handle.send_intent(Intent { volume: Some(20), ..Intent::default() });
//! });
//! worker.run(&AtomicBool::new(false))?;
//! # Ok::<(), yas_link::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};

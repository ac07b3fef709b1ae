//! Link worker: the polling loop that owns the transport
//!
//! Each iteration reads whatever the transport has, runs the heartbeat timer
//! check and writes at most one queued frame. The loop only sleeps after an
//! iteration that moved no bytes.

use super::constants::{HEARTBEAT_INTERVAL_SECS, IDLE_SLEEP_MS};
use super::packet::to_hex;
use super::session::{LinkSession, SessionHandle};
use crate::config::AppConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::transport::Transport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Read buffer size per iteration
const READ_CHUNK_SIZE: usize = 256;

/// Worker loop timing
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// How often the session timers are checked
    pub heartbeat_interval: Duration,
    /// Sleep after an idle iteration
    pub idle_sleep: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(HEARTBEAT_INTERVAL_SECS),
            idle_sleep: Duration::from_millis(IDLE_SLEEP_MS),
        }
    }
}

impl From<&AppConfig> for WorkerSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            heartbeat_interval: config.timing.heartbeat_interval(),
            idle_sleep: config.timing.idle_sleep(),
        }
    }
}

/// Owns the transport and drives the session
pub struct LinkWorker<T: Transport, C: Clock + Clone = SystemClock> {
    transport: T,
    session: LinkSession<C>,
    clock: C,
    settings: WorkerSettings,
    last_heartbeat: Instant,
    buffer: [u8; READ_CHUNK_SIZE],
}

impl<T: Transport, C: Clock + Clone> LinkWorker<T, C> {
    /// Wrap a freshly opened transport and a session in `Initial`
    pub fn new(transport: T, session: LinkSession<C>, settings: WorkerSettings) -> Self {
        let clock = session.clock().clone();
        let last_heartbeat = clock.now();
        Self {
            transport,
            session,
            clock,
            settings,
            last_heartbeat,
            buffer: [0u8; READ_CHUNK_SIZE],
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.session.handle()
    }

    pub fn session(&self) -> &LinkSession<C> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut LinkSession<C> {
        &mut self.session
    }

    pub fn into_session(self) -> LinkSession<C> {
        self.session
    }

    /// One polling iteration; returns whether any bytes moved
    ///
    /// Transport errors are returned as-is and leave the session untouched;
    /// the caller reconnects and calls `replace_transport`.
    pub fn tick(&mut self) -> Result<bool> {
        let mut worked = false;

        let n = self.transport.read(&mut self.buffer)?;
        if n > 0 {
            self.session.on_bytes_received(&self.buffer[..n]);
            worked = true;
        }

        let now = self.clock.now();
        if now.saturating_duration_since(self.last_heartbeat) >= self.settings.heartbeat_interval {
            self.last_heartbeat = now;
            self.session.on_heartbeat_tick();
        }

        if let Some(frame) = self.session.next_outgoing() {
            log::trace!("TX {}", to_hex(&frame));
            self.transport.write_all(&frame)?;
            self.transport.flush()?;
            worked = true;
        }

        Ok(worked)
    }

    /// Run until `shutdown` is set or the transport fails
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        log::info!("Link worker started");
        while !shutdown.load(Ordering::Relaxed) {
            if !self.tick()? {
                thread::sleep(self.settings.idle_sleep);
            }
        }
        log::info!("Link worker exiting");
        Ok(())
    }

    /// Swap in a reopened transport and restart the handshake
    pub fn replace_transport(&mut self, transport: T) {
        self.transport = transport;
        self.session.on_transport_reset();
    }
}

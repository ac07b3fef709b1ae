//! Link session: handshake, status tracking and intent convergence
//!
//! `LinkSession` is owned by the link worker and is the only mutator of the
//! session phase, the status snapshot and the pending reconciliation cycle.
//! Other threads talk to it through a cloneable `SessionHandle`, which only
//! reads the phase and pushes onto lock-free queues.
//!
//! Handshake sequence:
//!
//! ```text
//! Initial ──device id (0x04)──▶ AwaitingHandshakeFollowup ──ack (0x00)──▶ Synced
//!    ▲                                                                      │
//!    └─────────────── transport reset / sync timeout ◀──────────────────────┘
//! ```

use super::commands::NamedCommand;
use super::constants::*;
use super::intent::{InitialPolicy, Intent, WakeRule};
use super::packet::{frame_small, to_hex, RawPacket};
use super::protocol::PacketDecoder;
use super::queue::CommandQueue;
use super::reconciler::{self, Reconciliation};
use super::state::DeviceState;
use crate::config::AppConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crossbeam_queue::SegQueue;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Handshake progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionPhase {
    /// Handshake init sent, waiting for the device id
    Initial = 0,
    /// Follow-up sent, waiting for the ack
    AwaitingHandshakeFollowup = 1,
    /// Handshake complete; commands and intents accepted
    Synced = 2,
}

impl SessionPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SessionPhase::AwaitingHandshakeFollowup,
            2 => SessionPhase::Synced,
            _ => SessionPhase::Initial,
        }
    }
}

/// State visible to other threads
#[derive(Debug, Default)]
struct Shared {
    phase: AtomicU8,
    queue: CommandQueue,
    snapshot: RwLock<Option<DeviceState>>,
    intents: SegQueue<Intent>,
}

/// Cross-thread submission handle
///
/// Readiness checks are best-effort: the phase may change right after the
/// check. Anything staged before a resync is dropped when the session
/// re-enters `Initial`.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl SessionHandle {
    pub fn phase(&self) -> SessionPhase {
        SessionPhase::from_u8(self.shared.phase.load(Ordering::Acquire))
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == SessionPhase::Synced
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotReady)
        }
    }

    /// Encode and enqueue a caller-supplied packet, returning the wire bytes
    pub fn send_raw(&self, packet: RawPacket) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        let frame = packet.encode()?;
        self.shared.queue.enqueue(frame.clone());
        Ok(frame)
    }

    /// Enqueue a command by name (e.g. `"volume_up"`)
    pub fn send(&self, name: &str) -> Result<()> {
        self.ensure_ready()?;
        let command: NamedCommand = name.parse()?;
        self.enqueue_command(command);
        Ok(())
    }

    pub fn send_command(&self, command: NamedCommand) -> Result<()> {
        self.ensure_ready()?;
        self.enqueue_command(command);
        Ok(())
    }

    /// Submit a desired state
    ///
    /// The intent is validated as a whole, handed to the worker and a status
    /// query is enqueued; convergence starts with the reply to that query.
    pub fn send_intent(&self, intent: Intent) -> Result<()> {
        self.ensure_ready()?;
        intent.validate()?;
        if intent.is_empty() {
            return Ok(());
        }
        log::info!("Intent submitted: {}", intent);
        self.shared.intents.push(intent);
        self.enqueue_command(NamedCommand::ReportStatus);
        Ok(())
    }

    /// Latest status snapshot, `None` before the first status reply
    pub fn current_state(&self) -> Option<DeviceState> {
        *self.shared.snapshot.read()
    }

    fn enqueue_command(&self, command: NamedCommand) {
        log::debug!("Queue command {}", command);
        self.shared.queue.enqueue(command.frame());
    }
}

/// Session timing and initial-intent policy
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Restart the handshake if not synced within this long after a reset
    pub sync_timeout: Duration,
    /// Query status when no reply arrived for this long
    pub status_refresh: Duration,
    pub initial_policy: InitialPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sync_timeout: Duration::from_secs(SYNC_TIMEOUT_SECS),
            status_refresh: Duration::from_secs(STATUS_REFRESH_SECS),
            initial_policy: InitialPolicy::default(),
        }
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        let wake_rule = config.wake_policy.enabled.then_some(WakeRule {
            wake_input: config.wake_policy.wake_input,
            standby_input: config.wake_policy.standby_input,
        });
        Self {
            sync_timeout: config.timing.sync_timeout(),
            status_refresh: config.timing.status_refresh(),
            initial_policy: InitialPolicy {
                defaults: config.defaults.to_intent(),
                wake_rule,
            },
        }
    }
}

/// Worker-owned protocol session
pub struct LinkSession<C: Clock = SystemClock> {
    shared: Arc<Shared>,
    decoder: PacketDecoder,
    clock: C,
    settings: SessionSettings,
    phase: SessionPhase,
    reset_at: Instant,
    last_status_at: Instant,
    /// Expand the initial intent on the next status reply
    initial_pending: bool,
    cycle: Option<Reconciliation>,
}

impl LinkSession<SystemClock> {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl<C: Clock> LinkSession<C> {
    /// Create a session in `Initial` with the handshake init already queued
    pub fn with_clock(settings: SessionSettings, clock: C) -> Self {
        let now = clock.now();
        let mut session = Self {
            shared: Arc::new(Shared::default()),
            decoder: PacketDecoder::new(),
            clock,
            settings,
            phase: SessionPhase::Initial,
            reset_at: now,
            last_status_at: now,
            initial_pending: false,
            cycle: None,
        };
        session.enter_initial();
        session
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Pending reconciliation cycle, if any
    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        self.cycle.as_ref()
    }

    pub fn current_state(&self) -> Option<DeviceState> {
        *self.shared.snapshot.read()
    }

    /// Next frame to write, if any
    pub fn next_outgoing(&self) -> Option<Vec<u8>> {
        self.shared.queue.dequeue().map(|entry| entry.frame)
    }

    /// Frames waiting to be written
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    // ========================================================================
    // Inbound
    // ========================================================================

    /// Feed raw bytes read from the transport
    pub fn on_bytes_received(&mut self, data: &[u8]) {
        log::trace!("RX {}", to_hex(data));
        for &byte in data {
            if let Some(payload) = self.decoder.push(byte) {
                self.on_packet(&payload);
            }
        }
    }

    /// Handle one validated payload
    pub fn on_packet(&mut self, payload: &[u8]) {
        match payload.first() {
            Some(&OP_DEVICE_ID) => self.handle_device_id(payload),
            Some(&OP_HANDSHAKE_ACK) => self.handle_ack(payload),
            Some(&OP_STATUS) => self.handle_status(payload),
            _ => log::debug!("Unhandled packet: {}", to_hex(payload)),
        }
    }

    fn handle_device_id(&mut self, payload: &[u8]) {
        if self.phase != SessionPhase::Initial {
            log::warn!(
                "Out-of-sequence device id in {:?}: {}",
                self.phase,
                to_hex(payload)
            );
            return;
        }
        log::info!("Device identified: {}", to_hex(payload));
        self.set_phase(SessionPhase::AwaitingHandshakeFollowup);
        self.enqueue_payload(&HANDSHAKE_FOLLOWUP);
    }

    fn handle_ack(&mut self, payload: &[u8]) {
        if self.phase != SessionPhase::AwaitingHandshakeFollowup {
            log::debug!("Unhandled packet: {}", to_hex(payload));
            return;
        }
        if payload != HANDSHAKE_ACK_EXPECTED {
            log::warn!("Unexpected handshake ack: {}", to_hex(payload));
        }

        log::info!("Link synced");
        self.set_phase(SessionPhase::Synced);
        self.last_status_at = self.clock.now();
        self.initial_pending = true;
        self.enqueue_command(NamedCommand::ReportStatus);
    }

    fn handle_status(&mut self, payload: &[u8]) {
        if self.phase != SessionPhase::Synced {
            log::warn!("Status reply before sync ignored: {}", to_hex(payload));
            return;
        }
        let Some(state) = DeviceState::parse(payload) else {
            log::warn!(
                "Status reply too short ({} bytes): {}",
                payload.len(),
                to_hex(payload)
            );
            return;
        };

        self.last_status_at = self.clock.now();
        *self.shared.snapshot.write() = Some(state);
        log::info!("Status: {}", state);

        let mut cycle = self.cycle.take();
        if self.initial_pending {
            self.initial_pending = false;
            let initial = self.settings.initial_policy.expand(&state);
            log::debug!("Initial intent {}", initial);
            cycle = Some(Reconciliation::new(initial));
        }
        while let Some(intent) = self.shared.intents.pop() {
            match cycle.as_mut() {
                Some(pending) => pending.merge(&intent),
                None => cycle = Some(Reconciliation::new(intent)),
            }
        }

        if let Some(pending) = cycle {
            let outcome = reconciler::step(&pending, &state);
            for command in outcome.commands {
                self.enqueue_command(command);
            }
            self.cycle = outcome.next;
        }
    }

    // ========================================================================
    // Timers and resets
    // ========================================================================

    /// The transport was (re)opened: restart the handshake
    pub fn on_transport_reset(&mut self) {
        log::info!("Transport reset, restarting handshake");
        self.enter_initial();
    }

    /// Periodic timer check
    ///
    /// Both timers fire only once their period has strictly elapsed.
    pub fn on_heartbeat_tick(&mut self) {
        let now = self.clock.now();
        if self.phase == SessionPhase::Synced {
            if now.saturating_duration_since(self.last_status_at) > self.settings.status_refresh {
                log::debug!("No status for {:?}, polling", self.settings.status_refresh);
                self.enqueue_command(NamedCommand::ReportStatus);
                self.last_status_at = now;
            }
        } else if now.saturating_duration_since(self.reset_at) > self.settings.sync_timeout {
            log::warn!(
                "Not synced after {:?} (phase {:?}), restarting handshake",
                self.settings.sync_timeout,
                self.phase
            );
            self.enter_initial();
        }
    }

    fn enter_initial(&mut self) {
        self.shared.queue.clear();
        while self.shared.intents.pop().is_some() {}
        // Pre-reset state is stale until the next status reply
        *self.shared.snapshot.write() = None;
        self.decoder.reset();
        self.cycle = None;
        self.initial_pending = false;
        self.set_phase(SessionPhase::Initial);
        self.reset_at = self.clock.now();
        self.enqueue_payload(&HANDSHAKE_INIT);
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            log::debug!("Session phase {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
        self.shared.phase.store(phase as u8, Ordering::Release);
    }

    fn enqueue_payload(&self, payload: &[u8]) {
        self.shared.queue.enqueue(frame_small(payload));
    }

    fn enqueue_command(&self, command: NamedCommand) {
        log::debug!("Queue command {}", command);
        self.shared.queue.enqueue(command.frame());
    }

    // ========================================================================
    // Submissions
    // ========================================================================

    pub fn submit_raw(&self, packet: RawPacket) -> Result<Vec<u8>> {
        self.handle().send_raw(packet)
    }

    pub fn submit_command(&self, name: &str) -> Result<()> {
        self.handle().send(name)
    }

    pub fn submit_intent(&self, intent: Intent) -> Result<()> {
        self.handle().send_intent(intent)
    }
}

//! Yamaha YAS-207 soundbar link over a serial (RFCOMM) channel.
//!
//! Layers, bottom to top:
//! - [`packet`] / [`protocol`]: frame encoding and the streaming decoder
//! - [`state`] / [`commands`]: status reply layout and the command table
//! - [`queue`]: outgoing frame FIFO shared with other threads
//! - [`intent`] / [`reconciler`]: desired state and the pass that converges on it
//! - [`session`]: handshake, status tracking and submissions
//! - [`worker`]: polling loop over a [`Transport`](crate::transport::Transport)
//!
//! # Handshake
//!
//! 1. Host sends `01 48 54 53 20 43 6f 6e 74` ("\x01HTS Cont")
//! 2. Device answers with its id (opcode `0x04`)
//! 3. Host sends `02 00 01`
//! 4. Device acks (`00 02 00`); host queries status (`03 05`)
//!
//! From then on every status reply (opcode `0x05`) refreshes the snapshot and
//! drives one reconciliation pass.

pub mod commands;
pub mod constants;
pub mod intent;
pub mod packet;
pub mod protocol;
pub mod queue;
pub mod reconciler;
pub mod session;
pub mod state;
pub mod worker;

pub use commands::NamedCommand;
pub use intent::{InitialPolicy, Intent, IntentKey, IntentValue, WakeRule};
pub use packet::RawPacket;
pub use protocol::{DecoderState, PacketDecoder};
pub use reconciler::{Reconciliation, RetryState, StepOutcome};
pub use session::{LinkSession, SessionHandle, SessionPhase, SessionSettings};
pub use state::{DeviceState, InputKind, SurroundKind};
pub use worker::{LinkWorker, WorkerSettings};

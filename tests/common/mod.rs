//! Fake YAS-207 for integration tests
//!
//! Plays the device side of the link: answers the handshake, replies to
//! status queries and applies remote-control commands the way the hardware
//! does (most commands are ignored while powered off).

#![allow(dead_code)]

use yas_link::devices::yas207::constants::{HANDSHAKE_FOLLOWUP, HANDSHAKE_INIT, VOLUME_MAX};
use yas_link::devices::yas207::packet::encode_payload;
use yas_link::devices::yas207::{
    DeviceState, InputKind, LinkSession, NamedCommand, PacketDecoder, SurroundKind,
};
use yas_link::core::Clock;

/// Device id reply to the handshake init
pub const DEVICE_ID: [u8; 8] = [0x04, 0x00, 0x01, 0x32, 0x19, 0x02, 0x0A, 0x00];

pub struct FakeSoundbar {
    pub state: DeviceState,
    /// Ignore volume commands, to provoke a reconciliation stall
    pub volume_locked: bool,
    decoder: PacketDecoder,
    output: Vec<u8>,
    received: Vec<Vec<u8>>,
}

impl FakeSoundbar {
    pub fn new() -> Self {
        Self {
            state: DeviceState {
                power: true,
                input: InputKind::Bluetooth,
                muted: false,
                volume: 10,
                subwoofer: 16,
                surround: SurroundKind::Tv,
                bass_ext: true,
                clearvoice: false,
            },
            volume_locked: false,
            decoder: PacketDecoder::new(),
            output: Vec::new(),
            received: Vec::new(),
        }
    }

    /// Feed bytes written by the host
    pub fn receive(&mut self, bytes: &[u8]) {
        for payload in self.decoder.decode(bytes) {
            self.handle(&payload);
            self.received.push(payload);
        }
    }

    /// Bytes the device has written since the last call
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }

    /// Every payload received so far
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    /// Received payloads that are named commands, in order
    pub fn received_commands(&self) -> Vec<NamedCommand> {
        self.received
            .iter()
            .filter_map(|payload| NamedCommand::from_payload(payload))
            .collect()
    }

    pub fn clear_received(&mut self) {
        self.received.clear();
    }

    fn reply(&mut self, payload: &[u8]) {
        self.output
            .extend_from_slice(&encode_payload(payload).expect("reply fits in a frame"));
    }

    fn handle(&mut self, payload: &[u8]) {
        if payload == HANDSHAKE_INIT {
            // A fresh connection wakes the device on bluetooth
            self.state.power = true;
            self.state.input = InputKind::Bluetooth;
            self.reply(&DEVICE_ID);
            return;
        }
        if payload == HANDSHAKE_FOLLOWUP {
            self.reply(&[0x00, 0x02, 0x00]);
            return;
        }

        let Some(command) = NamedCommand::from_payload(payload) else {
            return;
        };
        if command == NamedCommand::ReportStatus {
            let status = self.state.to_status_payload();
            self.reply(&status);
            return;
        }

        let state = &mut self.state;
        if !state.power {
            match command {
                NamedCommand::PowerOn => state.power = true,
                NamedCommand::PowerOff => state.muted = false,
                _ => {}
            }
            return;
        }

        match command {
            NamedCommand::PowerToggle => state.power = !state.power,
            NamedCommand::PowerOn => state.power = true,
            NamedCommand::PowerOff => {
                state.power = false;
                state.muted = false;
            }
            NamedCommand::VolumeUp if !self.volume_locked => {
                if state.volume < VOLUME_MAX {
                    state.volume += 1;
                }
                state.muted = false;
            }
            NamedCommand::VolumeDown if !self.volume_locked => {
                state.volume = state.volume.saturating_sub(1);
                state.muted = false;
            }
            NamedCommand::SubwooferUp if state.subwoofer <= 28 => state.subwoofer += 4,
            NamedCommand::SubwooferDown if state.subwoofer >= 4 => state.subwoofer -= 4,
            NamedCommand::MuteOn => state.muted = true,
            NamedCommand::MuteOff => state.muted = false,
            NamedCommand::MuteToggle => state.muted = !state.muted,
            NamedCommand::BassExtOn => state.bass_ext = true,
            NamedCommand::BassExtOff => state.bass_ext = false,
            NamedCommand::ClearvoiceOn => state.clearvoice = true,
            NamedCommand::ClearvoiceOff => state.clearvoice = false,
            other => {
                if let Some(input) = InputKind::NAMED
                    .into_iter()
                    .find(|&i| NamedCommand::select_input(i) == Some(other))
                {
                    state.input = input;
                } else if let Some(surround) = SurroundKind::NAMED
                    .into_iter()
                    .find(|&s| NamedCommand::select_surround(s) == Some(other))
                {
                    state.surround = surround;
                }
            }
        }
    }
}

/// Shuttle frames between a session and the fake until both sides go quiet
///
/// Returns the number of frames the session wrote.
pub fn pump<C: Clock>(session: &mut LinkSession<C>, device: &mut FakeSoundbar) -> usize {
    let mut written = 0;
    while let Some(frame) = session.next_outgoing() {
        written += 1;
        assert!(written < 1000, "link never went quiet");
        device.receive(&frame);
        let reply = device.take_output();
        session.on_bytes_received(&reply);
    }
    written
}

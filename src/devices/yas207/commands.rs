//! Named command table for the YAS-207
//!
//! Each command is a fixed payload (three bytes for remote-control codes, two
//! for the status query) that is framed and checksummed on the way out.
//! Opcode `0x40` carries a two-byte IR-style key code; `0x03` is a query.

use super::packet::frame_small;
use super::state::{InputKind, SurroundKind};
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Every command the link knows how to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedCommand {
    // Power
    PowerToggle,
    PowerOn,
    PowerOff,

    // Input
    SetInputHdmi,
    SetInputAnalog,
    SetInputBluetooth,
    SetInputTv,

    // Surround
    Set3dSurround,
    SetTvProgram,
    SetStereo,
    SetMovie,
    SetMusic,
    SetSports,
    SetGame,
    /// Movie, or 3d if already on movie
    SurroundToggle,
    ClearvoiceToggle,
    ClearvoiceOn,
    ClearvoiceOff,
    BassExtToggle,
    BassExtOn,
    BassExtOff,

    // Volume
    SubwooferUp,
    SubwooferDown,
    MuteToggle,
    MuteOn,
    MuteOff,
    VolumeUp,
    VolumeDown,

    // IR extras
    BluetoothStandbyToggle,
    Dimmer,

    /// Status query; the device answers with a status reply
    ReportStatus,
}

impl NamedCommand {
    /// Every command, in table order
    pub const ALL: [NamedCommand; 31] = [
        NamedCommand::PowerToggle,
        NamedCommand::PowerOn,
        NamedCommand::PowerOff,
        NamedCommand::SetInputHdmi,
        NamedCommand::SetInputAnalog,
        NamedCommand::SetInputBluetooth,
        NamedCommand::SetInputTv,
        NamedCommand::Set3dSurround,
        NamedCommand::SetTvProgram,
        NamedCommand::SetStereo,
        NamedCommand::SetMovie,
        NamedCommand::SetMusic,
        NamedCommand::SetSports,
        NamedCommand::SetGame,
        NamedCommand::SurroundToggle,
        NamedCommand::ClearvoiceToggle,
        NamedCommand::ClearvoiceOn,
        NamedCommand::ClearvoiceOff,
        NamedCommand::BassExtToggle,
        NamedCommand::BassExtOn,
        NamedCommand::BassExtOff,
        NamedCommand::SubwooferUp,
        NamedCommand::SubwooferDown,
        NamedCommand::MuteToggle,
        NamedCommand::MuteOn,
        NamedCommand::MuteOff,
        NamedCommand::VolumeUp,
        NamedCommand::VolumeDown,
        NamedCommand::BluetoothStandbyToggle,
        NamedCommand::Dimmer,
        NamedCommand::ReportStatus,
    ];

    /// Symbolic name used by callers
    pub fn name(self) -> &'static str {
        match self {
            NamedCommand::PowerToggle => "power_toggle",
            NamedCommand::PowerOn => "power_on",
            NamedCommand::PowerOff => "power_off",
            NamedCommand::SetInputHdmi => "set_input_hdmi",
            NamedCommand::SetInputAnalog => "set_input_analog",
            NamedCommand::SetInputBluetooth => "set_input_bluetooth",
            NamedCommand::SetInputTv => "set_input_tv",
            NamedCommand::Set3dSurround => "set_3d_surround",
            NamedCommand::SetTvProgram => "set_tvprogram",
            NamedCommand::SetStereo => "set_stereo",
            NamedCommand::SetMovie => "set_movie",
            NamedCommand::SetMusic => "set_music",
            NamedCommand::SetSports => "set_sports",
            NamedCommand::SetGame => "set_game",
            NamedCommand::SurroundToggle => "surround_toggle",
            NamedCommand::ClearvoiceToggle => "clearvoice_toggle",
            NamedCommand::ClearvoiceOn => "clearvoice_on",
            NamedCommand::ClearvoiceOff => "clearvoice_off",
            NamedCommand::BassExtToggle => "bass_ext_toggle",
            NamedCommand::BassExtOn => "bass_ext_on",
            NamedCommand::BassExtOff => "bass_ext_off",
            NamedCommand::SubwooferUp => "subwoofer_up",
            NamedCommand::SubwooferDown => "subwoofer_down",
            NamedCommand::MuteToggle => "mute_toggle",
            NamedCommand::MuteOn => "mute_on",
            NamedCommand::MuteOff => "mute_off",
            NamedCommand::VolumeUp => "volume_up",
            NamedCommand::VolumeDown => "volume_down",
            NamedCommand::BluetoothStandbyToggle => "bluetooth_standby_toggle",
            NamedCommand::Dimmer => "dimmer",
            NamedCommand::ReportStatus => "report_status",
        }
    }

    /// Unframed payload bytes
    pub fn payload(self) -> &'static [u8] {
        match self {
            NamedCommand::PowerToggle => &[0x40, 0x78, 0xCC],
            NamedCommand::PowerOn => &[0x40, 0x78, 0x7E],
            NamedCommand::PowerOff => &[0x40, 0x78, 0x7F],
            NamedCommand::SetInputHdmi => &[0x40, 0x78, 0x4A],
            NamedCommand::SetInputAnalog => &[0x40, 0x78, 0xD1],
            NamedCommand::SetInputBluetooth => &[0x40, 0x78, 0x29],
            NamedCommand::SetInputTv => &[0x40, 0x78, 0xDF],
            NamedCommand::Set3dSurround => &[0x40, 0x78, 0xC9],
            NamedCommand::SetTvProgram => &[0x40, 0x7E, 0xF1],
            NamedCommand::SetStereo => &[0x40, 0x78, 0x50],
            NamedCommand::SetMovie => &[0x40, 0x78, 0xD9],
            NamedCommand::SetMusic => &[0x40, 0x78, 0xDA],
            NamedCommand::SetSports => &[0x40, 0x78, 0xDB],
            NamedCommand::SetGame => &[0x40, 0x78, 0xDC],
            NamedCommand::SurroundToggle => &[0x40, 0x78, 0xB4],
            NamedCommand::ClearvoiceToggle => &[0x40, 0x78, 0x5C],
            NamedCommand::ClearvoiceOn => &[0x40, 0x7E, 0x80],
            NamedCommand::ClearvoiceOff => &[0x40, 0x7E, 0x82],
            NamedCommand::BassExtToggle => &[0x40, 0x78, 0x8B],
            NamedCommand::BassExtOn => &[0x40, 0x78, 0x6E],
            NamedCommand::BassExtOff => &[0x40, 0x78, 0x6F],
            NamedCommand::SubwooferUp => &[0x40, 0x78, 0x4C],
            NamedCommand::SubwooferDown => &[0x40, 0x78, 0x4D],
            NamedCommand::MuteToggle => &[0x40, 0x78, 0x9C],
            NamedCommand::MuteOn => &[0x40, 0x7E, 0xA2],
            NamedCommand::MuteOff => &[0x40, 0x7E, 0xA3],
            NamedCommand::VolumeUp => &[0x40, 0x78, 0x1E],
            NamedCommand::VolumeDown => &[0x40, 0x78, 0x1F],
            NamedCommand::BluetoothStandbyToggle => &[0x40, 0x78, 0x34],
            NamedCommand::Dimmer => &[0x40, 0x78, 0xBA],
            NamedCommand::ReportStatus => &[0x03, 0x05],
        }
    }

    /// Framed, checksummed wire bytes
    pub fn frame(self) -> Vec<u8> {
        frame_small(self.payload())
    }

    /// Look up the command whose payload matches exactly
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        NamedCommand::ALL
            .into_iter()
            .find(|cmd| cmd.payload() == payload)
    }

    /// Set command for a named input (`None` for unknown codes)
    pub fn select_input(input: InputKind) -> Option<Self> {
        match input {
            InputKind::Hdmi => Some(NamedCommand::SetInputHdmi),
            InputKind::Analog => Some(NamedCommand::SetInputAnalog),
            InputKind::Bluetooth => Some(NamedCommand::SetInputBluetooth),
            InputKind::Tv => Some(NamedCommand::SetInputTv),
            InputKind::Unknown(_) => None,
        }
    }

    /// Set command for a named surround program (`None` for unknown codes)
    pub fn select_surround(surround: SurroundKind) -> Option<Self> {
        match surround {
            SurroundKind::Surround3d => Some(NamedCommand::Set3dSurround),
            SurroundKind::Tv => Some(NamedCommand::SetTvProgram),
            SurroundKind::Stereo => Some(NamedCommand::SetStereo),
            SurroundKind::Movie => Some(NamedCommand::SetMovie),
            SurroundKind::Music => Some(NamedCommand::SetMusic),
            SurroundKind::Sports => Some(NamedCommand::SetSports),
            SurroundKind::Game => Some(NamedCommand::SetGame),
            SurroundKind::Unknown(_) => None,
        }
    }

    pub fn power(on: bool) -> Self {
        if on {
            NamedCommand::PowerOn
        } else {
            NamedCommand::PowerOff
        }
    }

    pub fn mute(on: bool) -> Self {
        if on {
            NamedCommand::MuteOn
        } else {
            NamedCommand::MuteOff
        }
    }

    pub fn bass_ext(on: bool) -> Self {
        if on {
            NamedCommand::BassExtOn
        } else {
            NamedCommand::BassExtOff
        }
    }

    pub fn clearvoice(on: bool) -> Self {
        if on {
            NamedCommand::ClearvoiceOn
        } else {
            NamedCommand::ClearvoiceOff
        }
    }
}

impl FromStr for NamedCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedCommand::ALL
            .into_iter()
            .find(|cmd| cmd.name() == s)
            .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for NamedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

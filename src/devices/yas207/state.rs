//! Device status snapshot and status-field enumerations
//!
//! A status reply (opcode 0x05) is parsed into an immutable `DeviceState`.
//! Input and surround codes the table doesn't know are kept as raw values in
//! an explicit `Unknown` variant rather than rejected.

use super::constants::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Selected input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    Hdmi,
    Analog,
    Bluetooth,
    Tv,
    /// Code not in the input table
    Unknown(u8),
}

impl InputKind {
    /// Every named input
    pub const NAMED: [InputKind; 4] = [
        InputKind::Hdmi,
        InputKind::Analog,
        InputKind::Bluetooth,
        InputKind::Tv,
    ];

    pub fn from_code(code: u8) -> Self {
        match code {
            INPUT_HDMI => InputKind::Hdmi,
            INPUT_ANALOG => InputKind::Analog,
            INPUT_BLUETOOTH => InputKind::Bluetooth,
            INPUT_TV => InputKind::Tv,
            other => InputKind::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            InputKind::Hdmi => INPUT_HDMI,
            InputKind::Analog => INPUT_ANALOG,
            InputKind::Bluetooth => INPUT_BLUETOOTH,
            InputKind::Tv => INPUT_TV,
            InputKind::Unknown(code) => code,
        }
    }

    /// Symbolic name, `None` for unknown codes
    pub fn name(self) -> Option<&'static str> {
        match self {
            InputKind::Hdmi => Some("hdmi"),
            InputKind::Analog => Some("analog"),
            InputKind::Bluetooth => Some("bluetooth"),
            InputKind::Tv => Some("tv"),
            InputKind::Unknown(_) => None,
        }
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InputKind::NAMED
            .into_iter()
            .find(|input| input.name() == Some(s))
            .ok_or_else(|| format!("unknown input '{}'", s))
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

/// Surround (sound field) program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurroundKind {
    Surround3d,
    Tv,
    Stereo,
    Movie,
    Music,
    Sports,
    Game,
    /// Code not in the surround table
    Unknown(u16),
}

impl SurroundKind {
    /// Every named surround program
    pub const NAMED: [SurroundKind; 7] = [
        SurroundKind::Surround3d,
        SurroundKind::Tv,
        SurroundKind::Stereo,
        SurroundKind::Movie,
        SurroundKind::Music,
        SurroundKind::Sports,
        SurroundKind::Game,
    ];

    pub fn from_code(code: u16) -> Self {
        match code {
            SURROUND_3D => SurroundKind::Surround3d,
            SURROUND_TV => SurroundKind::Tv,
            SURROUND_STEREO => SurroundKind::Stereo,
            SURROUND_MOVIE => SurroundKind::Movie,
            SURROUND_MUSIC => SurroundKind::Music,
            SURROUND_SPORTS => SurroundKind::Sports,
            SURROUND_GAME => SurroundKind::Game,
            other => SurroundKind::Unknown(other),
        }
    }

    pub fn code(self) -> u16 {
        match self {
            SurroundKind::Surround3d => SURROUND_3D,
            SurroundKind::Tv => SURROUND_TV,
            SurroundKind::Stereo => SURROUND_STEREO,
            SurroundKind::Movie => SURROUND_MOVIE,
            SurroundKind::Music => SURROUND_MUSIC,
            SurroundKind::Sports => SURROUND_SPORTS,
            SurroundKind::Game => SURROUND_GAME,
            SurroundKind::Unknown(code) => code,
        }
    }

    /// Symbolic name, `None` for unknown codes
    pub fn name(self) -> Option<&'static str> {
        match self {
            SurroundKind::Surround3d => Some("3d"),
            SurroundKind::Tv => Some("tv"),
            SurroundKind::Stereo => Some("stereo"),
            SurroundKind::Movie => Some("movie"),
            SurroundKind::Music => Some("music"),
            SurroundKind::Sports => Some("sports"),
            SurroundKind::Game => Some("game"),
            SurroundKind::Unknown(_) => None,
        }
    }
}

impl FromStr for SurroundKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SurroundKind::NAMED
            .into_iter()
            .find(|surround| surround.name() == Some(s))
            .ok_or_else(|| format!("unknown surround '{}'", s))
    }
}

impl fmt::Display for SurroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

// Known codes serialize by name, unknown ones as the raw number.
// Deserialization only accepts names: callers never ask for an unknown code.

impl Serialize for InputKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_u8(self.code()),
        }
    }
}

impl<'de> Deserialize<'de> for InputKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for SurroundKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => serializer.serialize_str(name),
            None => serializer.serialize_u16(self.code()),
        }
    }
}

impl<'de> Deserialize<'de> for SurroundKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Full device status, as reported by one status reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceState {
    pub power: bool,
    pub input: InputKind,
    pub muted: bool,
    /// 0..=50
    pub volume: u8,
    /// 0..=32 in steps of 4
    pub subwoofer: u8,
    pub surround: SurroundKind,
    pub bass_ext: bool,
    pub clearvoice: bool,
}

impl DeviceState {
    /// Parse a status reply payload (opcode byte included)
    ///
    /// Returns `None` for payloads that are not status replies or are too short.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < STATUS_PAYLOAD_MIN_SIZE || payload[0] != OP_STATUS {
            return None;
        }

        let surround = u16::from_be_bytes([payload[OFFSET_SURROUND], payload[OFFSET_SURROUND + 1]]);
        let flags = payload[OFFSET_FLAGS];

        Some(Self {
            power: payload[OFFSET_POWER] != 0,
            input: InputKind::from_code(payload[OFFSET_INPUT]),
            muted: payload[OFFSET_MUTED] != 0,
            volume: payload[OFFSET_VOLUME],
            subwoofer: payload[OFFSET_SUBWOOFER],
            surround: SurroundKind::from_code(surround),
            bass_ext: flags & FLAG_BASS_EXT != 0,
            clearvoice: flags & FLAG_CLEARVOICE != 0,
        })
    }

    /// Build the status reply payload describing this state
    ///
    /// Inverse of `parse`; used by test doubles that play the device side.
    pub fn to_status_payload(&self) -> [u8; STATUS_PAYLOAD_MIN_SIZE] {
        let surround = self.surround.code().to_be_bytes();
        let mut flags = 0u8;
        if self.bass_ext {
            flags |= FLAG_BASS_EXT;
        }
        if self.clearvoice {
            flags |= FLAG_CLEARVOICE;
        }
        [
            OP_STATUS,
            0x00,
            self.power as u8,
            self.input.code(),
            self.muted as u8,
            self.volume,
            self.subwoofer,
            0x20,
            0x20,
            0x00,
            surround[0],
            surround[1],
            flags,
        ]
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power:{},input:{},muted:{},volume:{},subwoofer:{},surround:{},bass_ext:{},clearvoice:{}",
            self.power,
            self.input,
            self.muted,
            self.volume,
            self.subwoofer,
            self.surround,
            self.bass_ext,
            self.clearvoice
        )
    }
}

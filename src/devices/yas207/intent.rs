//! Desired device state ("intent") and its validation
//!
//! An `Intent` names target values for any subset of the reconcilable keys.
//! Intents reach the session either typed (front ends deserializing with
//! serde) or as untyped `(key, value)` pairs through `Intent::from_fields`;
//! both paths go through the same all-or-nothing `validate`.

use super::constants::{SUBWOOFER_MAX, SUBWOOFER_STEP, VOLUME_MAX};
use super::state::{DeviceState, InputKind, SurroundKind};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Reconcilable device fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKey {
    Input,
    Mute,
    Volume,
    Subwoofer,
    Surround,
    BassExt,
    Clearvoice,
    Power,
}

impl IntentKey {
    /// Order in which commands for differing keys are issued
    ///
    /// Input goes first (the device remembers some settings per input) and
    /// power goes last so a return-to-standby happens after everything else.
    pub const PRIORITY: [IntentKey; 8] = [
        IntentKey::Input,
        IntentKey::Mute,
        IntentKey::Volume,
        IntentKey::Subwoofer,
        IntentKey::Surround,
        IntentKey::BassExt,
        IntentKey::Clearvoice,
        IntentKey::Power,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntentKey::Input => "input",
            IntentKey::Mute => "mute",
            IntentKey::Volume => "volume",
            IntentKey::Subwoofer => "subwoofer",
            IntentKey::Surround => "surround",
            IntentKey::BassExt => "bass_ext",
            IntentKey::Clearvoice => "clearvoice",
            IntentKey::Power => "power",
        }
    }
}

impl FromStr for IntentKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        IntentKey::PRIORITY
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| invalid(s, "unknown key"))
    }
}

impl fmt::Display for IntentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Untyped intent value as decoded by a front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentValue {
    Bool(bool),
    Number(i64),
    Name(String),
}

impl From<bool> for IntentValue {
    fn from(value: bool) -> Self {
        IntentValue::Bool(value)
    }
}

impl From<i64> for IntentValue {
    fn from(value: i64) -> Self {
        IntentValue::Number(value)
    }
}

impl From<&str> for IntentValue {
    fn from(value: &str) -> Self {
        IntentValue::Name(value.to_string())
    }
}

/// Partial target state
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Intent {
    pub power: Option<bool>,
    pub mute: Option<bool>,
    pub input: Option<InputKind>,
    pub volume: Option<u8>,
    pub subwoofer: Option<u8>,
    pub surround: Option<SurroundKind>,
    pub bass_ext: Option<bool>,
    pub clearvoice: Option<bool>,
}

impl Intent {
    /// Build and validate an intent from untyped fields
    ///
    /// A repeated key keeps its last value.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, IntentValue)>,
    {
        let mut intent = Intent::default();
        for (name, value) in fields {
            let key: IntentKey = name.parse()?;
            match key {
                IntentKey::Power => intent.power = Some(expect_bool(key, value)?),
                IntentKey::Mute => intent.mute = Some(expect_bool(key, value)?),
                IntentKey::BassExt => intent.bass_ext = Some(expect_bool(key, value)?),
                IntentKey::Clearvoice => intent.clearvoice = Some(expect_bool(key, value)?),
                IntentKey::Volume => intent.volume = Some(expect_u8(key, value)?),
                IntentKey::Subwoofer => intent.subwoofer = Some(expect_u8(key, value)?),
                IntentKey::Input => {
                    let name = expect_name(key, value)?;
                    intent.input = Some(name.parse().map_err(|e: String| invalid(key.name(), &e))?);
                }
                IntentKey::Surround => {
                    let name = expect_name(key, value)?;
                    intent.surround =
                        Some(name.parse().map_err(|e: String| invalid(key.name(), &e))?);
                }
            }
        }
        intent.validate()?;
        Ok(intent)
    }

    /// Check every present field against its domain
    pub fn validate(&self) -> Result<()> {
        if let Some(volume) = self.volume {
            if volume > VOLUME_MAX {
                return Err(invalid(
                    IntentKey::Volume.name(),
                    &format!("must be within 0..={}, got {}", VOLUME_MAX, volume),
                ));
            }
        }
        if let Some(subwoofer) = self.subwoofer {
            if subwoofer > SUBWOOFER_MAX || subwoofer % SUBWOOFER_STEP != 0 {
                return Err(invalid(
                    IntentKey::Subwoofer.name(),
                    &format!(
                        "must be a multiple of {} within 0..={}, got {}",
                        SUBWOOFER_STEP, SUBWOOFER_MAX, subwoofer
                    ),
                ));
            }
        }
        if let Some(InputKind::Unknown(code)) = self.input {
            return Err(invalid(
                IntentKey::Input.name(),
                &format!("unnamed input code {}", code),
            ));
        }
        if let Some(SurroundKind::Unknown(code)) = self.surround {
            return Err(invalid(
                IntentKey::Surround.name(),
                &format!("unnamed surround code {}", code),
            ));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Intent::default()
    }

    /// Overlay `newer` on top of this intent; keys present in `newer` win
    pub fn merge(&mut self, newer: &Intent) {
        self.power = newer.power.or(self.power);
        self.mute = newer.mute.or(self.mute);
        self.input = newer.input.or(self.input);
        self.volume = newer.volume.or(self.volume);
        self.subwoofer = newer.subwoofer.or(self.subwoofer);
        self.surround = newer.surround.or(self.surround);
        self.bass_ext = newer.bass_ext.or(self.bass_ext);
        self.clearvoice = newer.clearvoice.or(self.clearvoice);
    }

    /// Present keys whose target differs from `observed`, in priority order
    pub fn delta(&self, observed: &DeviceState) -> Vec<IntentKey> {
        IntentKey::PRIORITY
            .into_iter()
            .filter(|&key| self.differs(key, observed))
            .collect()
    }

    fn differs(&self, key: IntentKey, observed: &DeviceState) -> bool {
        fn ne<T: PartialEq>(target: Option<T>, actual: T) -> bool {
            target.is_some_and(|t| t != actual)
        }
        match key {
            IntentKey::Input => ne(self.input, observed.input),
            IntentKey::Mute => ne(self.mute, observed.muted),
            IntentKey::Volume => ne(self.volume, observed.volume),
            IntentKey::Subwoofer => ne(self.subwoofer, observed.subwoofer),
            IntentKey::Surround => ne(self.surround, observed.surround),
            IntentKey::BassExt => ne(self.bass_ext, observed.bass_ext),
            IntentKey::Clearvoice => ne(self.clearvoice, observed.clearvoice),
            IntentKey::Power => ne(self.power, observed.power),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = self.input {
            parts.push(format!("input:{}", v));
        }
        if let Some(v) = self.mute {
            parts.push(format!("mute:{}", v));
        }
        if let Some(v) = self.volume {
            parts.push(format!("volume:{}", v));
        }
        if let Some(v) = self.subwoofer {
            parts.push(format!("subwoofer:{}", v));
        }
        if let Some(v) = self.surround {
            parts.push(format!("surround:{}", v));
        }
        if let Some(v) = self.bass_ext {
            parts.push(format!("bass_ext:{}", v));
        }
        if let Some(v) = self.clearvoice {
            parts.push(format!("clearvoice:{}", v));
        }
        if let Some(v) = self.power {
            parts.push(format!("power:{}", v));
        }
        write!(f, "{{{}}}", parts.join(","))
    }
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::InvalidIntentField {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn expect_bool(key: IntentKey, value: IntentValue) -> Result<bool> {
    match value {
        IntentValue::Bool(b) => Ok(b),
        other => Err(invalid(key.name(), &format!("expected a boolean, got {:?}", other))),
    }
}

fn expect_u8(key: IntentKey, value: IntentValue) -> Result<u8> {
    match value {
        IntentValue::Number(n) => u8::try_from(n)
            .map_err(|_| invalid(key.name(), &format!("out of range: {}", n))),
        other => Err(invalid(key.name(), &format!("expected a number, got {:?}", other))),
    }
}

fn expect_name(key: IntentKey, value: IntentValue) -> Result<String> {
    match value {
        IntentValue::Name(name) => Ok(name),
        other => Err(invalid(key.name(), &format!("expected a name, got {:?}", other))),
    }
}

// ============================================================================
// Initial intent policy
// ============================================================================

/// "Device was woken only by our connection" rule
///
/// If the first snapshot after sync shows the device on with `wake_input`
/// selected, send it back to standby on `standby_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeRule {
    pub wake_input: InputKind,
    pub standby_input: InputKind,
}

/// Targets applied after every fresh handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialPolicy {
    /// Default targets; volume and mute are never part of them
    pub defaults: Intent,
    pub wake_rule: Option<WakeRule>,
}

impl InitialPolicy {
    /// Concrete initial intent for the first snapshot after sync
    pub fn expand(&self, observed: &DeviceState) -> Intent {
        let mut intent = Intent {
            volume: None,
            mute: None,
            ..self.defaults.clone()
        };

        if let Some(rule) = self.wake_rule {
            if observed.power && observed.input == rule.wake_input {
                log::info!(
                    "Device powered on at {} after sync, returning it to standby on {}",
                    rule.wake_input,
                    rule.standby_input
                );
                intent.input = Some(rule.standby_input);
                intent.power = Some(false);
            }
        }
        intent
    }
}

impl Default for InitialPolicy {
    fn default() -> Self {
        Self {
            defaults: Intent {
                subwoofer: Some(16),
                surround: Some(SurroundKind::Tv),
                bass_ext: Some(true),
                clearvoice: Some(false),
                ..Intent::default()
            },
            wake_rule: Some(WakeRule {
                wake_input: InputKind::Bluetooth,
                standby_input: InputKind::Hdmi,
            }),
        }
    }
}

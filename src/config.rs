//! Configuration for the yas-link daemon
//!
//! Loads configuration from a TOML file. Every section has defaults, so a
//! partial file (or none at all) is enough to run against the usual
//! `/dev/rfcomm0` binding.

use crate::devices::yas207::constants::*;
use crate::devices::yas207::intent::Intent;
use crate::devices::yas207::state::{InputKind, SurroundKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `device.port`
pub const PORT_ENV_VAR: &str = "CONTROL_DEVICE";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub device: DeviceConfig,
    pub timing: TimingConfig,
    pub defaults: DefaultsConfig,
    pub wake_policy: WakePolicyConfig,
    pub logging: LoggingConfig,
}

/// Serial device configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Serial device node bound to the soundbar
    pub port: String,
    pub baud_rate: u32,
    /// RTS/CTS flow control
    pub hardware_flow_control: bool,
    /// Wait before reopening the port after a transport failure
    pub reconnect_delay_ms: u64,
}

/// Session and worker timing
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Restart the handshake if not synced within this long after a reset
    pub sync_timeout_secs: u64,
    /// Poll status when no reply arrived for this long
    pub status_refresh_secs: u64,
    /// How often the worker runs the timer checks
    pub heartbeat_interval_secs: u64,
    /// Sleep after an iteration that did no work
    pub idle_sleep_ms: u64,
    /// Serial read timeout
    pub read_timeout_ms: u64,
}

/// Targets applied after every handshake
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub subwoofer: u8,
    pub surround: SurroundKind,
    pub bass_ext: bool,
    pub clearvoice: bool,
}

/// Return-to-standby rule for a device that was only woken by the connection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WakePolicyConfig {
    pub enabled: bool,
    /// Input the device comes up on when woken over the link
    pub wake_input: InputKind,
    /// Input to select before returning to standby
    pub standby_input: InputKind,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            hardware_flow_control: true,
            reconnect_delay_ms: RECONNECT_DELAY_MS,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sync_timeout_secs: SYNC_TIMEOUT_SECS,
            status_refresh_secs: STATUS_REFRESH_SECS,
            heartbeat_interval_secs: HEARTBEAT_INTERVAL_SECS,
            idle_sleep_ms: IDLE_SLEEP_MS,
            read_timeout_ms: SERIAL_READ_TIMEOUT_MS,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            subwoofer: 16,
            surround: SurroundKind::Tv,
            bass_ext: true,
            clearvoice: false,
        }
    }
}

impl Default for WakePolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            wake_input: InputKind::Bluetooth,
            standby_input: InputKind::Hdmi,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl DefaultsConfig {
    /// Default targets as an intent
    pub fn to_intent(&self) -> Intent {
        Intent {
            subwoofer: Some(self.subwoofer),
            surround: Some(self.surround),
            bass_ext: Some(self.bass_ext),
            clearvoice: Some(self.clearvoice),
            ..Intent::default()
        }
    }
}

impl DeviceConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

impl TimingConfig {
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.sync_timeout_secs)
    }

    pub fn status_refresh(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use yas_link::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("/etc/yas-link.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `CONTROL_DEVICE` from the environment, if set
    pub fn apply_env_overrides(&mut self) {
        let port = std::env::var(PORT_ENV_VAR).ok();
        self.override_port(port.as_deref());
    }

    fn override_port(&mut self, port: Option<&str>) {
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            log::info!("Using serial port {} from ${}", port, PORT_ENV_VAR);
            self.device.port = port.to_string();
        }
    }

    /// Reject values the link can't run with
    pub fn validate(&self) -> Result<()> {
        if self.device.port.is_empty() {
            return Err(Error::InvalidConfig("device.port is empty".to_string()));
        }
        if self.device.baud_rate == 0 {
            return Err(Error::InvalidConfig("device.baud_rate must be > 0".to_string()));
        }

        let intervals = [
            ("timing.sync_timeout_secs", self.timing.sync_timeout_secs),
            ("timing.status_refresh_secs", self.timing.status_refresh_secs),
            ("timing.heartbeat_interval_secs", self.timing.heartbeat_interval_secs),
            ("timing.read_timeout_ms", self.timing.read_timeout_ms),
        ];
        for (name, value) in intervals {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{} must be > 0", name)));
            }
        }

        self.defaults
            .to_intent()
            .validate()
            .map_err(|e| Error::InvalidConfig(format!("defaults: {}", e)))?;

        const LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(Error::InvalidConfig(format!(
                "logging.level '{}' is not one of {}",
                self.logging.level,
                LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

//! Error types for yas-link

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// yas-link error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Configuration value outside its domain
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Packet text or bytes that cannot be encoded into a frame
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Link is not synced with the device yet
    #[error("Device not ready")]
    NotReady,

    /// Named command not present in the opcode table
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Intent field with an unknown key or out-of-domain value
    #[error("Invalid intent field '{key}': {reason}")]
    InvalidIntentField {
        /// Offending intent key
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures of the underlying byte stream (fatal to the connection)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Serial(_))
    }
}

//! Constants for the YAS-207 serial protocol

// Sync bytes
pub const SYNC_BYTE_1: u8 = 0xCC;
pub const SYNC_BYTE_2: u8 = 0xAA;

// Frame layout
pub const FRAME_HEADER_LEN: usize = 3; // SYNC(2) + LEN(1)
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

// Inbound opcodes (first payload byte)
pub const OP_HANDSHAKE_ACK: u8 = 0x00; // Reply to the handshake follow-up
pub const OP_DEVICE_ID: u8 = 0x04; // Reply to the handshake init
pub const OP_STATUS: u8 = 0x05; // Full device status

// Handshake payloads
pub const HANDSHAKE_INIT: [u8; 9] = [0x01, 0x48, 0x54, 0x53, 0x20, 0x43, 0x6F, 0x6E, 0x74]; // "\x01HTS Cont"
pub const HANDSHAKE_FOLLOWUP: [u8; 3] = [0x02, 0x00, 0x01];
pub const HANDSHAKE_ACK_EXPECTED: [u8; 3] = [0x00, 0x02, 0x00];

// Status payload offsets
pub const OFFSET_POWER: usize = 2;
pub const OFFSET_INPUT: usize = 3;
pub const OFFSET_MUTED: usize = 4;
pub const OFFSET_VOLUME: usize = 5;
pub const OFFSET_SUBWOOFER: usize = 6;
pub const OFFSET_SURROUND: usize = 10; // Big-endian u16 at [10..=11]
pub const OFFSET_FLAGS: usize = 12;
pub const STATUS_PAYLOAD_MIN_SIZE: usize = 13;

// Flag masks (status byte 12)
pub const FLAG_BASS_EXT: u8 = 0x20;
pub const FLAG_CLEARVOICE: u8 = 0x04;

// Input codes
pub const INPUT_HDMI: u8 = 0x00;
pub const INPUT_BLUETOOTH: u8 = 0x05;
pub const INPUT_TV: u8 = 0x07;
pub const INPUT_ANALOG: u8 = 0x0C;

// Surround codes
pub const SURROUND_MOVIE: u16 = 0x0003;
pub const SURROUND_MUSIC: u16 = 0x0008;
pub const SURROUND_SPORTS: u16 = 0x0009;
pub const SURROUND_TV: u16 = 0x000A;
pub const SURROUND_GAME: u16 = 0x000C;
pub const SURROUND_3D: u16 = 0x000D;
pub const SURROUND_STEREO: u16 = 0x0100;

// Value domains
pub const VOLUME_MAX: u8 = 50;
pub const SUBWOOFER_MAX: u8 = 32;
pub const SUBWOOFER_STEP: u8 = 4;

// Timing defaults
pub const SYNC_TIMEOUT_SECS: u64 = 15;
pub const STATUS_REFRESH_SECS: u64 = 30;
pub const HEARTBEAT_INTERVAL_SECS: u64 = 5;
pub const IDLE_SLEEP_MS: u64 = 50;
pub const SERIAL_READ_TIMEOUT_MS: u64 = 10;
pub const RECONNECT_DELAY_MS: u64 = 1000;
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_PORT: &str = "/dev/rfcomm0";

//! Frame encoding for the YAS-207 protocol
//!
//! Wire format: `[0xCC 0xAA] [LEN] [PAYLOAD; LEN] [CSUM]`
//!
//! This module provides:
//! - `checksum`: the one-byte additive checksum shared by TX and RX paths
//! - `RawPacket`: caller-supplied packet in any of the accepted shapes
//! - `encode_payload` / `encode_hex`: frame builders
//!
//! For decoding, use `PacketDecoder` from `protocol.rs`.

use super::constants::{FRAME_HEADER_LEN, MAX_PAYLOAD_LEN, SYNC_BYTE_1, SYNC_BYTE_2};
use crate::error::{Error, Result};
use std::fmt::Write as _;

// ============================================================================
// Checksum - single canonical implementation for the YAS-207 protocol
// ============================================================================

/// YAS-207 checksum: two's-complement negation of `len + sum(payload)`, mod 256
///
/// Linear, not a CRC: raising one payload byte by `d` lowers the checksum by `d`.
///
/// # Example
/// ```
/// use yas_link::devices::yas207::packet::checksum;
///
/// // Status query payload [0x03, 0x05]: -(2 + 3 + 5) = 0xF6
/// assert_eq!(checksum(2, &[0x03, 0x05]), 0xF6);
/// ```
#[inline]
pub fn checksum(len: u8, payload: &[u8]) -> u8 {
    payload
        .iter()
        .fold(len, |acc, &b| acc.wrapping_add(b))
        .wrapping_neg()
}

/// Packet to encode, in one of the shapes callers speak
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPacket {
    /// Fully formed frame (sync, length, payload, checksum), sent as-is
    Frame(Vec<u8>),
    /// Bare payload; sync, length and checksum are added
    Payload(Vec<u8>),
    /// Hex text of either a full frame (`ccaa...`) or a bare payload
    Hex(String),
}

impl RawPacket {
    /// Encode into wire bytes
    ///
    /// Full frames are not validated, so a malformed one will desync the
    /// receiver until its next sync mark.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            RawPacket::Frame(bytes) => Ok(bytes.clone()),
            RawPacket::Payload(payload) => encode_payload(payload),
            RawPacket::Hex(text) => encode_hex(text),
        }
    }
}

impl From<&str> for RawPacket {
    fn from(text: &str) -> Self {
        RawPacket::Hex(text.to_string())
    }
}

impl From<Vec<u8>> for RawPacket {
    fn from(payload: Vec<u8>) -> Self {
        RawPacket::Payload(payload)
    }
}

/// Build a frame around a payload
pub fn encode_payload(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(Error::InvalidEncoding(format!(
            "payload of {} bytes exceeds {} byte limit",
            payload.len(),
            MAX_PAYLOAD_LEN
        )));
    }
    Ok(frame_small(payload))
}

/// Encode hex text: `ccaa...` passes through as a full frame, anything else is a payload
pub fn encode_hex(text: &str) -> Result<Vec<u8>> {
    let bytes = parse_hex(text.trim())?;
    if bytes.len() > 2 && bytes[0] == SYNC_BYTE_1 && bytes[1] == SYNC_BYTE_2 {
        return Ok(bytes);
    }
    encode_payload(&bytes)
}

/// Frame a payload already known to fit the one-byte length field
pub(crate) fn frame_small(payload: &[u8]) -> Vec<u8> {
    debug_assert!(payload.len() <= MAX_PAYLOAD_LEN);
    let len = payload.len() as u8;
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len() + 1);
    frame.push(SYNC_BYTE_1);
    frame.push(SYNC_BYTE_2);
    frame.push(len);
    frame.extend_from_slice(payload);
    frame.push(checksum(len, payload));
    frame
}

/// Parse an even-length, non-empty hex string (either case)
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits = text.as_bytes();
    if digits.is_empty() || digits.len() % 2 != 0 {
        return Err(Error::InvalidEncoding(format!(
            "expected an even-length hex string, got {:?}",
            text
        )));
    }

    digits
        .chunks_exact(2)
        .map(|pair| match (nibble(pair[0]), nibble(pair[1])) {
            (Some(high), Some(low)) => Ok((high << 4) | low),
            _ => Err(Error::InvalidEncoding(format!(
                "non-hex characters in {:?}",
                text
            ))),
        })
        .collect()
}

#[inline]
fn nibble(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|d| d as u8)
}

/// Lowercase hex rendering for log lines
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_status_query() {
        let frame = encode_payload(&[0x03, 0x05]).unwrap();
        assert_eq!(frame, vec![0xCC, 0xAA, 0x02, 0x03, 0x05, 0xF6]);
    }

    #[test]
    fn test_encode_empty_payload() {
        // -(0) = 0
        assert_eq!(encode_payload(&[]).unwrap(), vec![0xCC, 0xAA, 0x00, 0x00]);
    }

    #[test]
    fn test_checksum_matches_formula() {
        for len in 0..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            let sum: i64 = len as i64 + payload.iter().map(|&b| b as i64).sum::<i64>();
            let expected = ((-sum) & 0xFF) as u8;
            assert_eq!(checksum(len as u8, &payload), expected, "len={}", len);
        }
    }

    #[test]
    fn test_checksum_linear_delta() {
        let base = [0x40, 0x78, 0x4A];
        let reference = checksum(3, &base);
        for delta in 1..=255u8 {
            let mut mutated = base;
            mutated[1] = mutated[1].wrapping_add(delta);
            assert_eq!(checksum(3, &mutated), reference.wrapping_sub(delta));
        }
    }

    #[test]
    fn test_hex_payload() {
        let frame = encode_hex("0305").unwrap();
        assert_eq!(frame, vec![0xCC, 0xAA, 0x02, 0x03, 0x05, 0xF6]);

        let upper = encode_hex("40784A").unwrap();
        assert_eq!(upper, vec![0xCC, 0xAA, 0x03, 0x40, 0x78, 0x4A, 0xFB]);
    }

    #[test]
    fn test_hex_full_frame_passthrough() {
        // Bad checksum on purpose: full frames are not validated
        let frame = encode_hex("ccaa020305ff").unwrap();
        assert_eq!(frame, vec![0xCC, 0xAA, 0x02, 0x03, 0x05, 0xFF]);
    }

    #[test]
    fn test_hex_invalid() {
        assert!(matches!(encode_hex("030"), Err(Error::InvalidEncoding(_))));
        assert!(matches!(encode_hex("zz"), Err(Error::InvalidEncoding(_))));
        assert!(matches!(encode_hex(""), Err(Error::InvalidEncoding(_))));
        assert!(matches!(encode_hex("+1"), Err(Error::InvalidEncoding(_))));
    }

    #[test]
    fn test_raw_packet_shapes() {
        let expected = vec![0xCC, 0xAA, 0x02, 0x03, 0x05, 0xF6];
        assert_eq!(RawPacket::Payload(vec![3, 5]).encode().unwrap(), expected);
        assert_eq!(RawPacket::from("0305").encode().unwrap(), expected);
        assert_eq!(RawPacket::Frame(expected.clone()).encode().unwrap(), expected);
    }

    #[test]
    fn test_oversize_payload_rejected() {
        let payload = vec![0u8; 256];
        assert!(matches!(
            encode_payload(&payload),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0xCC, 0xAA, 0x02]), "ccaa02");
        assert_eq!(to_hex(&[]), "");
    }
}

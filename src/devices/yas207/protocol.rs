//! Streaming frame decoder for the YAS-207 protocol
//!
//! The transport gives no delimiters beyond the `0xCC 0xAA` sync mark, so the
//! decoder is a byte-at-a-time state machine that resynchronizes on its own
//! after any lost or corrupted byte:
//!
//! ```text
//! Desync  ──0xCC──▶ SyncMark ──0xAA──▶ Synced ──len>0──▶ Reading
//!   ▲                 │  ▲ 0xCC           │                 │ payload full
//!   │                 │  └───┘            └──len=0──┐       ▼
//!   └──── other ──────┘                             └─▶ VerifyChecksum
//!   ▲                                                       │
//!   └──────────────── deliver or drop ──────────────────────┘
//! ```
//!
//! For sending, use `encode_payload` / `RawPacket` from `packet.rs`.

use super::constants::{SYNC_BYTE_1, SYNC_BYTE_2};
use super::packet::{checksum, to_hex};

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Scanning for the first sync byte
    #[default]
    Desync,
    /// Saw `0xCC`, expecting `0xAA`
    SyncMark,
    /// Sync confirmed, next byte is the payload length
    Synced,
    /// Accumulating payload bytes
    Reading,
    /// Next byte is the checksum
    VerifyChecksum,
}

/// Streaming decoder with one frame of accumulator
#[derive(Debug, Default)]
pub struct PacketDecoder {
    state: DecoderState,
    payload: Vec<u8>,
    expected_len: u8,
}

impl PacketDecoder {
    /// Create a decoder in `Desync`
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state (for diagnostics and tests)
    #[inline]
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Drop any partial frame and return to `Desync`
    pub fn reset(&mut self) {
        self.state = DecoderState::Desync;
        self.payload.clear();
        self.expected_len = 0;
    }

    /// Advance by one byte, returning a payload when a valid frame completes
    pub fn push(&mut self, byte: u8) -> Option<Vec<u8>> {
        match self.state {
            DecoderState::Desync => {
                if byte == SYNC_BYTE_1 {
                    self.state = DecoderState::SyncMark;
                }
            }
            DecoderState::SyncMark => {
                self.state = match byte {
                    SYNC_BYTE_2 => DecoderState::Synced,
                    SYNC_BYTE_1 => DecoderState::SyncMark,
                    _ => DecoderState::Desync,
                };
            }
            DecoderState::Synced => {
                self.payload.clear();
                self.expected_len = byte;
                self.state = if byte > 0 {
                    DecoderState::Reading
                } else {
                    DecoderState::VerifyChecksum
                };
            }
            DecoderState::Reading => {
                self.payload.push(byte);
                if self.payload.len() == self.expected_len as usize {
                    self.state = DecoderState::VerifyChecksum;
                }
            }
            DecoderState::VerifyChecksum => {
                let expected = checksum(self.expected_len, &self.payload);
                let payload = std::mem::take(&mut self.payload);
                self.reset();

                if byte == expected {
                    log::trace!("RX valid frame: {}", to_hex(&payload));
                    return Some(payload);
                }
                log::debug!(
                    "Checksum mismatch: received=0x{:02X}, calculated=0x{:02X}, payload={}",
                    byte,
                    expected,
                    to_hex(&payload)
                );
            }
        }
        None
    }

    /// Feed a chunk of bytes, handing every valid payload to `sink` in order
    pub fn feed<F: FnMut(&[u8])>(&mut self, data: &[u8], mut sink: F) {
        for &byte in data {
            if let Some(payload) = self.push(byte) {
                sink(&payload);
            }
        }
    }

    /// Feed a chunk of bytes and collect the valid payloads
    pub fn decode(&mut self, data: &[u8]) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        self.feed(data, |payload| packets.push(payload.to_vec()));
        packets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::yas207::packet::encode_payload;
    use rand::prelude::*;

    fn random_noise(rng: &mut StdRng) -> Vec<u8> {
        let len = rng.random_range(0..=32);
        (0..len)
            .map(|_| loop {
                let byte: u8 = rng.random();
                if byte != SYNC_BYTE_1 {
                    break byte;
                }
            })
            .collect()
    }

    fn random_payload(rng: &mut StdRng) -> Vec<u8> {
        let len = rng.random_range(0..=24);
        (0..len).map(|_| rng.random()).collect()
    }

    #[test]
    fn test_decode_set_input_hdmi_echo() {
        let mut decoder = PacketDecoder::new();
        let packets = decoder.decode(&[0xCC, 0xAA, 0x03, 0x40, 0x78, 0x4A, 0xFB]);
        assert_eq!(packets, vec![vec![0x40, 0x78, 0x4A]]);
        assert_eq!(decoder.state(), DecoderState::Desync);
    }

    #[test]
    fn test_round_trip_byte_at_a_time() {
        let mut decoder = PacketDecoder::new();
        for len in 0..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(7)).collect();
            let frame = encode_payload(&payload).unwrap();

            let mut delivered = Vec::new();
            for &byte in &frame {
                if let Some(p) = decoder.push(byte) {
                    delivered.push(p);
                }
            }
            assert_eq!(delivered, vec![payload], "len={}", len);
        }
    }

    #[test]
    fn test_empty_payload_frame() {
        let mut decoder = PacketDecoder::new();
        assert_eq!(decoder.decode(&[0xCC, 0xAA, 0x00, 0x00]), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn test_resync_through_noise() {
        let first = encode_payload(&[0x05, 0x00, 0x01]).unwrap();
        let second = encode_payload(&[0x04, 0x00, 0x01, 0x32]).unwrap();

        let mut stream = vec![0x13, 0x37, 0xCC, 0x01, 0xAA, 0xFF];
        stream.extend_from_slice(&first);
        stream.extend_from_slice(&[0x00, 0xCC, 0x42, 0x99]);
        stream.extend_from_slice(&second);
        stream.extend_from_slice(&[0xAA, 0x10]);

        let mut decoder = PacketDecoder::new();
        let packets = decoder.decode(&stream);
        assert_eq!(packets, vec![vec![0x05, 0x00, 0x01], vec![0x04, 0x00, 0x01, 0x32]]);
    }

    #[test]
    fn test_resync_through_random_noise() {
        let mut rng = StdRng::seed_from_u64(0x5A5_207);
        for _ in 0..500 {
            let first = random_payload(&mut rng);
            let second = random_payload(&mut rng);

            let mut stream = random_noise(&mut rng);
            stream.extend(encode_payload(&first).unwrap());
            stream.extend(random_noise(&mut rng));
            stream.extend(encode_payload(&second).unwrap());

            let mut cuts: Vec<usize> = (0..rng.random_range(0..6))
                .map(|_| rng.random_range(0..=stream.len()))
                .collect();
            cuts.sort_unstable();

            let mut decoder = PacketDecoder::new();
            let mut packets = Vec::new();
            let mut start = 0;
            for cut in cuts.into_iter().chain(std::iter::once(stream.len())) {
                packets.extend(decoder.decode(&stream[start..cut]));
                start = cut;
            }
            assert_eq!(packets, vec![first, second], "stream {}", to_hex(&stream));
        }
    }

    #[test]
    fn test_repeated_sync_byte_rearms() {
        let mut decoder = PacketDecoder::new();
        let packets = decoder.decode(&[0xCC, 0xCC, 0xCC, 0xAA, 0x02, 0x03, 0x05, 0xF6]);
        assert_eq!(packets, vec![vec![0x03, 0x05]]);
    }

    #[test]
    fn test_bad_checksum_dropped() {
        let mut decoder = PacketDecoder::new();
        let mut frame = encode_payload(&[0x40, 0x78, 0x4A]).unwrap();
        *frame.last_mut().unwrap() ^= 0x01;

        assert!(decoder.decode(&frame).is_empty());
        assert_eq!(decoder.state(), DecoderState::Desync);

        // Decoder recovers on the next frame
        let good = encode_payload(&[0x03, 0x05]).unwrap();
        assert_eq!(decoder.decode(&good), vec![vec![0x03, 0x05]]);
    }

    #[test]
    fn test_split_across_chunks() {
        let frame = encode_payload(&[0x00, 0x02, 0x00]).unwrap();
        let mut decoder = PacketDecoder::new();
        assert!(decoder.decode(&frame[..2]).is_empty());
        assert_eq!(decoder.state(), DecoderState::Synced);
        assert!(decoder.decode(&frame[2..5]).is_empty());
        assert_eq!(decoder.state(), DecoderState::Reading);
        assert_eq!(decoder.decode(&frame[5..]), vec![vec![0x00, 0x02, 0x00]]);
    }

    #[test]
    fn test_short_frame_never_delivered() {
        // Declares 4 payload bytes but the stream stops after 3 + a would-be checksum
        let mut decoder = PacketDecoder::new();
        let packets = decoder.decode(&[0xCC, 0xAA, 0x04, 0x03, 0x05, 0x00, 0xF2]);
        assert!(packets.is_empty());
        assert_eq!(decoder.state(), DecoderState::VerifyChecksum);

        decoder.reset();
        assert_eq!(decoder.state(), DecoderState::Desync);
    }
}

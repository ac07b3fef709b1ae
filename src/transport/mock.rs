//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

/// In-memory transport
///
/// Clones share the same buffers: hand one to the worker and keep one in
/// the test to play the device side.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Default)]
struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    fail_next_read: Option<io::ErrorKind>,
    max_read: Option<usize>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        self.inner.lock().read_buffer.extend(data);
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        self.inner.lock().write_buffer.clone()
    }

    /// Get and clear written data
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.inner.lock().write_buffer)
    }

    /// Make the next read fail with the given I/O error kind
    pub fn fail_next_read(&self, kind: io::ErrorKind) {
        self.inner.lock().fail_next_read = Some(kind);
    }

    /// Cap how many bytes a single read returns
    pub fn set_max_read(&self, max: usize) {
        self.inner.lock().max_read = Some(max);
    }

    /// Bytes injected but not read yet
    pub fn pending_read(&self) -> usize {
        self.inner.lock().read_buffer.len()
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock();
        if let Some(kind) = inner.fail_next_read.take() {
            return Err(io::Error::new(kind, "injected read failure").into());
        }

        let limit = inner.max_read.unwrap_or(usize::MAX);
        let available = inner.read_buffer.len().min(buffer.len()).min(limit);
        for (slot, byte) in buffer.iter_mut().zip(inner.read_buffer.drain(..available)) {
            *slot = byte;
        }
        Ok(available)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.inner.lock().write_buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_respects_buffer_and_cap() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();
        mock.inject_read(&[1, 2, 3, 4, 5]);
        mock.set_max_read(2);

        let mut buf = [0u8; 8];
        assert_eq!(transport.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], &[1, 2]);
        assert_eq!(mock.pending_read(), 3);
    }

    #[test]
    fn test_write_all_and_take() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();
        transport.write_all(&[0xCC, 0xAA, 0x00, 0x00]).unwrap();
        assert_eq!(mock.take_written(), vec![0xCC, 0xAA, 0x00, 0x00]);
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn test_injected_failure_is_one_shot() {
        let mock = MockTransport::new();
        let mut transport = mock.clone();
        mock.fail_next_read(io::ErrorKind::BrokenPipe);

        let mut buf = [0u8; 4];
        let err = transport.read(&mut buf).unwrap_err();
        assert!(err.is_transport());
        assert_eq!(transport.read(&mut buf).unwrap(), 0);
    }
}

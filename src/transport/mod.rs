//! Transport layer for I/O abstraction

use crate::error::Result;

#[cfg(any(test, feature = "mock"))]
mod mock;
mod serial;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Byte stream to the soundbar
pub trait Transport: Send {
    /// Read available bytes into buffer, returns number of bytes read
    ///
    /// Returns `Ok(0)` when the read timed out with nothing available.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Write a whole frame, retrying short writes
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into());
            }
            data = &data[n..];
        }
        Ok(())
    }
}

// Byte transport consumed by the CI-V engine

use super::comm::Result;

/// Half-duplex byte link to a transceiver.
///
/// Every call is bounded by the transport's configured timeout. Callers
/// issue one exchange at a time; implementations need not be reentrant.
#[allow(async_fn_in_trait)]
pub trait Transport: Send {
    /// Write the whole buffer
    async fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Read bytes up to and including the next `terminator`.
    ///
    /// Returns `SerialError::Timeout` if the terminator does not arrive in time.
    async fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>>;

    /// Configured line speed, used to size the power-on wake preamble
    fn baud_rate(&self) -> u32;

    /// Release the underlying link. Further I/O fails with `SerialError::NotOpen`.
    fn close(&mut self) -> Result<()>;
}

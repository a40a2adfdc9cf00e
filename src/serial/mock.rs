// Mock transport for testing without hardware

use super::comm::{Result, SerialError};
use super::transport::Transport;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted in-memory transport.
///
/// Clones share buffers, so a test can keep a handle after moving the
/// transport into an engine and inspect what was written.
#[derive(Clone)]
pub struct MockTransport {
    /// Bytes available to `read_until` (simulates the receive line)
    read_buffer: Arc<Mutex<VecDeque<u8>>>,

    /// Everything passed to `write_all`
    write_buffer: Arc<Mutex<Vec<u8>>>,

    /// Replies released one per write, after any echo
    responses: Arc<Mutex<VecDeque<Vec<u8>>>>,

    /// Loop written bytes back onto the receive line
    echo: bool,

    fail_writes: bool,

    closed: Arc<Mutex<bool>>,

    baud_rate: u32,

    timeout: Duration,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            read_buffer: Arc::new(Mutex::new(VecDeque::new())),
            write_buffer: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            echo: false,
            fail_writes: false,
            closed: Arc::new(Mutex::new(false)),
            baud_rate: 19200,
            timeout: Duration::from_secs(1),
        }
    }

    /// Emulate a cable that echoes transmitted bytes
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Make every write fail with a broken pipe
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Push data to be read immediately
    pub fn push_read_data(&self, data: &[u8]) {
        self.read_buffer.lock().unwrap().extend(data.iter().copied());
    }

    /// Queue a reply that becomes readable after the next write
    pub fn queue_response(&self, data: &[u8]) {
        self.responses.lock().unwrap().push_back(data.to_vec());
    }

    pub fn get_written_data(&self) -> Vec<u8> {
        self.write_buffer.lock().unwrap().clone()
    }

    pub fn clear_written_data(&self) {
        self.write_buffer.lock().unwrap().clear();
    }

    /// Check if a specific byte sequence was written
    pub fn was_written(&self, expected: &[u8]) -> bool {
        let buffer = self.write_buffer.lock().unwrap();
        buffer
            .windows(expected.len())
            .any(|window| window == expected)
    }

    pub fn bytes_available(&self) -> usize {
        self.read_buffer.lock().unwrap().len()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(SerialError::NotOpen);
        }
        if self.fail_writes {
            return Err(SerialError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }

        self.write_buffer.lock().unwrap().extend_from_slice(buf);

        let mut read_buffer = self.read_buffer.lock().unwrap();
        if self.echo {
            read_buffer.extend(buf.iter().copied());
        }
        if let Some(response) = self.responses.lock().unwrap().pop_front() {
            read_buffer.extend(response);
        }
        Ok(())
    }

    async fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>> {
        if self.is_closed() {
            return Err(SerialError::NotOpen);
        }

        let mut buffer = self.read_buffer.lock().unwrap();
        match buffer.iter().position(|&b| b == terminator) {
            Some(pos) => Ok(buffer.drain(..=pos).collect()),
            None => {
                // Partial bytes are consumed before the deadline passes
                buffer.clear();
                Err(SerialError::Timeout(self.timeout))
            }
        }
    }

    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn close(&mut self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_read_until() {
        let mut port = MockTransport::new();
        port.push_read_data(&[0x01, 0xFD, 0x02, 0x03, 0xFD]);

        assert_eq!(port.read_until(0xFD).await.unwrap(), vec![0x01, 0xFD]);
        assert_eq!(port.read_until(0xFD).await.unwrap(), vec![0x02, 0x03, 0xFD]);
        assert!(matches!(
            port.read_until(0xFD).await,
            Err(SerialError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_partial_read_times_out() {
        let mut port = MockTransport::new();
        port.push_read_data(&[0xFE, 0xFE, 0xE0]);

        assert!(matches!(
            port.read_until(0xFD).await,
            Err(SerialError::Timeout(_))
        ));
        assert_eq!(port.bytes_available(), 0);
    }

    #[tokio::test]
    async fn test_mock_echo_then_response() {
        let mut port = MockTransport::new().with_echo();
        port.queue_response(&[0xAA, 0xFD]);

        port.write_all(&[0x01, 0xFD]).await.unwrap();
        assert_eq!(port.read_until(0xFD).await.unwrap(), vec![0x01, 0xFD]);
        assert_eq!(port.read_until(0xFD).await.unwrap(), vec![0xAA, 0xFD]);
        assert!(port.was_written(&[0x01, 0xFD]));
    }

    #[tokio::test]
    async fn test_mock_shared_buffers_and_close() {
        let handle = MockTransport::new();
        let mut port = handle.clone();

        port.write_all(b"CMD").await.unwrap();
        assert_eq!(handle.get_written_data(), b"CMD");

        port.close().unwrap();
        assert!(handle.is_closed());
        assert!(matches!(
            port.write_all(b"X").await,
            Err(SerialError::NotOpen)
        ));
    }

    #[tokio::test]
    async fn test_mock_failing_writes() {
        let mut port = MockTransport::new().with_failing_writes();
        assert!(matches!(
            port.write_all(&[0x00]).await,
            Err(SerialError::Io(_))
        ));
        assert!(port.get_written_data().is_empty());
    }
}

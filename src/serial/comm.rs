// Serial port transport with async support
// Wraps the serialport crate with tokio timeouts

use super::transport::Transport;
use std::io::{self, Read, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

#[derive(Error, Debug)]
pub enum SerialError {
    #[error("Serial port error: {0}")]
    Port(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Port not open")]
    NotOpen,

    #[error("No terminator within {0} bytes")]
    FrameTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, SerialError>;

/// Longest run of bytes accepted while waiting for a terminator
pub const MAX_FRAME_LEN: usize = 1024;

/// Blocking read slice; the tokio timeout bounds the whole operation
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Line settings for a CI-V serial link
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed; also sizes the power-on wake preamble
    pub baud_rate: u32,

    pub data_bits: serialport::DataBits,

    pub stop_bits: serialport::StopBits,

    pub parity: serialport::Parity,

    pub flow_control: serialport::FlowControl,

    /// Bound on each write and each terminator-delimited read
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 19200,
            data_bits: serialport::DataBits::Eight,
            stop_bits: serialport::StopBits::One,
            parity: serialport::Parity::None,
            flow_control: serialport::FlowControl::None,
            timeout: Duration::from_secs(1),
        }
    }
}

impl SerialConfig {
    /// 8N1 without flow control at `baud_rate`
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set hardware flow control (RTS/CTS)
    pub fn with_hardware_flow(mut self) -> Self {
        self.flow_control = serialport::FlowControl::Hardware;
        self
    }
}

/// Serial link to one transceiver
pub struct SerialPort {
    port: Option<Box<dyn serialport::SerialPort>>,
    config: SerialConfig,
    port_name: String,
}

impl SerialPort {
    /// Open a serial port with the given configuration
    pub fn open(port_name: &str, config: SerialConfig) -> Result<Self> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits)
            .stop_bits(config.stop_bits)
            .parity(config.parity)
            .flow_control(config.flow_control)
            .timeout(POLL_INTERVAL)
            .open()
            .map_err(|e| SerialError::Port(e.to_string()))?;

        tracing::info!(
            "Opened {} at {} bps (timeout {:?})",
            port_name,
            config.baud_rate,
            config.timeout
        );

        Ok(Self {
            port: Some(port),
            config,
            port_name: port_name.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Read until `terminator` (inclusive) with timeout
    pub async fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>> {
        let limit = self.config.timeout;
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(limit, async {
            let mut data = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                match port.read(&mut byte) {
                    Ok(0) => {
                        return Err(SerialError::Io(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "Port closed",
                        )))
                    }
                    Ok(_) => {
                        data.push(byte[0]);
                        if byte[0] == terminator {
                            return Ok(data);
                        }
                        if data.len() >= MAX_FRAME_LEN {
                            return Err(SerialError::FrameTooLarge(MAX_FRAME_LEN));
                        }
                    }
                    Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {
                        tokio::time::sleep(POLL_INTERVAL).await;
                    }
                    Err(e) => return Err(SerialError::Io(e)),
                }
            }
        })
        .await
        .map_err(|_| SerialError::Timeout(limit))?
    }

    /// Write all bytes with timeout
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let limit = self.config.timeout;
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;

        timeout(limit, async {
            port.write_all(buf)?;
            port.flush().map_err(SerialError::Io)
        })
        .await
        .map_err(|_| SerialError::Timeout(limit))?
    }

    pub fn flush(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.flush().map_err(SerialError::Io)
    }

    /// Drop anything already sitting in the input buffer
    pub fn clear_input(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or(SerialError::NotOpen)?;
        port.clear(serialport::ClearBuffer::Input)
            .map_err(|e| SerialError::Port(e.to_string()))
    }

    pub fn close(&mut self) -> Result<()> {
        if self.port.take().is_some() {
            tracing::info!("Closed {}", self.port_name);
        }
        Ok(())
    }
}

impl Transport for SerialPort {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        SerialPort::write_all(self, buf).await
    }

    async fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>> {
        SerialPort::read_until(self, terminator).await
    }

    fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }

    fn close(&mut self) -> Result<()> {
        SerialPort::close(self)
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<String>> {
    serialport::available_ports()
        .map_err(|e| SerialError::Port(e.to_string()))
        .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_config() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.data_bits, serialport::DataBits::Eight);
        assert_eq!(config.timeout, Duration::from_secs(1));

        let config = SerialConfig::new(115200)
            .with_timeout(Duration::from_millis(250))
            .with_hardware_flow();
        assert_eq!(config.baud_rate, 115200);
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.flow_control, serialport::FlowControl::Hardware);
    }

    #[test]
    fn test_open_missing_port() {
        let result = SerialPort::open("/dev/civ-rs-no-such-port", SerialConfig::default());
        assert!(matches!(result, Err(SerialError::Port(_))));
    }

    #[test]
    fn test_list_ports() {
        // This should not fail even if no ports are available
        let result = list_ports();
        assert!(result.is_ok());
    }
}

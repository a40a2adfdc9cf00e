// Byte transports for CI-V sessions
pub mod comm;
pub mod fake;
pub mod transport;

#[cfg(test)]
pub mod mock;

pub use comm::{list_ports, SerialConfig, SerialError, SerialPort};
pub use fake::FakeTransceiver;
pub use transport::Transport;

// Icom CI-V protocol: framing, transaction engine and command catalog
pub mod commands;
pub mod engine;
pub mod error;
pub mod frame;
pub mod reply;
pub mod types;

pub use commands::{CommandSpec, PayloadEncoding, ReplyDecoding, ScanMode, Value, VfoOperation};
pub use engine::{CivEngine, TransactionState};
pub use error::{ErrorKind, RadioError, RadioResult};
pub use frame::{build_frame, wake_preamble};
pub use reply::{Reply, ReplyStatus};
pub use types::{Address, CommandCode};

/// Sync byte; two open every frame and extra ones form the wake preamble
pub const PREAMBLE: u8 = 0xFE;

/// End-of-frame byte
pub const TERMINATOR: u8 = 0xFD;

/// Positive acknowledgement body
pub const OK: u8 = 0xFB;

/// Negative acknowledgement ("not good") body
pub const NG: u8 = 0xFA;

/// Shortest reply accepted as a real answer rather than a link failure
pub const MIN_REPLY_LEN: usize = 3;

/// Render bytes as space-separated upper-case hex for logs and errors
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

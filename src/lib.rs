// CIV-RS: async Icom CI-V transceiver control
// Copyright 2024 - Licensed under GPLv3

pub mod civ;
pub mod codec;
pub mod config;
pub mod drivers;
pub mod serial;

// Re-export commonly used types
pub use civ::{
    Address, CivEngine, CommandCode, CommandSpec, ErrorKind, RadioError, RadioResult, Reply,
    ReplyStatus, TransactionState, Value,
};
pub use codec::{decode2, level_percent, Measurement, MeterScale, MeterUnit};
pub use config::{CivConfig, ConfigError};
pub use drivers::{
    init_drivers, list_models, lookup_model, register_model, DeviceModel, Filter, OperatingMode,
    Transceiver,
};
pub use serial::{FakeTransceiver, SerialConfig, SerialPort, Transport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

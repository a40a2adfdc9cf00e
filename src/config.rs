// Session configuration loaded from JSON

use crate::civ::error::RadioError;
use crate::civ::types::Address;
use crate::drivers::model::DeviceModel;
use crate::drivers::{builtin_models, generic, register_model};
use crate::serial::SerialConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] RadioError),

    #[error("Model {0} would replace a built-in model")]
    DuplicateModel(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One transceiver session.
///
/// ```json
/// { "port": "/dev/ttyUSB0", "baud_rate": 19200, "address": "0x94", "model": "IC-7300" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CivConfig {
    /// Serial device path; unused with `fake`
    pub port: String,

    pub baud_rate: u32,

    /// Bound on each write and each reply read
    pub timeout_ms: u64,

    /// Transceiver address as hex text; the model's default when absent
    pub address: Option<String>,

    /// Controller address as hex text
    pub controller_address: String,

    /// Device model id
    pub model: String,

    /// Talk to the built-in simulated transceiver instead of a serial port
    pub fake: bool,

    /// Extra models, made available by `register_models`
    pub models: Vec<DeviceModel>,
}

impl Default for CivConfig {
    fn default() -> Self {
        let serial = SerialConfig::default();
        Self {
            port: String::new(),
            baud_rate: serial.baud_rate,
            timeout_ms: serial.timeout.as_millis() as u64,
            address: None,
            controller_address: Address::CONTROLLER.to_string(),
            model: generic::ID.to_string(),
            fake: false,
            models: Vec::new(),
        }
    }
}

impl CivConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CivConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse both addresses and check model ids so mistakes are reported at load time
    fn validate(&self) -> Result<()> {
        self.transceiver_address()?;
        self.controller_address()?;

        let builtin = builtin_models();
        for model in &self.models {
            if builtin.iter().any(|b| b.id.eq_ignore_ascii_case(&model.id)) {
                return Err(ConfigError::DuplicateModel(model.id.clone()));
            }
        }
        Ok(())
    }

    /// Add the configured models to the global registry.
    ///
    /// Call after `init_drivers` and before looking up `model`.
    pub fn register_models(&self) -> Result<()> {
        self.validate()?;
        for model in &self.models {
            tracing::info!("Registering configured model {}", model.id);
            register_model(model.clone());
        }
        Ok(())
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig::new(self.baud_rate).with_timeout(Duration::from_millis(self.timeout_ms))
    }

    /// Configured transceiver address, if any
    pub fn transceiver_address(&self) -> Result<Option<Address>> {
        self.address
            .as_deref()
            .map(Address::parse)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn controller_address(&self) -> Result<Address> {
        Ok(Address::parse(&self.controller_address)?)
    }
}

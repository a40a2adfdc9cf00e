// Addressing and command identifiers used on the CI-V bus

use super::error::{RadioError, RadioResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static::lazy_static! {
    static ref HEX_ADDRESS: regex::Regex =
        regex::Regex::new(r"^\s*0[xX]([0-9A-Fa-f]{1,2})\s*$").expect("address pattern is valid");
}

/// One-byte CI-V bus address
///
/// Addresses are configured as hexadecimal text (`"0x94"`) and parsed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(u8);

impl Address {
    /// Default PC controller address
    pub const CONTROLLER: Address = Address(0xE0);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Parse hexadecimal text such as `"0x94"`
    pub fn parse(text: &str) -> RadioResult<Self> {
        let digits = HEX_ADDRESS
            .captures(text)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| RadioError::InvalidAddress(text.to_string()))?;

        u8::from_str_radix(digits.as_str(), 16)
            .map(Address)
            .map_err(|_| RadioError::InvalidAddress(text.to_string()))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl FromStr for Address {
    type Err = RadioError;

    fn from_str(s: &str) -> RadioResult<Self> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = RadioError;

    fn try_from(value: String) -> RadioResult<Self> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Command byte with an optional sub-command byte
///
/// The shape guarantees the wire length is always 1 or 2 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandCode {
    pub cmd: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<u8>,
}

impl CommandCode {
    pub const fn cmd(cmd: u8) -> Self {
        Self { cmd, sub: None }
    }

    pub const fn sub(cmd: u8, sub: u8) -> Self {
        Self {
            cmd,
            sub: Some(sub),
        }
    }

    pub fn len(&self) -> usize {
        1 + self.sub.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.cmd];
        bytes.extend(self.sub);
        bytes
    }

    /// True if `bytes` begins with this command (and sub-command)
    pub fn is_prefix_of(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(&self.to_bytes())
    }
}

impl TryFrom<&[u8]> for CommandCode {
    type Error = RadioError;

    fn try_from(bytes: &[u8]) -> RadioResult<Self> {
        match *bytes {
            [cmd] => Ok(CommandCode::cmd(cmd)),
            [cmd, sub] => Ok(CommandCode::sub(cmd, sub)),
            _ => Err(RadioError::InvalidCommand(format!(
                "command must be 1 or 2 bytes, got {}",
                bytes.len()
            ))),
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.cmd)?;
        if let Some(sub) = self.sub {
            write!(f, " 0x{:02X}", sub)?;
        }
        Ok(())
    }
}

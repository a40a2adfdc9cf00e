// Per-model capability descriptor consulted by the CI-V engine

use crate::civ::error::{RadioError, RadioResult};
use crate::civ::types::{Address, CommandCode};
use crate::codec::meter::{Measurement, MeterScale};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating modes reported by CI-V command 0x04
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatingMode {
    #[serde(rename = "LSB")]
    Lsb,
    #[serde(rename = "USB")]
    Usb,
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "CW")]
    Cw,
    #[serde(rename = "RTTY")]
    Rtty,
    #[serde(rename = "FM")]
    Fm,
    #[serde(rename = "NFM")]
    Nfm,
    #[serde(rename = "WFM")]
    Wfm,
    #[serde(rename = "CW-R")]
    Cwr,
    #[serde(rename = "RTTY-R")]
    RttyR,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperatingMode::Lsb => "LSB",
            OperatingMode::Usb => "USB",
            OperatingMode::Am => "AM",
            OperatingMode::Cw => "CW",
            OperatingMode::Rtty => "RTTY",
            OperatingMode::Fm => "FM",
            OperatingMode::Nfm => "NFM",
            OperatingMode::Wfm => "WFM",
            OperatingMode::Cwr => "CW-R",
            OperatingMode::RttyR => "RTTY-R",
        };
        f.write_str(label)
    }
}

/// IF filter selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    #[serde(rename = "FIL1")]
    Fil1,
    #[serde(rename = "FIL2")]
    Fil2,
    #[serde(rename = "FIL3")]
    Fil3,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Filter::Fil1 => "FIL1",
            Filter::Fil2 => "FIL2",
            Filter::Fil3 => "FIL3",
        };
        f.write_str(label)
    }
}

/// Immutable description of one transceiver model.
///
/// Built once at startup and shared read-only (behind an `Arc`) by every
/// transaction of a device session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceModel {
    /// Registry key (e.g. "IC-7300")
    pub id: String,

    pub description: String,

    /// Factory-default transceiver address
    pub default_address: Address,

    #[serde(default = "default_controller")]
    pub controller_address: Address,

    /// Inclusive (min, max) transmit frequency in Hz
    pub frequency_range: (u32, u32),

    /// Commands the model accepts; anything else is refused before framing
    pub commands: Vec<CommandCode>,

    /// Mode code -> mode
    pub modes: Vec<(u8, OperatingMode)>,

    /// Filter code -> filter
    pub filters: Vec<(u8, Filter)>,

    /// Accepted reply body lengths (command echo plus data) for commands
    /// whose replies have a fixed shape. A command may be listed more than once.
    #[serde(default)]
    pub body_lengths: Vec<(CommandCode, usize)>,

    /// Calibration of raw meter readings, by meter command
    #[serde(default)]
    pub meter_scales: Vec<(CommandCode, MeterScale)>,
}

fn default_controller() -> Address {
    Address::CONTROLLER
}

impl DeviceModel {
    pub fn supports(&self, command: &CommandCode) -> bool {
        self.commands.contains(command)
    }

    /// Refuse commands outside the supported set
    pub fn validate(&self, command: &CommandCode, _payload: &[u8]) -> RadioResult<()> {
        if self.supports(command) {
            Ok(())
        } else {
            Err(RadioError::UnsupportedCommand {
                model: self.id.clone(),
                command: *command,
            })
        }
    }

    pub fn check_frequency(&self, hz: u32) -> RadioResult<()> {
        let (min, max) = self.frequency_range;
        if (min..=max).contains(&hz) {
            Ok(())
        } else {
            Err(RadioError::OutOfRange {
                value: hz as u64,
                min: min as u64,
                max: max as u64,
            })
        }
    }

    pub fn decode_mode(&self, code: u8) -> RadioResult<OperatingMode> {
        lookup_by_code(&self.modes, code).ok_or_else(|| {
            RadioError::UnknownMode(format!("mode code {:#04x} not in {} table", code, self.id))
        })
    }

    pub fn encode_mode(&self, mode: OperatingMode) -> RadioResult<u8> {
        lookup_by_value(&self.modes, mode).ok_or_else(|| {
            RadioError::UnknownMode(format!("mode {} not supported by {}", mode, self.id))
        })
    }

    pub fn decode_filter(&self, code: u8) -> RadioResult<Filter> {
        lookup_by_code(&self.filters, code).ok_or_else(|| {
            RadioError::UnknownMode(format!("filter code {:#04x} not in {} table", code, self.id))
        })
    }

    pub fn encode_filter(&self, filter: Filter) -> RadioResult<u8> {
        lookup_by_value(&self.filters, filter).ok_or_else(|| {
            RadioError::UnknownMode(format!("filter {} not supported by {}", filter, self.id))
        })
    }

    /// Accepted body lengths for `command`; empty when unconstrained
    pub fn expected_body_lens(&self, command: &CommandCode) -> Vec<usize> {
        self.body_lengths
            .iter()
            .filter(|(code, _)| code == command)
            .map(|(_, len)| *len)
            .collect()
    }

    /// Check the body of an OK data reply against the model's table
    pub fn check_body_len(&self, command: &CommandCode, len: usize) -> RadioResult<()> {
        let expected = self.expected_body_lens(command);
        if expected.is_empty() || expected.contains(&len) {
            Ok(())
        } else {
            Err(RadioError::MalformedReply(format!(
                "{} reply body to {} is {} bytes, expected {:?}",
                self.id, command, len, expected
            )))
        }
    }

    pub fn meter_scale(&self, command: &CommandCode) -> Option<&MeterScale> {
        self.meter_scales
            .iter()
            .find(|(code, _)| code == command)
            .map(|(_, scale)| scale)
    }

    /// Convert a raw reading of `command`'s meter, falling back to 0-100 %
    pub fn scale_meter(&self, command: &CommandCode, raw: u16) -> Measurement {
        match self.meter_scale(command) {
            Some(scale) => scale.convert(raw),
            None => MeterScale::percent().convert(raw),
        }
    }
}

fn lookup_by_code<V: Copy>(table: &[(u8, V)], code: u8) -> Option<V> {
    table.iter().find(|(c, _)| *c == code).map(|(_, v)| *v)
}

fn lookup_by_value<V: PartialEq>(table: &[(u8, V)], value: V) -> Option<u8> {
    table.iter().find(|(_, v)| *v == value).map(|(c, _)| *c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civ::error::ErrorKind;
    use crate::codec::meter::MeterUnit;

    fn sample() -> DeviceModel {
        DeviceModel {
            id: "TEST".to_string(),
            description: "Test radio".to_string(),
            default_address: Address::new(0x94),
            controller_address: Address::CONTROLLER,
            frequency_range: (30_000, 60_000_000),
            commands: vec![CommandCode::cmd(0x03), CommandCode::sub(0x15, 0x02)],
            modes: vec![(0x00, OperatingMode::Lsb), (0x01, OperatingMode::Usb)],
            filters: vec![(0x01, Filter::Fil1)],
            body_lengths: vec![
                (CommandCode::cmd(0x03), 6),
                (CommandCode::cmd(0x04), 2),
                (CommandCode::cmd(0x04), 3),
            ],
            meter_scales: vec![(
                CommandCode::sub(0x15, 0x15),
                MeterScale::new(MeterUnit::Volt, &[(0, 0.0), (13, 10.0), (241, 16.0)]),
            )],
        }
    }

    #[test]
    fn test_validate() {
        let model = sample();
        assert!(model.validate(&CommandCode::cmd(0x03), &[]).is_ok());
        assert!(model.validate(&CommandCode::sub(0x15, 0x02), &[]).is_ok());

        let err = model.validate(&CommandCode::sub(0x15, 0x01), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCommand);
        let err = model.validate(&CommandCode::cmd(0x15), &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedCommand);
    }

    #[test]
    fn test_frequency_bounds() {
        let model = sample();
        assert!(model.check_frequency(30_000).is_ok());
        assert!(model.check_frequency(60_000_000).is_ok());
        assert_eq!(
            model.check_frequency(29_999).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(
            model.check_frequency(60_000_001).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
    }

    #[test]
    fn test_mode_tables() {
        let model = sample();
        assert_eq!(model.decode_mode(0x01).unwrap(), OperatingMode::Usb);
        assert_eq!(model.encode_mode(OperatingMode::Lsb).unwrap(), 0x00);
        assert_eq!(model.decode_filter(0x01).unwrap(), Filter::Fil1);

        assert_eq!(model.decode_mode(0x05).unwrap_err().kind(), ErrorKind::UnknownMode);
        assert_eq!(
            model.encode_mode(OperatingMode::Fm).unwrap_err().kind(),
            ErrorKind::UnknownMode
        );
        assert_eq!(model.decode_filter(0x03).unwrap_err().kind(), ErrorKind::UnknownMode);
        assert_eq!(
            model.encode_filter(Filter::Fil2).unwrap_err().kind(),
            ErrorKind::UnknownMode
        );
    }

    #[test]
    fn test_body_lengths() {
        let model = sample();
        assert_eq!(model.expected_body_lens(&CommandCode::cmd(0x03)), vec![6]);
        assert!(model.check_body_len(&CommandCode::cmd(0x03), 6).is_ok());
        assert_eq!(
            model
                .check_body_len(&CommandCode::cmd(0x03), 7)
                .unwrap_err()
                .kind(),
            ErrorKind::MalformedReply
        );
        // Mode with or without the filter byte
        assert!(model.check_body_len(&CommandCode::cmd(0x04), 2).is_ok());
        assert!(model.check_body_len(&CommandCode::cmd(0x04), 3).is_ok());
        assert!(model.check_body_len(&CommandCode::cmd(0x04), 4).is_err());
        // No table entry means no length constraint
        assert!(model.check_body_len(&CommandCode::sub(0x15, 0x02), 42).is_ok());
    }

    #[test]
    fn test_meter_scales() {
        let model = sample();
        let vd = model.scale_meter(&CommandCode::sub(0x15, 0x15), 13);
        assert_eq!(vd.unit, MeterUnit::Volt);
        assert_eq!(vd.value, 10.0);

        let raw = model.scale_meter(&CommandCode::sub(0x15, 0x02), 255);
        assert_eq!(raw.unit, MeterUnit::Percent);
        assert_eq!(raw.value, 100.0);
    }

    #[test]
    fn test_model_json_round_trip() {
        let model = sample();
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"default_address\":\"0x94\""));
        assert!(json.contains("\"USB\""));

        let back: DeviceModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_model_json_defaults() {
        let json = r#"{
            "id": "CUSTOM",
            "description": "Custom radio",
            "default_address": "0x70",
            "frequency_range": [100000, 30000000],
            "commands": [{"cmd": 3}, {"cmd": 25, "sub": 0}],
            "modes": [[1, "USB"]],
            "filters": []
        }"#;
        let model: DeviceModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.controller_address, Address::CONTROLLER);
        assert!(model.supports(&CommandCode::sub(0x19, 0x00)));
        assert!(model.body_lengths.is_empty());
        assert!(model.meter_scales.is_empty());
    }
}

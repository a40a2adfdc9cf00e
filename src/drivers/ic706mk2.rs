// Icom IC-706MKII HF/VHF transceiver
// Older rig: no level, meter, tuner or power commands

use super::generic::smeter_scale;
use crate::civ::commands::{self, CommandSpec};
use crate::civ::types::Address;
use crate::drivers::model::{DeviceModel, Filter, OperatingMode};

pub const ID: &str = "IC-706MKII";
pub const DEFAULT_ADDRESS: Address = Address::new(0x4E);

const COMMANDS: &[CommandSpec] = &[
    commands::READ_OPERATING_FREQUENCY,
    commands::SEND_OPERATING_FREQUENCY,
    commands::READ_OPERATING_MODE,
    commands::SET_OPERATING_MODE,
    commands::SET_VFO_MODE,
    commands::SET_MEMORY_MODE,
    commands::READ_TRANSCEIVER_ID,
    commands::READ_SQUELCH_STATUS,
    commands::READ_SMETER,
];

const MODES: &[(u8, OperatingMode)] = &[
    (0x00, OperatingMode::Lsb),
    (0x01, OperatingMode::Usb),
    (0x02, OperatingMode::Am),
    (0x03, OperatingMode::Cw),
    (0x04, OperatingMode::Rtty),
    (0x05, OperatingMode::Fm),
    (0x06, OperatingMode::Wfm),
];

const FILTERS: &[(u8, Filter)] = &[(0x01, Filter::Fil1), (0x02, Filter::Fil2)];

pub fn model() -> DeviceModel {
    DeviceModel {
        id: ID.to_string(),
        description: "Icom IC-706MKII HF/50/144MHz transceiver".to_string(),
        default_address: DEFAULT_ADDRESS,
        controller_address: Address::CONTROLLER,
        frequency_range: (30_000, 200_000_000),
        commands: commands::codes(COMMANDS),
        modes: MODES.to_vec(),
        filters: FILTERS.to_vec(),
        body_lengths: commands::body_lengths(COMMANDS),
        meter_scales: vec![smeter_scale()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civ::types::CommandCode;
    use crate::codec::meter::MeterUnit;

    #[test]
    fn test_ic706mk2_model() {
        let model = model();
        assert_eq!(model.default_address.value(), 0x4E);
        assert!(model.check_frequency(145_000_000).is_ok());
        assert!(model.supports(&CommandCode::sub(0x15, 0x02)));
        assert!(!model.supports(&CommandCode::sub(0x15, 0x11)));
        assert!(!model.supports(&CommandCode::sub(0x18, 0x01)));
        assert_eq!(model.decode_mode(0x06).unwrap(), OperatingMode::Wfm);
        assert!(model.decode_filter(0x03).is_err());
        assert!(!model.supports(&CommandCode::sub(0x1A, 0x05)));
        assert!(!model.supports(&CommandCode::cmd(0x02)));
    }

    #[test]
    fn test_ic706mk2_meter_scales() {
        let model = model();
        assert!(model.meter_scale(&commands::READ_SMETER.code).is_some());
        assert!(model.meter_scale(&commands::READ_VD_METER.code).is_none());

        let s9 = model.scale_meter(&commands::READ_SMETER.code, 60);
        assert_eq!((s9.value, s9.unit), (-27.0, MeterUnit::DbOverS9));
    }
}

// Icom IC-7300 HF/50MHz transceiver

use super::generic::{meter_scales, FILTERS};
use crate::civ::commands::{self, CATALOG};
use crate::civ::types::Address;
use crate::drivers::model::{DeviceModel, OperatingMode};

pub const ID: &str = "IC-7300";
pub const DEFAULT_ADDRESS: Address = Address::new(0x94);

// 0x06 is unused on this rig
const MODES: &[(u8, OperatingMode)] = &[
    (0x00, OperatingMode::Lsb),
    (0x01, OperatingMode::Usb),
    (0x02, OperatingMode::Am),
    (0x03, OperatingMode::Cw),
    (0x04, OperatingMode::Rtty),
    (0x05, OperatingMode::Fm),
    (0x07, OperatingMode::Cwr),
    (0x08, OperatingMode::RttyR),
];

pub fn model() -> DeviceModel {
    DeviceModel {
        id: ID.to_string(),
        description: "Icom IC-7300 HF/50MHz SDR transceiver".to_string(),
        default_address: DEFAULT_ADDRESS,
        controller_address: Address::CONTROLLER,
        frequency_range: (30_000, 74_000_000),
        commands: commands::codes(CATALOG),
        modes: MODES.to_vec(),
        filters: FILTERS.to_vec(),
        body_lengths: commands::body_lengths(CATALOG),
        meter_scales: meter_scales(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civ::error::ErrorKind;
    use crate::codec::meter::MeterUnit;

    #[test]
    fn test_ic7300_model() {
        let model = model();
        assert!(model.check_frequency(30_000).is_ok());
        assert_eq!(
            model.check_frequency(10_000).unwrap_err().kind(),
            ErrorKind::OutOfRange
        );
        assert_eq!(model.decode_mode(0x06).unwrap_err().kind(), ErrorKind::UnknownMode);
        assert_eq!(model.encode_mode(OperatingMode::Cwr).unwrap(), 0x07);
    }

    #[test]
    fn test_ic7300_meter_scales() {
        let model = model();
        let vd = model.scale_meter(&commands::READ_VD_METER.code, 127);
        assert_eq!(vd.unit, MeterUnit::Volt);
        assert!((vd.value - 13.0).abs() < 0.001);

        let po = model.scale_meter(&commands::READ_PO_METER.code, 213);
        assert_eq!((po.value, po.unit), (100.0, MeterUnit::Percent));

        let id = model.scale_meter(&commands::READ_ID_METER.code, 255);
        assert_eq!((id.value, id.unit), (25.0, MeterUnit::Ampere));
    }
}

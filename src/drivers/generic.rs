// Generic CI-V transceiver
// Covers the command set shared by current Icom HF rigs

use crate::civ::commands::{self, CATALOG};
use crate::civ::types::{Address, CommandCode};
use crate::codec::frequency::DEFAULT_RANGE;
use crate::codec::meter::{MeterScale, MeterUnit};
use crate::drivers::model::{DeviceModel, Filter, OperatingMode};

pub const ID: &str = "generic";
pub const DEFAULT_ADDRESS: Address = Address::new(0x94);

pub(crate) const MODES: &[(u8, OperatingMode)] = &[
    (0x00, OperatingMode::Lsb),
    (0x01, OperatingMode::Usb),
    (0x02, OperatingMode::Am),
    (0x03, OperatingMode::Cw),
    (0x04, OperatingMode::Rtty),
    (0x05, OperatingMode::Fm),
    (0x06, OperatingMode::Nfm),
    (0x07, OperatingMode::Cwr),
    (0x08, OperatingMode::RttyR),
];

pub(crate) const FILTERS: &[(u8, Filter)] = &[
    (0x01, Filter::Fil1),
    (0x02, Filter::Fil2),
    (0x03, Filter::Fil3),
];

pub(crate) fn smeter_scale() -> (CommandCode, MeterScale) {
    (
        commands::READ_SMETER.code,
        MeterScale::new(MeterUnit::DbOverS9, &[(0, -54.0), (120, 0.0), (241, 60.0)]),
    )
}

/// Meter calibration published for the IC-7300 and shared by compatible rigs
pub(crate) fn meter_scales() -> Vec<(CommandCode, MeterScale)> {
    vec![
        smeter_scale(),
        (
            commands::READ_PO_METER.code,
            MeterScale::new(MeterUnit::Percent, &[(0, 0.0), (143, 50.0), (213, 100.0)]),
        ),
        (
            commands::READ_SWR_METER.code,
            MeterScale::new(
                MeterUnit::Swr,
                &[(0, 1.0), (48, 1.5), (80, 2.0), (120, 3.0)],
            ),
        ),
        (
            commands::READ_ALC_METER.code,
            MeterScale::new(MeterUnit::Percent, &[(0, 0.0), (120, 100.0)]),
        ),
        (
            commands::READ_COMP_METER.code,
            MeterScale::new(MeterUnit::Decibel, &[(0, 0.0), (130, 15.0), (241, 30.0)]),
        ),
        (
            commands::READ_VD_METER.code,
            MeterScale::new(MeterUnit::Volt, &[(0, 0.0), (13, 10.0), (241, 16.0)]),
        ),
        (
            commands::READ_ID_METER.code,
            MeterScale::new(
                MeterUnit::Ampere,
                &[(0, 0.0), (97, 10.0), (146, 15.0), (241, 25.0)],
            ),
        ),
    ]
}

pub fn model() -> DeviceModel {
    DeviceModel {
        id: ID.to_string(),
        description: "Generic Icom CI-V transceiver".to_string(),
        default_address: DEFAULT_ADDRESS,
        controller_address: Address::CONTROLLER,
        frequency_range: DEFAULT_RANGE,
        commands: commands::codes(CATALOG),
        modes: MODES.to_vec(),
        filters: FILTERS.to_vec(),
        body_lengths: commands::body_lengths(CATALOG),
        meter_scales: meter_scales(),
    }
}

// Declarative CI-V command catalog
// Each entry pairs an opcode with how its payload is built and its reply read;
// one generic dispatcher (Transceiver::dispatch) executes any of them.

use super::reply::ReplyStatus;
use super::types::{Address, CommandCode};
use crate::codec::frequency::FREQUENCY_BYTES;
use crate::codec::meter::METER_BYTES;
use crate::drivers::model::{Filter, OperatingMode};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Separator between the two frequencies of a band-edge reply
pub const BAND_EDGE_SEPARATOR: u8 = 0x2D;

/// How a command's payload is produced from a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    None,
    /// Constant payload bytes
    Fixed(&'static [u8]),
    /// 5-byte BCD frequency, gated by the model's range
    Frequency,
    /// Mode code with an optional filter code
    ModeFilter,
    /// 0-255 level, 2 bytes
    Level,
    /// 0x00 / 0x01
    Flag,
    Byte,
    /// 2-byte BCD memory channel
    MemoryChannel,
    /// YYYYMMDD as 4 BCD bytes
    Date,
    /// HHMM as 2 BCD bytes
    Time,
}

/// How the data of an OK reply is turned into a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDecoding {
    /// Plain acknowledgement; NG is a failure
    Ack,
    /// OK or NG returned as data
    Status,
    Frequency,
    /// Lower and upper frequency around a 0x2D separator
    BandEdges,
    ModeFilter,
    Level,
    Flag,
    Address,
    Raw,
}

impl ReplyDecoding {
    /// Accepted data lengths after the echoed command; empty when not fixed
    pub fn data_lens(&self) -> &'static [usize] {
        match self {
            ReplyDecoding::Frequency => &[FREQUENCY_BYTES],
            ReplyDecoding::BandEdges => &[2 * FREQUENCY_BYTES + 1],
            // Some rigs omit the filter byte
            ReplyDecoding::ModeFilter => &[1, 2],
            ReplyDecoding::Level => &[METER_BYTES],
            ReplyDecoding::Flag | ReplyDecoding::Address => &[1],
            ReplyDecoding::Ack | ReplyDecoding::Status | ReplyDecoding::Raw => &[],
        }
    }
}

/// Values passed into and out of the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    None,
    Frequency(u32),
    BandEdges {
        low: u32,
        high: u32,
    },
    Mode {
        mode: OperatingMode,
        filter: Option<Filter>,
    },
    Level(u16),
    Flag(bool),
    Byte(u8),
    Channel(u16),
    Date(NaiveDate),
    Time(NaiveTime),
    Address(Address),
    Status(ReplyStatus),
    Raw(Vec<u8>),
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub code: CommandCode,
    /// Bytes between the command and the encoded value (menu item numbers)
    pub prefix: &'static [u8],
    pub encoding: PayloadEncoding,
    pub decoding: ReplyDecoding,
    /// Send the baud-dependent wake preamble ahead of the frame
    pub wake: bool,
}

impl CommandSpec {
    pub const fn new(
        name: &'static str,
        code: CommandCode,
        encoding: PayloadEncoding,
        decoding: ReplyDecoding,
    ) -> Self {
        Self {
            name,
            code,
            prefix: &[],
            encoding,
            decoding,
            wake: false,
        }
    }

    const fn with_wake(mut self) -> Self {
        self.wake = true;
        self
    }

    const fn with_prefix(mut self, prefix: &'static [u8]) -> Self {
        self.prefix = prefix;
        self
    }

    /// Accepted reply body lengths (command echo, prefix and data)
    pub fn body_lens(&self) -> Vec<usize> {
        self.decoding
            .data_lens()
            .iter()
            .map(|data| self.code.len() + self.prefix.len() + data)
            .collect()
    }
}

/// VFO operations for command 0x07
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfoOperation {
    SelectVfoA,
    SelectVfoB,
    /// Copy the active VFO to the other one
    Equalize,
    Exchange,
}

impl VfoOperation {
    pub fn code(&self) -> u8 {
        match self {
            VfoOperation::SelectVfoA => 0x00,
            VfoOperation::SelectVfoB => 0x01,
            VfoOperation::Equalize => 0xA0,
            VfoOperation::Exchange => 0xB0,
        }
    }
}

/// Scan controls for command 0x0E
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Stop,
    StartProgrammedOrMemory,
    StartProgrammed,
    StartDeltaF,
    StartFineProgrammed,
    StartFineDeltaF,
    StartMemory,
    StartSelectMemory,
    SelectDfSpan5kHz,
    SelectDfSpan10kHz,
    SelectDfSpan20kHz,
    SelectDfSpan50kHz,
    SelectDfSpan100kHz,
    SelectDfSpan500kHz,
    SelectDfSpan1MHz,
    ResumeOff,
    ResumeOn,
}

impl ScanMode {
    pub fn code(&self) -> u8 {
        match self {
            ScanMode::Stop => 0x00,
            ScanMode::StartProgrammedOrMemory => 0x01,
            ScanMode::StartProgrammed => 0x02,
            ScanMode::StartDeltaF => 0x03,
            ScanMode::StartFineProgrammed => 0x12,
            ScanMode::StartFineDeltaF => 0x13,
            ScanMode::StartMemory => 0x22,
            ScanMode::StartSelectMemory => 0x23,
            ScanMode::SelectDfSpan5kHz => 0xA1,
            ScanMode::SelectDfSpan10kHz => 0xA2,
            ScanMode::SelectDfSpan20kHz => 0xA3,
            ScanMode::SelectDfSpan50kHz => 0xA4,
            ScanMode::SelectDfSpan100kHz => 0xA5,
            ScanMode::SelectDfSpan500kHz => 0xA6,
            ScanMode::SelectDfSpan1MHz => 0xA7,
            ScanMode::ResumeOff => 0xD0,
            ScanMode::ResumeOn => 0xD3,
        }
    }
}

pub const POWER_ON: CommandSpec = CommandSpec::new(
    "power_on",
    CommandCode::sub(0x18, 0x01),
    PayloadEncoding::None,
    ReplyDecoding::Ack,
)
.with_wake();
pub const POWER_OFF: CommandSpec = CommandSpec::new(
    "power_off",
    CommandCode::sub(0x18, 0x00),
    PayloadEncoding::None,
    ReplyDecoding::Ack,
);
pub const READ_TRANSCEIVER_ID: CommandSpec = CommandSpec::new(
    "read_transceiver_id",
    CommandCode::sub(0x19, 0x00),
    PayloadEncoding::None,
    ReplyDecoding::Address,
);

pub const READ_BAND_EDGE_FREQUENCIES: CommandSpec = CommandSpec::new(
    "read_band_edge_frequencies",
    CommandCode::cmd(0x02),
    PayloadEncoding::None,
    ReplyDecoding::BandEdges,
);
pub const READ_OPERATING_FREQUENCY: CommandSpec = CommandSpec::new(
    "read_operating_frequency",
    CommandCode::cmd(0x03),
    PayloadEncoding::None,
    ReplyDecoding::Frequency,
);
pub const SEND_OPERATING_FREQUENCY: CommandSpec = CommandSpec::new(
    "send_operating_frequency",
    CommandCode::cmd(0x05),
    PayloadEncoding::Frequency,
    ReplyDecoding::Ack,
);
pub const READ_OPERATING_MODE: CommandSpec = CommandSpec::new(
    "read_operating_mode",
    CommandCode::cmd(0x04),
    PayloadEncoding::None,
    ReplyDecoding::ModeFilter,
);
pub const SET_OPERATING_MODE: CommandSpec = CommandSpec::new(
    "set_operating_mode",
    CommandCode::cmd(0x06),
    PayloadEncoding::ModeFilter,
    ReplyDecoding::Ack,
);
pub const SET_VFO_MODE: CommandSpec = CommandSpec::new(
    "set_vfo_mode",
    CommandCode::cmd(0x07),
    PayloadEncoding::Byte,
    ReplyDecoding::Ack,
);
pub const SET_MEMORY_MODE: CommandSpec = CommandSpec::new(
    "set_memory_mode",
    CommandCode::cmd(0x08),
    PayloadEncoding::MemoryChannel,
    ReplyDecoding::Ack,
);
pub const START_SCAN: CommandSpec = CommandSpec::new(
    "start_scan",
    CommandCode::cmd(0x0E),
    PayloadEncoding::Byte,
    ReplyDecoding::Ack,
);

const fn level(name: &'static str, sub: u8) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandCode::sub(0x14, sub),
        PayloadEncoding::None,
        ReplyDecoding::Level,
    )
}

const fn set_level(name: &'static str, sub: u8) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandCode::sub(0x14, sub),
        PayloadEncoding::Level,
        ReplyDecoding::Ack,
    )
}

const fn meter(name: &'static str, sub: u8) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandCode::sub(0x15, sub),
        PayloadEncoding::None,
        ReplyDecoding::Level,
    )
}

const fn squelch(name: &'static str, sub: u8) -> CommandSpec {
    CommandSpec::new(
        name,
        CommandCode::sub(0x15, sub),
        PayloadEncoding::None,
        ReplyDecoding::Flag,
    )
}

pub const READ_AF_VOLUME: CommandSpec = level("read_af_volume", 0x01);
pub const SET_AF_VOLUME: CommandSpec = set_level("set_af_volume", 0x01);
pub const READ_RF_GAIN: CommandSpec = level("read_rf_gain", 0x02);
pub const SET_RF_GAIN: CommandSpec = set_level("set_rf_gain", 0x02);
pub const READ_SQUELCH_LEVEL: CommandSpec = level("read_squelch_level", 0x03);
pub const SET_SQUELCH_LEVEL: CommandSpec = set_level("set_squelch_level", 0x03);
pub const READ_NR_LEVEL: CommandSpec = level("read_nr_level", 0x06);
pub const READ_NB_LEVEL: CommandSpec = level("read_nb_level", 0x12);

pub const READ_SQUELCH_STATUS: CommandSpec = squelch("read_squelch_status", 0x01);
pub const READ_SMETER: CommandSpec = meter("read_smeter", 0x02);
pub const READ_SQUELCH_STATUS2: CommandSpec = squelch("read_squelch_status2", 0x05);
pub const READ_PO_METER: CommandSpec = meter("read_po_meter", 0x11);
pub const READ_SWR_METER: CommandSpec = meter("read_swr_meter", 0x12);
pub const READ_ALC_METER: CommandSpec = meter("read_alc_meter", 0x13);
pub const READ_COMP_METER: CommandSpec = meter("read_comp_meter", 0x14);
pub const READ_VD_METER: CommandSpec = meter("read_vd_meter", 0x15);
pub const READ_ID_METER: CommandSpec = meter("read_id_meter", 0x16);

pub const SET_MF_BAND_ATTENUATOR: CommandSpec = CommandSpec::new(
    "set_mf_band_attenuator",
    CommandCode::sub(0x1A, 0x05),
    PayloadEncoding::Flag,
    ReplyDecoding::Ack,
)
.with_prefix(&[0x01, 0x93]);
pub const SET_CLOCK_DATE: CommandSpec = CommandSpec::new(
    "set_clock_date",
    CommandCode::sub(0x1A, 0x05),
    PayloadEncoding::Date,
    ReplyDecoding::Ack,
)
.with_prefix(&[0x00, 0x94]);
pub const SET_CLOCK_TIME: CommandSpec = CommandSpec::new(
    "set_clock_time",
    CommandCode::sub(0x1A, 0x05),
    PayloadEncoding::Time,
    ReplyDecoding::Ack,
)
.with_prefix(&[0x00, 0x95]);
pub const SET_IP_PLUS_FUNCTION: CommandSpec = CommandSpec::new(
    "set_ip_plus_function",
    CommandCode::sub(0x1A, 0x07),
    PayloadEncoding::Flag,
    ReplyDecoding::Ack,
);

pub const SET_MOX: CommandSpec = CommandSpec::new(
    "set_mox",
    CommandCode::sub(0x1C, 0x00),
    PayloadEncoding::Flag,
    ReplyDecoding::Ack,
);
pub const SET_ANTENNA_TUNER: CommandSpec = CommandSpec::new(
    "set_antenna_tuner",
    CommandCode::sub(0x1C, 0x01),
    PayloadEncoding::Flag,
    ReplyDecoding::Ack,
);
// NG here means the tuner could not start, which callers read as state
pub const TUNE_ANTENNA_TUNER: CommandSpec = CommandSpec::new(
    "tune_antenna_tuner",
    CommandCode::sub(0x1C, 0x01),
    PayloadEncoding::Fixed(&[0x02]),
    ReplyDecoding::Status,
);

/// Every catalog entry
pub const CATALOG: &[CommandSpec] = &[
    POWER_ON,
    POWER_OFF,
    READ_TRANSCEIVER_ID,
    READ_BAND_EDGE_FREQUENCIES,
    READ_OPERATING_FREQUENCY,
    SEND_OPERATING_FREQUENCY,
    READ_OPERATING_MODE,
    SET_OPERATING_MODE,
    SET_VFO_MODE,
    SET_MEMORY_MODE,
    START_SCAN,
    READ_AF_VOLUME,
    SET_AF_VOLUME,
    READ_RF_GAIN,
    SET_RF_GAIN,
    READ_SQUELCH_LEVEL,
    SET_SQUELCH_LEVEL,
    READ_NR_LEVEL,
    READ_NB_LEVEL,
    READ_SQUELCH_STATUS,
    READ_SMETER,
    READ_SQUELCH_STATUS2,
    READ_PO_METER,
    READ_SWR_METER,
    READ_ALC_METER,
    READ_COMP_METER,
    READ_VD_METER,
    READ_ID_METER,
    SET_MF_BAND_ATTENUATOR,
    SET_CLOCK_DATE,
    SET_CLOCK_TIME,
    SET_IP_PLUS_FUNCTION,
    SET_MOX,
    SET_ANTENNA_TUNER,
    TUNE_ANTENNA_TUNER,
];

pub fn find(name: &str) -> Option<&'static CommandSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Distinct command codes used by `specs`, in first-seen order
pub fn codes(specs: &[CommandSpec]) -> Vec<CommandCode> {
    let mut out: Vec<CommandCode> = Vec::new();
    for spec in specs {
        if !out.contains(&spec.code) {
            out.push(spec.code);
        }
    }
    out
}

/// Fixed reply body lengths for the read commands among `specs`.
///
/// A command may appear more than once when several lengths are valid.
pub fn body_lengths(specs: &[CommandSpec]) -> Vec<(CommandCode, usize)> {
    let mut out: Vec<(CommandCode, usize)> = Vec::new();
    for spec in specs {
        for len in spec.body_lens() {
            if !out.contains(&(spec.code, len)) {
                out.push((spec.code, len));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_unique() {
        for (i, spec) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG[i + 1..].iter().all(|other| other.name != spec.name),
                "duplicate entry {}",
                spec.name
            );
        }
        assert_eq!(find("read_smeter"), Some(&READ_SMETER));
        assert!(find("read_everything").is_none());
    }

    #[test]
    fn test_body_lens() {
        assert_eq!(READ_OPERATING_FREQUENCY.body_lens(), vec![6]);
        assert_eq!(READ_OPERATING_MODE.body_lens(), vec![2, 3]);
        assert_eq!(READ_TRANSCEIVER_ID.body_lens(), vec![3]);
        assert_eq!(READ_SMETER.body_lens(), vec![4]);
        assert_eq!(READ_SQUELCH_STATUS.body_lens(), vec![3]);
        assert_eq!(READ_BAND_EDGE_FREQUENCIES.body_lens(), vec![12]);
        assert!(SET_AF_VOLUME.body_lens().is_empty());
    }

    #[test]
    fn test_codes_deduplicated() {
        let all = codes(CATALOG);
        assert!(all.contains(&CommandCode::sub(0x14, 0x01)));
        assert_eq!(
            all.iter()
                .filter(|c| **c == CommandCode::sub(0x1C, 0x01))
                .count(),
            1
        );
        assert_eq!(
            all.iter()
                .filter(|c| **c == CommandCode::sub(0x1A, 0x05))
                .count(),
            1
        );

        let lengths = body_lengths(CATALOG);
        assert!(lengths.contains(&(CommandCode::sub(0x14, 0x01), 4)));
        assert!(lengths.contains(&(CommandCode::cmd(0x04), 2)));
        assert!(lengths.contains(&(CommandCode::cmd(0x04), 3)));
        assert!(!lengths.iter().any(|(code, _)| *code == CommandCode::cmd(0x05)));
    }

    #[test]
    fn test_menu_prefixes() {
        assert_eq!(SET_CLOCK_DATE.prefix, &[0x00, 0x94]);
        assert_eq!(SET_CLOCK_TIME.prefix, &[0x00, 0x95]);
        assert_eq!(SET_MF_BAND_ATTENUATOR.prefix, &[0x01, 0x93]);
        assert!(READ_SMETER.prefix.is_empty());
    }

    #[test]
    fn test_power_on_wakes() {
        assert!(POWER_ON.wake);
        assert!(!POWER_OFF.wake);
    }

    #[test]
    fn test_vfo_codes() {
        assert_eq!(VfoOperation::SelectVfoA.code(), 0x00);
        assert_eq!(VfoOperation::Exchange.code(), 0xB0);
        assert_eq!(ScanMode::SelectDfSpan50kHz.code(), 0xA4);
        assert_eq!(ScanMode::Stop.code(), 0x00);
    }
}

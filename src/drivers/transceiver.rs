// Transceiver session: typed operations over the CI-V engine
// Every operation is one catalog entry run through `dispatch`

use super::model::{DeviceModel, Filter, OperatingMode};
use super::registry;
use crate::civ::commands::{
    self, CommandSpec, PayloadEncoding, ReplyDecoding, ScanMode, Value, VfoOperation,
    BAND_EDGE_SEPARATOR,
};
use crate::civ::engine::CivEngine;
use crate::civ::error::{RadioError, RadioResult};
use crate::civ::frame::wake_preamble;
use crate::civ::reply::{Reply, ReplyStatus};
use crate::civ::types::Address;
use crate::codec::frequency::FREQUENCY_BYTES;
use crate::codec::meter::Measurement;
use crate::codec::{bcd, frequency, meter};
use crate::config::{self, CivConfig};
use crate::serial::{SerialPort, Transport};
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use std::sync::Arc;

/// Highest channel number a 2-byte BCD field can carry
const MAX_MEMORY_CHANNEL: u16 = 9999;

pub struct Transceiver<T: Transport> {
    engine: CivEngine<T>,
}

impl<T: Transport> Transceiver<T> {
    pub fn new(transport: T, model: Arc<DeviceModel>, address: Address) -> Self {
        Self {
            engine: CivEngine::new(transport, model, address),
        }
    }

    /// Address the transceiver at its model's factory default
    pub fn with_default_address(transport: T, model: Arc<DeviceModel>) -> Self {
        let address = model.default_address;
        Self::new(transport, model, address)
    }

    pub fn with_controller(mut self, controller: Address) -> Self {
        self.engine = self.engine.with_controller(controller);
        self
    }

    /// Build a session from configuration, resolving the model in the global registry.
    ///
    /// `init_drivers` and `CivConfig::register_models` must have run first.
    pub fn from_config(transport: T, config: &CivConfig) -> config::Result<Self> {
        let model = registry::lookup_model(&config.model)?;
        let address = config
            .transceiver_address()?
            .unwrap_or(model.default_address);
        let controller = config.controller_address()?;

        tracing::info!(
            "CI-V session: {} at {} (controller {})",
            model.id,
            address,
            controller
        );
        Ok(Self::new(transport, model, address).with_controller(controller))
    }

    pub fn engine(&self) -> &CivEngine<T> {
        &self.engine
    }

    pub fn model(&self) -> &DeviceModel {
        self.engine.model()
    }

    pub fn address(&self) -> Address {
        self.engine.transceiver_address()
    }

    pub fn close(&mut self) -> RadioResult<()> {
        self.engine.close()
    }

    /// Run one catalog command.
    ///
    /// NG replies fail with `Rejected`, except for `ReplyDecoding::Status`
    /// where the status itself is the result.
    pub async fn dispatch(&mut self, spec: &CommandSpec, value: Value) -> RadioResult<Value> {
        let payload = self.encode_payload(spec, &value)?;
        let preamble = if spec.wake {
            wake_preamble(self.engine.baud_rate())
        } else {
            Vec::new()
        };

        let reply = self.engine.transact(spec.code, &payload, &preamble).await?;
        self.decode_reply(spec, &reply)
    }

    /// Menu prefix followed by the encoded value
    fn encode_payload(&self, spec: &CommandSpec, value: &Value) -> RadioResult<Vec<u8>> {
        let mut payload = spec.prefix.to_vec();
        payload.extend(self.encode_value(spec, value)?);
        Ok(payload)
    }

    fn encode_value(&self, spec: &CommandSpec, value: &Value) -> RadioResult<Vec<u8>> {
        let model = self.engine.model();
        match (spec.encoding, value) {
            (PayloadEncoding::None, Value::None) => Ok(Vec::new()),
            (PayloadEncoding::Fixed(bytes), Value::None) => Ok(bytes.to_vec()),
            (PayloadEncoding::Frequency, Value::Frequency(hz)) => {
                Ok(frequency::encode(*hz, model.frequency_range)?.to_vec())
            }
            (PayloadEncoding::ModeFilter, Value::Mode { mode, filter }) => {
                let mut payload = vec![model.encode_mode(*mode)?];
                if let Some(filter) = filter {
                    payload.push(model.encode_filter(*filter)?);
                }
                Ok(payload)
            }
            (PayloadEncoding::Level, Value::Level(level)) => Ok(meter::encode(*level)?.to_vec()),
            (PayloadEncoding::Flag, Value::Flag(on)) => Ok(vec![*on as u8]),
            (PayloadEncoding::Byte, Value::Byte(byte)) => Ok(vec![*byte]),
            (PayloadEncoding::MemoryChannel, Value::Channel(channel)) => {
                if *channel > MAX_MEMORY_CHANNEL {
                    return Err(RadioError::OutOfRange {
                        value: *channel as u64,
                        min: 0,
                        max: MAX_MEMORY_CHANNEL as u64,
                    });
                }
                Ok(bcd::int_to_bcd_be(*channel as u64, 2)?)
            }
            (PayloadEncoding::Date, Value::Date(date)) => {
                let year = date.year();
                if !(0..=9999).contains(&year) {
                    return Err(RadioError::OutOfRange {
                        value: year.unsigned_abs() as u64,
                        min: 0,
                        max: 9999,
                    });
                }
                let mut payload = bcd::int_to_bcd_be(year as u64, 2)?;
                payload.push(bcd::pair_to_bcd_byte(date.month() as u8)?);
                payload.push(bcd::pair_to_bcd_byte(date.day() as u8)?);
                Ok(payload)
            }
            (PayloadEncoding::Time, Value::Time(time)) => Ok(vec![
                bcd::pair_to_bcd_byte(time.hour() as u8)?,
                bcd::pair_to_bcd_byte(time.minute() as u8)?,
            ]),
            (encoding, value) => Err(RadioError::InvalidCommand(format!(
                "{} takes a {:?} payload, got {:?}",
                spec.name, encoding, value
            ))),
        }
    }

    fn decode_reply(&self, spec: &CommandSpec, reply: &Reply) -> RadioResult<Value> {
        if spec.decoding == ReplyDecoding::Status {
            return Ok(Value::Status(reply.status()));
        }
        if reply.is_ng() {
            return Err(RadioError::Rejected(spec.code));
        }
        if spec.decoding == ReplyDecoding::Ack {
            return Ok(Value::None);
        }

        let model = self.engine.model();
        // Extra leading sync bytes are not part of the body
        model.check_body_len(&spec.code, reply.frame()?.body.len())?;
        let data = reply.data_for(&spec.code)?;
        let data = data.strip_prefix(spec.prefix).ok_or_else(|| {
            RadioError::MalformedReply(format!(
                "{} reply data {} lacks prefix {}",
                spec.name,
                crate::civ::hex_string(data),
                crate::civ::hex_string(spec.prefix)
            ))
        })?;

        match (spec.decoding, data) {
            (ReplyDecoding::Frequency, _) => Ok(Value::Frequency(frequency::decode(data)?)),
            (ReplyDecoding::BandEdges, _)
                if data.len() == 2 * FREQUENCY_BYTES + 1
                    && data[FREQUENCY_BYTES] == BAND_EDGE_SEPARATOR =>
            {
                let (low, high) = data.split_at(FREQUENCY_BYTES);
                Ok(Value::BandEdges {
                    low: frequency::decode(low)?,
                    high: frequency::decode(&high[1..])?,
                })
            }
            (ReplyDecoding::ModeFilter, [mode]) => Ok(Value::Mode {
                mode: model.decode_mode(*mode)?,
                filter: None,
            }),
            (ReplyDecoding::ModeFilter, [mode, filter]) => Ok(Value::Mode {
                mode: model.decode_mode(*mode)?,
                filter: Some(model.decode_filter(*filter)?),
            }),
            (ReplyDecoding::Level, _) => Ok(Value::Level(meter::decode(data)?)),
            (ReplyDecoding::Flag, [flag]) => Ok(Value::Flag(*flag != 0)),
            (ReplyDecoding::Address, [address]) => Ok(Value::Address(Address::new(*address))),
            (ReplyDecoding::Raw, _) => Ok(Value::Raw(data.to_vec())),
            (decoding, _) => Err(RadioError::MalformedReply(format!(
                "{} reply data {} does not decode as {:?}",
                spec.name,
                crate::civ::hex_string(data),
                decoding
            ))),
        }
    }

    async fn command(&mut self, spec: &CommandSpec, value: Value) -> RadioResult<()> {
        self.dispatch(spec, value).await.map(|_| ())
    }

    async fn read_level(&mut self, spec: &CommandSpec) -> RadioResult<u16> {
        match self.dispatch(spec, Value::None).await? {
            Value::Level(level) => Ok(level),
            other => Err(unexpected(spec, other)),
        }
    }

    async fn read_flag(&mut self, spec: &CommandSpec) -> RadioResult<bool> {
        match self.dispatch(spec, Value::None).await? {
            Value::Flag(on) => Ok(on),
            other => Err(unexpected(spec, other)),
        }
    }

    /// Read a meter and convert it with the model's calibration.
    ///
    /// Meters without a calibration come back as a percentage of full scale.
    pub async fn read_scaled_meter(&mut self, spec: &CommandSpec) -> RadioResult<Measurement> {
        let raw = self.read_level(spec).await?;
        Ok(self.model().scale_meter(&spec.code, raw))
    }

    /// Power on, preceded by a wake preamble sized to the line speed
    pub async fn power_on(&mut self) -> RadioResult<()> {
        self.command(&commands::POWER_ON, Value::None).await
    }

    pub async fn power_off(&mut self) -> RadioResult<()> {
        self.command(&commands::POWER_OFF, Value::None).await
    }

    pub async fn read_transceiver_id(&mut self) -> RadioResult<Address> {
        let spec = &commands::READ_TRANSCEIVER_ID;
        match self.dispatch(spec, Value::None).await? {
            Value::Address(address) => Ok(address),
            other => Err(unexpected(spec, other)),
        }
    }

    /// Lower and upper edge of the band the radio is tuned to, in Hz
    pub async fn read_band_edge_frequencies(&mut self) -> RadioResult<(u32, u32)> {
        let spec = &commands::READ_BAND_EDGE_FREQUENCIES;
        match self.dispatch(spec, Value::None).await? {
            Value::BandEdges { low, high } => Ok((low, high)),
            other => Err(unexpected(spec, other)),
        }
    }

    pub async fn read_operating_frequency(&mut self) -> RadioResult<u32> {
        let spec = &commands::READ_OPERATING_FREQUENCY;
        match self.dispatch(spec, Value::None).await? {
            Value::Frequency(hz) => Ok(hz),
            other => Err(unexpected(spec, other)),
        }
    }

    pub async fn send_operating_frequency(&mut self, hz: u32) -> RadioResult<()> {
        self.command(&commands::SEND_OPERATING_FREQUENCY, Value::Frequency(hz))
            .await
    }

    pub async fn read_operating_mode(&mut self) -> RadioResult<(OperatingMode, Option<Filter>)> {
        let spec = &commands::READ_OPERATING_MODE;
        match self.dispatch(spec, Value::None).await? {
            Value::Mode { mode, filter } => Ok((mode, filter)),
            other => Err(unexpected(spec, other)),
        }
    }

    /// Set the mode; without a filter the radio keeps its current one
    pub async fn set_operating_mode(
        &mut self,
        mode: OperatingMode,
        filter: Option<Filter>,
    ) -> RadioResult<()> {
        self.command(&commands::SET_OPERATING_MODE, Value::Mode { mode, filter })
            .await
    }

    pub async fn set_vfo_mode(&mut self, operation: VfoOperation) -> RadioResult<()> {
        self.command(&commands::SET_VFO_MODE, Value::Byte(operation.code()))
            .await
    }

    pub async fn set_memory_mode(&mut self, channel: u16) -> RadioResult<()> {
        self.command(&commands::SET_MEMORY_MODE, Value::Channel(channel))
            .await
    }

    pub async fn start_scan(&mut self, mode: ScanMode) -> RadioResult<()> {
        self.command(&commands::START_SCAN, Value::Byte(mode.code()))
            .await
    }

    pub async fn read_af_volume(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_AF_VOLUME).await
    }

    pub async fn set_af_volume(&mut self, level: u16) -> RadioResult<()> {
        self.command(&commands::SET_AF_VOLUME, Value::Level(level)).await
    }

    pub async fn read_rf_gain(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_RF_GAIN).await
    }

    pub async fn set_rf_gain(&mut self, level: u16) -> RadioResult<()> {
        self.command(&commands::SET_RF_GAIN, Value::Level(level)).await
    }

    pub async fn read_squelch_level(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_SQUELCH_LEVEL).await
    }

    pub async fn set_squelch_level(&mut self, level: u16) -> RadioResult<()> {
        self.command(&commands::SET_SQUELCH_LEVEL, Value::Level(level))
            .await
    }

    pub async fn read_nr_level(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_NR_LEVEL).await
    }

    pub async fn read_nb_level(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_NB_LEVEL).await
    }

    /// True when the squelch is open
    pub async fn read_squelch_status(&mut self) -> RadioResult<bool> {
        self.read_flag(&commands::READ_SQUELCH_STATUS).await
    }

    pub async fn read_squelch_status2(&mut self) -> RadioResult<bool> {
        self.read_flag(&commands::READ_SQUELCH_STATUS2).await
    }

    pub async fn read_smeter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_SMETER).await
    }

    pub async fn read_po_meter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_PO_METER).await
    }

    pub async fn read_swr_meter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_SWR_METER).await
    }

    pub async fn read_alc_meter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_ALC_METER).await
    }

    pub async fn read_comp_meter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_COMP_METER).await
    }

    pub async fn read_vd_meter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_VD_METER).await
    }

    pub async fn read_id_meter(&mut self) -> RadioResult<u16> {
        self.read_level(&commands::READ_ID_METER).await
    }

    /// S-meter in dB relative to S9
    pub async fn read_smeter_db(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_SMETER).await
    }

    pub async fn read_power_output(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_PO_METER).await
    }

    pub async fn read_swr(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_SWR_METER).await
    }

    pub async fn read_alc(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_ALC_METER).await
    }

    pub async fn read_compression(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_COMP_METER).await
    }

    pub async fn read_supply_voltage(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_VD_METER).await
    }

    pub async fn read_drain_current(&mut self) -> RadioResult<Measurement> {
        self.read_scaled_meter(&commands::READ_ID_METER).await
    }

    pub async fn set_mf_band_attenuator(&mut self, on: bool) -> RadioResult<()> {
        self.command(&commands::SET_MF_BAND_ATTENUATOR, Value::Flag(on))
            .await
    }

    pub async fn set_ip_plus_function(&mut self, on: bool) -> RadioResult<()> {
        self.command(&commands::SET_IP_PLUS_FUNCTION, Value::Flag(on))
            .await
    }

    /// Set the radio's clock: date first, then hours and minutes
    pub async fn set_clock(&mut self, at: NaiveDateTime) -> RadioResult<()> {
        self.command(&commands::SET_CLOCK_DATE, Value::Date(at.date()))
            .await?;
        self.command(&commands::SET_CLOCK_TIME, Value::Time(at.time()))
            .await
    }

    /// Set the radio's clock to local time
    pub async fn sync_clock(&mut self) -> RadioResult<()> {
        let now = Local::now().naive_local();
        tracing::info!("Setting transceiver clock to {}", now.format("%Y-%m-%d %H:%M"));
        self.set_clock(now).await
    }

    pub async fn set_mox(&mut self, transmit: bool) -> RadioResult<()> {
        self.command(&commands::SET_MOX, Value::Flag(transmit)).await
    }

    pub async fn set_antenna_tuner(&mut self, on: bool) -> RadioResult<()> {
        self.command(&commands::SET_ANTENNA_TUNER, Value::Flag(on))
            .await
    }

    /// Start a tuning cycle. NG (tuner unable to start) is returned, not raised.
    pub async fn tune_antenna_tuner(&mut self) -> RadioResult<ReplyStatus> {
        let spec = &commands::TUNE_ANTENNA_TUNER;
        match self.dispatch(spec, Value::None).await? {
            Value::Status(status) => Ok(status),
            other => Err(unexpected(spec, other)),
        }
    }
}

impl Transceiver<SerialPort> {
    /// Open the configured serial port and build a session on it
    pub fn open(config: &CivConfig) -> config::Result<Self> {
        let port = SerialPort::open(&config.port, config.serial_config())
            .map_err(RadioError::from)?;
        Self::from_config(port, config)
    }
}

fn unexpected(spec: &CommandSpec, value: Value) -> RadioError {
    RadioError::MalformedReply(format!("{} decoded to unexpected {:?}", spec.name, value))
}

// Meter and level codec: two bytes, a raw hundreds byte then a BCD tens/units byte

use super::bcd;
use crate::civ::error::{RadioError, RadioResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of payload bytes in a meter or level field
pub const METER_BYTES: usize = 2;

/// Full-scale value of the 0-255 level range
pub const LEVEL_MAX: u16 = 255;

/// Decode a meter reading as `high * 100 + decimal(low)`.
///
/// `low` is read as BCD. Out-of-table bytes are not rejected; they just yield
/// values beyond the documented scale, which callers clamp.
pub fn decode2(high: u8, low: u8) -> u16 {
    high as u16 * 100 + bcd::nibbles_as_decimal(low)
}

/// Decode a meter field from a reply's data bytes
pub fn decode(bytes: &[u8]) -> RadioResult<u16> {
    match *bytes {
        [high, low] => Ok(decode2(high, low)),
        _ => Err(RadioError::MalformedReply(format!(
            "meter field must be {} bytes, got {}",
            METER_BYTES,
            bytes.len()
        ))),
    }
}

/// Encode a 0-255 level in the same layout `decode2` reads
pub fn encode(level: u16) -> RadioResult<[u8; METER_BYTES]> {
    if level > LEVEL_MAX {
        return Err(RadioError::OutOfRange {
            value: level as u64,
            min: 0,
            max: LEVEL_MAX as u64,
        });
    }

    Ok([(level / 100) as u8, bcd::pair_to_bcd_byte((level % 100) as u8)?])
}

/// Scale a 0-255 level to a percentage, clamping out-of-scale readings
pub fn level_percent(level: u16) -> f32 {
    level.min(LEVEL_MAX) as f32 / LEVEL_MAX as f32 * 100.0
}

/// Physical unit of a calibrated meter reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterUnit {
    Percent,
    /// Standing wave ratio, 1.0 and up
    Swr,
    Decibel,
    /// Decibels relative to S9
    DbOverS9,
    Volt,
    Ampere,
}

impl fmt::Display for MeterUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MeterUnit::Percent => "%",
            MeterUnit::Swr => ":1",
            MeterUnit::Decibel => "dB",
            MeterUnit::DbOverS9 => "dB/S9",
            MeterUnit::Volt => "V",
            MeterUnit::Ampere => "A",
        };
        f.write_str(label)
    }
}

/// A meter reading converted to its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f32,
    pub unit: MeterUnit,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit)
    }
}

/// Piecewise-linear calibration from raw meter readings to a unit.
///
/// `points` are (raw, value) pairs sorted by raw reading. Readings outside
/// the table clamp to its first or last value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterScale {
    pub unit: MeterUnit,
    pub points: Vec<(u16, f32)>,
}

impl MeterScale {
    pub fn new(unit: MeterUnit, points: &[(u16, f32)]) -> Self {
        Self {
            unit,
            points: points.to_vec(),
        }
    }

    /// Straight 0-255 to 0-100 % scale
    pub fn percent() -> Self {
        Self::new(MeterUnit::Percent, &[(0, 0.0), (LEVEL_MAX, 100.0)])
    }

    pub fn convert(&self, raw: u16) -> Measurement {
        Measurement {
            value: interpolate(&self.points, raw),
            unit: self.unit,
        }
    }
}

fn interpolate(points: &[(u16, f32)], raw: u16) -> f32 {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return raw as f32,
    };
    if raw <= first.0 {
        return first.1;
    }
    if raw >= last.0 {
        return last.1;
    }

    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if raw <= x1 && x1 > x0 {
            let t = (raw - x0) as f32 / (x1 - x0) as f32;
            return y0 + t * (y1 - y0);
        }
    }
    last.1
}

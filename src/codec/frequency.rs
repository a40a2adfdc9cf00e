// Frequency payload codec: 5 bytes of packed BCD, least significant pair first
// 14.050123 MHz travels as 23 01 05 14 00

use super::bcd;
use crate::civ::error::{RadioError, RadioResult};

/// Number of payload bytes in a CI-V frequency field (10 decimal digits)
pub const FREQUENCY_BYTES: usize = 5;

/// Transmission range used when a model does not narrow it further (Hz)
pub const DEFAULT_RANGE: (u32, u32) = (10_000, 74_000_000);

/// Encode a frequency in Hz for transmission.
///
/// Fails with `OutOfRange` unless `min <= frequency <= max`.
pub fn encode(frequency: u32, (min, max): (u32, u32)) -> RadioResult<[u8; FREQUENCY_BYTES]> {
    if frequency < min || frequency > max {
        return Err(RadioError::OutOfRange {
            value: frequency as u64,
            min: min as u64,
            max: max as u64,
        });
    }

    let packed = bcd::int_to_bcd_le(frequency as u64, FREQUENCY_BYTES)?;
    let mut out = [0u8; FREQUENCY_BYTES];
    out.copy_from_slice(&packed);
    Ok(out)
}

/// Decode a frequency field (up to 5 bytes, least significant pair first).
pub fn decode(bytes: &[u8]) -> RadioResult<u32> {
    if bytes.is_empty() || bytes.len() > FREQUENCY_BYTES {
        return Err(RadioError::MalformedReply(format!(
            "frequency field must be 1..={} bytes, got {}",
            FREQUENCY_BYTES,
            bytes.len()
        )));
    }

    let hz = bcd::bcd_to_int_le(bytes)?;
    u32::try_from(hz)
        .map_err(|_| RadioError::MalformedReply(format!("frequency {} Hz overflows", hz)))
}

// Packed BCD helpers shared by the CI-V payload codecs
// Each byte carries two decimal digits: tens in the upper nibble, units in the lower

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BcdError {
    #[error("Invalid BCD digit: {0:#04x}")]
    InvalidDigit(u8),

    #[error("Value {value} does not fit in {bytes} BCD bytes")]
    ValueTooLarge { value: u64, bytes: usize },
}

pub type Result<T> = std::result::Result<T, BcdError>;

/// Split a BCD byte into its (tens, units) digits
/// Example: 0x14 -> (1, 4)
pub fn bcd_byte_to_digits(byte: u8) -> Result<(u8, u8)> {
    let tens = byte >> 4;
    let units = byte & 0x0F;

    if tens > 9 || units > 9 {
        return Err(BcdError::InvalidDigit(byte));
    }

    Ok((tens, units))
}

/// Pack a two-digit decimal value (0-99) into one BCD byte
/// Example: 23 -> 0x23
pub fn pair_to_bcd_byte(pair: u8) -> Result<u8> {
    if pair > 99 {
        return Err(BcdError::InvalidDigit(pair));
    }

    Ok(((pair / 10) << 4) | (pair % 10))
}

/// Read a byte's two hex digits as a two-digit decimal number without
/// validating them. 0x23 -> 23, 0x2A -> 30.
pub fn nibbles_as_decimal(byte: u8) -> u16 {
    ((byte >> 4) as u16) * 10 + (byte & 0x0F) as u16
}

/// Decode BCD bytes, most significant pair first
/// Example: [0x00, 0x12] -> 12
pub fn bcd_to_int_be(bytes: &[u8]) -> Result<u64> {
    bytes.iter().try_fold(0u64, |acc, &byte| {
        let (tens, units) = bcd_byte_to_digits(byte)?;
        acc.checked_mul(100)
            .and_then(|v| v.checked_add((tens * 10 + units) as u64))
            .ok_or(BcdError::ValueTooLarge {
                value: acc,
                bytes: bytes.len(),
            })
    })
}

/// Decode BCD bytes, least significant pair first
/// Example: [0x23, 0x01, 0x05, 0x14, 0x00] -> 14050123
pub fn bcd_to_int_le(bytes: &[u8]) -> Result<u64> {
    let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
    bcd_to_int_be(&reversed)
}

/// Encode an integer as `num_bytes` BCD bytes, least significant pair first
pub fn int_to_bcd_le(value: u64, num_bytes: usize) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(num_bytes);
    let mut remaining = value;

    for _ in 0..num_bytes {
        result.push(pair_to_bcd_byte((remaining % 100) as u8)?);
        remaining /= 100;
    }

    if remaining > 0 {
        return Err(BcdError::ValueTooLarge {
            value,
            bytes: num_bytes,
        });
    }

    Ok(result)
}

/// Encode an integer as `num_bytes` BCD bytes, most significant pair first
pub fn int_to_bcd_be(value: u64, num_bytes: usize) -> Result<Vec<u8>> {
    let mut result = int_to_bcd_le(value, num_bytes)?;
    result.reverse();
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcd_byte_conversion() {
        assert_eq!(bcd_byte_to_digits(0x12).unwrap(), (1, 2));
        assert_eq!(bcd_byte_to_digits(0x99).unwrap(), (9, 9));
        assert_eq!(bcd_byte_to_digits(0xAB), Err(BcdError::InvalidDigit(0xAB)));

        assert_eq!(pair_to_bcd_byte(0).unwrap(), 0x00);
        assert_eq!(pair_to_bcd_byte(95).unwrap(), 0x95);
        assert!(pair_to_bcd_byte(100).is_err());
    }

    #[test]
    fn test_nibbles_as_decimal() {
        assert_eq!(nibbles_as_decimal(0x23), 23);
        assert_eq!(nibbles_as_decimal(0x00), 0);
        // Not BCD, still produces a number
        assert_eq!(nibbles_as_decimal(0x2A), 30);
    }

    #[test]
    fn test_bcd_to_int() {
        assert_eq!(bcd_to_int_be(&[0x01, 0x23]).unwrap(), 123);
        assert_eq!(
            bcd_to_int_le(&[0x23, 0x01, 0x05, 0x14, 0x00]).unwrap(),
            14_050_123
        );
        assert!(bcd_to_int_le(&[0x0F]).is_err());
    }

    #[test]
    fn test_int_to_bcd() {
        assert_eq!(int_to_bcd_be(42, 2).unwrap(), vec![0x00, 0x42]);
        assert_eq!(int_to_bcd_le(123456, 3).unwrap(), vec![0x56, 0x34, 0x12]);
        assert_eq!(
            int_to_bcd_le(1234567, 3),
            Err(BcdError::ValueTooLarge {
                value: 1234567,
                bytes: 3
            })
        );
    }
}

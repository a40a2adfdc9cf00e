// CI-V frame construction
// [preamble] FE FE <transceiver> <controller> <cmd> [sub] [payload...] FD

use super::types::{Address, CommandCode};
use super::{PREAMBLE, TERMINATOR};

/// Wake-up preamble lengths for `power_on`, by baud rate
const WAKE_PREAMBLE_LEN: &[(u32, usize)] = &[
    (115_200, 150),
    (57_600, 75),
    (38_400, 50),
    (19_200, 25),
    (9_600, 13),
];

/// Preamble length used for any baud rate not listed above
const WAKE_PREAMBLE_FALLBACK: usize = 7;

/// Assemble a complete wire frame.
///
/// Payload bytes are copied verbatim; the protocol never escapes 0xFD.
pub fn build_frame(
    preamble: &[u8],
    transceiver: Address,
    controller: Address,
    command: &CommandCode,
    payload: &[u8],
) -> Vec<u8> {
    let mut frame = Vec::with_capacity(preamble.len() + 5 + command.len() + payload.len());

    frame.extend_from_slice(preamble);
    frame.extend_from_slice(&[PREAMBLE, PREAMBLE]);
    frame.push(transceiver.value());
    frame.push(controller.value());
    frame.extend_from_slice(&command.to_bytes());
    frame.extend_from_slice(payload);
    frame.push(TERMINATOR);

    frame
}

/// Wake-up preamble sent ahead of `power_on` so a sleeping transceiver
/// has time to sync its UART
pub fn wake_preamble(baud_rate: u32) -> Vec<u8> {
    let count = WAKE_PREAMBLE_LEN
        .iter()
        .find(|(baud, _)| *baud == baud_rate)
        .map(|(_, count)| *count)
        .unwrap_or(WAKE_PREAMBLE_FALLBACK);

    vec![PREAMBLE; count]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_read_frequency_frame() {
        let frame = build_frame(
            &[],
            Address::new(0x94),
            Address::CONTROLLER,
            &CommandCode::cmd(0x03),
            &[],
        );
        assert_eq!(frame, vec![0xFE, 0xFE, 0x94, 0xE0, 0x03, 0xFD]);
    }

    #[test]
    fn test_build_frame_with_sub_and_payload() {
        let frame = build_frame(
            &[],
            Address::new(0x94),
            Address::CONTROLLER,
            &CommandCode::sub(0x14, 0x01),
            &[0x01, 0x28],
        );
        assert_eq!(
            frame,
            vec![0xFE, 0xFE, 0x94, 0xE0, 0x14, 0x01, 0x01, 0x28, 0xFD]
        );
    }

    #[test]
    fn test_build_frame_with_preamble() {
        let frame = build_frame(
            &[0xFE; 3],
            Address::new(0x4E),
            Address::CONTROLLER,
            &CommandCode::sub(0x18, 0x01),
            &[],
        );
        assert_eq!(
            frame,
            vec![0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0x4E, 0xE0, 0x18, 0x01, 0xFD]
        );
    }

    #[test]
    fn test_wake_preamble_table() {
        assert_eq!(wake_preamble(115_200).len(), 150);
        assert_eq!(wake_preamble(57_600).len(), 75);
        assert_eq!(wake_preamble(38_400).len(), 50);
        assert_eq!(wake_preamble(19_200).len(), 25);
        assert_eq!(wake_preamble(9_600).len(), 13);
        assert_eq!(wake_preamble(4_800).len(), 7);
        assert!(wake_preamble(19_200).iter().all(|&b| b == PREAMBLE));
    }
}

// Reply classification and frame parsing

use super::error::{RadioError, RadioResult};
use super::types::CommandCode;
use super::{hex_string, NG, PREAMBLE, TERMINATOR};
use nom::{
    bytes::complete::{tag, take_until, take_while},
    number::complete::be_u8,
    IResult,
};
use serde::Serialize;

/// Outcome reported by the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReplyStatus {
    Ok,
    Ng,
}

/// Raw reply bytes up to and including the terminator, with their status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    bytes: Vec<u8>,
    status: ReplyStatus,
}

/// Reply split into addressing and body (command echo plus data)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyFrame<'a> {
    pub dst: u8,
    pub src: u8,
    pub body: &'a [u8],
}

const SYNC: [u8; 2] = [PREAMBLE, PREAMBLE];
const END: [u8; 1] = [TERMINATOR];

fn parse_frame(input: &[u8]) -> IResult<&[u8], ReplyFrame<'_>> {
    let (input, _) = tag(&SYNC[..])(input)?;
    let (input, _) = take_while(|b: u8| b == PREAMBLE)(input)?;
    let (input, dst) = be_u8(input)?;
    let (input, src) = be_u8(input)?;
    let (input, body) = take_until(&END[..])(input)?;
    let (input, _) = tag(&END[..])(input)?;
    Ok((input, ReplyFrame { dst, src, body }))
}

impl Reply {
    /// Classify raw reply bytes. The reply is NG when the byte before the
    /// terminator is 0xFA; anything else at that position is OK.
    pub fn classify(bytes: Vec<u8>) -> Self {
        let status = if bytes.len() > 2 && bytes[bytes.len() - 2] == NG {
            ReplyStatus::Ng
        } else {
            ReplyStatus::Ok
        };
        Self { bytes, status }
    }

    pub fn status(&self) -> ReplyStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    pub fn is_ng(&self) -> bool {
        self.status == ReplyStatus::Ng
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Parse the reply as a single, complete CI-V frame
    pub fn frame(&self) -> RadioResult<ReplyFrame<'_>> {
        match parse_frame(&self.bytes) {
            Ok((rest, frame)) if rest.is_empty() => Ok(frame),
            Ok((rest, _)) => Err(RadioError::MalformedReply(format!(
                "{} trailing bytes after terminator",
                rest.len()
            ))),
            Err(_) => Err(RadioError::MalformedReply(format!(
                "not a CI-V frame: {}",
                hex_string(&self.bytes)
            ))),
        }
    }

    /// Data bytes that follow the echoed command in the reply body
    pub fn data_for(&self, command: &CommandCode) -> RadioResult<&[u8]> {
        let frame = self.frame()?;
        if !command.is_prefix_of(frame.body) {
            return Err(RadioError::MalformedReply(format!(
                "expected reply to {}, got body {}",
                command,
                hex_string(frame.body)
            )));
        }
        Ok(&frame.body[command.len()..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civ::error::ErrorKind;

    #[test]
    fn test_classify() {
        let ok = Reply::classify(vec![0xFE, 0xFE, 0xE0, 0x94, 0xFB, 0xFD]);
        assert!(ok.is_ok());

        let ng = Reply::classify(vec![0xFE, 0xFE, 0xE0, 0x94, 0xFA, 0xFD]);
        assert_eq!(ng.status(), ReplyStatus::Ng);

        // Only the byte before the terminator matters
        let data = Reply::classify(vec![0xFE, 0xFE, 0xE0, 0x94, 0xFA, 0x00, 0xFD]);
        assert!(data.is_ok());

        // Too short to carry a status byte
        assert!(Reply::classify(vec![0xFA, 0xFD]).is_ok());
    }

    #[test]
    fn test_frame_parse() {
        let reply = Reply::classify(vec![
            0xFE, 0xFE, 0xE0, 0x94, 0x03, 0x00, 0x00, 0x00, 0x14, 0x00, 0xFD,
        ]);
        let frame = reply.frame().unwrap();
        assert_eq!(frame.dst, 0xE0);
        assert_eq!(frame.src, 0x94);
        assert_eq!(frame.body, &[0x03, 0x00, 0x00, 0x00, 0x14, 0x00]);

        let data = reply.data_for(&CommandCode::cmd(0x03)).unwrap();
        assert_eq!(data, &[0x00, 0x00, 0x00, 0x14, 0x00]);
    }

    #[test]
    fn test_frame_with_extra_preamble() {
        let reply = Reply::classify(vec![0xFE, 0xFE, 0xFE, 0xE0, 0x94, 0xFB, 0xFD]);
        let frame = reply.frame().unwrap();
        assert_eq!(frame.src, 0x94);
        assert_eq!(frame.body, &[0xFB]);
    }

    #[test]
    fn test_data_for_wrong_command() {
        let reply = Reply::classify(vec![0xFE, 0xFE, 0xE0, 0x94, 0x15, 0x01, 0x01, 0xFD]);
        let err = reply.data_for(&CommandCode::sub(0x15, 0x02)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedReply);
        assert_eq!(
            reply.data_for(&CommandCode::sub(0x15, 0x01)).unwrap(),
            &[0x01]
        );
    }

    #[test]
    fn test_malformed_frames() {
        for bytes in [
            vec![0x00, 0x01, 0xFD],
            vec![0xFE, 0xFE, 0xE0, 0x94, 0x03],
            vec![0xFE, 0xFE, 0xE0, 0x94, 0xFB, 0xFD, 0x00],
        ] {
            let err = Reply::classify(bytes).frame().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedReply);
        }
    }
}

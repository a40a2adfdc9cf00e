// Simulated transceiver behind the Transport trait
// Lets the stack run end to end without a radio attached

use super::comm::{Result, SerialError};
use super::transport::Transport;
use crate::civ::commands::BAND_EDGE_SEPARATOR;
use crate::civ::types::Address;
use crate::civ::{hex_string, NG, OK, PREAMBLE, TERMINATOR};
use crate::codec::{frequency, meter};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// In-memory radio that answers the common CI-V reads and writes.
///
/// Set frequency, mode and levels are remembered for later reads. Commands it
/// does not know are answered with NG.
pub struct FakeTransceiver {
    address: Address,
    echo: bool,
    baud_rate: u32,
    rx: VecDeque<u8>,
    closed: bool,
    powered: bool,
    frequency: u32,
    mode: u8,
    filter: u8,
    levels: HashMap<u8, u16>,
    switches: HashMap<u8, u8>,
    menu: HashMap<(u8, u8), Vec<u8>>,
    ip_plus: bool,
}

/// Band the simulated radio reports as tuned
const BAND_EDGES: (u32, u32) = (30_000, 74_000_000);

impl FakeTransceiver {
    pub fn new(address: Address) -> Self {
        let levels = HashMap::from([(0x01, 128), (0x02, 255), (0x03, 0), (0x06, 64), (0x12, 32)]);

        Self {
            address,
            echo: true,
            baud_rate: 19200,
            rx: VecDeque::new(),
            closed: false,
            powered: true,
            frequency: 14_074_000,
            mode: 0x01,
            filter: 0x01,
            levels,
            switches: HashMap::new(),
            menu: HashMap::new(),
            ip_plus: false,
        }
    }

    /// Toggle the loopback of transmitted bytes (on by default)
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Last value written to a 0x1A 0x05 menu item
    pub fn menu_item(&self, high: u8, low: u8) -> Option<&[u8]> {
        self.menu.get(&(high, low)).map(Vec::as_slice)
    }

    pub fn ip_plus(&self) -> bool {
        self.ip_plus
    }

    /// Reply body (command echo plus data, or a bare OK/NG) for a request body
    fn respond(&mut self, body: &[u8]) -> Vec<u8> {
        match *body {
            [0x02] => {
                let mut out = vec![0x02];
                out.extend_from_slice(&encode_frequency(BAND_EDGES.0));
                out.push(BAND_EDGE_SEPARATOR);
                out.extend_from_slice(&encode_frequency(BAND_EDGES.1));
                out
            }
            [0x03] => {
                let mut out = vec![0x03];
                out.extend_from_slice(&self.frequency_bytes());
                out
            }
            [0x04] => vec![0x04, self.mode, self.filter],
            [0x05, ref data @ ..] => match frequency::decode(data) {
                Ok(hz) => {
                    self.frequency = hz;
                    vec![OK]
                }
                Err(_) => vec![NG],
            },
            [0x06, mode] => {
                self.mode = mode;
                vec![OK]
            }
            [0x06, mode, filter] => {
                self.mode = mode;
                self.filter = filter;
                vec![OK]
            }
            [0x07, ..] | [0x08, ..] | [0x0E, _] => vec![OK],
            [0x14, sub] => {
                let level = self.levels.get(&sub).copied().unwrap_or(0);
                let mut out = vec![0x14, sub];
                out.extend_from_slice(&meter::encode(level).unwrap_or([0, 0]));
                out
            }
            [0x14, sub, high, low] => {
                self.levels.insert(sub, meter::decode2(high, low));
                vec![OK]
            }
            // Squelch open
            [0x15, sub @ (0x01 | 0x05)] => vec![0x15, sub, 0x01],
            [0x15, 0x02] => vec![0x15, 0x02, 0x01, 0x20],
            [0x15, sub @ 0x11..=0x16] => vec![0x15, sub, 0x00, 0x42],
            [0x1A, 0x05, high, low, ref value @ ..] if !value.is_empty() => {
                self.menu.insert((high, low), value.to_vec());
                vec![OK]
            }
            [0x1A, 0x07, state @ (0x00 | 0x01)] => {
                self.ip_plus = state == 0x01;
                vec![OK]
            }
            [0x18, state @ (0x00 | 0x01)] => {
                self.powered = state == 0x01;
                vec![OK]
            }
            [0x19, 0x00] => vec![0x19, 0x00, self.address.value()],
            [0x1C, sub @ (0x00 | 0x01)] => {
                vec![0x1C, sub, self.switches.get(&sub).copied().unwrap_or(0)]
            }
            [0x1C, 0x01, 0x02] => vec![OK],
            [0x1C, sub @ (0x00 | 0x01), state @ (0x00 | 0x01)] => {
                self.switches.insert(sub, state);
                vec![OK]
            }
            _ => vec![NG],
        }
    }

    fn frequency_bytes(&self) -> [u8; frequency::FREQUENCY_BYTES] {
        encode_frequency(self.frequency)
    }
}

fn encode_frequency(hz: u32) -> [u8; frequency::FREQUENCY_BYTES] {
    frequency::encode(hz, (0, u32::MAX)).unwrap_or([0; frequency::FREQUENCY_BYTES])
}

impl Transport for FakeTransceiver {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if self.closed {
            return Err(SerialError::NotOpen);
        }
        if self.echo {
            self.rx.extend(buf.iter().copied());
        }

        let start = buf.iter().position(|&b| b != PREAMBLE).unwrap_or(buf.len());
        let frame = &buf[start..];
        let (dst, src, body) = match frame {
            [dst, src, body @ .., TERMINATOR] => (*dst, *src, body),
            _ => {
                tracing::debug!("fake: ignoring unframed write {}", hex_string(buf));
                return Ok(());
            }
        };
        if dst != self.address.value() && dst != 0x00 {
            return Ok(());
        }

        let reply_body = self.respond(body);
        self.rx
            .extend([PREAMBLE, PREAMBLE, src, self.address.value()]);
        self.rx.extend(reply_body);
        self.rx.push_back(TERMINATOR);
        Ok(())
    }

    async fn read_until(&mut self, terminator: u8) -> Result<Vec<u8>> {
        if self.closed {
            return Err(SerialError::NotOpen);
        }
        match self.rx.iter().position(|&b| b == terminator) {
            Some(pos) => Ok(self.rx.drain(..=pos).collect()),
            None => {
                self.rx.clear();
                Err(SerialError::Timeout(Duration::from_secs(1)))
            }
        }
    }

    fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

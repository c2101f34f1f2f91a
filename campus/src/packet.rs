//! COM_QUERY packet framing, used to trace statements the way a driver
//! would put them on the wire.

use crate::dump::{format_dump, DumpConfig};
use crate::error::PacketError;

/// Command byte of a text-protocol query.
pub const COM_QUERY: u8 = 0x03;

/// Largest payload a single packet can carry.
pub const MAX_PAYLOAD_LEN: usize = 0xFF_FFFF;

/// A text-protocol query packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPacket {
    sequence: u8,
    payload: Vec<u8>,
}

impl QueryPacket {
    /// Frame `sql` as a COM_QUERY packet with the given sequence id.
    pub fn new(sequence: u8, sql: &str) -> Result<Self, PacketError> {
        let size = sql.len() + 1;
        if size > MAX_PAYLOAD_LEN {
            return Err(PacketError::PayloadTooLarge { size });
        }

        let mut payload = Vec::with_capacity(size);
        payload.push(COM_QUERY);
        payload.extend_from_slice(sql.as_bytes());
        Ok(Self { sequence, payload })
    }

    /// 3-byte little-endian payload length followed by the sequence id.
    pub fn header(&self) -> [u8; 4] {
        let len = (self.payload.len() as u32).to_le_bytes();
        [len[0], len[1], len[2], self.sequence]
    }

    /// Command byte followed by the statement text.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Hex dump of the packet, header first.
    pub fn dump(&self, config: &DumpConfig) -> String {
        let header = self.header();
        format_dump(config, Some(self.payload.as_slice()), 0, None, Some(&header[..]))
    }
}

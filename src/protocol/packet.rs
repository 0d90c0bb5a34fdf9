use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// MySQL packet header (zero-copy)
///
/// Layout matches MySQL wire protocol:
/// - length: 3 bytes (little-endian, payload length)
/// - sequence_id: 1 byte
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable, IntoBytes)]
pub struct PacketHeader {
    pub length: [u8; 3],
    pub sequence_id: u8,
}

impl PacketHeader {
    pub fn encode(length: usize, sequence_id: u8) -> Self {
        let [a, b, c, _] = (length as u32).to_le_bytes();
        Self {
            length: [a, b, c],
            sequence_id,
        }
    }

    pub fn length(&self) -> usize {
        let [a, b, c] = self.length;
        u32::from_le_bytes([a, b, c, 0]) as usize
    }
}

/// Helper function to write packet header
#[inline]
pub fn write_packet_header(out: &mut Vec<u8>, sequence_id: u8, payload_length: usize) {
    out.extend_from_slice(PacketHeader::encode(payload_length, sequence_id).as_bytes());
}

/// OK packet payload (minimal header only)
///
/// Layout: 0x00 (or 0xFE when it terminates a result set) followed by:
/// - affected_rows: length-encoded integer
/// - last_insert_id: length-encoded integer
/// - status_flags: 2 bytes
/// - warnings: 2 bytes
/// - info: variable-length string
#[derive(Debug, Clone, Copy)]
pub struct OkPayloadBytes<'a>(pub &'a [u8]);

impl<'a> OkPayloadBytes<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.0
    }
}

/// ERR packet payload, starting with the 0xFF header
#[derive(Debug, Clone, Copy)]
pub struct ErrPayloadBytes<'a>(pub &'a [u8]);

impl<'a> ErrPayloadBytes<'a> {
    pub fn bytes(&self) -> &'a [u8] {
        self.0
    }
}

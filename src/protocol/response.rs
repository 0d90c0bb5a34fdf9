use crate::constant::{
    CapabilityFlags, EOF_HEADER, ERR_HEADER, LEGACY_EOF_MAX_LENGTH, MAX_PAYLOAD_LENGTH, OK_HEADER,
    ServerStatusFlags,
};
use crate::error::{Error, Result};
use crate::protocol::packet::{ErrPayloadBytes, OkPayloadBytes};
use crate::protocol::primitive::*;
use zerocopy::byteorder::little_endian::U16 as U16LE;
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Kind of a packet received while reading rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Row,
    Eof,
    Err,
}

/// Detect packet type from the first byte
///
/// A row's first column is NULL (0xFB) or a length-encoded string, and a
/// length-encoded integer never starts with 0xFF, so 0xFF always means ERR.
/// A column starting with 0xFE declares at least 2^24 bytes, which only fits
/// in a maximum-size frame, so a shorter 0xFE packet is the terminator.
pub fn detect_packet_type(payload: &[u8], capabilities: CapabilityFlags) -> Result<PacketType> {
    let Some(&header) = payload.first() else {
        return Err(Error::InvalidPacket);
    };

    let eof_limit = if capabilities.contains(CapabilityFlags::CLIENT_DEPRECATE_EOF) {
        MAX_PAYLOAD_LENGTH
    } else {
        LEGACY_EOF_MAX_LENGTH
    };

    match header {
        ERR_HEADER => Ok(PacketType::Err),
        EOF_HEADER if payload.len() < eof_limit => Ok(PacketType::Eof),
        _ => Ok(PacketType::Row),
    }
}

/// OK packet response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OkPayload {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status_flags: ServerStatusFlags,
    pub warnings: u16,
}

impl OkPayload {
    /// Decode a completion packet, which must start with 0x00
    pub fn decode(payload: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(payload);
        let header = cursor.read_u8()?;
        if header != OK_HEADER {
            return Err(Error::UnexpectedHeader {
                expected: OK_HEADER,
                found: header,
            });
        }
        Self::decode_body(&mut cursor)
    }

    /// Decode the OK packet that ends a result set under `CLIENT_DEPRECATE_EOF`
    pub fn decode_terminator(payload: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(payload);
        let header = cursor.read_u8()?;
        if header != EOF_HEADER {
            return Err(Error::UnexpectedHeader {
                expected: EOF_HEADER,
                found: header,
            });
        }
        Self::decode_body(&mut cursor)
    }

    fn decode_body(cursor: &mut Cursor<'_>) -> Result<Self> {
        let affected_rows = cursor.read_lenenc_int()?;
        let last_insert_id = cursor.read_lenenc_int()?;
        let status_flags = cursor.read_u16()?;
        let warnings = cursor.read_u16()?;

        // The info string and session state changes that may follow are not kept.

        Ok(OkPayload {
            affected_rows,
            last_insert_id,
            status_flags: ServerStatusFlags::from_bits_retain(status_flags),
            warnings,
        })
    }

    /// Append the completion packet to `out`
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.reserve(
            1 + lenenc_int_len(self.affected_rows) + lenenc_int_len(self.last_insert_id) + 4,
        );
        write_u8(out, OK_HEADER);
        write_lenenc_int(out, self.affected_rows);
        write_lenenc_int(out, self.last_insert_id);
        write_u16(out, self.status_flags.bits());
        write_u16(out, self.warnings);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode(&mut out);
        out
    }
}

impl TryFrom<OkPayloadBytes<'_>> for OkPayload {
    type Error = Error;

    fn try_from(bytes: OkPayloadBytes<'_>) -> Result<Self> {
        match bytes.bytes().first() {
            Some(&EOF_HEADER) => Self::decode_terminator(bytes.bytes()),
            _ => Self::decode(bytes.bytes()),
        }
    }
}

/// ERR packet response
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ERROR {} ({}): {}", self.error_code, self.sql_state, self.message)]
pub struct ErrPayload {
    pub error_code: u16,
    pub sql_state: String,
    pub message: String,
}

impl ErrPayload {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Self::try_from(ErrPayloadBytes(payload))
    }

    /// Append the ERR packet to `out`
    ///
    /// The SQL state marker is written only when `sql_state` holds exactly 5 bytes.
    pub fn encode(&self, out: &mut Vec<u8>) {
        write_u8(out, ERR_HEADER);
        write_u16(out, self.error_code);
        if self.sql_state.len() == 5 {
            write_u8(out, b'#');
            out.extend_from_slice(self.sql_state.as_bytes());
        }
        out.extend_from_slice(self.message.as_bytes());
    }
}

impl TryFrom<ErrPayloadBytes<'_>> for ErrPayload {
    type Error = Error;

    fn try_from(bytes: ErrPayloadBytes<'_>) -> Result<Self> {
        let mut cursor = Cursor::new(bytes.bytes());
        let header = cursor.read_u8()?;
        if header != ERR_HEADER {
            return Err(Error::UnexpectedHeader {
                expected: ERR_HEADER,
                found: header,
            });
        }

        let error_code = cursor.read_u16()?;

        // Check for SQL state marker '#'
        let sql_state = if cursor.remaining().first() == Some(&b'#') {
            cursor.read_u8()?;
            String::from_utf8_lossy(cursor.read_fixed(5)?).into_owned()
        } else {
            String::new()
        };

        // Rest is error message
        let message = String::from_utf8_lossy(cursor.read_rest()).into_owned();

        Ok(ErrPayload {
            error_code,
            sql_state,
            message,
        })
    }
}

/// EOF packet response (zero-copy)
///
/// Layout matches MySQL wire protocol after header byte 0xFE:
/// - warnings: 2 bytes (little-endian)
/// - status_flags: 2 bytes (little-endian)
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
pub struct EofPacket {
    pub warnings: U16LE,
    pub status_flags: U16LE,
}

impl EofPacket {
    pub fn warnings(&self) -> u16 {
        self.warnings.get()
    }

    pub fn status_flags(&self) -> ServerStatusFlags {
        ServerStatusFlags::from_bits_retain(self.status_flags.get())
    }
}

/// Read EOF packet (header byte 0xFE, length < 9) - zero-copy
pub fn read_eof_packet(payload: &[u8]) -> Result<&EofPacket> {
    let mut cursor = Cursor::new(payload);
    let header = cursor.read_u8()?;
    if header != EOF_HEADER {
        return Err(Error::UnexpectedHeader {
            expected: EOF_HEADER,
            found: header,
        });
    }

    let body = cursor.read_fixed(4)?;
    EofPacket::ref_from_bytes(body).map_err(|_| Error::InvalidPacket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_ok_packet() {
        let payload = [0x00, 0x03, 0xFC, 0x00, 0x01, 0x02, 0x00, 0x01, 0x00];
        let ok = OkPayload::decode(&payload).unwrap();
        assert_eq!(
            ok,
            OkPayload {
                affected_rows: 3,
                last_insert_id: 256,
                status_flags: ServerStatusFlags::SERVER_STATUS_AUTOCOMMIT,
                warnings: 1,
            }
        );
    }

    #[test]
    fn ok_round_trip() {
        let records = [
            OkPayload::default(),
            OkPayload {
                affected_rows: 250,
                last_insert_id: 251,
                status_flags: ServerStatusFlags::from_bits_retain(0xFFFF),
                warnings: u16::MAX,
            },
            OkPayload {
                affected_rows: 16777216,
                last_insert_id: u64::MAX,
                status_flags: ServerStatusFlags::SERVER_STATUS_IN_TRANS
                    | ServerStatusFlags::SERVER_MORE_RESULTS_EXISTS,
                warnings: 7,
            },
        ];
        for record in records {
            let bytes = record.to_bytes();
            assert_eq!(OkPayload::decode(&bytes).unwrap(), record);
        }
    }

    #[test]
    fn ok_wire_layout() {
        let ok = OkPayload {
            affected_rows: 1,
            last_insert_id: 65536,
            status_flags: ServerStatusFlags::SERVER_STATUS_AUTOCOMMIT,
            warnings: 0,
        };
        assert_eq!(
            ok.to_bytes(),
            vec![0x00, 0x01, 0xFD, 0x00, 0x00, 0x01, 0x02, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn ok_rejects_other_headers() {
        let err = OkPayload::decode(&[0xFF, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedHeader {
                expected: 0x00,
                found: 0xFF
            }
        ));
        // A terminator is not a completion packet.
        assert!(matches!(
            OkPayload::decode(&[0xFE, 0, 0, 2, 0, 0, 0]),
            Err(Error::UnexpectedHeader { .. })
        ));
    }

    #[test]
    fn ok_truncated() {
        let bytes = OkPayload::default().to_bytes();
        for len in 0..bytes.len() {
            assert!(
                matches!(
                    OkPayload::decode(&bytes[..len]),
                    Err(Error::TruncatedInput { .. })
                ),
                "prefix of length {len}"
            );
        }
    }

    #[test]
    fn ok_payload_bytes_accepts_terminator() {
        let payload = [0xFE, 0x00, 0x00, 0x22, 0x00, 0x00, 0x00];
        let ok = OkPayload::try_from(OkPayloadBytes(&payload)).unwrap();
        assert_eq!(ok.status_flags.bits(), 0x0022);
    }

    #[test]
    fn err_round_trip() {
        let err = ErrPayload {
            error_code: 1064,
            sql_state: "42000".to_string(),
            message: "syntax error".to_string(),
        };
        let mut out = Vec::new();
        err.encode(&mut out);
        assert_eq!(&out[..4], &[0xFF, 0x28, 0x04, b'#']);
        assert_eq!(ErrPayload::try_from(ErrPayloadBytes(&out)).unwrap(), err);
        assert_eq!(err.to_string(), "ERROR 1064 (42000): syntax error");
    }

    #[test]
    fn err_without_sql_state() {
        let payload = [0xFF, 0x15, 0x04, b'n', b'o'];
        let err = ErrPayload::decode(&payload).unwrap();
        assert_eq!(err.error_code, 1045);
        assert_eq!(err.sql_state, "");
        assert_eq!(err.message, "no");
    }

    #[test]
    fn err_truncated_sql_state() {
        let payload = [0xFF, 0x28, 0x04, b'#', b'4', b'2'];
        assert!(matches!(
            ErrPayload::try_from(ErrPayloadBytes(&payload)),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn legacy_eof_packet() {
        let payload = [0xFE, 0x02, 0x00, 0x02, 0x00];
        let eof = read_eof_packet(&payload).unwrap();
        assert_eq!(eof.warnings(), 2);
        assert_eq!(eof.status_flags(), ServerStatusFlags::SERVER_STATUS_AUTOCOMMIT);
        assert!(matches!(
            read_eof_packet(&[0xFE]),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn packet_type_detection() {
        let deprecate = CapabilityFlags::CLIENT_PROTOCOL_41 | CapabilityFlags::CLIENT_DEPRECATE_EOF;
        let legacy = CapabilityFlags::CLIENT_PROTOCOL_41;

        assert!(matches!(
            detect_packet_type(&[], legacy),
            Err(Error::InvalidPacket)
        ));
        assert_eq!(detect_packet_type(&[0xFF, 0x28, 0x04], legacy).unwrap(), PacketType::Err);
        assert_eq!(detect_packet_type(&[0xFE], legacy).unwrap(), PacketType::Eof);
        assert_eq!(detect_packet_type(&[0x00], legacy).unwrap(), PacketType::Row);
        assert_eq!(detect_packet_type(&[0xFB], legacy).unwrap(), PacketType::Row);

        // An OK terminator carrying an info string can exceed the legacy limit.
        let long_terminator = [0xFE, 0, 0, 2, 0, 0, 0, 3, b'a', b'b', b'c'];
        assert_eq!(
            detect_packet_type(&long_terminator, legacy).unwrap(),
            PacketType::Row
        );
        assert_eq!(
            detect_packet_type(&long_terminator, deprecate).unwrap(),
            PacketType::Eof
        );
    }
}

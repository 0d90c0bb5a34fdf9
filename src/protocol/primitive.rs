use crate::constant::NULL_MARKER;
use crate::error::{Error, Result};
use zerocopy::FromBytes;
use zerocopy::byteorder::little_endian::{U16 as U16LE, U64 as U64LE};

/// Prefix of a 2-byte length-encoded integer
const LENENC_U16: u8 = 0xFC;
/// Prefix of a 3-byte length-encoded integer
const LENENC_U24: u8 = 0xFD;
/// Prefix of an 8-byte length-encoded integer
const LENENC_U64: u8 = 0xFE;

/// Read position over a borrowed packet payload
///
/// A cursor is reset to each new payload instead of being rebuilt, so one
/// instance can walk every row of a result set. On a failed read the position
/// is unspecified; callers discard the cursor's payload after an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Point the cursor at a new payload and rewind it
    pub fn reset(&mut self, data: &'a [u8]) {
        self.data = data;
        self.pos = 0;
    }

    /// Number of bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining().is_empty()
    }

    fn peek(&self) -> Result<u8> {
        self.remaining()
            .first()
            .copied()
            .ok_or(Error::TruncatedInput {
                needed: 1,
                remaining: 0,
            })
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let rest = self.remaining();
        let (head, _) = rest.split_at_checked(len).ok_or(Error::TruncatedInput {
            needed: len,
            remaining: rest.len(),
        })?;
        self.pos += len;
        Ok(head)
    }

    /// Read 1-byte integer
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.peek()?;
        self.pos += 1;
        Ok(value)
    }

    /// Read 2-byte little-endian integer
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.take(2)?;
        Ok(U16LE::read_from_bytes(bytes)
            .map_err(|_| Error::InvalidPacket)?
            .get())
    }

    /// Read 3-byte little-endian integer
    pub fn read_u24(&mut self) -> Result<u32> {
        let [a, b, c] = *self.read_array::<3>()?;
        Ok(u32::from_le_bytes([a, b, c, 0]))
    }

    /// Read 8-byte little-endian integer
    pub fn read_u64(&mut self) -> Result<u64> {
        let bytes = self.take(8)?;
        Ok(U64LE::read_from_bytes(bytes)
            .map_err(|_| Error::InvalidPacket)?
            .get())
    }

    fn read_array<const N: usize>(&mut self) -> Result<&'a [u8; N]> {
        let bytes = self.take(N)?;
        <&[u8; N]>::try_from(bytes).map_err(|_| Error::InvalidPacket)
    }

    /// Read length-encoded integer
    ///
    /// The NULL marker (0xFB) is left unconsumed and reported as
    /// [`Error::UnexpectedNull`]; use [`Cursor::read_lenenc_bytes`] where NULL is legal.
    pub fn read_lenenc_int(&mut self) -> Result<u64> {
        match self.peek()? {
            NULL_MARKER => Err(Error::UnexpectedNull),
            0xFF => Err(Error::InvalidPacket),
            LENENC_U16 => {
                self.pos += 1;
                self.read_u16().map(u64::from)
            }
            LENENC_U24 => {
                self.pos += 1;
                self.read_u24().map(u64::from)
            }
            LENENC_U64 => {
                self.pos += 1;
                self.read_u64()
            }
            val => {
                self.pos += 1;
                Ok(u64::from(val))
            }
        }
    }

    /// Read length-encoded string
    ///
    /// Returns `None` for the NULL marker, which is distinct from `Some(&[])`.
    pub fn read_lenenc_bytes(&mut self) -> Result<Option<&'a [u8]>> {
        if self.peek()? == NULL_MARKER {
            self.pos += 1;
            return Ok(None);
        }
        let len = self.read_lenenc_int()?;
        let len = usize::try_from(len).map_err(|_| Error::TruncatedInput {
            needed: usize::MAX,
            remaining: self.remaining().len(),
        })?;
        self.take(len).map(Some)
    }

    /// Read fixed-length string
    pub fn read_fixed(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    /// Read remaining data as string
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = self.remaining();
        self.pos = self.data.len();
        rest
    }
}

/// Encoded size of a length-encoded integer
pub fn lenenc_int_len(value: u64) -> usize {
    if value < 251 {
        1
    } else if value < (1 << 16) {
        3
    } else if value < (1 << 24) {
        4
    } else {
        9
    }
}

/// Write 1-byte integer
pub fn write_u8(out: &mut Vec<u8>, value: u8) {
    out.push(value);
}

/// Write 2-byte little-endian integer
pub fn write_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write 3-byte little-endian integer, dropping the high byte
pub fn write_u24(out: &mut Vec<u8>, value: u32) {
    let [a, b, c, _] = value.to_le_bytes();
    out.extend_from_slice(&[a, b, c]);
}

/// Write 8-byte little-endian integer
pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Write length-encoded integer using the shortest form
pub fn write_lenenc_int(out: &mut Vec<u8>, value: u64) {
    match lenenc_int_len(value) {
        1 => out.push(value as u8),
        3 => {
            out.push(LENENC_U16);
            write_u16(out, value as u16);
        }
        4 => {
            out.push(LENENC_U24);
            write_u24(out, value as u32);
        }
        _ => {
            out.push(LENENC_U64);
            write_u64(out, value);
        }
    }
}

/// Write length-encoded bytes
pub fn write_lenenc_bytes(out: &mut Vec<u8>, data: &[u8]) {
    write_lenenc_int(out, data.len() as u64);
    out.extend_from_slice(data);
}

/// Write the length-encoded NULL marker
pub fn write_lenenc_null(out: &mut Vec<u8>) {
    out.push(NULL_MARKER);
}

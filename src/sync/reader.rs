use std::io::BufRead;

use zerocopy::{FromZeros, IntoBytes};

use crate::error::Result;
use crate::protocol::packet::PacketHeader;
use crate::protocol::r#trait::Transport;

/// Frame payload length that signals a continuation frame follows
const CONTINUATION_LENGTH: usize = 0xFFFFFF;

/// [`Transport`] over a blocking byte stream
///
/// After [`Transport::cleanup`] the reader refuses further reads: the bytes left
/// in the stream can no longer be matched to packet boundaries, so the
/// connection has to be dropped rather than reused.
pub struct PacketReader<R> {
    reader: R,
    last_sequence_id: u8,
    discarded: bool,
}

impl<R: BufRead> PacketReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            last_sequence_id: 0,
            discarded: false,
        }
    }

    /// Sequence id of the last frame read
    pub fn last_sequence_id(&self) -> u8 {
        self.last_sequence_id
    }

    /// Whether [`Transport::cleanup`] was called
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }
}

impl<R: BufRead> Transport for PacketReader<R> {
    fn next_packet(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        if self.discarded {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "transport discarded after a protocol error",
            )
            .into());
        }
        self.last_sequence_id = read_payload(&mut self.reader, buffer)?;
        Ok(())
    }

    fn cleanup(&mut self) {
        if !self.discarded {
            tracing::debug!(sequence_id = self.last_sequence_id, "packet reader discarded");
        }
        self.discarded = true;
    }
}

/// Read a complete MySQL payload, concatenating packets if they span multiple 16MB chunks
/// Returns the sequence_id of the last packet read.
#[tracing::instrument(skip_all)]
pub fn read_payload<R: BufRead>(reader: &mut R, buffer: &mut Vec<u8>) -> Result<u8> {
    buffer.clear();

    let mut header = PacketHeader::new_zeroed();
    reader.read_exact(header.as_mut_bytes())?;

    let length = header.length();
    let mut sequence_id = header.sequence_id;

    buffer.resize(length, 0);
    reader.read_exact(buffer)?;

    let mut current_length = length;
    while current_length == CONTINUATION_LENGTH {
        reader.read_exact(header.as_mut_bytes())?;

        current_length = header.length();
        sequence_id = header.sequence_id;

        let prev_len = buffer.len();
        buffer.resize(prev_len + current_length, 0);
        reader.read_exact(buffer.get_mut(prev_len..).unwrap_or_default())?;
    }

    Ok(sequence_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::protocol::packet::write_packet_header;

    fn frame(out: &mut Vec<u8>, sequence_id: u8, payload: &[u8]) {
        write_packet_header(out, sequence_id, payload.len());
        out.extend_from_slice(payload);
    }

    #[test]
    fn reads_frames_in_order() {
        let mut wire = Vec::new();
        frame(&mut wire, 1, b"\x01a");
        frame(&mut wire, 2, b"\xFE");

        let mut reader = PacketReader::new(wire.as_slice());
        let mut buffer = Vec::new();
        reader.next_packet(&mut buffer).unwrap();
        assert_eq!(buffer, b"\x01a");
        assert_eq!(reader.last_sequence_id(), 1);
        reader.next_packet(&mut buffer).unwrap();
        assert_eq!(buffer, b"\xFE");
        assert_eq!(reader.last_sequence_id(), 2);

        assert!(matches!(
            reader.next_packet(&mut buffer),
            Err(Error::Transport(_))
        ));
    }

    #[test]
    fn concatenates_continuation_frames() {
        let first = vec![0xAB; CONTINUATION_LENGTH];
        let mut wire = Vec::new();
        frame(&mut wire, 0, &first);
        frame(&mut wire, 1, b"tail");

        let mut buffer = Vec::new();
        let sequence_id = read_payload(&mut wire.as_slice(), &mut buffer).unwrap();
        assert_eq!(sequence_id, 1);
        assert_eq!(buffer.len(), CONTINUATION_LENGTH + 4);
        assert_eq!(&buffer[CONTINUATION_LENGTH..], b"tail");
    }

    #[test]
    fn cleanup_refuses_further_reads() {
        let mut wire = Vec::new();
        frame(&mut wire, 1, b"\x00");

        let mut reader = PacketReader::new(wire.as_slice());
        reader.cleanup();
        reader.cleanup();
        assert!(reader.is_discarded());

        let mut buffer = Vec::new();
        let Err(Error::Transport(err)) = reader.next_packet(&mut buffer) else {
            panic!("expected transport error");
        };
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionAborted);
    }
}

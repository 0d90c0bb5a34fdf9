use crate::constant::{CapabilityFlags, ServerStatusFlags};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::opts::Opts;
use crate::protocol::packet::ErrPayloadBytes;
use crate::protocol::primitive::Cursor;
use crate::protocol::response::{OkPayload, PacketType, detect_packet_type, read_eof_packet};
use crate::protocol::r#trait::{Rows, Transport};
use crate::value::{TextValue, Value};

/// Iteration state of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsState {
    /// Fields are known and the terminator has not been read
    Active,
    /// The terminator was read
    Ended,
    /// Iteration stopped on an error, see [`TextRows::last_error`]
    Failed,
}

/// Text protocol (COM_QUERY) result set
///
/// Reads `ProtocolText::ResultsetRow` packets from the transport until the
/// terminator. Each packet lands in one buffer that is reused for the whole
/// result set; [`Rows::row_values`] borrows from it.
///
/// ```rs
/// let mut rows = TextRows::new(&mut transport, fields);
/// while rows.advance() {
///     let values = rows.row_values()?;
///     let id: i64 = values[0].get()?;
/// }
/// rows.close()?;
/// ```
pub struct TextRows<T> {
    transport: T,
    fields: Vec<Field>,
    capabilities: CapabilityFlags,
    state: RowsState,
    has_row: bool,
    error: Option<Error>,
    buffer: Vec<u8>,
    rows_affected: u64,
    last_insert_id: u64,
    warnings: u16,
    status_flags: ServerStatusFlags,
}

impl<T: Transport> TextRows<T> {
    /// An empty `fields` means the query returned only a completion packet.
    pub fn new(transport: T, fields: Vec<Field>) -> Self {
        Self::with_opts(transport, fields, &Opts::default())
    }

    pub fn with_opts(transport: T, fields: Vec<Field>, opts: &Opts) -> Self {
        Self {
            transport,
            fields,
            capabilities: opts.capabilities,
            state: RowsState::Active,
            has_row: false,
            error: None,
            buffer: Vec::with_capacity(opts.row_buffer_capacity),
            rows_affected: 0,
            last_insert_id: 0,
            warnings: 0,
            status_flags: ServerStatusFlags::empty(),
        }
    }

    /// Record the counters of the completion packet the session received for this query
    pub fn set_completion(&mut self, ok: &OkPayload) {
        self.rows_affected = ok.affected_rows;
        self.last_insert_id = ok.last_insert_id;
        self.warnings = ok.warnings;
        self.status_flags = ok.status_flags;
    }

    pub fn state(&self) -> RowsState {
        self.state
    }

    /// Warning count of the terminator (or of the completion packet before it is read)
    pub fn warnings(&self) -> u16 {
        self.warnings
    }

    /// Status flags of the terminator (or of the completion packet before it is read)
    pub fn status_flags(&self) -> ServerStatusFlags {
        self.status_flags
    }

    /// Give the transport back, e.g. to issue the next command on the connection
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn end(&mut self) {
        tracing::debug!(warnings = self.warnings, "result set ended");
        self.state = RowsState::Ended;
        self.has_row = false;
    }

    fn fail(&mut self, err: Error) {
        if err.is_desync() {
            tracing::warn!(%err, "discarding transport state");
            self.transport.cleanup();
        } else {
            tracing::debug!(%err, "result set failed");
        }
        self.state = RowsState::Failed;
        self.has_row = false;
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// A failed read leaves the packet boundary unknown, whatever the error says
    fn fail_transport(&mut self, err: Error) {
        tracing::warn!(%err, "transport read failed, discarding transport state");
        self.transport.cleanup();
        self.state = RowsState::Failed;
        self.has_row = false;
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Pick up warnings and status flags from the terminator, if it carries them
    fn read_terminator(&mut self) {
        let summary = if self
            .capabilities
            .contains(CapabilityFlags::CLIENT_DEPRECATE_EOF)
        {
            OkPayload::decode_terminator(&self.buffer).map(|ok| (ok.warnings, ok.status_flags))
        } else {
            read_eof_packet(&self.buffer).map(|eof| (eof.warnings(), eof.status_flags()))
        };

        match summary {
            Ok((warnings, status_flags)) => {
                self.warnings = warnings;
                self.status_flags = status_flags;
            }
            Err(err) => tracing::debug!(%err, "terminator without status"),
        }
    }
}

impl<T: Transport> Rows for TextRows<T> {
    #[tracing::instrument(skip_all)]
    fn advance(&mut self) -> bool {
        self.has_row = false;

        if self.state != RowsState::Active {
            return false;
        }

        // A query without a result set is answered by an OK packet alone.
        if self.fields.is_empty() {
            self.end();
            return false;
        }

        if let Err(err) = self.transport.next_packet(&mut self.buffer) {
            self.fail_transport(err);
            return false;
        }

        match detect_packet_type(&self.buffer, self.capabilities) {
            Ok(PacketType::Row) => {
                self.has_row = true;
                true
            }
            Ok(PacketType::Eof) => {
                self.read_terminator();
                self.end();
                false
            }
            Ok(PacketType::Err) => {
                let err = Error::from(ErrPayloadBytes(&self.buffer));
                self.fail(err);
                false
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    fn row_values(&mut self) -> Result<Vec<Value<'_>>> {
        if self.fields.is_empty() || !self.has_row {
            return Err(Error::EmptyMetadata);
        }

        match decode_text_row(&self.fields, &self.buffer) {
            Ok(values) => Ok(values),
            Err(err) => {
                // The row was framed as one packet but its columns do not fit it.
                tracing::warn!(%err, "discarding transport state");
                self.transport.cleanup();
                self.state = RowsState::Failed;
                self.has_row = false;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip_all)]
    fn close(&mut self) -> Result<()> {
        while self.advance() {}
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn payload(&self) -> &[u8] {
        &self.buffer
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    fn last_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }
}

/// Decode one `ProtocolText::ResultsetRow` payload
///
/// Every column is a length-encoded string or the NULL marker; the payload
/// must hold exactly `fields.len()` of them.
pub fn decode_text_row<'a>(fields: &'a [Field], payload: &'a [u8]) -> Result<Vec<Value<'a>>> {
    let mut cursor = Cursor::new(payload);
    let mut values = Vec::with_capacity(fields.len());

    for field in fields {
        let value = match cursor.read_lenenc_bytes()? {
            None => Value::Null,
            Some(bytes) => Value::Text(TextValue::new(field, bytes)),
        };
        values.push(value);
    }

    if !cursor.is_empty() {
        return Err(Error::TrailingBytes(cursor.remaining().len()));
    }

    Ok(values)
}

//! Packet builders shared by the integration tests

use zero_mysql_rows::protocol::primitive::{write_lenenc_bytes, write_lenenc_null, write_u16};
use zero_mysql_rows::protocol::response::{ErrPayload, OkPayload};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// `ProtocolText::ResultsetRow` payload, `None` meaning NULL
pub fn row(columns: &[Option<&str>]) -> Vec<u8> {
    let mut out = Vec::new();
    for column in columns {
        match column {
            Some(text) => write_lenenc_bytes(&mut out, text.as_bytes()),
            None => write_lenenc_null(&mut out),
        }
    }
    out
}

/// Legacy EOF packet
pub fn eof(warnings: u16, status_flags: u16) -> Vec<u8> {
    let mut out = vec![0xFE];
    write_u16(&mut out, warnings);
    write_u16(&mut out, status_flags);
    out
}

/// OK packet terminating a result set under `CLIENT_DEPRECATE_EOF`
pub fn ok_terminator(ok: &OkPayload) -> Vec<u8> {
    let mut out = ok.to_bytes();
    out[0] = 0xFE;
    out
}

pub fn err_packet(error_code: u16, sql_state: &str, message: &str) -> Vec<u8> {
    let mut out = Vec::new();
    ErrPayload {
        error_code,
        sql_state: sql_state.to_string(),
        message: message.to_string(),
    }
    .encode(&mut out);
    out
}

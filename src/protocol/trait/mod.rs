use auto_impl::auto_impl;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::value::Value;

/// Source of framed packets for one connection
///
/// Implemented for `&mut T` and `Box<T>`, so a result set can either own its
/// transport or borrow it from a connection for the duration of the iteration.
#[auto_impl(&mut, Box)]
pub trait Transport {
    /// Clear `buffer` and fill it with the payload of the next packet
    ///
    /// Frames longer than 16 MiB are already concatenated; `buffer` holds
    /// exactly one logical payload on success.
    fn next_packet(&mut self, buffer: &mut Vec<u8>) -> Result<()>;

    /// Discard connection state after a failure that may have desynchronized
    /// packet boundaries. Must be idempotent.
    fn cleanup(&mut self);
}

/// Pull-based access to the rows of one result set
///
/// The text protocol is the only implementation in this crate; a binary
/// protocol result set can implement the same trait so callers pick the
/// variant matching the command that produced the result set.
pub trait Rows {
    /// Advance to the next row
    ///
    /// Returns `false` once the result set ended or failed, and keeps returning
    /// `false` without touching the transport afterwards.
    fn advance(&mut self) -> bool;

    /// Decode the current row, one value per field
    fn row_values(&mut self) -> Result<Vec<Value<'_>>>;

    /// Drain the remaining rows and return the error that terminated the result set
    fn close(&mut self) -> Result<()>;

    /// Raw payload of the current row packet
    fn payload(&self) -> &[u8];

    fn fields(&self) -> &[Field];

    fn rows_affected(&self) -> u64;

    fn last_insert_id(&self) -> u64;

    fn last_error(&self) -> Option<&Error>;
}

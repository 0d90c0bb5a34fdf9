//! Text protocol result sets and wire primitives for MySQL-compatible servers.
//!
//! - [`protocol::primitive`]: fixed-width and length-encoded integers and strings
//! - [`protocol::response`]: OK, ERR and EOF packets
//! - [`TextRows`]: iterates the rows of one result set over a [`Transport`]

pub mod constant;
pub mod error;
pub mod field;
mod opts;
pub mod protocol;
pub mod raw;
pub mod sync;
pub mod value;

pub use field::Field;
pub use opts::{DEFAULT_CAPABILITIES, Opts};
pub use protocol::command::{RowsState, TextRows};
pub use protocol::{Rows, Transport};
pub use value::{TextValue, Value};

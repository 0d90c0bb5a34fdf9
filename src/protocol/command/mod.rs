pub mod text;

pub use text::{RowsState, TextRows, decode_text_row};

/// MySQL Text Protocol Value Types
use crate::constant::{ColumnFlags, ColumnType};
use crate::error::{Error, Result};
use crate::field::Field;
use crate::raw::FromRawValue;
use simdutf8::basic::from_utf8;

/// One decoded cell of a text protocol row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// NULL value (wire marker 0xFB)
    Null,
    /// Any non-NULL value, including the empty string
    Text(TextValue<'a>),
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Raw bytes of a non-NULL value
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            Value::Null => None,
            Value::Text(text) => Some(text.bytes),
        }
    }

    /// Convert into a Rust type according to the column's declared type
    pub fn get<T: FromRawValue<'a>>(&self) -> Result<T> {
        match *self {
            Value::Null => T::from_null(),
            Value::Text(text) => T::from_text(text),
        }
    }
}

/// Bytes of a non-NULL column together with the metadata needed to interpret them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextValue<'a> {
    pub field: &'a Field,
    pub bytes: &'a [u8],
}

impl<'a> TextValue<'a> {
    pub fn new(field: &'a Field, bytes: &'a [u8]) -> Self {
        Self { field, bytes }
    }

    pub fn column_type(&self) -> ColumnType {
        self.field.column_type
    }

    pub fn flags(&self) -> ColumnFlags {
        self.field.flags
    }

    pub fn as_str(&self) -> Result<&'a str> {
        from_utf8(self.bytes).map_err(|_| {
            Error::BadUsageError(format!(
                "column `{}` ({:?}) is not valid UTF-8",
                self.field.name, self.field.column_type
            ))
        })
    }

    /// Parse the ASCII decimal text of a signed integer column
    pub fn parse_i64(&self) -> Result<i64> {
        self.as_str()?
            .parse()
            .map_err(|_| self.invalid_text("signed integer"))
    }

    /// Parse the ASCII decimal text of an unsigned integer column
    pub fn parse_u64(&self) -> Result<u64> {
        self.as_str()?
            .parse()
            .map_err(|_| self.invalid_text("unsigned integer"))
    }

    pub fn parse_f64(&self) -> Result<f64> {
        self.as_str()?
            .parse()
            .map_err(|_| self.invalid_text("floating point number"))
    }

    fn invalid_text(&self, expected: &str) -> Error {
        Error::BadUsageError(format!(
            "column `{}` ({:?}) holds {:?}, not a {}",
            self.field.name,
            self.field.column_type,
            String::from_utf8_lossy(self.bytes),
            expected
        ))
    }
}

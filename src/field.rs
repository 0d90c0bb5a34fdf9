use crate::constant::{ColumnFlags, ColumnType};

/// Static metadata of one result set column
///
/// Column definition packets are decoded elsewhere; a result set only needs the
/// declared type (and flags) to interpret each text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub column_type: ColumnType,
    pub flags: ColumnFlags,
    pub charset: u16,
}

impl Field {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            flags: ColumnFlags::empty(),
            charset: 0,
        }
    }

    pub fn with_flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_charset(mut self, charset: u16) -> Self {
        self.charset = charset;
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(ColumnFlags::UNSIGNED_FLAG)
    }
}

//! Conversion of text protocol values into Rust types.
//!
//! The text protocol sends every non-NULL value as a string. [`FromRawValue`]
//! interprets that string according to the column's declared type, so an
//! `INT` column decodes into integers and a `VARCHAR` column into `&str`.

use crate::error::{Error, Result};
use crate::value::TextValue;

/// Trait for types that can be decoded from a text protocol value.
///
/// Implementations should return `Err` for unsupported conversions.
pub trait FromRawValue<'buf>: Sized {
    fn from_null() -> Result<Self> {
        Err(Error::BadUsageError(format!(
            "Cannot decode MySQL type NULL to {}",
            std::any::type_name::<Self>()
        )))
    }

    fn from_text(value: TextValue<'buf>) -> Result<Self>;
}

fn unsupported<T>(value: &TextValue<'_>) -> Error {
    Error::BadUsageError(format!(
        "Cannot decode MySQL type {:?} (column `{}`) to {}",
        value.column_type(),
        value.field.name,
        std::any::type_name::<T>()
    ))
}

fn out_of_range<T>(value: &TextValue<'_>) -> Error {
    Error::BadUsageError(format!(
        "Value {:?} of column `{}` does not fit in {}",
        String::from_utf8_lossy(value.bytes),
        value.field.name,
        std::any::type_name::<T>()
    ))
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl FromRawValue<'_> for $t {
            fn from_text(value: TextValue<'_>) -> Result<Self> {
                if !value.column_type().is_integer() {
                    return Err(unsupported::<Self>(&value));
                }
                if value.field.is_unsigned() {
                    <$t>::try_from(value.parse_u64()?).map_err(|_| out_of_range::<Self>(&value))
                } else {
                    <$t>::try_from(value.parse_i64()?).map_err(|_| out_of_range::<Self>(&value))
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl FromRawValue<'_> for $t {
            fn from_text(value: TextValue<'_>) -> Result<Self> {
                if !value.column_type().is_integer() {
                    return Err(unsupported::<Self>(&value));
                }
                <$t>::try_from(value.parse_u64()?).map_err(|_| out_of_range::<Self>(&value))
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl FromRawValue<'_> for f64 {
    fn from_text(value: TextValue<'_>) -> Result<Self> {
        let column_type = value.column_type();
        if column_type.is_float() || column_type.is_decimal() || column_type.is_integer() {
            value.parse_f64()
        } else {
            Err(unsupported::<Self>(&value))
        }
    }
}

impl FromRawValue<'_> for f32 {
    fn from_text(value: TextValue<'_>) -> Result<Self> {
        f64::from_text(value).map(|v| v as f32)
    }
}

impl FromRawValue<'_> for bool {
    fn from_text(value: TextValue<'_>) -> Result<Self> {
        if !value.column_type().is_integer() {
            return Err(unsupported::<Self>(&value));
        }
        Ok(value.parse_i64()? != 0)
    }
}

impl<'buf> FromRawValue<'buf> for &'buf str {
    fn from_text(value: TextValue<'buf>) -> Result<Self> {
        value.as_str()
    }
}

impl FromRawValue<'_> for String {
    fn from_text(value: TextValue<'_>) -> Result<Self> {
        value.as_str().map(ToOwned::to_owned)
    }
}

impl<'buf> FromRawValue<'buf> for &'buf [u8] {
    fn from_text(value: TextValue<'buf>) -> Result<Self> {
        Ok(value.bytes)
    }
}

impl FromRawValue<'_> for Vec<u8> {
    fn from_text(value: TextValue<'_>) -> Result<Self> {
        Ok(value.bytes.to_vec())
    }
}

impl<'buf, T: FromRawValue<'buf>> FromRawValue<'buf> for Option<T> {
    fn from_null() -> Result<Self> {
        Ok(None)
    }

    fn from_text(value: TextValue<'buf>) -> Result<Self> {
        T::from_text(value).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::{ColumnFlags, ColumnType};
    use crate::field::Field;
    use crate::value::Value;

    fn text<'a>(field: &'a Field, bytes: &'a [u8]) -> Value<'a> {
        Value::Text(TextValue::new(field, bytes))
    }

    #[test]
    fn integers() {
        let int = Field::new("id", ColumnType::MYSQL_TYPE_LONG);
        assert_eq!(text(&int, b"-7").get::<i32>().unwrap(), -7);
        assert_eq!(text(&int, b"-7").get::<i64>().unwrap(), -7);
        assert!(matches!(
            text(&int, b"-7").get::<u32>(),
            Err(Error::BadUsageError(_))
        ));
        assert!(matches!(
            text(&int, b"300").get::<i8>(),
            Err(Error::BadUsageError(_))
        ));

        let unsigned = Field::new("n", ColumnType::MYSQL_TYPE_LONGLONG)
            .with_flags(ColumnFlags::UNSIGNED_FLAG);
        assert_eq!(
            text(&unsigned, b"18446744073709551615").get::<u64>().unwrap(),
            u64::MAX
        );
        assert!(text(&unsigned, b"18446744073709551615").get::<i64>().is_err());
    }

    #[test]
    fn floats_and_bools() {
        let double = Field::new("d", ColumnType::MYSQL_TYPE_DOUBLE);
        assert_eq!(text(&double, b"1.5").get::<f64>().unwrap(), 1.5);
        assert_eq!(text(&double, b"1.5").get::<f32>().unwrap(), 1.5);

        let decimal = Field::new("price", ColumnType::MYSQL_TYPE_NEWDECIMAL);
        assert_eq!(text(&decimal, b"12.25").get::<f64>().unwrap(), 12.25);
        assert_eq!(text(&decimal, b"12.25").get::<&str>().unwrap(), "12.25");

        let tiny = Field::new("flag", ColumnType::MYSQL_TYPE_TINY);
        assert!(text(&tiny, b"1").get::<bool>().unwrap());
        assert!(!text(&tiny, b"0").get::<bool>().unwrap());
    }

    #[test]
    fn strings_and_bytes() {
        let name = Field::new("name", ColumnType::MYSQL_TYPE_VAR_STRING);
        assert_eq!(text(&name, b"alice").get::<&str>().unwrap(), "alice");
        assert_eq!(text(&name, b"").get::<String>().unwrap(), "");
        assert_eq!(text(&name, b"alice").get::<&[u8]>().unwrap(), b"alice");
        assert_eq!(text(&name, b"alice").get::<Vec<u8>>().unwrap(), b"alice");
        assert!(matches!(
            text(&name, b"alice").get::<i64>(),
            Err(Error::BadUsageError(_))
        ));
    }

    #[test]
    fn null_handling() {
        assert_eq!(Value::Null.get::<Option<i64>>().unwrap(), None);
        assert_eq!(Value::Null.get::<Option<&str>>().unwrap(), None);
        assert!(matches!(
            Value::Null.get::<i64>(),
            Err(Error::BadUsageError(_))
        ));

        let name = Field::new("name", ColumnType::MYSQL_TYPE_VAR_STRING);
        assert_eq!(
            text(&name, b"").get::<Option<&str>>().unwrap(),
            Some("")
        );
    }
}

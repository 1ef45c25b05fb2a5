//! ClickHouse type translation.
//!
//! Catalog types are matched on their unparameterized base name (`FixedString`, not
//! `FixedString(16)`) and mapped to the Rust type the generator should emit.
//!
//! Supported mappings:
//! - UInt8 → `bool` or `u8` (see [`TypeTranslator::uint8_as_bool`])
//! - UInt16/32/64, Int8/16/32/64 → fixed-width integers
//! - Float32/64 → `f32` / `f64`
//! - Date, DateTime → `chrono::NaiveDateTime`
//! - FixedString → [`FixedString`]
//! - String → `String`
//! - everything else → `Vec<u8>`

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::traits::Column;

/// Target-language type assigned to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Timestamp,
    FixedString,
    String,
    Bytes,
}

impl HostType {
    /// Rust type path emitted for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Timestamp => "chrono::NaiveDateTime",
            Self::FixedString => "schemagen_clickhouse::FixedString",
            Self::String => "String",
            Self::Bytes => "Vec<u8>",
        }
    }
}

impl std::fmt::Display for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps catalog base types to [`HostType`]s.
///
/// The only knob is how `UInt8` is emitted; it is fixed per translator instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTranslator {
    uint8_as_bool: bool,
}

impl TypeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `UInt8` columns as `bool` instead of `u8`.
    pub fn uint8_as_bool(mut self, enabled: bool) -> Self {
        self.uint8_as_bool = enabled;
        self
    }

    pub fn is_uint8_as_bool(&self) -> bool {
        self.uint8_as_bool
    }

    /// Translate an unparameterized catalog type. Never fails.
    pub fn translate(&self, db_type: &str) -> HostType {
        match db_type {
            "UInt8" if self.uint8_as_bool => HostType::Bool,
            "UInt8" => HostType::U8,
            "UInt16" => HostType::U16,
            "UInt32" => HostType::U32,
            "UInt64" => HostType::U64,
            "Int8" => HostType::I8,
            "Int16" => HostType::I16,
            "Int32" => HostType::I32,
            "Int64" => HostType::I64,
            "Float32" => HostType::F32,
            "Float64" => HostType::F64,
            "Date" | "DateTime" => HostType::Timestamp,
            "FixedString" => HostType::FixedString,
            "String" => HostType::String,
            _ => HostType::Bytes,
        }
    }

    /// Fill in `host_type` from the column's base type.
    pub fn translate_column(&self, mut column: Column) -> Column {
        column.host_type = Some(self.translate(&column.db_type));
        column
    }
}

/// Value type for `FixedString(N)` columns.
///
/// ClickHouse pads fixed strings with NUL bytes; the padding is stripped from both
/// ends on construction, so comparisons and display see only the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedString(String);

impl FixedString {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim_matches('\0');
        if trimmed.len() == raw.len() {
            Self(raw)
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for FixedString {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for FixedString {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl AsRef<str> for FixedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FixedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FixedString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FixedString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &[(&str, HostType)] = &[
        ("UInt16", HostType::U16),
        ("UInt32", HostType::U32),
        ("UInt64", HostType::U64),
        ("Int8", HostType::I8),
        ("Int16", HostType::I16),
        ("Int32", HostType::I32),
        ("Int64", HostType::I64),
        ("Float32", HostType::F32),
        ("Float64", HostType::F64),
        ("Date", HostType::Timestamp),
        ("DateTime", HostType::Timestamp),
        ("FixedString", HostType::FixedString),
        ("String", HostType::String),
    ];

    #[test]
    fn test_known_types() {
        let translator = TypeTranslator::new();
        for (db_type, expected) in KNOWN {
            assert_eq!(translator.translate(db_type), *expected, "{db_type}");
        }
    }

    #[test]
    fn test_uint8_depends_on_flag() {
        assert_eq!(TypeTranslator::new().translate("UInt8"), HostType::U8);
        assert_eq!(
            TypeTranslator::new().uint8_as_bool(true).translate("UInt8"),
            HostType::Bool
        );
    }

    #[test]
    fn test_flag_only_affects_uint8() {
        let translator = TypeTranslator::new().uint8_as_bool(true);
        for (db_type, expected) in KNOWN {
            assert_eq!(translator.translate(db_type), *expected, "{db_type}");
        }
    }

    #[test]
    fn test_unknown_types_fall_back_to_bytes() {
        let translator = TypeTranslator::new();
        for db_type in ["UUID", "Decimal", "Array", "Nullable", "", "string", "FixedString(16)"] {
            let host = translator.translate(db_type);
            assert_eq!(host, HostType::Bytes, "{db_type}");
            assert!(!host.as_str().is_empty());
        }
    }

    #[test]
    fn test_emitted_paths_resolve_without_imports() {
        assert_eq!(HostType::FixedString.as_str(), "schemagen_clickhouse::FixedString");
        assert_eq!(HostType::Timestamp.as_str(), "chrono::NaiveDateTime");
        assert_eq!(HostType::Bytes.to_string(), "Vec<u8>");
    }

    #[test]
    fn test_translate_column() {
        let column = Column::new("code", "FixedString(3)", "");
        let column = TypeTranslator::new().translate_column(column);

        assert_eq!(column.db_type, "FixedString");
        assert_eq!(column.host_type, Some(HostType::FixedString));
    }

    #[test]
    fn test_fixed_string_trims_nul_padding() {
        let value = FixedString::from("abc\0\0\0");
        assert_eq!(value.as_str(), "abc");
        assert_eq!(value.to_string(), "abc");

        let value = FixedString::from("\0ab\0");
        assert_eq!(value.as_str(), "ab");
    }

    #[test]
    fn test_fixed_string_serde() {
        let value: FixedString = serde_json::from_str("\"US\\u0000\\u0000\"").unwrap();
        assert_eq!(value.as_str(), "US");
        assert_eq!(serde_json::to_string(&value).unwrap(), "\"US\"");
    }
}

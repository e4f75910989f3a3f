//! # Scalar Type Table
//!
//! Process-wide mapping from member type names to storage column types.
//! Built once on first use and never written afterwards.

use crate::model::TypeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Storage type of a scalar or string-list column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    /// Text.
    Text,
    /// Signed integer.
    Integer,
    /// Floating point.
    Real,
    /// Boolean.
    Boolean,
    /// Date or timestamp, stored as ISO-8601 text.
    Date,
    /// Serialized map.
    Map,
    /// Serialized list of strings.
    StringList,
}

impl StorageType {
    /// SQLite column type.
    pub fn sql_type(self) -> &'static str {
        match self {
            StorageType::Text | StorageType::Date => "TEXT",
            StorageType::Integer => "INT",
            StorageType::Real => "DOUBLE",
            StorageType::Boolean => "BOOL",
            StorageType::Map | StorageType::StringList => "BLOB",
        }
    }
}

const ENTRIES: &[(&str, StorageType)] = &[
    ("String", StorageType::Text),
    ("std::string::String", StorageType::Text),
    ("alloc::string::String", StorageType::Text),
    ("str", StorageType::Text),
    ("bool", StorageType::Boolean),
    ("i8", StorageType::Integer),
    ("i16", StorageType::Integer),
    ("i32", StorageType::Integer),
    ("i64", StorageType::Integer),
    ("isize", StorageType::Integer),
    ("u8", StorageType::Integer),
    ("u16", StorageType::Integer),
    ("u32", StorageType::Integer),
    ("f32", StorageType::Real),
    ("f64", StorageType::Real),
    ("NaiveDate", StorageType::Date),
    ("NaiveDateTime", StorageType::Date),
    ("chrono::NaiveDate", StorageType::Date),
    ("chrono::NaiveDateTime", StorageType::Date),
    ("DateTime<?>", StorageType::Date),
    ("chrono::DateTime<?>", StorageType::Date),
    ("HashMap<?, ?>", StorageType::Map),
    ("BTreeMap<?, ?>", StorageType::Map),
    ("std::collections::HashMap<?, ?>", StorageType::Map),
    ("std::collections::BTreeMap<?, ?>", StorageType::Map),
    ("serde_json::Map<?, ?>", StorageType::Map),
    ("serde_json::Value", StorageType::Map),
];

/// Read-only lookup from type name to [`StorageType`].
#[derive(Debug)]
pub struct ScalarTypeTable {
    entries: HashMap<&'static str, StorageType>,
}

impl ScalarTypeTable {
    /// The shared table.
    pub fn global() -> &'static ScalarTypeTable {
        static TABLE: OnceLock<ScalarTypeTable> = OnceLock::new();
        TABLE.get_or_init(|| ScalarTypeTable {
            entries: ENTRIES.iter().copied().collect(),
        })
    }

    /// Storage type for `ty`: exact form first, then the argument-erased form.
    pub fn lookup(&self, ty: &TypeRef) -> Option<StorageType> {
        self.entries
            .get(ty.to_string().as_str())
            .or_else(|| self.entries.get(ty.erased().as_str()))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_lookup() {
        let table = ScalarTypeTable::global();
        let cases = vec![
            ("String", StorageType::Text),
            ("&'static str", StorageType::Text),
            ("i64", StorageType::Integer),
            ("f32", StorageType::Real),
            ("bool", StorageType::Boolean),
            ("chrono::NaiveDate", StorageType::Date),
        ];
        for (input, expected) in cases {
            let ty = TypeRef::parse(input).expect(input);
            assert_eq!(table.lookup(&ty), Some(expected), "{input}");
        }
    }

    #[test]
    fn test_generic_lookup_is_erased() {
        let table = ScalarTypeTable::global();
        let ty = TypeRef::parse("HashMap<String, Vec<i32>>").unwrap();
        assert_eq!(table.lookup(&ty), Some(StorageType::Map));
        let ty = TypeRef::parse("DateTime<Utc>").unwrap();
        assert_eq!(table.lookup(&ty), Some(StorageType::Date));
    }

    #[test]
    fn test_unsupported_types() {
        let table = ScalarTypeTable::global();
        assert_eq!(table.lookup(&TypeRef::new("u64")), None);
        assert_eq!(table.lookup(&TypeRef::new("crate::Cat")), None);
        assert_eq!(table.lookup(&TypeRef::parse("Option<String>").unwrap()), None);
    }

    #[test]
    fn test_sql_types() {
        assert_eq!(StorageType::Text.sql_type(), "TEXT");
        assert_eq!(StorageType::StringList.sql_type(), "BLOB");
        assert_eq!(StorageType::Boolean.sql_type(), "BOOL");
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════
//  Type Code
// ════════════════════════════════════════════════════════════════

/// Kind of a column, as declared by the server per query.
///
/// Only scalar kinds have a default decoding rule, see [`crate::codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeCode {
    Bool,
    Int64,
    Float64,
    Float32,
    Timestamp,
    Date,
    String,
    Bytes,
    Array,
    Struct,
    Numeric,
    Json,
    Proto,
    Enum,
    #[serde(rename = "TYPE_CODE_UNSPECIFIED", alias = "UNSPECIFIED")]
    Unspecified,
    /// Any code this client does not know. Non-null values of it are
    /// rejected at decode time; nulls still decode.
    #[serde(other)]
    Unknown,
}

impl TypeCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCode::Bool => "BOOL",
            TypeCode::Int64 => "INT64",
            TypeCode::Float64 => "FLOAT64",
            TypeCode::Float32 => "FLOAT32",
            TypeCode::Timestamp => "TIMESTAMP",
            TypeCode::Date => "DATE",
            TypeCode::String => "STRING",
            TypeCode::Bytes => "BYTES",
            TypeCode::Array => "ARRAY",
            TypeCode::Struct => "STRUCT",
            TypeCode::Numeric => "NUMERIC",
            TypeCode::Json => "JSON",
            TypeCode::Proto => "PROTO",
            TypeCode::Enum => "ENUM",
            TypeCode::Unspecified => "TYPE_CODE_UNSPECIFIED",
            TypeCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════
//  Type / Field
// ════════════════════════════════════════════════════════════════

/// Declared type of a column or parameter.
///
/// Wire shape: `{"code": "ARRAY", "arrayElementType": {...}}` or
/// `{"code": "STRUCT", "structType": {"fields": [...]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    pub code: TypeCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_element_type: Option<Box<Type>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_type: Option<StructType>,
}

impl Type {
    pub fn new(code: TypeCode) -> Self {
        Self {
            code,
            array_element_type: None,
            struct_type: None,
        }
    }

    /// `ARRAY<element>`.
    pub fn array(element: Type) -> Self {
        Self {
            code: TypeCode::Array,
            array_element_type: Some(Box::new(element)),
            struct_type: None,
        }
    }

    /// `STRUCT<fields...>`.
    pub fn structure(fields: Vec<Field>) -> Self {
        Self {
            code: TypeCode::Struct,
            array_element_type: None,
            struct_type: Some(StructType { fields }),
        }
    }
}

impl From<TypeCode> for Type {
    fn from(code: TypeCode) -> Self {
        Self::new(code)
    }
}

/// Ordered fields of a `STRUCT` type; also the wire form of a row type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructType {
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One named, typed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Empty for anonymous struct fields / unnamed expressions.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: Type,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<Type>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  ColumnSchema
// ════════════════════════════════════════════════════════════════

/// Shape of every row in one result: ordered fields plus a name index.
///
/// Built once per response and shared by `Arc` across all decoded rows.
/// With duplicate names, lookup resolves to the first position.
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    fields: Vec<Field>,
    by_name: HashMap<String, usize>,
}

impl ColumnSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        let mut by_name = HashMap::with_capacity(fields.len());
        for (i, field) in fields.iter().enumerate() {
            by_name.entry(field.name.clone()).or_insert(i);
        }
        Self { fields, by_name }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Position of the column named `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

impl From<StructType> for ColumnSchema {
    fn from(row_type: StructType) -> Self {
        Self::new(row_type.fields)
    }
}

impl PartialEq for ColumnSchema {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

//! The record model shared by both directions of the pipeline. Inbound
//! records are either `Structured` (schema plus positional values) or
//! `Dynamic` (a string-keyed map), matched explicitly by every consumer
//! instead of branching on missing schemas.

use serde::{Deserialize, Serialize};

use crate::errors::GraphLinkError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    Text,
    Bytes,
    Decimal { scale: i32 },
    Date,
    Time,
    Timestamp,
}

impl FieldType {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldType::Int8 => "INT8",
            FieldType::Int16 => "INT16",
            FieldType::Int32 => "INT32",
            FieldType::Int64 => "INT64",
            FieldType::Float32 => "FLOAT32",
            FieldType::Float64 => "FLOAT64",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Text => "STRING",
            FieldType::Bytes => "BYTES",
            FieldType::Decimal { .. } => "DECIMAL",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Timestamp => "TIMESTAMP",
        }
    }
}

/// A concrete value. Temporal variants carry milliseconds since the Unix
/// epoch (UTC); `Decimal` carries the lexical form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(String),
    Date(i64),
    Time(i64),
    Timestamp(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<Field>,
}

impl RecordSchema {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field<N: Into<String>>(mut self, name: N, field_type: FieldType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            field_type,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A structured value: a schema and one slot per field, `None` meaning null.
#[derive(Clone, Debug, PartialEq)]
pub struct StructData {
    pub schema: RecordSchema,
    pub values: Vec<Option<FieldValue>>,
}

impl StructData {
    pub fn new(schema: RecordSchema) -> Self {
        let len = schema.fields.len();
        Self {
            schema,
            values: vec![None; len],
        }
    }

    pub fn set<N: AsRef<str>>(mut self, name: N, value: FieldValue) -> Result<Self, GraphLinkError> {
        let idx = self.schema.field_index(name.as_ref()).ok_or_else(|| {
            GraphLinkError::configuration(format!(
                "schema '{}' has no field named '{}'",
                self.schema.name,
                name.as_ref()
            ))
        })?;
        self.values[idx] = Some(value);
        Ok(self)
    }

    /// Value of the named field; `None` for both null and unknown fields.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema
            .field_index(name)
            .and_then(|idx| self.values[idx].as_ref())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecordKey {
    Primitive {
        field_type: FieldType,
        value: Option<FieldValue>,
    },
    Struct(StructData),
}

pub type DynamicMap = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum RecordValue {
    Structured(StructData),
    Dynamic(DynamicMap),
}

/// One inbound change record headed for the store.
#[derive(Clone, Debug, PartialEq)]
pub struct SinkRecord {
    pub topic: String,
    pub key: Option<RecordKey>,
    pub value: RecordValue,
}

/// One outbound record produced from a polled row, tagged with the partition
/// and offset the host uses for redelivery bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceRecord {
    pub partition: (String, String),
    pub offset: (String, String),
    pub topic: String,
    pub schema: RecordSchema,
    pub values: Vec<Option<FieldValue>>,
}

impl SourceRecord {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema
            .field_index(name)
            .and_then(|idx| self.values[idx].as_ref())
    }
}

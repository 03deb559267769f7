//! Binds a record's values into a prepared statement's positional slots:
//! key fields first, then non-key fields, with logical types tried before
//! primitive coercions.

use serde_json::Value as JsonValue;

use crate::{
    config::PrimaryKeyMode,
    errors::GraphLinkError,
    field_meta::FieldLayout,
    record::{DynamicMap, FieldType, FieldValue, RecordKey, RecordValue, SinkRecord, StructData},
    store::ParameterSink,
};

pub struct RecordBinder<'a> {
    pk_mode: PrimaryKeyMode,
    type_name_key: &'a str,
    layout: &'a FieldLayout,
}

impl<'a> RecordBinder<'a> {
    pub fn new(
        pk_mode: PrimaryKeyMode,
        type_name_key: &'a str,
        layout: &'a FieldLayout,
    ) -> Self {
        Self {
            pk_mode,
            type_name_key,
            layout,
        }
    }

    pub fn bind<S: ParameterSink + ?Sized>(
        &self,
        sink: &mut S,
        record: &SinkRecord,
    ) -> Result<(), GraphLinkError> {
        match &record.value {
            RecordValue::Structured(value) => {
                let next = self.bind_key_fields(sink, record, value, 1)?;
                self.bind_nonkey_fields(sink, value, next)
            }
            RecordValue::Dynamic(map) => self.bind_dynamic(sink, map),
        }
    }

    fn bind_key_fields<S: ParameterSink + ?Sized>(
        &self,
        sink: &mut S,
        record: &SinkRecord,
        value: &StructData,
        mut idx: usize,
    ) -> Result<usize, GraphLinkError> {
        match self.pk_mode {
            PrimaryKeyMode::None => {
                debug_assert!(self.layout.key_field_names.is_empty());
            }
            PrimaryKeyMode::RecordKey => match record.key.as_ref() {
                Some(RecordKey::Primitive {
                    field_type,
                    value: key_value,
                }) => {
                    debug_assert_eq!(self.layout.key_field_names.len(), 1);
                    bind_field(sink, idx, *field_type, key_value.as_ref())?;
                    idx += 1;
                }
                Some(RecordKey::Struct(key_data)) => {
                    for name in &self.layout.key_field_names {
                        let field = key_data.schema.field(name).ok_or_else(|| {
                            GraphLinkError::configuration(format!(
                                "record key schema does not contain field: {name}"
                            ))
                        })?;
                        bind_field(sink, idx, field.field_type, key_data.get(name))?;
                        idx += 1;
                    }
                }
                None => {
                    return Err(GraphLinkError::configuration(
                        "PK mode is record_key, but the record has no key",
                    ));
                }
            },
            PrimaryKeyMode::RecordValue => {
                for name in &self.layout.key_field_names {
                    let field = value.schema.field(name).ok_or_else(|| {
                        GraphLinkError::configuration(format!(
                            "record value schema does not contain field: {name}"
                        ))
                    })?;
                    bind_field(sink, idx, field.field_type, value.get(name))?;
                    idx += 1;
                }
            }
        }
        Ok(idx)
    }

    fn bind_nonkey_fields<S: ParameterSink + ?Sized>(
        &self,
        sink: &mut S,
        value: &StructData,
        mut idx: usize,
    ) -> Result<(), GraphLinkError> {
        for name in &self.layout.nonkey_field_names {
            let field = value.schema.field(name).ok_or_else(|| {
                GraphLinkError::configuration(format!(
                    "record value schema does not contain field: {name}"
                ))
            })?;
            bind_field(sink, idx, field.field_type, value.get(name))?;
            idx += 1;
        }
        Ok(())
    }

    /// Schemaless fallback: the indicator field is stripped, a field ending
    /// in an `_id` token is bound first as a string, and the remaining map
    /// values are bound by their runtime type.
    fn bind_dynamic<S: ParameterSink + ?Sized>(
        &self,
        sink: &mut S,
        map: &DynamicMap,
    ) -> Result<(), GraphLinkError> {
        let indicator = format!("_{}", self.type_name_key);
        let mut table_key = None;
        let mut id_key = None;
        for name in map.keys() {
            if name.ends_with(&indicator) {
                table_key = Some(name.clone());
            }
            if name.ends_with("_id") {
                id_key = Some(name.clone());
            }
        }
        let mut idx = 1;
        if let Some(id_key) = &id_key {
            let text = json_to_string(&map[id_key]);
            sink.set_string(idx, &text)?;
            idx += 1;
        }
        for (name, value) in map {
            if Some(name) == table_key.as_ref() || Some(name) == id_key.as_ref() {
                continue;
            }
            bind_json_value(sink, idx, value)?;
            idx += 1;
        }
        Ok(())
    }
}

/// Binds one value at `idx`: null directly, then logical types, then
/// primitives. FLOAT64 values are narrowed to a 32-bit integer on the wire;
/// existing consumers of the original connector depend on it, so it stays.
pub fn bind_field<S: ParameterSink + ?Sized>(
    sink: &mut S,
    idx: usize,
    field_type: FieldType,
    value: Option<&FieldValue>,
) -> Result<(), GraphLinkError> {
    let value = match value {
        None => return sink.set_null(idx),
        Some(value) => value,
    };
    match (field_type, value) {
        (FieldType::Decimal { .. }, FieldValue::Decimal(text)) => sink.set_decimal(idx, text),
        (FieldType::Date, FieldValue::Date(millis)) => sink.set_date(idx, *millis),
        (FieldType::Time, FieldValue::Time(millis)) => sink.set_time(idx, *millis),
        (FieldType::Timestamp, FieldValue::Timestamp(millis)) => {
            sink.set_timestamp(idx, *millis)
        }
        (
            FieldType::Int8 | FieldType::Int16 | FieldType::Int32 | FieldType::Int64,
            value,
        ) => sink.set_i32(idx, integer_value(value, field_type)?),
        (FieldType::Float32, FieldValue::Float32(v)) => sink.set_f32(idx, *v),
        (FieldType::Float64, FieldValue::Float64(v)) => sink.set_i32(idx, *v as i32),
        (FieldType::Boolean, FieldValue::Boolean(v)) => sink.set_bool(idx, *v),
        (FieldType::Text, FieldValue::Text(v)) => sink.set_string(idx, v),
        (other, _) => Err(GraphLinkError::unsupported_type(other.describe())),
    }
}

fn integer_value(value: &FieldValue, field_type: FieldType) -> Result<i32, GraphLinkError> {
    match value {
        FieldValue::Int8(v) => Ok(i32::from(*v)),
        FieldValue::Int16(v) => Ok(i32::from(*v)),
        FieldValue::Int32(v) => Ok(*v),
        FieldValue::Int64(v) => Ok(*v as i32),
        _ => Err(GraphLinkError::unsupported_type(field_type.describe())),
    }
}

fn bind_json_value<S: ParameterSink + ?Sized>(
    sink: &mut S,
    idx: usize,
    value: &JsonValue,
) -> Result<(), GraphLinkError> {
    match value {
        JsonValue::Null => sink.set_null(idx),
        JsonValue::Bool(v) => sink.set_bool(idx, *v),
        JsonValue::Number(n) => {
            if let Some(v) = n.as_i64() {
                sink.set_i32(idx, v as i32)
            } else {
                sink.set_i32(idx, n.as_f64().unwrap_or_default() as i32)
            }
        }
        JsonValue::String(v) => sink.set_string(idx, v),
        other => sink.set_string(idx, &other.to_string()),
    }
}

fn json_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(v) => v.clone(),
        other => other.to_string(),
    }
}

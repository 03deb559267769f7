//! Partitions an inbound record's fields into the primary-key and non-key
//! column sets of the synthesized upsert, under the configured key policy.

use ahash::AHashSet;

use crate::{
    config::PrimaryKeyMode,
    errors::GraphLinkError,
    record::{RecordKey, RecordValue},
};

/// Key and non-key field names, disjoint and in first-seen order. Neither
/// set contains the element-type indicator field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldLayout {
    pub key_field_names: Vec<String>,
    pub nonkey_field_names: Vec<String>,
}

impl FieldLayout {
    pub fn extract(
        table_name: &str,
        pk_mode: PrimaryKeyMode,
        configured_pk_fields: &[String],
        key: Option<&RecordKey>,
        value: &RecordValue,
        type_name_key: &str,
    ) -> Result<FieldLayout, GraphLinkError> {
        let indicator = format!("_{type_name_key}");
        let key_field_names = match pk_mode {
            PrimaryKeyMode::None => Vec::new(),
            PrimaryKeyMode::RecordKey => {
                extract_record_key_pk(table_name, configured_pk_fields, key)?
            }
            PrimaryKeyMode::RecordValue => {
                extract_record_value_pk(table_name, configured_pk_fields, value, &indicator)?
            }
        };

        let key_set: AHashSet<&str> = key_field_names.iter().map(String::as_str).collect();
        let mut nonkey_field_names = Vec::new();
        if let RecordValue::Structured(data) = value {
            for name in data.schema.field_names() {
                if !key_set.contains(name) && !name.contains(&indicator) {
                    nonkey_field_names.push(name.to_string());
                }
            }
        }

        Ok(FieldLayout {
            key_field_names,
            nonkey_field_names,
        })
    }
}

fn extract_record_key_pk(
    table_name: &str,
    configured: &[String],
    key: Option<&RecordKey>,
) -> Result<Vec<String>, GraphLinkError> {
    match key {
        None => Err(GraphLinkError::configuration(format!(
            "PK mode for table '{table_name}' is record_key, but record key schema is missing"
        ))),
        Some(RecordKey::Primitive { .. }) => {
            if configured.len() != 1 {
                return Err(GraphLinkError::configuration(format!(
                    "Need exactly one PK column defined since the key schema for records \
                     is a primitive type, defined columns are: {configured:?}"
                )));
            }
            Ok(vec![configured[0].clone()])
        }
        Some(RecordKey::Struct(data)) => {
            if configured.is_empty() {
                return Ok(data.schema.field_names().map(str::to_string).collect());
            }
            for name in configured {
                if data.schema.field(name).is_none() {
                    return Err(GraphLinkError::configuration(format!(
                        "PK mode for table '{table_name}' is record_key with configured \
                         PK fields {configured:?}, but record key schema does not contain \
                         field: {name}"
                    )));
                }
            }
            Ok(configured.to_vec())
        }
    }
}

fn extract_record_value_pk(
    table_name: &str,
    configured: &[String],
    value: &RecordValue,
    indicator: &str,
) -> Result<Vec<String>, GraphLinkError> {
    let data = match value {
        RecordValue::Structured(data) => data,
        RecordValue::Dynamic(_) => {
            return Err(GraphLinkError::configuration(format!(
                "PK mode for table '{table_name}' is record_value, but record value \
                 schema is missing"
            )));
        }
    };
    if configured.is_empty() {
        return Ok(data
            .schema
            .field_names()
            .filter(|name| !name.contains(indicator))
            .map(str::to_string)
            .collect());
    }
    for name in configured {
        if data.schema.field(name).is_none() {
            return Err(GraphLinkError::configuration(format!(
                "PK mode for table '{table_name}' is record_value with configured \
                 PK fields {configured:?}, but record value schema does not contain \
                 field: {name}"
            )));
        }
    }
    Ok(configured.to_vec())
}

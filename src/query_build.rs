//! Decides where a record is headed (which table, vertex or edge) and
//! synthesizes the upsert statement body for it.

use crate::{
    bind::RecordBinder,
    column::TableRef,
    config::SinkConfig,
    errors::GraphLinkError,
    field_meta::FieldLayout,
    record::{RecordValue, SinkRecord},
    store::StoreConnection,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Vertex,
    Edge,
    /// No indicator field was found; the upsert degenerates to an empty
    /// kind and table and is passed through as-is.
    Unspecified,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::Unspecified => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTarget {
    pub table: TableRef,
    pub kind: ElementKind,
}

/// Scans the record for a field named `<prefix>_..._<type_name_key>`: the
/// prefix selects the element kind (`e*` means edge, anything else vertex)
/// and the field's runtime value names the target table.
pub fn resolve_target(record: &SinkRecord, type_name_key: &str) -> ResolvedTarget {
    let indicator = format!("_{type_name_key}");
    match &record.value {
        RecordValue::Structured(data) => {
            for field in &data.schema.fields {
                if let Some(kind) = indicator_kind(&field.name, &indicator) {
                    let table = data
                        .get(&field.name)
                        .and_then(|v| v.as_text())
                        .unwrap_or_default();
                    return ResolvedTarget {
                        table: TableRef::new("", "", table),
                        kind,
                    };
                }
            }
        }
        RecordValue::Dynamic(map) => {
            for (name, value) in map {
                if let Some(kind) = indicator_kind(name, &indicator) {
                    let table = value.as_str().unwrap_or_default();
                    return ResolvedTarget {
                        table: TableRef::new("", "", table),
                        kind,
                    };
                }
            }
        }
    }
    ResolvedTarget {
        table: TableRef::default(),
        kind: ElementKind::Unspecified,
    }
}

fn indicator_kind(name: &str, indicator: &str) -> Option<ElementKind> {
    let pos = name.find('_')?;
    if pos == 0 || !name.ends_with(indicator) {
        return None;
    }
    if name[..pos].starts_with('e') {
        Some(ElementKind::Edge)
    } else {
        Some(ElementKind::Vertex)
    }
}

/// A synthesized upsert, bound to the record it was built from and consumed
/// exactly once by the write executor.
#[derive(Debug)]
pub struct UpsertStatement<'a> {
    pub body: String,
    pub table: TableRef,
    pub kind: ElementKind,
    pub columns: Vec<String>,
    pub layout: FieldLayout,
    pub record: &'a SinkRecord,
}

impl UpsertStatement<'_> {
    /// Prepares, binds and executes the statement against the store.
    pub fn run(
        &self,
        conn: &dyn StoreConnection,
        config: &SinkConfig,
    ) -> Result<(), GraphLinkError> {
        let mut stmt = conn.prepare(&self.body)?;
        let binder = RecordBinder::new(config.pk_mode, &config.type_name_key, &self.layout);
        binder.bind(stmt.as_mut(), self.record)?;
        stmt.execute_batch()
    }
}

pub fn generate_query<'a>(
    record: &'a SinkRecord,
    config: &SinkConfig,
) -> Result<UpsertStatement<'a>, GraphLinkError> {
    let target = resolve_target(record, &config.type_name_key);
    let layout = FieldLayout::extract(
        &target.table.table,
        config.pk_mode,
        &config.pk_fields,
        record.key.as_ref(),
        &record.value,
        &config.type_name_key,
    )?;
    let columns = column_list(&target, &layout, record, &config.type_name_key);
    let placeholders = vec!["?"; columns.len()].join(",");
    let body = format!(
        "INSERT INTO {} {} ({}) VALUES ({})",
        target.kind.as_str(),
        target.table.table,
        columns.join(","),
        placeholders
    );
    Ok(UpsertStatement {
        body,
        table: target.table,
        kind: target.kind,
        columns,
        layout,
        record,
    })
}

/// Column order matches the binder: key fields first, non-key fields after.
/// Vertex targets get a leading `id` column when keyed without one, and
/// vertex-prefixed non-key attributes collapse onto the `id` column. With no
/// layout at all (schemaless records), columns come straight from the
/// dynamic map minus the indicator field.
fn column_list(
    target: &ResolvedTarget,
    layout: &FieldLayout,
    record: &SinkRecord,
    type_name_key: &str,
) -> Vec<String> {
    let indicator = format!("_{type_name_key}");
    let mut columns = Vec::new();
    if target.kind == ElementKind::Vertex {
        if !layout.key_field_names.is_empty()
            && !layout.key_field_names.iter().any(|k| k == "id")
        {
            columns.push("id".to_string());
        }
        columns.extend(layout.key_field_names.iter().cloned());
        if !layout.nonkey_field_names.is_empty() {
            for name in &layout.nonkey_field_names {
                if name.starts_with("v_") {
                    columns.push("id".to_string());
                } else {
                    columns.push(name.clone());
                }
            }
        } else if let RecordValue::Dynamic(map) = &record.value {
            columns.push("id".to_string());
            for name in map.keys() {
                if !name.ends_with(&indicator) && !name.starts_with("v_") {
                    columns.push(name.clone());
                }
            }
        }
    } else {
        columns.extend(layout.key_field_names.iter().cloned());
        if !layout.nonkey_field_names.is_empty() {
            columns.extend(layout.nonkey_field_names.iter().cloned());
        } else if let RecordValue::Dynamic(map) = &record.value {
            for name in map.keys() {
                if !name.ends_with(&indicator) {
                    columns.push(name.clone());
                }
            }
        }
    }
    columns
}

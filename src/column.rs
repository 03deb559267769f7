use serde::{Deserialize, Serialize};

use crate::store::ColumnMetadata;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new<C, S, T>(catalog: C, schema: S, table: T) -> Self
    where
        C: Into<String>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// The name records are tagged with. Prefers the table component; some
    /// drivers only fill the catalog slot, so fall back to that.
    pub fn resolved_name(&self) -> &str {
        if !self.table.is_empty() {
            &self.table
        } else {
            &self.catalog
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: TableRef,
    pub name: String,
    pub alias: String,
}

impl ColumnRef {
    pub fn new<N, A>(table: TableRef, name: N, alias: A) -> Self
    where
        N: Into<String>,
        A: Into<String>,
    {
        Self {
            table,
            name: name.into(),
            alias: alias.into(),
        }
    }
}

/// One destination/source column as the store's metadata describes it.
/// `primary_key` is always false at construction; key membership is resolved
/// by the field layout, not the metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: ColumnRef,
    pub type_code: i32,
    pub type_name: String,
    pub precision: i32,
    pub scale: i32,
    pub display_size: i32,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub signed: bool,
}

/// Describes one column, degrading any capability the provider lacks to
/// empty/zero/false.
pub fn describe_column(meta: &dyn ColumnMetadata, col: usize) -> ColumnDescriptor {
    let table = TableRef::new(
        meta.catalog_name(col).unwrap_or_default(),
        meta.schema_name(col).unwrap_or_default(),
        meta.table_name(col).unwrap_or_default(),
    );
    let name = meta.column_name(col).unwrap_or_default();
    let alias = meta.column_label(col).unwrap_or_else(|| name.clone());
    ColumnDescriptor {
        id: ColumnRef::new(table, name, alias),
        type_code: meta.column_type(col).unwrap_or_default(),
        type_name: meta.column_type_name(col).unwrap_or_default(),
        precision: meta.precision(col).unwrap_or_default(),
        scale: meta.scale(col).unwrap_or_default(),
        display_size: meta.display_size(col).unwrap_or_default(),
        auto_increment: meta.is_auto_increment(col).unwrap_or_default(),
        primary_key: false,
        signed: meta.is_signed(col).unwrap_or_default(),
    }
}

pub fn describe_columns(meta: &dyn ColumnMetadata) -> Vec<ColumnDescriptor> {
    (1..=meta.column_count())
        .map(|col| describe_column(meta, col))
        .collect()
}

/// Synthesizes the element-type column from the lead column: the indicator
/// suffix is spliced in after the first underscore of its name, or appended
/// as `_<suffix>` when there is none.
pub fn table_name_column(meta: &dyn ColumnMetadata, type_name_key: &str) -> ColumnDescriptor {
    let lead = describe_column(meta, 1);
    let name = match lead.id.name.find('_') {
        Some(pos) if pos > 0 => format!("{}{}", &lead.id.name[..=pos], type_name_key),
        _ => format!("{}_{}", lead.id.name, type_name_key),
    };
    ColumnDescriptor {
        id: ColumnRef::new(lead.id.table, name.clone(), name),
        type_code: lead.type_code,
        type_name: lead.type_name,
        precision: lead.precision,
        scale: lead.scale,
        display_size: lead.display_size,
        auto_increment: false,
        primary_key: false,
        signed: false,
    }
}

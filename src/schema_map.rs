//! Builds the output schema for a poll cycle from cursor metadata: one field
//! per supported column plus the synthetic element-type field, with a reader
//! list running parallel to the fields.

use crate::{
    column::{describe_columns, table_name_column},
    record::{FieldType, RecordSchema},
    store::{ColumnMetadata, ReadKind},
    type_map::map_column,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnReader {
    /// 1-based cursor position of the source column.
    pub column: usize,
    /// `None` fields take the resolved table name as a constant.
    pub kind: Option<ReadKind>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SchemaMapping {
    schema: RecordSchema,
    readers: Vec<ColumnReader>,
}

impl SchemaMapping {
    /// Builds the mapping from the cursor's metadata. Unsupported columns are
    /// skipped; the synthetic element-type field is always appended, so the
    /// schema never comes out empty. The second element of the pair is the
    /// resolved table name used as that field's constant value.
    pub fn create(
        schema_name: &str,
        metadata: &dyn ColumnMetadata,
        type_name_key: &str,
    ) -> (SchemaMapping, String) {
        let mut schema = RecordSchema::new(schema_name);
        let mut readers = Vec::new();
        for (idx, def) in describe_columns(metadata).iter().enumerate() {
            if let Some(mapping) = map_column(def) {
                schema = schema.with_field(def.id.alias.clone(), mapping.field_type);
                readers.push(ColumnReader {
                    column: idx + 1,
                    kind: mapping.reader,
                });
            }
        }
        let table_column = table_name_column(metadata, type_name_key);
        let resolved_table = table_column.id.table.resolved_name().to_string();
        schema = schema.with_field(table_column.id.alias, FieldType::Text);
        readers.push(ColumnReader {
            column: 1,
            kind: None,
        });
        (SchemaMapping { schema, readers }, resolved_table)
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn readers(&self) -> &[ColumnReader] {
        &self.readers
    }
}

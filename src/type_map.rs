//! Maps a column's native type code onto an output field type and the reader
//! that extracts its values. One lookup produces both, so the schema a column
//! gets and the way its values are read can never disagree.

use tracing::{debug, warn};

use crate::{
    column::ColumnDescriptor,
    record::FieldType,
    store::{type_codes as tc, ReadKind},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnMapping {
    pub field_type: FieldType,
    /// `None` means the field exists in the schema but carries no cursor
    /// extractor (binary payloads); downstream fills it with the resolved
    /// table-name constant.
    pub reader: Option<ReadKind>,
}

impl ColumnMapping {
    fn of(field_type: FieldType, reader: ReadKind) -> Option<Self> {
        Some(Self {
            field_type,
            reader: Some(reader),
        })
    }

    fn without_reader(field_type: FieldType) -> Option<Self> {
        Some(Self {
            field_type,
            reader: None,
        })
    }
}

/// Resolves the mapping for one column, or `None` when the native type is
/// unsupported and the column is to be omitted from the schema.
pub fn map_column(def: &ColumnDescriptor) -> Option<ColumnMapping> {
    match def.type_code {
        tc::LONGNVARCHAR | tc::NCHAR | tc::NVARCHAR | tc::LONGVARCHAR | tc::CHAR
        | tc::VARCHAR | tc::DATALINK | tc::CLOB | tc::SQLXML | tc::NCLOB => {
            ColumnMapping::of(FieldType::Text, ReadKind::Text)
        }
        tc::BIT => ColumnMapping::of(FieldType::Int8, ReadKind::I8),
        tc::TINYINT => {
            if def.signed {
                ColumnMapping::of(FieldType::Int8, ReadKind::I8)
            } else {
                ColumnMapping::of(FieldType::Int16, ReadKind::I16)
            }
        }
        tc::BIGINT => ColumnMapping::of(FieldType::Int64, ReadKind::I64),
        tc::LONGVARBINARY | tc::VARBINARY | tc::BINARY | tc::BLOB => {
            ColumnMapping::without_reader(FieldType::Bytes)
        }
        tc::NULL => {
            debug!(
                column = %def.id.alias,
                "NULL-typed column not currently supported"
            );
            None
        }
        tc::NUMERIC => {
            debug!(
                precision = def.precision,
                scale = def.scale,
                "mapping NUMERIC column"
            );
            map_numeric(def.precision, def.scale)
        }
        tc::DECIMAL => {
            debug!(
                precision = def.precision,
                scale = def.scale,
                "mapping DECIMAL column"
            );
            let scale = if def.scale == -127 { 127 } else { def.scale };
            ColumnMapping::of(FieldType::Decimal { scale }, ReadKind::Decimal)
        }
        tc::INTEGER => {
            if def.signed {
                ColumnMapping::of(FieldType::Int32, ReadKind::I32)
            } else {
                ColumnMapping::of(FieldType::Int64, ReadKind::I64)
            }
        }
        tc::SMALLINT => {
            if def.signed {
                ColumnMapping::of(FieldType::Int16, ReadKind::I16)
            } else {
                ColumnMapping::of(FieldType::Int32, ReadKind::I32)
            }
        }
        tc::FLOAT | tc::DOUBLE => ColumnMapping::of(FieldType::Float64, ReadKind::F64),
        tc::REAL => ColumnMapping::of(FieldType::Float32, ReadKind::F32),
        tc::BOOLEAN => ColumnMapping::of(FieldType::Boolean, ReadKind::Bool),
        tc::DATE => ColumnMapping::of(FieldType::Date, ReadKind::DateMillis),
        tc::TIME => ColumnMapping::of(FieldType::Time, ReadKind::TimeMillis),
        tc::TIMESTAMP => ColumnMapping::of(FieldType::Timestamp, ReadKind::TimestampMillis),
        other => {
            warn!(
                code = other,
                type_name = %def.type_name,
                "native type not currently supported"
            );
            None
        }
    }
}

/// NUMERIC(precision, scale): scale 0 with precision under 19 picks an
/// integer width by precision breakpoints; a positive scale becomes a 64-bit
/// float; anything else needs arbitrary precision.
fn map_numeric(precision: i32, scale: i32) -> Option<ColumnMapping> {
    if scale == 0 && precision < 19 {
        if precision > 9 {
            ColumnMapping::of(FieldType::Int64, ReadKind::I64)
        } else if precision > 4 {
            ColumnMapping::of(FieldType::Int32, ReadKind::I32)
        } else if precision > 2 {
            ColumnMapping::of(FieldType::Int16, ReadKind::I16)
        } else {
            ColumnMapping::of(FieldType::Int8, ReadKind::I8)
        }
    } else if scale > 0 {
        ColumnMapping::of(FieldType::Float64, ReadKind::F64)
    } else {
        ColumnMapping::of(FieldType::Decimal { scale }, ReadKind::Decimal)
    }
}

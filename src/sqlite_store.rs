//! SQLite adapter for the store traits. Column metadata is reconstructed from
//! declared types, which SQLite keeps as free text; the decoder maps the
//! declaration back onto the native type codes, including any `(precision,
//! scale)` suffix.

use std::path::Path;

use rusqlite::{
    types::{Null, Value as SqlValue},
    Connection, Rows, Statement,
};

use crate::{
    errors::GraphLinkError,
    record::FieldValue,
    store::{
        type_codes as tc, ColumnMetadata, ParameterSink, ReadKind, RowCursor, StoreConnection,
        StoreStatement,
    },
};

fn store_err(err: rusqlite::Error) -> GraphLinkError {
    GraphLinkError::execution(err.to_string())
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GraphLinkError> {
        Connection::open(path)
            .map(|conn| Self { conn })
            .map_err(|err| GraphLinkError::connection(err.to_string()))
    }

    pub fn open_in_memory() -> Result<Self, GraphLinkError> {
        Connection::open_in_memory()
            .map(|conn| Self { conn })
            .map_err(|err| GraphLinkError::connection(err.to_string()))
    }

    /// Runs raw SQL directly, bypassing the statement surface. Intended for
    /// schema setup and fixtures.
    pub fn execute_sql(&self, sql: &str) -> Result<(), GraphLinkError> {
        self.conn.execute_batch(sql).map_err(store_err)
    }
}

impl StoreConnection for SqliteStore {
    fn prepare(&self, sql: &str) -> Result<Box<dyn StoreStatement + '_>, GraphLinkError> {
        let stmt = self.conn.prepare(sql).map_err(store_err)?;
        Ok(Box::new(SqliteStatement { stmt }))
    }
}

pub struct SqliteStatement<'a> {
    stmt: Statement<'a>,
}

impl ParameterSink for SqliteStatement<'_> {
    fn set_null(&mut self, idx: usize) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, Null).map_err(store_err)
    }

    fn set_i32(&mut self, idx: usize, value: i32) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, value).map_err(store_err)
    }

    fn set_f32(&mut self, idx: usize, value: f32) -> Result<(), GraphLinkError> {
        self.stmt
            .raw_bind_parameter(idx, f64::from(value))
            .map_err(store_err)
    }

    fn set_f64(&mut self, idx: usize, value: f64) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, value).map_err(store_err)
    }

    fn set_bool(&mut self, idx: usize, value: bool) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, value).map_err(store_err)
    }

    fn set_string(&mut self, idx: usize, value: &str) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, value).map_err(store_err)
    }

    fn set_decimal(&mut self, idx: usize, value: &str) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, value).map_err(store_err)
    }

    fn set_date(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, millis).map_err(store_err)
    }

    fn set_time(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, millis).map_err(store_err)
    }

    fn set_timestamp(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError> {
        self.stmt.raw_bind_parameter(idx, millis).map_err(store_err)
    }
}

impl StoreStatement for SqliteStatement<'_> {
    fn execute_batch(&mut self) -> Result<(), GraphLinkError> {
        self.stmt.raw_execute().map(|_| ()).map_err(store_err)
    }

    fn query(&mut self) -> Result<Box<dyn RowCursor + '_>, GraphLinkError> {
        let columns = snapshot_columns(&self.stmt);
        let width = columns.columns.len();
        let rows = self.stmt.raw_query();
        Ok(Box::new(SqliteCursor {
            columns,
            rows,
            width,
            current: Vec::new(),
        }))
    }
}

#[derive(Clone, Debug)]
struct SqliteColumn {
    name: String,
    type_code: i32,
    type_name: String,
    precision: i32,
    scale: i32,
}

#[derive(Clone, Debug, Default)]
struct SqliteColumns {
    columns: Vec<SqliteColumn>,
}

impl SqliteColumns {
    fn get(&self, col: usize) -> Option<&SqliteColumn> {
        self.columns.get(col.checked_sub(1)?)
    }
}

impl ColumnMetadata for SqliteColumns {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    // SQLite does not track catalogs or schemas per result column.
    fn catalog_name(&self, _col: usize) -> Option<String> {
        None
    }

    fn schema_name(&self, _col: usize) -> Option<String> {
        None
    }

    fn table_name(&self, _col: usize) -> Option<String> {
        None
    }

    fn column_name(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.name.clone())
    }

    fn column_label(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.name.clone())
    }

    fn column_type(&self, col: usize) -> Option<i32> {
        self.get(col).map(|c| c.type_code)
    }

    fn column_type_name(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.type_name.clone())
    }

    fn precision(&self, col: usize) -> Option<i32> {
        self.get(col).map(|c| c.precision)
    }

    fn scale(&self, col: usize) -> Option<i32> {
        self.get(col).map(|c| c.scale)
    }

    fn display_size(&self, _col: usize) -> Option<i32> {
        None
    }

    fn is_auto_increment(&self, _col: usize) -> Option<bool> {
        None
    }

    fn is_signed(&self, _col: usize) -> Option<bool> {
        Some(true)
    }
}

fn snapshot_columns(stmt: &Statement<'_>) -> SqliteColumns {
    let columns = stmt
        .columns()
        .iter()
        .map(|col| {
            let decl = col.decl_type();
            let (type_code, precision, scale) = decode_decl(decl);
            SqliteColumn {
                name: col.name().to_string(),
                type_code,
                type_name: decl.unwrap_or_default().to_string(),
                precision,
                scale,
            }
        })
        .collect();
    SqliteColumns { columns }
}

/// Maps a declared column type back onto a native type code. An expression
/// column with no declaration reads as a blob, matching SQLite's affinity
/// fallback.
fn decode_decl(decl: Option<&str>) -> (i32, i32, i32) {
    let decl = match decl {
        Some(decl) => decl.trim().to_ascii_uppercase(),
        None => return (tc::BLOB, 0, 0),
    };
    let (base, precision, scale) = split_decl(&decl);
    let code = if base.contains("BIGINT") {
        tc::BIGINT
    } else if base.contains("SMALLINT") {
        tc::SMALLINT
    } else if base.contains("TINYINT") {
        tc::TINYINT
    } else if base.contains("INT") {
        tc::INTEGER
    } else if base.contains("DECIMAL") {
        tc::DECIMAL
    } else if base.contains("NUMERIC") {
        tc::NUMERIC
    } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
        tc::VARCHAR
    } else if base.contains("BLOB") || base.is_empty() {
        tc::BLOB
    } else if base.contains("REAL") || base.contains("FLOA") || base.contains("DOUB") {
        tc::DOUBLE
    } else if base.contains("BOOL") {
        tc::BOOLEAN
    } else if base.contains("DATETIME") || base.contains("TIMESTAMP") {
        tc::TIMESTAMP
    } else if base.contains("DATE") {
        tc::DATE
    } else if base.contains("TIME") {
        tc::TIME
    } else {
        tc::OTHER
    };
    (code, precision, scale)
}

fn split_decl(decl: &str) -> (&str, i32, i32) {
    let open = match decl.find('(') {
        Some(pos) => pos,
        None => return (decl, 0, 0),
    };
    let base = decl[..open].trim_end();
    let args = decl[open + 1..].trim_end_matches(')');
    let mut parts = args.splitn(2, ',');
    let precision = parts
        .next()
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or_default();
    let scale = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_default();
    (base, precision, scale)
}

pub struct SqliteCursor<'s> {
    columns: SqliteColumns,
    rows: Rows<'s>,
    width: usize,
    current: Vec<SqlValue>,
}

impl RowCursor for SqliteCursor<'_> {
    fn metadata(&self) -> &dyn ColumnMetadata {
        &self.columns
    }

    fn advance(&mut self) -> Result<bool, GraphLinkError> {
        match self.rows.next().map_err(store_err)? {
            Some(row) => {
                self.current.clear();
                for idx in 0..self.width {
                    self.current
                        .push(row.get::<_, SqlValue>(idx).map_err(store_err)?);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn read(&self, col: usize, kind: ReadKind) -> Result<Option<FieldValue>, GraphLinkError> {
        let value = col
            .checked_sub(1)
            .and_then(|idx| self.current.get(idx))
            .ok_or_else(|| GraphLinkError::execution("cursor is not positioned on a row"))?;
        match value {
            SqlValue::Null => Ok(None),
            value => convert(value, kind).map(Some),
        }
    }

    fn read_string_named(&self, name: &str) -> Result<Option<String>, GraphLinkError> {
        let idx = self
            .columns
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| {
                GraphLinkError::execution(format!("no column named '{name}' in result set"))
            })?;
        let value = self
            .current
            .get(idx)
            .ok_or_else(|| GraphLinkError::execution("cursor is not positioned on a row"))?;
        Ok(match value {
            SqlValue::Null => None,
            SqlValue::Text(text) => Some(text.clone()),
            SqlValue::Integer(v) => Some(v.to_string()),
            SqlValue::Real(v) => Some(v.to_string()),
            SqlValue::Blob(_) => None,
        })
    }
}

fn convert(value: &SqlValue, kind: ReadKind) -> Result<FieldValue, GraphLinkError> {
    match (kind, value) {
        (ReadKind::I8, SqlValue::Integer(v)) => Ok(FieldValue::Int8(*v as i8)),
        (ReadKind::I16, SqlValue::Integer(v)) => Ok(FieldValue::Int16(*v as i16)),
        (ReadKind::I32, SqlValue::Integer(v)) => Ok(FieldValue::Int32(*v as i32)),
        (ReadKind::I64, SqlValue::Integer(v)) => Ok(FieldValue::Int64(*v)),
        (ReadKind::F32, SqlValue::Real(v)) => Ok(FieldValue::Float32(*v as f32)),
        (ReadKind::F32, SqlValue::Integer(v)) => Ok(FieldValue::Float32(*v as f32)),
        (ReadKind::F64, SqlValue::Real(v)) => Ok(FieldValue::Float64(*v)),
        (ReadKind::F64, SqlValue::Integer(v)) => Ok(FieldValue::Float64(*v as f64)),
        (ReadKind::Bool, SqlValue::Integer(v)) => Ok(FieldValue::Boolean(*v != 0)),
        (ReadKind::Text, SqlValue::Text(text)) => Ok(FieldValue::Text(text.clone())),
        (ReadKind::Decimal, SqlValue::Text(text)) => Ok(FieldValue::Decimal(text.clone())),
        (ReadKind::Decimal, SqlValue::Integer(v)) => Ok(FieldValue::Decimal(v.to_string())),
        (ReadKind::Decimal, SqlValue::Real(v)) => Ok(FieldValue::Decimal(v.to_string())),
        (ReadKind::DateMillis, SqlValue::Integer(v)) => Ok(FieldValue::Date(*v)),
        (ReadKind::TimeMillis, SqlValue::Integer(v)) => Ok(FieldValue::Time(*v)),
        (ReadKind::TimestampMillis, SqlValue::Integer(v)) => Ok(FieldValue::Timestamp(*v)),
        (kind, other) => Err(GraphLinkError::execution(format!(
            "cannot read a {} column as {kind:?}",
            other.data_type()
        ))),
    }
}

//! Capability traits for the store boundary. The pipeline never opens
//! connections or negotiates credentials; it consumes these traits and leaves
//! the transport to the adapter (see [`crate::sqlite_store`] and
//! [`crate::memory_store`]).

use crate::{errors::GraphLinkError, record::FieldValue};

/// Native type codes reported by store metadata, numbered after the JDBC
/// `java.sql.Types` constants the wire protocol inherited.
pub mod type_codes {
    pub const BIT: i32 = -7;
    pub const TINYINT: i32 = -6;
    pub const SMALLINT: i32 = 5;
    pub const INTEGER: i32 = 4;
    pub const BIGINT: i32 = -5;
    pub const FLOAT: i32 = 6;
    pub const REAL: i32 = 7;
    pub const DOUBLE: i32 = 8;
    pub const NUMERIC: i32 = 2;
    pub const DECIMAL: i32 = 3;
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const DATE: i32 = 91;
    pub const TIME: i32 = 92;
    pub const TIMESTAMP: i32 = 93;
    pub const BINARY: i32 = -2;
    pub const VARBINARY: i32 = -3;
    pub const LONGVARBINARY: i32 = -4;
    pub const NULL: i32 = 0;
    pub const OTHER: i32 = 1111;
    pub const ROWID: i32 = -8;
    pub const NCHAR: i32 = -15;
    pub const NVARCHAR: i32 = -9;
    pub const LONGNVARCHAR: i32 = -16;
    pub const BLOB: i32 = 2004;
    pub const CLOB: i32 = 2005;
    pub const NCLOB: i32 = 2011;
    pub const SQLXML: i32 = 2009;
    pub const DATALINK: i32 = 70;
    pub const BOOLEAN: i32 = 16;
}

/// How a mapped column is pulled out of a cursor row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadKind {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    Text,
    Decimal,
    DateMillis,
    TimeMillis,
    TimestampMillis,
}

/// Per-column metadata accessors. Columns are 1-based. `None` means the
/// provider cannot answer that question for the column; callers degrade to
/// empty/zero/false instead of failing.
pub trait ColumnMetadata {
    fn column_count(&self) -> usize;
    fn catalog_name(&self, col: usize) -> Option<String>;
    fn schema_name(&self, col: usize) -> Option<String>;
    fn table_name(&self, col: usize) -> Option<String>;
    fn column_name(&self, col: usize) -> Option<String>;
    fn column_label(&self, col: usize) -> Option<String>;
    fn column_type(&self, col: usize) -> Option<i32>;
    fn column_type_name(&self, col: usize) -> Option<String>;
    fn precision(&self, col: usize) -> Option<i32>;
    fn scale(&self, col: usize) -> Option<i32>;
    fn display_size(&self, col: usize) -> Option<i32>;
    fn is_auto_increment(&self, col: usize) -> Option<bool>;
    fn is_signed(&self, col: usize) -> Option<bool>;
}

/// Positional parameter setters of a prepared statement. Indices are 1-based.
/// Temporal setters take milliseconds since the Unix epoch in UTC; decimals
/// travel in lexical form.
pub trait ParameterSink {
    fn set_null(&mut self, idx: usize) -> Result<(), GraphLinkError>;
    fn set_i32(&mut self, idx: usize, value: i32) -> Result<(), GraphLinkError>;
    fn set_f32(&mut self, idx: usize, value: f32) -> Result<(), GraphLinkError>;
    fn set_f64(&mut self, idx: usize, value: f64) -> Result<(), GraphLinkError>;
    fn set_bool(&mut self, idx: usize, value: bool) -> Result<(), GraphLinkError>;
    fn set_string(&mut self, idx: usize, value: &str) -> Result<(), GraphLinkError>;
    fn set_decimal(&mut self, idx: usize, value: &str) -> Result<(), GraphLinkError>;
    fn set_date(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError>;
    fn set_time(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError>;
    fn set_timestamp(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError>;
}

/// Forward-only cursor over a result set. `advance` must be called before the
/// first `read`; reads address the current row with 1-based column positions.
pub trait RowCursor {
    fn metadata(&self) -> &dyn ColumnMetadata;
    fn advance(&mut self) -> Result<bool, GraphLinkError>;
    fn read(&self, col: usize, kind: ReadKind) -> Result<Option<FieldValue>, GraphLinkError>;
    fn read_string_named(&self, name: &str) -> Result<Option<String>, GraphLinkError>;
}

pub trait StoreStatement: ParameterSink {
    /// Executes the statement with everything bound so far as one batch.
    fn execute_batch(&mut self) -> Result<(), GraphLinkError>;
    /// Executes the statement and hands back a cursor over its result rows.
    fn query(&mut self) -> Result<Box<dyn RowCursor + '_>, GraphLinkError>;
}

impl std::fmt::Debug for dyn StoreStatement + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoreStatement")
    }
}

pub trait StoreConnection {
    fn prepare(&self, sql: &str) -> Result<Box<dyn StoreStatement + '_>, GraphLinkError>;
}

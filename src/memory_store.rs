//! In-memory store double. Records every prepared statement together with the
//! parameters bound into it, injects write failures on demand, and serves a
//! canned result set to the read path. Public so integration tests can drive
//! the pipeline without a real store.

use std::cell::RefCell;

use crate::{
    errors::GraphLinkError,
    record::FieldValue,
    store::{ColumnMetadata, ParameterSink, RowCursor, StoreConnection, StoreStatement},
};

/// One bound parameter as the statement saw it.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundParam {
    Null,
    I32(i32),
    F32(f32),
    F64(f64),
    Bool(bool),
    Text(String),
    Decimal(String),
    Date(i64),
    Time(i64),
    Timestamp(i64),
}

/// A statement that was executed or queried, successful or not.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutedStatement {
    pub sql: String,
    pub params: Vec<(usize, BoundParam)>,
}

/// Metadata for one canned result column. Fields left at their defaults show
/// up as absent capabilities, which is exactly how a sparse provider behaves.
#[derive(Clone, Debug, Default)]
pub struct MemoryColumn {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub name: String,
    pub label: String,
    pub type_code: i32,
    pub type_name: String,
    pub precision: i32,
    pub scale: i32,
    pub display_size: i32,
    pub auto_increment: bool,
    pub signed: bool,
}

impl MemoryColumn {
    pub fn new<N: Into<String>>(name: N, type_code: i32) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            type_code,
            signed: true,
            ..Self::default()
        }
    }

    pub fn in_table<T: Into<String>>(mut self, table: T) -> Self {
        self.table = table.into();
        self
    }

    pub fn precision_scale(mut self, precision: i32, scale: i32) -> Self {
        self.precision = precision;
        self.scale = scale;
        self
    }

    pub fn unsigned(mut self) -> Self {
        self.signed = false;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct MemoryColumns {
    pub columns: Vec<MemoryColumn>,
}

impl MemoryColumns {
    pub fn new(columns: Vec<MemoryColumn>) -> Self {
        Self { columns }
    }

    fn get(&self, col: usize) -> Option<&MemoryColumn> {
        self.columns.get(col.checked_sub(1)?)
    }
}

impl ColumnMetadata for MemoryColumns {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn catalog_name(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.catalog.clone())
    }

    fn schema_name(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.schema.clone())
    }

    fn table_name(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.table.clone())
    }

    fn column_name(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.name.clone())
    }

    fn column_label(&self, col: usize) -> Option<String> {
        self.get(col).map(|c| c.label.clone())
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

    fn display_size(&self, col: usize) -> Option<i32> {
        self.get(col).map(|c| c.display_size)
    }

    fn is_auto_increment(&self, col: usize) -> Option<bool> {
        self.get(col).map(|c| c.auto_increment)
    }

    fn is_signed(&self, col: usize) -> Option<bool> {
        self.get(col).map(|c| c.signed)
    }
}

#[derive(Debug, Default)]
struct Inner {
    executed: Vec<ExecutedStatement>,
    fail_next: u32,
    columns: MemoryColumns,
    rows: Vec<Vec<Option<FieldValue>>>,
}

/// The store itself. Interior mutability because `StoreConnection::prepare`
/// takes `&self`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every query yields the given result set.
    pub fn with_result(columns: MemoryColumns, rows: Vec<Vec<Option<FieldValue>>>) -> Self {
        Self {
            inner: RefCell::new(Inner {
                columns,
                rows,
                ..Inner::default()
            }),
        }
    }

    /// The next `count` executes fail with a retriable execution error.
    pub fn fail_next(&self, count: u32) {
        self.inner.borrow_mut().fail_next = count;
    }

    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.inner.borrow().executed.clone()
    }
}

impl StoreConnection for MemoryStore {
    fn prepare(&self, sql: &str) -> Result<Box<dyn StoreStatement + '_>, GraphLinkError> {
        Ok(Box::new(MemoryStatement {
            store: self,
            sql: sql.to_string(),
            params: Vec::new(),
        }))
    }
}

pub struct MemoryStatement<'a> {
    store: &'a MemoryStore,
    sql: String,
    params: Vec<(usize, BoundParam)>,
}

impl MemoryStatement<'_> {
    fn record(&mut self, idx: usize, param: BoundParam) -> Result<(), GraphLinkError> {
        self.params.push((idx, param));
        Ok(())
    }
}

impl ParameterSink for MemoryStatement<'_> {
    fn set_null(&mut self, idx: usize) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Null)
    }

    fn set_i32(&mut self, idx: usize, value: i32) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::I32(value))
    }

    fn set_f32(&mut self, idx: usize, value: f32) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::F32(value))
    }

    fn set_f64(&mut self, idx: usize, value: f64) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::F64(value))
    }

    fn set_bool(&mut self, idx: usize, value: bool) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Bool(value))
    }

    fn set_string(&mut self, idx: usize, value: &str) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Text(value.to_string()))
    }

    fn set_decimal(&mut self, idx: usize, value: &str) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Decimal(value.to_string()))
    }

    fn set_date(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Date(millis))
    }

    fn set_time(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Time(millis))
    }

    fn set_timestamp(&mut self, idx: usize, millis: i64) -> Result<(), GraphLinkError> {
        self.record(idx, BoundParam::Timestamp(millis))
    }
}

impl StoreStatement for MemoryStatement<'_> {
    fn execute_batch(&mut self) -> Result<(), GraphLinkError> {
        let mut inner = self.store.inner.borrow_mut();
        inner.executed.push(ExecutedStatement {
            sql: self.sql.clone(),
            params: self.params.clone(),
        });
        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(GraphLinkError::execution("injected write failure"));
        }
        Ok(())
    }

    fn query(&mut self) -> Result<Box<dyn RowCursor + '_>, GraphLinkError> {
        let mut inner = self.store.inner.borrow_mut();
        inner.executed.push(ExecutedStatement {
            sql: self.sql.clone(),
            params: self.params.clone(),
        });
        Ok(Box::new(MemoryCursor {
            columns: inner.columns.clone(),
            rows: inner.rows.clone(),
            pos: 0,
        }))
    }
}

pub struct MemoryCursor {
    columns: MemoryColumns,
    rows: Vec<Vec<Option<FieldValue>>>,
    pos: usize,
}

impl MemoryCursor {
    fn current(&self) -> Result<&Vec<Option<FieldValue>>, GraphLinkError> {
        self.pos
            .checked_sub(1)
            .and_then(|row| self.rows.get(row))
            .ok_or_else(|| GraphLinkError::execution("cursor is not positioned on a row"))
    }
}

impl RowCursor for MemoryCursor {
    fn metadata(&self) -> &dyn ColumnMetadata {
        &self.columns
    }

    fn advance(&mut self) -> Result<bool, GraphLinkError> {
        if self.pos < self.rows.len() {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn read(
        &self,
        col: usize,
        _kind: crate::store::ReadKind,
    ) -> Result<Option<FieldValue>, GraphLinkError> {
        let row = self.current()?;
        let value = row.get(col.checked_sub(1).ok_or_else(|| {
            GraphLinkError::execution("column positions are 1-based")
        })?);
        Ok(value.cloned().flatten())
    }

    fn read_string_named(&self, name: &str) -> Result<Option<String>, GraphLinkError> {
        let col = self
            .columns
            .columns
            .iter()
            .position(|c| c.name == name || c.label == name)
            .ok_or_else(|| {
                GraphLinkError::execution(format!("no column named '{name}' in result set"))
            })?;
        let row = self.current()?;
        Ok(row
            .get(col)
            .and_then(|v| v.as_ref())
            .and_then(|v| v.as_text().map(str::to_string)))
    }
}

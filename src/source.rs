//! Read-side task: expands the configured query template, runs it against the
//! store and turns every result row into an outbound record. When timestamp
//! tracking is on, the task keeps a high-water mark and feeds it back into the
//! query as an escaped argument so already-seen rows stay behind.

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, error};

use crate::{
    config::SourceConfig,
    errors::GraphLinkError,
    record::{FieldValue, SourceRecord},
    schema_map::SchemaMapping,
    store::{RowCursor, StoreConnection},
};

pub struct SourceTask<'a> {
    conn: &'a dyn StoreConnection,
    config: SourceConfig,
    watermark: String,
}

impl std::fmt::Debug for SourceTask<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceTask")
            .field("config", &self.config)
            .field("watermark", &self.watermark)
            .finish_non_exhaustive()
    }
}

impl<'a> SourceTask<'a> {
    /// `persisted` is the watermark recovered from the host's offset storage,
    /// if any; a fresh task starts its mark at the current time, so only rows
    /// newer than task start pass the predicate.
    pub fn new(
        conn: &'a dyn StoreConnection,
        config: SourceConfig,
        persisted: Option<String>,
    ) -> Result<Self, GraphLinkError> {
        config.validate()?;
        let watermark = persisted
            .unwrap_or_else(|| Utc::now().format(&config.timestamp_format).to_string());
        Ok(Self {
            conn,
            config,
            watermark,
        })
    }

    pub fn watermark(&self) -> &str {
        &self.watermark
    }

    pub fn poll(&mut self) -> Result<Vec<SourceRecord>, GraphLinkError> {
        let body = self.build_query();
        let query_name = query_name_of(&self.config.query);
        debug!(query = %body, name = %query_name, "polling");

        let mut stmt = self.conn.prepare(&body)?;
        for (idx, arg) in self.config.query_args.iter().enumerate() {
            let value: i32 = arg.parse().map_err(|_| {
                GraphLinkError::parse(format!("query argument is not an integer: {arg}"))
            })?;
            stmt.set_i32(idx + 1, value)?;
        }
        if self.config.timestamp_enabled {
            let escaped = self.watermark.replace(' ', "%20").replace(':', "%3A");
            stmt.set_string(self.config.query_args.len() + 1, &escaped)?;
        }

        let mut cursor = stmt.query()?;
        if cursor.metadata().column_count() == 0 {
            return Ok(Vec::new());
        }

        // The schema is built once per poll from the first cursor's metadata;
        // every row of the cycle shares it.
        let (mapping, table_name) =
            SchemaMapping::create(&query_name, cursor.metadata(), &self.config.type_name_key);
        let offset_value = Utc::now().format(&self.config.timestamp_format).to_string();

        let mut records = Vec::new();
        while cursor.advance()? {
            let mut values = Vec::with_capacity(mapping.readers().len());
            for reader in mapping.readers() {
                match reader.kind {
                    Some(kind) => values.push(cursor.read(reader.column, kind)?),
                    None => values.push(Some(FieldValue::Text(table_name.clone()))),
                }
            }
            if self.config.timestamp_enabled {
                self.advance_watermark(cursor.as_ref())?;
            }
            records.push(SourceRecord {
                partition: (self.config.query_name_key.clone(), query_name.clone()),
                offset: (self.config.offset_name_key.clone(), offset_value.clone()),
                topic: self.config.topic.clone(),
                schema: mapping.schema().clone(),
                values,
            });
        }
        Ok(records)
    }

    /// Every occurrence of the literal `pattern` in the query template becomes
    /// the argument pattern repeated once per configured argument.
    fn build_query(&self) -> String {
        let expanded = vec![self.config.query_pattern.as_str(); self.config.query_args.len()]
            .join(",");
        self.config.query.replace("pattern", &expanded)
    }

    /// Pushes the watermark forward when the current row's tracked attribute
    /// is newer. A value that does not parse under the configured format, on
    /// either side of the comparison, is logged and skipped.
    fn advance_watermark(&mut self, cursor: &dyn RowCursor) -> Result<(), GraphLinkError> {
        let attr = self.config.timestamp_attr.as_deref().unwrap_or_default();
        let row_value = match cursor.read_string_named(attr)? {
            Some(value) => value,
            None => return Ok(()),
        };
        let fmt = &self.config.timestamp_format;
        let row_ts = match NaiveDateTime::parse_from_str(&row_value, fmt) {
            Ok(ts) => ts,
            Err(err) => {
                error!(value = %row_value, %err, "timestamp attribute did not parse");
                return Ok(());
            }
        };
        let current = match NaiveDateTime::parse_from_str(&self.watermark, fmt) {
            Ok(ts) => ts,
            Err(err) => {
                error!(value = %self.watermark, %err, "tracked watermark did not parse");
                return Ok(());
            }
        };
        if current < row_ts {
            self.watermark = row_value;
        }
        Ok(())
    }
}

/// Derives the partition name from the query text: the token between the
/// leading verb and the opening parenthesis.
fn query_name_of(query: &str) -> String {
    if query.is_empty() {
        return "no_query_name".to_string();
    }
    let start = query.find(' ').map(|pos| pos + 1).unwrap_or(1);
    let end = query.find('(').unwrap_or(query.len());
    query
        .get(start..end)
        .filter(|name| !name.is_empty())
        .unwrap_or("no_query_name")
        .to_string()
}

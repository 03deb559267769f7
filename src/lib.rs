//! Record translation between a structured event stream and a graph-oriented
//! relational store: inbound records become positional upserts, polled rows
//! become schema-tagged outbound records.

pub mod bind;
pub mod column;
pub mod config;
pub mod errors;
pub mod field_meta;
pub mod memory_store;
pub mod query_build;
pub mod record;
pub mod schema_map;
pub mod sink;
pub mod source;
pub mod store;
pub mod type_map;

#[cfg(feature = "sqlite-backend")]
pub mod sqlite_store;

pub use crate::bind::RecordBinder;
pub use crate::config::{PrimaryKeyMode, SinkConfig, SourceConfig};
pub use crate::errors::GraphLinkError;
pub use crate::field_meta::FieldLayout;
pub use crate::query_build::{generate_query, resolve_target, ElementKind, UpsertStatement};
pub use crate::record::{
    FieldType, FieldValue, RecordKey, RecordSchema, RecordValue, SinkRecord, SourceRecord,
    StructData,
};
pub use crate::schema_map::SchemaMapping;
pub use crate::sink::SinkTask;
pub use crate::source::SourceTask;

#[cfg(feature = "sqlite-backend")]
pub use crate::sqlite_store::SqliteStore;

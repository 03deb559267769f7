//! Configuration consumed by the pipeline. The host is expected to parse and
//! deserialize these from its own property surface; `validate` enforces the
//! cross-field rules that cannot be expressed by types alone.

use serde::{Deserialize, Serialize};

use crate::errors::GraphLinkError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKeyMode {
    /// No key columns.
    #[default]
    None,
    /// Key fields come from the record key (primitive or struct).
    RecordKey,
    /// Key fields come from the record value struct.
    RecordValue,
}

impl PrimaryKeyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryKeyMode::None => "none",
            PrimaryKeyMode::RecordKey => "record_key",
            PrimaryKeyMode::RecordValue => "record_value",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Indicator suffix identifying the element-type field of a record.
    pub type_name_key: String,
    /// Maximum attempts per record before the write fails for good.
    pub max_retries: u32,
    /// Initial backoff; doubled after every failed attempt.
    pub retry_backoff_ms: u64,
    pub pk_mode: PrimaryKeyMode,
    pub pk_fields: Vec<String>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            type_name_key: "type".to_string(),
            max_retries: 3,
            retry_backoff_ms: 1000,
            pk_mode: PrimaryKeyMode::None,
            pk_fields: Vec::new(),
        }
    }
}

impl SinkConfig {
    pub fn validate(&self) -> Result<(), GraphLinkError> {
        if self.type_name_key.is_empty() {
            return Err(GraphLinkError::configuration("Type name key not set."));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Topic the emitted records are routed to.
    pub topic: String,
    /// Query template; every occurrence of the literal `pattern` is replaced
    /// by the argument pattern repeated once per configured argument.
    pub query: String,
    pub query_pattern: String,
    pub query_args: Vec<String>,
    /// Partition map key carrying the derived query name.
    pub query_name_key: String,
    /// Offset map key carrying the formatted poll timestamp.
    pub offset_name_key: String,
    pub type_name_key: String,
    pub timestamp_enabled: bool,
    /// Row attribute inspected for watermark advancement. Required when
    /// timestamp tracking is enabled.
    pub timestamp_attr: Option<String>,
    /// chrono format string for watermark values.
    pub timestamp_format: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            topic: String::new(),
            query: String::new(),
            query_pattern: String::new(),
            query_args: Vec::new(),
            query_name_key: "query".to_string(),
            offset_name_key: String::new(),
            type_name_key: "type".to_string(),
            timestamp_enabled: false,
            timestamp_attr: None,
            timestamp_format: "%Y-%b-%d %H:%M:%S".to_string(),
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<(), GraphLinkError> {
        if self.query.is_empty() {
            return Err(GraphLinkError::configuration("Query not set."));
        }
        if self.query_pattern.is_empty() {
            return Err(GraphLinkError::configuration("Query pattern not set."));
        }
        if self.timestamp_enabled
            && self.timestamp_attr.as_deref().unwrap_or("").is_empty()
        {
            return Err(GraphLinkError::configuration(
                "Timestamp attribute name not set.",
            ));
        }
        Ok(())
    }
}

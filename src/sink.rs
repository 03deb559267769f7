//! Write-side task: turns inbound records into upserts and drives them into
//! the store, retrying transient execution failures with doubling backoff.

use std::time::Duration;

use tracing::warn;

use crate::{
    config::SinkConfig,
    errors::GraphLinkError,
    query_build::generate_query,
    record::SinkRecord,
    store::StoreConnection,
};

/// Seam for the inter-attempt pause, so tests can count sleeps instead of
/// taking them.
pub trait BackoffHandler {
    fn sleep(&mut self, millis: u64);
}

/// Production handler; parks the calling thread.
#[derive(Debug, Default)]
pub struct ThreadSleep;

impl BackoffHandler for ThreadSleep {
    fn sleep(&mut self, millis: u64) {
        std::thread::sleep(Duration::from_millis(millis));
    }
}

pub struct SinkTask<'a> {
    conn: &'a dyn StoreConnection,
    config: SinkConfig,
    backoff: Box<dyn BackoffHandler + 'a>,
    remaining_retries: u32,
}

impl<'a> SinkTask<'a> {
    pub fn new(conn: &'a dyn StoreConnection, config: SinkConfig) -> Result<Self, GraphLinkError> {
        Self::with_backoff(conn, config, Box::new(ThreadSleep))
    }

    pub fn with_backoff(
        conn: &'a dyn StoreConnection,
        config: SinkConfig,
        backoff: Box<dyn BackoffHandler + 'a>,
    ) -> Result<Self, GraphLinkError> {
        config.validate()?;
        let remaining_retries = config.max_retries;
        Ok(Self {
            conn,
            config,
            backoff,
            remaining_retries,
        })
    }

    /// Writes the batch in order. The first record that fails for good stops
    /// the batch; the host decides whether to redeliver.
    pub fn put(&mut self, records: &[SinkRecord]) -> Result<(), GraphLinkError> {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// One record, up to `max_retries` attempts. The retry budget is restored
    /// before every exit so the next record starts fresh. On exhaustion the
    /// error carries every attempt's failure text, newline-separated.
    fn write_record(&mut self, record: &SinkRecord) -> Result<(), GraphLinkError> {
        let upsert = generate_query(record, &self.config)?;
        let mut failures: Vec<String> = Vec::new();
        let mut backoff_ms = self.config.retry_backoff_ms;
        while self.remaining_retries > 0 {
            match upsert.run(self.conn, &self.config) {
                Ok(()) => {
                    self.remaining_retries = self.config.max_retries;
                    return Ok(());
                }
                Err(err) if err.is_retriable() => {
                    failures.push(err.to_string());
                    self.remaining_retries -= 1;
                    if self.remaining_retries == 0 {
                        break;
                    }
                    warn!(
                        table = %upsert.table.table,
                        remaining = self.remaining_retries,
                        backoff_ms,
                        "write failed, retrying"
                    );
                    self.backoff.sleep(backoff_ms);
                    backoff_ms = backoff_ms.saturating_mul(2);
                }
                Err(err) => {
                    self.remaining_retries = self.config.max_retries;
                    return Err(err);
                }
            }
        }
        self.remaining_retries = self.config.max_retries;
        Err(GraphLinkError::execution(failures.join("\n")))
    }
}

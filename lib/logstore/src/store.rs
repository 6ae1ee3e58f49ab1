//! The log store seam.

use async_trait::async_trait;

use crate::error::LogStoreError;
use crate::page::LogPage;
use crate::query::LogQuery;

/// A paginated, read-only source of log events.
///
/// Implementations make exactly one attempt per call: no retries, no caching.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Reads one page of events for `query`.
    async fn get_log_events(&self, query: &LogQuery) -> Result<LogPage, LogStoreError>;
}

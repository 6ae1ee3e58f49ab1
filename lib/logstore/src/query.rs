//! The log read request.

use serde::{Deserialize, Serialize};

/// Which end of the stream a read starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadDirection {
    /// Oldest events first.
    FromHead,
    /// Newest events first.
    FromTail,
}

impl ReadDirection {
    /// Maps the CloudWatch `startFromHead` flag onto a direction.
    #[must_use]
    pub fn from_start_from_head(start_from_head: bool) -> Self {
        if start_from_head {
            Self::FromHead
        } else {
            Self::FromTail
        }
    }

    /// Returns true when reading starts at the oldest event.
    #[must_use]
    pub fn starts_from_head(self) -> bool {
        matches!(self, Self::FromHead)
    }
}

/// A single page read against one log stream.
///
/// Queries are chosen by the server; nothing in them comes from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogQuery {
    /// The log group to read.
    pub log_group: String,
    /// The stream within the group.
    pub log_stream: String,
    /// Maximum number of events to return.
    pub limit: u32,
    /// Where reading starts.
    pub direction: ReadDirection,
}

impl LogQuery {
    /// Creates a query reading up to `limit` events from the head of a stream.
    #[must_use]
    pub fn new(log_group: impl Into<String>, log_stream: impl Into<String>, limit: u32) -> Self {
        Self {
            log_group: log_group.into(),
            log_stream: log_stream.into(),
            limit,
            direction: ReadDirection::FromHead,
        }
    }

    /// Sets the read direction.
    #[must_use]
    pub fn with_direction(mut self, direction: ReadDirection) -> Self {
        self.direction = direction;
        self
    }
}

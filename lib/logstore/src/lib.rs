//! Log retrieval for the log-gateway API.
//!
//! This crate provides:
//! - The query and page types exchanged with the log store (`LogQuery`, `LogPage`)
//! - The `LogStore` trait the HTTP layer depends on
//! - `CloudWatchLogStore`, the AWS CloudWatch Logs implementation
//! - `LogStoreError`, carrying the provider's sanitized error metadata

pub mod cloudwatch;
pub mod error;
pub mod page;
pub mod query;
pub mod store;

pub use cloudwatch::{CloudWatchLogStore, CloudWatchSettings};
pub use error::LogStoreError;
pub use page::{LogEvent, LogPage};
pub use query::{LogQuery, ReadDirection};
pub use store::LogStore;

//! AWS CloudWatch Logs implementation of [`LogStore`].

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_cloudwatchlogs::Client;
use aws_sdk_cloudwatchlogs::config::Region;
use aws_sdk_cloudwatchlogs::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatchlogs::operation::RequestId;
use aws_sdk_cloudwatchlogs::operation::get_log_events::GetLogEventsError;
use aws_sdk_cloudwatchlogs::types::OutputLogEvent;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::LogStoreError;
use crate::page::{LogEvent, LogPage};
use crate::query::LogQuery;
use crate::store::LogStore;

const CF_ID_HEADER: &str = "x-amz-cf-id";

/// Connection settings for CloudWatch Logs.
///
/// Credentials come from the standard AWS provider chain.
#[derive(Debug, Clone)]
pub struct CloudWatchSettings {
    /// AWS region; the provider chain decides when unset.
    pub region: Option<String>,
    /// Upper bound on one `GetLogEvents` call, including connection setup.
    pub operation_timeout: Duration,
}

/// Reads log events through the CloudWatch Logs `GetLogEvents` API.
#[derive(Clone)]
pub struct CloudWatchLogStore {
    client: Client,
}

impl CloudWatchLogStore {
    /// Builds a client from the AWS environment with retries disabled and
    /// the configured operation timeout.
    pub async fn from_env(settings: &CloudWatchSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(settings.operation_timeout)
                    .build(),
            );
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        Self {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl LogStore for CloudWatchLogStore {
    #[instrument(skip(self), fields(log_group = %query.log_group, log_stream = %query.log_stream))]
    async fn get_log_events(&self, query: &LogQuery) -> Result<LogPage, LogStoreError> {
        let limit = i32::try_from(query.limit).unwrap_or(i32::MAX);

        let output = self
            .client
            .get_log_events()
            .log_group_name(&query.log_group)
            .log_stream_name(&query.log_stream)
            .limit(limit)
            .start_from_head(query.direction.starts_from_head())
            .send()
            .await
            .map_err(log_store_error)?;

        let page = LogPage {
            events: output.events().iter().map(to_log_event).collect(),
            next_forward_token: output.next_forward_token().map(str::to_string),
            next_backward_token: output.next_backward_token().map(str::to_string),
        };

        debug!(events = page.events.len(), "fetched log events");
        Ok(page)
    }
}

fn to_log_event(event: &OutputLogEvent) -> LogEvent {
    LogEvent {
        timestamp: event.timestamp(),
        message: event.message().map(str::to_string),
        ingestion_time: event.ingestion_time(),
    }
}

/// Keeps the provider's message and identifiers, drops everything else.
fn log_store_error(err: SdkError<GetLogEventsError>) -> LogStoreError {
    let cf_id = err
        .raw_response()
        .and_then(|response| response.headers().get(CF_ID_HEADER))
        .map(str::to_string);

    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback_message(&err).to_string());

    LogStoreError::new(message)
        .with_code(err.code().map(str::to_string))
        .with_request_id(err.request_id().map(str::to_string))
        .with_cf_id(cf_id)
}

fn fallback_message(err: &SdkError<GetLogEventsError>) -> &'static str {
    match err {
        SdkError::TimeoutError(_) => "request to log store timed out",
        SdkError::DispatchFailure(_) => "failed to reach log store",
        SdkError::ConstructionFailure(_) => "failed to build log store request",
        SdkError::ResponseError(_) => "unexpected response from log store",
        _ => "log store request failed",
    }
}

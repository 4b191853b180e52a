use ecos_cloud::CloudError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single AWS API call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {}", detail(.code, .message))]
pub struct AwsError {
    /// API operation name (e.g., "HeadBucket")
    pub operation: String,

    /// Service error code, when the service returned one
    pub code: Option<String>,

    pub message: String,
}

/// Error code used for calls that exceeded their deadline.
pub const TIMEOUT_CODE: &str = "Timeout";

impl AwsError {
    pub fn new(operation: impl Into<String>, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            code: code.filter(|c| !c.is_empty()).map(str::to_string),
            message: message.into(),
        }
    }

    pub fn with_code(operation: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        Self::new(operation, Some(code), message)
    }

    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        Self::new(
            operation,
            Some(TIMEOUT_CODE),
            format!("no response within {}s", limit.as_secs()),
        )
    }
}

fn detail(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) if message.is_empty() => code.clone(),
        Some(code) => format!("{code}: {message}"),
        None => message.to_string(),
    }
}

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        CloudError::Api {
            operation: err.operation.clone(),
            message: detail(&err.code, &err.message),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;

//! AWS error classification
//!
//! Service error codes are authoritative. Message text is consulted only
//! when no code is present or the code is too generic, and only here.

use crate::error::AwsError;

const PREVIEW_MESSAGE_LIMIT: usize = 140;
const PREVIEW_MESSAGE_KEEP: usize = 137;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bucket, key, tag set or workgroup does not exist
    NotFound,
    AccessDenied,
    Throttled,
    InvalidRequest,
    /// Bucket name is owned by another account
    TakenGlobally,
    /// Bucket already exists in this account
    AlreadyOwnedByYou,
    /// Non-bucket resource with that name already exists
    AlreadyExists,
    BucketNotEmpty,
    Conflict,
    Other,
}

fn class_for_code(code: &str) -> ErrorClass {
    match code {
        "NoSuchBucket" | "NoSuchKey" | "NoSuchTagSet" | "NoSuchTagSetError" | "NotFound"
        | "ResourceNotFoundException" => ErrorClass::NotFound,
        "AccessDenied" | "AccessDeniedException" => ErrorClass::AccessDenied,
        "ThrottlingException" | "TooManyRequestsException" | "SlowDown" => ErrorClass::Throttled,
        "InvalidRequestException" => ErrorClass::InvalidRequest,
        "BucketAlreadyExists" => ErrorClass::TakenGlobally,
        "BucketAlreadyOwnedByYou" => ErrorClass::AlreadyOwnedByYou,
        "BucketNotEmpty" => ErrorClass::BucketNotEmpty,
        "OperationAborted" | "Conflict" | "ConflictException" => ErrorClass::Conflict,
        _ => ErrorClass::Other,
    }
}

fn class_for_message(message: &str) -> Option<ErrorClass> {
    let lower = message.to_ascii_lowercase();
    if lower.contains("already exists") {
        Some(ErrorClass::AlreadyExists)
    } else if message.contains("NoSuchTagSet")
        || message.contains("NoSuchBucket")
        || message.contains("NotFound")
        || lower.contains("not found")
        || message.contains("404")
    {
        Some(ErrorClass::NotFound)
    } else if message.contains("AccessDenied") {
        Some(ErrorClass::AccessDenied)
    } else if message.contains("BucketNotEmpty") {
        Some(ErrorClass::BucketNotEmpty)
    } else if message.contains("Conflict") {
        Some(ErrorClass::Conflict)
    } else {
        None
    }
}

pub fn classify(err: &AwsError) -> ErrorClass {
    let by_code = err
        .code
        .as_deref()
        .map(class_for_code)
        .unwrap_or(ErrorClass::Other);

    match by_code {
        // Athena reports most conditions as InvalidRequestException
        ErrorClass::Other | ErrorClass::InvalidRequest => {
            class_for_message(&err.message).unwrap_or(by_code)
        }
        known => known,
    }
}

/// Short, user-facing reason for a failed ownership check.
///
/// Known codes map to fixed phrases and other codes are shown as-is.
/// Without a code the raw message is used, with `resource` masked and the
/// result truncated.
pub fn humanize_preview_error(err: &AwsError, resource: &str) -> String {
    if let Some(code) = err.code.as_deref() {
        return match code {
            "NoSuchBucket" | "ResourceNotFoundException" => "resource not found".to_string(),
            "AccessDenied" | "AccessDeniedException" => "access denied".to_string(),
            "ThrottlingException" | "TooManyRequestsException" => "request throttled".to_string(),
            "InvalidRequestException" => "invalid request".to_string(),
            other => other.to_string(),
        };
    }

    let mut message = err.message.clone();
    if !resource.is_empty() {
        message = message.replace(resource, "[resource]");
    }
    if message.chars().count() > PREVIEW_MESSAGE_LIMIT {
        let kept: String = message.chars().take(PREVIEW_MESSAGE_KEEP).collect();
        return format!("{kept}…");
    }
    message
}

//! Storage layer (S3-compatible)
//!
//! The service only ever issues three provider calls, captured by
//! [`ObjectStore`]: list containers, list objects under a prefix with the `/`
//! delimiter, and presign a time-limited GET for one object.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{BucketSummary, ObjectListing};

pub mod s3_client;

pub use s3_client::S3Client;

/// Delimiter used to roll keys up into folder-like prefixes.
pub const DELIMITER: &str = "/";

/// Provider error codes that mean the caller lacks permission.
const ACCESS_DENIED_CODES: &[&str] = &["AccessDenied", "AllAccessDisabled"];

/// Provider error codes that mean the container or object does not exist.
const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchKey"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Provider(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StorageError>;

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<ObjectListing, StorageError>;

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError>;
}

/// Body of a failed provider call: `<Error><Code/><Message/>...</Error>`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProviderErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a failed provider call onto the storage taxonomy.
///
/// The provider reports failures as an XML document whose `<Code>` element
/// names the error; access-denied detection matches on that name only, never
/// on the HTTP status or free text.
pub fn classify_provider_error(status: Option<u16>, body: &str) -> StorageError {
    let parsed: ProviderErrorBody = quick_xml::de::from_str(body).unwrap_or_default();
    let code = non_blank(parsed.code);
    let message = non_blank(parsed.message)
        .or_else(|| code.clone())
        .unwrap_or_else(|| body.trim().to_string());

    match code.as_deref() {
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => StorageError::AccessDenied(message),
        Some(c) if NOT_FOUND_CODES.contains(&c) => StorageError::NotFound(message),
        _ if status == Some(404) => StorageError::NotFound(message),
        _ => match status {
            Some(status) => StorageError::Provider(format!("{} (status {})", message, status)),
            None => StorageError::Provider(message),
        },
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

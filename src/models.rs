use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::storage::ObjectStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn ObjectStore>, config: Config) -> Self {
        Self { store, config }
    }
}

// Wire types. Field names follow the storage provider's casing so the
// listing payload passes through unchanged.

/// A storage container descriptor as returned by `GET /buckets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketSummary {
    pub name: String,
    #[serde(default)]
    pub creation_date: Option<String>,
}

/// One object under the listed prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// A folder-like prefix rolled up by the `/` delimiter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommonPrefix {
    pub prefix: String,
}

/// Response of `GET /buckets/{name}/objects`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectListing {
    #[serde(default)]
    pub contents: Vec<ObjectSummary>,
    #[serde(default)]
    pub common_prefixes: Vec<CommonPrefix>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresignRequest {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_uses_provider_field_names() {
        let listing: ObjectListing = serde_json::from_str(
            r#"{"Contents":[{"Key":"a/b.txt","Size":3,"LastModified":"2024-01-01T00:00:00Z"}],
                "CommonPrefixes":[{"Prefix":"a/c/"}]}"#,
        )
        .unwrap();
        assert_eq!(listing.contents[0].key, "a/b.txt");
        assert_eq!(listing.contents[0].size, 3);
        assert_eq!(listing.common_prefixes[0].prefix, "a/c/");
    }

    #[test]
    fn test_listing_missing_arrays_default_to_empty() {
        let listing: ObjectListing = serde_json::from_str("{}").unwrap();
        assert!(listing.contents.is_empty());
        assert!(listing.common_prefixes.is_empty());
    }

    #[test]
    fn test_presign_request_tolerates_missing_fields() {
        let req: PresignRequest = serde_json::from_str(r#"{"bucket":"b"}"#).unwrap();
        assert_eq!(req.bucket.as_deref(), Some("b"));
        assert!(req.key.is_none());
    }
}

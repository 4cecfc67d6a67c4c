// S3 client backed by rust-s3

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, Region};
use tracing::{debug, error};

use super::{classify_provider_error, ObjectStore, StorageError, DELIMITER};
use crate::config::StorageConfig;
use crate::models::{BucketSummary, CommonPrefix, ObjectListing, ObjectSummary};

/// Longest expiry the provider accepts for a presigned URL (seven days).
const MAX_PRESIGN_EXPIRY_SECS: u32 = 604_800;

pub struct S3Client {
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3Client {
    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        let region = match &config.s3_endpoint {
            Some(endpoint) => Region::Custom {
                region: config.s3_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .s3_region
                .parse::<Region>()
                .map_err(|e| anyhow::anyhow!("Invalid S3 region '{}': {}", config.s3_region, e))?,
        };

        // With no explicit keys rust-s3 falls back to the environment,
        // profile and instance-metadata chain.
        let credentials = Credentials::new(
            config.s3_access_key_id.as_deref(),
            config.s3_secret_access_key.as_deref(),
            None,
            config.s3_session_token.as_deref(),
            None,
        )
        .map_err(|e| anyhow::anyhow!("Failed to load S3 credentials: {}", e))?;

        Ok(Self {
            region,
            credentials,
            path_style: config.s3_endpoint.is_some(),
        })
    }

    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StorageError> {
        let bucket = Bucket::new(name, self.region.clone(), self.credentials.clone())
            .map_err(map_s3_error)?;
        Ok(if self.path_style {
            Box::new(bucket.with_path_style())
        } else {
            Box::new(bucket)
        })
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StorageError> {
        let response = Bucket::list_buckets(self.region.clone(), self.credentials.clone())
            .await
            .map_err(map_s3_error)?;

        Ok(response
            .buckets
            .bucket
            .into_iter()
            .map(|info| BucketSummary {
                name: info.name,
                creation_date: Some(normalize_timestamp(info.creation_date.to_string())),
            })
            .collect())
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<ObjectListing, StorageError> {
        let pages = self
            .bucket(bucket)?
            .list(prefix.to_string(), Some(DELIMITER.to_string()))
            .await
            .map_err(map_s3_error)?;
        debug!("Listed {} page(s) for {}/{}", pages.len(), bucket, prefix);

        let mut listing = ObjectListing::default();
        for page in pages {
            listing
                .contents
                .extend(page.contents.into_iter().map(|object| ObjectSummary {
                    key: object.key,
                    size: object.size,
                    last_modified: Some(normalize_timestamp(object.last_modified)),
                }));
            listing.common_prefixes.extend(
                page.common_prefixes
                    .unwrap_or_default()
                    .into_iter()
                    .map(|p| CommonPrefix { prefix: p.prefix }),
            );
        }
        Ok(listing)
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expiry_secs: u32,
    ) -> Result<String, StorageError> {
        let expiry = expiry_secs.clamp(1, MAX_PRESIGN_EXPIRY_SECS);
        self.bucket(bucket)?
            .presign_get(key, expiry, None)
            .await
            .map_err(map_s3_error)
    }
}

fn map_s3_error(err: S3Error) -> StorageError {
    error!("S3 request failed: {}", err);
    match err {
        S3Error::HttpFailWithBody(status, body) => classify_provider_error(Some(status), &body),
        other => classify_provider_error(None, &other.to_string()),
    }
}

/// Render provider timestamps as RFC 3339 in UTC.
///
/// Listing pages already carry ISO-8601 strings; the bucket listing exposes a
/// parsed timestamp whose display form is `YYYY-MM-DD HH:MM:SS UTC`.
fn normalize_timestamp(raw: String) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true);
    }
    let trimmed = raw.trim_end_matches(" UTC");
    match NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        Ok(naive) => naive.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
        Err(_) => raw,
    }
}

// Authenticated calls against the proxy service

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, error};

use super::{ClientError, ClientResult, Session, TokenProvider};
use crate::config::ClientConfig;
use crate::models::{BucketSummary, ObjectListing, PresignRequest};

#[derive(Deserialize)]
struct PresignBody {
    url: Option<String>,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            &config.api_base_url,
            Arc::new(Session::new(config.id_token.clone())),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unauthenticated client, used for fetching signed URLs.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub async fn fetch_buckets(&self) -> ClientResult<Vec<BucketSummary>> {
        let url = format!("{}/buckets", self.base_url);
        let response = self.send(self.http.get(&url)).await.inspect_err(|e| {
            error!("Error fetching buckets: {}", e);
        })?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse bucket list: {}", e)))
    }

    /// List folders and files of `bucket` under `prefix`; an empty prefix
    /// lists the container root.
    pub async fn fetch_objects(&self, bucket: &str, prefix: &str) -> ClientResult<ObjectListing> {
        let url = objects_url(&self.base_url, bucket, prefix)?;
        let response = self.send(self.http.get(url)).await.inspect_err(|e| {
            error!("Error fetching objects: {}", e);
        })?;
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse object listing: {}", e)))
    }

    /// Request a time-limited download URL for one object.
    pub async fn presign(&self, bucket: &str, key: &str) -> ClientResult<String> {
        let url = format!("{}/presign", self.base_url);
        let request = PresignRequest {
            bucket: Some(bucket.to_string()),
            key: Some(key.to_string()),
        };
        let response = self
            .send(self.http.post(&url).json(&request))
            .await
            .inspect_err(|e| error!("Error getting presigned URL: {}", e))?;

        let body: PresignBody = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse presign response: {}", e)))?;
        body.url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("No presigned URL received".to_string()))
    }

    /// Attach the identity token, send, and map non-2xx statuses.
    async fn send(&self, request: RequestBuilder) -> ClientResult<Response> {
        // The proxy expects the raw ID token, without a scheme prefix.
        let token = self.tokens.get_token().ok_or(ClientError::NotAuthenticated)?;
        let response = request
            .header(reqwest::header::AUTHORIZATION, token)
            .send()
            .await?;

        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(error_for_status(status, &text))
    }
}

fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED => ClientError::AuthenticationFailed,
        StatusCode::FORBIDDEN => ClientError::AccessDenied,
        s if s.is_server_error() => ClientError::Server(s.as_u16()),
        s => {
            let message = backend_message(body)
                .unwrap_or_else(|| format!("Request failed with status {}", s.as_u16()));
            if s == StatusCode::NOT_FOUND {
                ClientError::NotFound(message)
            } else {
                ClientError::Request(message)
            }
        }
    }
}

/// The `message` of a JSON error body, or the raw text when it is not one.
fn backend_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<MessageBody>(body) {
        Ok(MessageBody { message: Some(m) }) if !m.is_empty() => Some(m),
        _ => Some(body.to_string()),
    }
}

fn objects_url(base_url: &str, bucket: &str, prefix: &str) -> ClientResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ClientError::Request(format!("Invalid API base URL {}: {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::Request(format!("Invalid API base URL {}", base_url)))?
        .pop_if_empty()
        .push("buckets")
        .push(bucket)
        .push("objects");
    if !prefix.is_empty() {
        url.query_pairs_mut().append_pair("prefix", prefix);
    }
    Ok(url)
}

//! API Routes
//!
//! The proxy surface consumed by the browser:
//! - `GET /buckets` - List storage containers
//! - `GET /buckets/{name}/objects?prefix=` - List folders and files under a prefix
//! - `POST /presign` - Issue a time-limited download URL
//! - `GET /health` - Health check
//!
//! Any other route answers 404 with `Route not found: <METHOD> <path>`.

pub mod buckets;
pub mod health;
pub mod presign;

use axum::{
    http::{Method, Uri},
    middleware, Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::{auth_middleware, cors_layer, options_short_circuit};
use crate::models::AppState;
use crate::types::AppError;

/// Create the main application router
///
/// Layer order, outermost first: tracing, CORS, OPTIONS short-circuit,
/// identity check, then routing.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);

    Router::new()
        .merge(buckets::router())
        .merge(presign::router())
        .merge(health::router())
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn(options_short_circuit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found(method: Method, uri: Uri) -> AppError {
    AppError::NotFound(format!("Route not found: {} {}", method, uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthMode, Config};
    use crate::models::{BucketSummary, CommonPrefix, ObjectListing, ObjectSummary};
    use crate::storage::{ObjectStore, StorageError};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[derive(Default)]
    struct MemoryStore {
        deny: bool,
        presigned: Mutex<Vec<(String, String, u32)>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn list_buckets(&self) -> Result<Vec<BucketSummary>, StorageError> {
            if self.deny {
                return Err(StorageError::AccessDenied("Access Denied".to_string()));
            }
            Ok(vec![BucketSummary {
                name: "reports".to_string(),
                creation_date: Some("2024-01-01T00:00:00.000Z".to_string()),
            }])
        }

        async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<ObjectListing, StorageError> {
            if bucket != "reports" {
                return Err(StorageError::Provider(format!("bucket {} unreachable", bucket)));
            }
            Ok(ObjectListing {
                contents: vec![ObjectSummary {
                    key: format!("{}readme.txt", prefix),
                    size: 120,
                    last_modified: Some("2024-01-01T00:00:00Z".to_string()),
                }],
                common_prefixes: vec![CommonPrefix {
                    prefix: format!("{}img/", prefix),
                }],
            })
        }

        async fn presign_get(
            &self,
            bucket: &str,
            key: &str,
            expiry_secs: u32,
        ) -> Result<String, StorageError> {
            self.presigned
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string(), expiry_secs));
            Ok(format!("https://{}.s3.local/{}?X-Amz-Expires={}", bucket, key, expiry_secs))
        }
    }

    fn app_with(store: Arc<MemoryStore>, config: Config) -> Router {
        create_router(AppState::new(store, config))
    }

    fn app() -> Router {
        app_with(Arc::new(MemoryStore::default()), Config::default())
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_presign(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/presign")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_buckets() {
        let (status, body) = send(app(), get("/buckets")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["Name"], "reports");
        assert_eq!(body[0]["CreationDate"], "2024-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_list_objects_passes_prefix() {
        let (status, body) = send(app(), get("/buckets/reports/objects?prefix=docs/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Contents"][0]["Key"], "docs/readme.txt");
        assert_eq!(body["Contents"][0]["Size"], 120);
        assert_eq!(body["CommonPrefixes"][0]["Prefix"], "docs/img/");
    }

    #[tokio::test]
    async fn test_list_objects_without_prefix() {
        let (status, body) = send(app(), get("/buckets/reports/objects")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["Contents"][0]["Key"], "readme.txt");
    }

    #[tokio::test]
    async fn test_provider_failure_is_500_with_detail() {
        let (status, body) = send(app(), get("/buckets/missing/objects")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
        assert_eq!(body["error"], "bucket missing unreachable");
    }

    #[tokio::test]
    async fn test_access_denied_is_403_with_hint() {
        let store = Arc::new(MemoryStore {
            deny: true,
            ..Default::default()
        });
        let (status, body) = send(app_with(store, Config::default()), get("/buckets")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["message"].as_str().unwrap().starts_with("Access Denied."));
    }

    #[tokio::test]
    async fn test_presign_uses_configured_expiry() {
        let store = Arc::new(MemoryStore::default());
        let (status, body) = send(
            app_with(store.clone(), Config::default()),
            post_presign(r#"{"bucket":"reports","key":"docs/readme.txt"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["url"].as_str().unwrap().contains("X-Amz-Expires=300"));
        let calls = store.presigned.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[("reports".to_string(), "docs/readme.txt".to_string(), 300)]
        );
    }

    #[tokio::test]
    async fn test_presign_requires_bucket_and_key() {
        for body in [r#"{"bucket":"reports"}"#, r#"{"bucket":"","key":"k"}"#, "", "not json"] {
            let (status, json) = send(app(), post_presign(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", body);
            assert_eq!(json["message"], "Bucket and key are required.");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (status, body) = send(app(), get("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Route not found: GET /nope");
    }

    #[tokio::test]
    async fn test_options_short_circuits_before_auth() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/buckets")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(
            app_with(Arc::new(MemoryStore::default()), jwt_config()),
            req,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_bare_options_short_circuits() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/anything")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_cors_header_present() {
        let req = Request::builder()
            .uri("/buckets")
            .header(header::ORIGIN, "https://example.com")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    fn jwt_config() -> Config {
        let mut config = Config::default();
        config.auth.mode = AuthMode::Jwt;
        config.auth.secret = "s3cret".to_string();
        config
    }

    #[derive(serde::Serialize)]
    struct TestClaims {
        exp: usize,
        sub: String,
    }

    #[tokio::test]
    async fn test_jwt_mode_rejects_missing_token() {
        let (status, body) = send(
            app_with(Arc::new(MemoryStore::default()), jwt_config()),
            get("/buckets"),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_jwt_mode_accepts_raw_token() {
        let claims = TestClaims {
            exp: (chrono::Utc::now().timestamp() + 600) as usize,
            sub: "u".to_string(),
        };
        let token =
            encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s3cret")).unwrap();
        let req = Request::builder()
            .uri("/buckets")
            .header(header::AUTHORIZATION, token)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app_with(Arc::new(MemoryStore::default()), jwt_config()), req).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (status, body) = send(
            app_with(Arc::new(MemoryStore::default()), jwt_config()),
            get("/health"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}

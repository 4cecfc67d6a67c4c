use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Default lifetime of a presigned download URL.
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u32 = 300;

/// Largest text body the preview will download.
pub const DEFAULT_PREVIEW_MAX_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    pub s3_session_token: Option<String>,
    pub presign_expiry_secs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    None,
    Jwt,
}

impl std::str::FromStr for AuthMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(AuthMode::None),
            "jwt" => Ok(AuthMode::Jwt),
            other => bail!("unknown AUTH_MODE '{}', expected 'none' or 'jwt'", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub secret: String,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub id_token: Option<String>,
    pub preview_max_bytes: u64,
    /// Where the browser saves downloaded objects.
    pub download_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["*".to_string()],
            },
            storage: StorageConfig {
                s3_region: "us-east-1".to_string(),
                s3_endpoint: None,
                s3_access_key_id: None,
                s3_secret_access_key: None,
                s3_session_token: None,
                presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
            },
            auth: AuthConfig {
                mode: AuthMode::None,
                secret: String::new(),
                audience: None,
            },
            client: ClientConfig {
                api_base_url: "http://localhost:3000".to_string(),
                id_token: None,
                preview_max_bytes: DEFAULT_PREVIEW_MAX_BYTES,
                download_dir: PathBuf::from("."),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let auth_mode: AuthMode = env::var("AUTH_MODE")
            .unwrap_or_else(|_| "none".to_string())
            .parse()?;
        let auth_secret = env::var("AUTH_SECRET").unwrap_or_default();
        if auth_mode == AuthMode::Jwt && auth_secret.is_empty() {
            bail!("AUTH_SECRET must be set when AUTH_MODE=jwt");
        }

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("PORT must be a valid port number")?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            storage: StorageConfig {
                s3_region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                s3_endpoint: non_empty_var("S3_ENDPOINT"),
                s3_access_key_id: non_empty_var("AWS_ACCESS_KEY_ID"),
                s3_secret_access_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
                s3_session_token: non_empty_var("AWS_SESSION_TOKEN"),
                presign_expiry_secs: env::var("PRESIGN_EXPIRY_SECS")
                    .unwrap_or_else(|_| DEFAULT_PRESIGN_EXPIRY_SECS.to_string())
                    .parse()
                    .context("PRESIGN_EXPIRY_SECS must be a number of seconds")?,
            },
            auth: AuthConfig {
                mode: auth_mode,
                secret: auth_secret,
                audience: non_empty_var("AUTH_AUDIENCE"),
            },
            client: ClientConfig {
                api_base_url: env::var("API_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                id_token: non_empty_var("ID_TOKEN"),
                preview_max_bytes: env::var("PREVIEW_MAX_BYTES")
                    .unwrap_or_else(|_| DEFAULT_PREVIEW_MAX_BYTES.to_string())
                    .parse()
                    .context("PREVIEW_MAX_BYTES must be a byte count")?,
                download_dir: non_empty_var("DOWNLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

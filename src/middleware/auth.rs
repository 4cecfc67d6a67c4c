// Identity-token check for the proxy routes

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{AuthConfig, AuthMode};
use crate::models::AppState;
use crate::types::AppError;

/// Paths reachable without an identity token.
const PUBLIC_PATHS: &[&str] = &["/health"];

#[derive(Debug, Deserialize)]
pub struct Claims {
    pub exp: usize,
    #[serde(default)]
    pub sub: Option<String>,
}

pub async fn auth_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.config.auth.mode == AuthMode::None || PUBLIC_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(extract_token);

    match token {
        Some(token) if !token.is_empty() => match verify_jwt(token, &state.config.auth) {
            Ok(claims) => {
                debug!("Authenticated request for subject {:?}", claims.sub);
                next.run(req).await
            }
            Err(e) => {
                warn!("Rejected identity token: {}", e);
                AppError::Unauthorized("Unauthorized".to_string()).into_response()
            }
        },
        _ => AppError::Unauthorized("Unauthorized".to_string()).into_response(),
    }
}

/// The header holds the raw ID token; a `Bearer ` prefix is tolerated.
fn extract_token(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

pub fn verify_jwt(token: &str, config: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    match &config.audience {
        Some(aud) => validation.set_audience(&[aud.as_str()]),
        None => validation.validate_aud = false,
    }
    let key = DecodingKey::from_secret(config.secret.as_bytes());
    decode::<Claims>(token, &key, &validation).map(|data| data.claims)
}

// Identity token source

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

/// Supplies the identity token attached to outbound requests.
///
/// Returning `None` means the user is signed out; callers fail with
/// `ClientError::NotAuthenticated` before touching the network.
pub trait TokenProvider: Send + Sync {
    fn get_token(&self) -> Option<String>;
}

/// Token held in memory for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct Session {
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

impl Session {
    pub fn new(id_token: Option<String>) -> Self {
        Self {
            id_token: id_token.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl TokenProvider for Session {
    fn get_token(&self) -> Option<String> {
        let token = self.id_token.as_ref()?;
        match token_expiry(token) {
            Some(exp) if exp <= chrono::Utc::now().timestamp() => None,
            _ => Some(token.clone()),
        }
    }
}

/// `exp` claim of a JWT, read without verifying the signature.
/// Opaque tokens have no readable expiry.
fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<ExpiryClaim>(&bytes).ok()?.exp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_with(payload: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_signed_out() {
        assert_eq!(Session::anonymous().get_token(), None);
        assert_eq!(Session::new(Some("   ".to_string())).get_token(), None);
    }

    #[test]
    fn test_opaque_token_passes_through() {
        let session = Session::new(Some("opaque-token".to_string()));
        assert_eq!(session.get_token().as_deref(), Some("opaque-token"));
    }

    #[test]
    fn test_expired_jwt_is_treated_as_signed_out() {
        let session = Session::new(Some(jwt_with(r#"{"sub":"u","exp":1}"#)));
        assert_eq!(session.get_token(), None);
    }

    #[test]
    fn test_live_jwt() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = jwt_with(&format!(r#"{{"sub":"u","exp":{}}}"#, exp));
        let session = Session::new(Some(token.clone()));
        assert_eq!(session.get_token(), Some(token));
    }
}

//! Client side of the explorer
//!
//! - [`session`]: identity token source attached to every request
//! - [`api`]: authenticated calls against the proxy service
//! - [`listing`]: turn listing payloads into display entries
//! - [`fetcher`]: signed URL plus optional bounded text download

pub mod api;
pub mod fetcher;
pub mod listing;
pub mod session;

pub use api::ApiClient;
pub use fetcher::{default_file_name, ContentFetcher, Downloaded, FetchedPreview, PreviewContent};
pub use listing::{containers_to_entries, normalize_listing, Entry, EntryKind};
pub use session::{Session, TokenProvider};

/// Failures surfaced to the user by client operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authentication failed. Please sign in again.")]
    AuthenticationFailed,

    #[error("Access denied. You do not have permission to access this resource.")]
    AccessDenied,

    #[error("{0}")]
    NotFound(String),

    #[error("Server error ({0}). Please try again later.")]
    Server(u16),

    #[error("{0}")]
    Request(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("File error: {0}")]
    Io(String),

    #[error("{0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Errors that ask the user to sign in again rather than retry.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::AuthenticationFailed
        )
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

// S3 Explorer - browse object storage through an authenticated proxy

pub mod config;
pub mod models;
pub mod types;
pub mod storage;
pub mod routes;
pub mod middleware;
pub mod client;     // HTTP client for the proxy API
pub mod preview;    // File-kind detection and preview rendering
pub mod navigation; // Location, breadcrumbs and stale-response handling
pub mod utils;
pub mod tui;        // Terminal User Interface

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

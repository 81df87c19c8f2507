//! ecdnd: encrypted file delivery daemon
//!
//! Routes (all require `X-API-Key`):
//!   GET /download/{filename} - base64 AES-256-GCM envelope of the file
//!   GET /files               - JSON listing of the served directory
//!
//! Operational endpoints live on a separate listener, see [`metrics`].

pub mod auth;
pub mod delivery;
pub mod error;
pub mod filename;
pub mod listing;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, Secrets};

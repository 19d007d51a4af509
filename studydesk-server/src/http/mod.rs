//! HTTP server layer
//!
//! Axum server with:
//! - Bearer-token authentication (`CurrentUser` extractor)
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod server;
pub mod error;
pub mod extractors;
pub mod routes;

pub use server::{build_router, run_server, AppState, ServerConfig, ServerError, DEFAULT_BIND};
pub use error::ApiError;
pub use extractors::CurrentUser;

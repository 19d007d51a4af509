//! studydesk-server: student productivity backend
//!
//! Users, roles, tasks, schedule events, mood entries and tutoring
//! sessions behind a JWT-bearer JSON API, stored in PostgreSQL.

pub mod auth;
pub mod db;
pub mod http;
pub mod models;
pub mod policy;

pub use auth::{AuthConfig, AuthError, TokenIssuer};
pub use db::{create_pool, DbError};
pub use http::{run_server, ServerConfig};

//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool, cloned into handler state
//! - List operations use JOINs - no N+1 queries
//! - Rely on DB constraints, classify violations - no check-then-insert
//! - Transactions for read-modify-write updates

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use sqlx::PgPool;

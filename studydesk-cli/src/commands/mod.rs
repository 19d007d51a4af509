//! Command implementations for the studydesk CLI

pub mod admin;
pub mod migrate;
pub mod rehash;
pub mod serve;

pub use admin::run_create_admin;
pub use migrate::run_migrate;
pub use rehash::run_rehash_passwords;
pub use serve::run_serve;

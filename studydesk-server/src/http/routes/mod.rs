//! Route handlers organized by resource

pub mod health;
pub mod auth;
pub mod roles;
pub mod users;
pub mod tasks;
pub mod schedule;
pub mod moods;
pub mod tutoring;
pub mod stats;

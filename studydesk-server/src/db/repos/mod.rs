//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Maps constraint violations instead of check-then-insert
//! - Uses transactions for read-modify-write updates

use super::DbError;

pub mod roles;
pub mod users;
pub mod tasks;
pub mod schedule;
pub mod moods;
pub mod tutoring;
pub mod stats;

pub use roles::{Role, RoleRepo};
pub use users::{Credentials, NewUser, User, UserPatch, UserRepo};
pub use tasks::{NewTask, Task, TaskFilter, TaskPatch, TaskRepo};
pub use schedule::{EventFilter, NewEvent, ScheduleEvent, ScheduleRepo, EventPatch};
pub use moods::{MoodEntry, MoodFilter, MoodPatch, MoodRepo, NewMood};
pub use tutoring::{
    NewSession, Participant, Participation, SessionPatch, SessionWithParticipants,
    TutoringRepo, TutoringSession,
};
pub use stats::{Overview, StatsRepo, StatusCounts, UserStats};

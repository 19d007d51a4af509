//! Authorization rules
//!
//! Every check reduces to two integer comparisons: the actor's role id
//! against the seeded role ids, and the actor's id against a record's
//! owner id. Handlers for owned records load the record first (404 wins
//! over 403), then ask this module.

/// Seeded role ids (see `db::migrations`).
pub const ADMIN_ROLE_ID: i32 = 1;
pub const STUDENT_ROLE_ID: i32 = 2;
pub const TUTOR_ROLE_ID: i32 = 3;

/// The authenticated user making a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role_id: Option<i32>,
}

impl Actor {
    pub fn new(id: i32, role_id: Option<i32>) -> Self {
        Self { id, role_id }
    }

    pub fn is_admin(&self) -> bool {
        self.role_id == Some(ADMIN_ROLE_ID)
    }

    pub fn is_tutor(&self) -> bool {
        self.role_id == Some(TUTOR_ROLE_ID)
    }

    pub fn owns(&self, owner_id: i32) -> bool {
        self.id == owner_id
    }
}

/// Denied access, carrying the message shown to the client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Denied {
    pub reason: &'static str,
}

fn deny(reason: &'static str) -> Result<(), Denied> {
    Err(Denied { reason })
}

/// Admin-only operations (user list/create/delete, session delete, overview stats).
pub fn require_admin(actor: &Actor) -> Result<(), Denied> {
    if actor.is_admin() {
        Ok(())
    } else {
        deny("administrator role required")
    }
}

/// Reading or updating a user record, per-user statistics, participation.
pub fn require_self_or_admin(actor: &Actor, user_id: i32) -> Result<(), Denied> {
    if actor.is_admin() || actor.owns(user_id) {
        Ok(())
    } else {
        deny("you can only access your own account")
    }
}

/// Read/update/delete of an owned record (task, schedule event, mood entry).
pub fn require_owner_or_admin(actor: &Actor, owner_id: i32) -> Result<(), Denied> {
    if actor.is_admin() || actor.owns(owner_id) {
        Ok(())
    } else {
        deny("you do not have access to this record")
    }
}

/// Creating an owned record: non-admins may only target themselves.
pub fn require_create_for(actor: &Actor, target_user_id: i32) -> Result<(), Denied> {
    if actor.is_admin() || actor.owns(target_user_id) {
        Ok(())
    } else {
        deny("you can only create records for yourself")
    }
}

/// Owner filter for list queries: admins keep what they asked for,
/// everyone else is pinned to their own id.
pub fn scope_owner_filter(actor: &Actor, requested: Option<i32>) -> Option<i32> {
    if actor.is_admin() {
        requested
    } else {
        Some(actor.id)
    }
}

/// Creating or updating a tutoring session.
pub fn require_session_editor(actor: &Actor) -> Result<(), Denied> {
    if actor.is_admin() || actor.is_tutor() {
        Ok(())
    } else {
        deny("administrator or tutor role required")
    }
}

/// Only admins may assign roles; a self-update must leave `role_id` alone.
pub fn require_role_assignment(actor: &Actor, new_role_id: Option<i32>) -> Result<(), Denied> {
    match new_role_id {
        Some(_) if !actor.is_admin() => deny("only administrators can change roles"),
        _ => Ok(()),
    }
}

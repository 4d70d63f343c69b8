//! # Actors
//!
//! The party on whose behalf an operation runs. Actors are threaded
//! explicitly through every permission-checked call; nothing in the
//! workspace reads a process-wide "current user".

use serde::{Deserialize, Serialize};

use crate::identity::AgentId;

/// Platform role of an actor.
///
/// Roles are not ordered. `Admin` grants view access everywhere but no
/// implicit status-change rights; those always come from project control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Anonymous visitor.
    Guest,
    /// Authenticated user acting through their profile agent.
    User,
    /// Platform administrator.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// The caller of a domain operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: Role,
    /// The agent the actor acts as. Guests have none.
    pub profile: Option<AgentId>,
}

impl Actor {
    pub fn guest() -> Self {
        Self {
            role: Role::Guest,
            profile: None,
        }
    }

    pub fn user(profile: AgentId) -> Self {
        Self {
            role: Role::User,
            profile: Some(profile),
        }
    }

    pub fn admin(profile: Option<AgentId>) -> Self {
        Self {
            role: Role::Admin,
            profile,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self.role, Role::Guest)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.profile {
            Some(agent) => write!(f, "{}({})", self.role.as_str(), agent),
            None => f.write_str(self.role.as_str()),
        }
    }
}

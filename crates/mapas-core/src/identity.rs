//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the integer identifiers assigned by the storage
//! layer. These prevent accidental identifier confusion: a `ProjectId`
//! cannot be handed to an agent lookup.
//!
//! [`EntityRef`] pairs an identifier with its [`EntityKind`]. It is the key
//! permission questions and ownership-request lookups are scoped by
//! (the `originType` / `originId` pair of a transfer request).

use serde::{Deserialize, Serialize};

/// Identifier of a registration, assigned on first persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(pub u64);

/// Identifier of an agent (person or organization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

/// Identifier of a project registrations are submitted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

/// Identifier of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

macro_rules! impl_id {
    ($name:ident, $prefix:literal) => {
        impl $name {
            /// Access the raw integer value.
            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

impl_id!(RegistrationId, "registration");
impl_id!(AgentId, "agent");
impl_id!(ProjectId, "project");
impl_id!(FileId, "file");

/// The kinds of entity a permission or ownership question can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Registration,
    Agent,
    Project,
}

impl EntityKind {
    /// Class-style name used as the `originType` of ownership requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registration => "Registration",
            Self::Agent => "Agent",
            Self::Project => "Project",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed reference to a persisted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: u64,
}

impl EntityRef {
    pub fn registration(id: RegistrationId) -> Self {
        Self {
            kind: EntityKind::Registration,
            id: id.0,
        }
    }

    pub fn agent(id: AgentId) -> Self {
        Self {
            kind: EntityKind::Agent,
            id: id.0,
        }
    }

    pub fn project(id: ProjectId) -> Self {
        Self {
            kind: EntityKind::Project,
            id: id.0,
        }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

//! # Registration Errors
//!
//! Errors surfaced by registration operations. None of them are retried;
//! each reaches the immediate caller synchronously.

use thiserror::Error;

use mapas_core::{Actor, AgentId, Capability, PersistenceError, ProjectId, RegistrationId};

#[derive(Error, Debug)]
pub enum RegistrationError {
    /// The actor lacks the capability the operation requires. Nothing was
    /// mutated.
    #[error("permission denied: {actor} lacks {capability} on {target}")]
    PermissionDenied {
        capability: Capability,
        actor: Actor,
        /// Human-readable target, e.g. `registration:42` or `unsaved registration`.
        target: String,
    },

    /// The storage collaborator failed. For status transitions the
    /// in-memory status has already been changed when this is returned.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A registration cannot exist without an owning agent.
    #[error("owner is required: {0} has no agent profile")]
    OwnerRequired(Actor),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    /// The registration already carries a storage id.
    #[error("registration already has id {existing}")]
    IdAlreadyAssigned { existing: RegistrationId },
}

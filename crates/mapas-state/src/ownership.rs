//! # Ownership Resolution
//!
//! A registration's `owner` field changes only when an ownership transfer
//! is finalized elsewhere. While a transfer request is pending, the
//! registration is considered owned by the request's target agent, with
//! ownership status `PENDING`. Display and authorization code asks the
//! [`OwnershipResolver`] rather than reading `owner` directly.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mapas_core::{AgentId, EntityRef};

use crate::ports::OwnershipRequestLookup;
use crate::registration::{Agent, Registration};
use crate::status::StatusError;

/// Status of the effective ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum OwnerStatus {
    /// No transfer in flight; the recorded owner is the owner.
    Enabled,
    /// A transfer request is awaiting the target agent's acceptance.
    Pending,
}

impl OwnerStatus {
    pub const ENABLED: i16 = 1;
    pub const PENDING: i16 = -5;

    pub fn code(&self) -> i16 {
        match self {
            Self::Enabled => Self::ENABLED,
            Self::Pending => Self::PENDING,
        }
    }
}

impl From<OwnerStatus> for i16 {
    fn from(status: OwnerStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i16> for OwnerStatus {
    type Error = StatusError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            Self::ENABLED => Ok(Self::Enabled),
            Self::PENDING => Ok(Self::Pending),
            other => Err(StatusError::UnknownCode(other)),
        }
    }
}

impl std::fmt::Display for OwnerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => f.write_str("ENABLED"),
            Self::Pending => f.write_str("PENDING"),
        }
    }
}

/// A pending request to hand an entity over to another agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipTransferRequest {
    /// The entity being transferred (`originType` / `originId`).
    pub origin: EntityRef,
    /// The agent that would become the owner.
    pub agent: Arc<Agent>,
    /// The agent that asked for the transfer, if known.
    pub requested_by: Option<AgentId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveOwner {
    pub agent: Arc<Agent>,
    pub status: OwnerStatus,
    /// Who asked for the pending transfer. `None` when no transfer is in
    /// flight or the requester is unknown.
    pub requested_by: Option<AgentId>,
}

pub struct OwnershipResolver<'a> {
    requests: &'a dyn OwnershipRequestLookup,
}

impl std::fmt::Debug for OwnershipResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipResolver").finish_non_exhaustive()
    }
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(requests: &'a dyn OwnershipRequestLookup) -> Self {
        Self { requests }
    }

    /// Resolve owner and ownership status in a single lookup.
    pub fn resolve(&self, registration: &Registration) -> EffectiveOwner {
        match self.pending_request(registration) {
            Some(request) => EffectiveOwner {
                agent: request.agent,
                status: OwnerStatus::Pending,
                requested_by: request.requested_by,
            },
            None => EffectiveOwner {
                agent: Arc::clone(registration.owner()),
                status: OwnerStatus::Enabled,
                requested_by: None,
            },
        }
    }

    pub fn effective_owner(&self, registration: &Registration) -> Arc<Agent> {
        self.resolve(registration).agent
    }

    pub fn effective_owner_status(&self, registration: &Registration) -> OwnerStatus {
        self.resolve(registration).status
    }

    /// An unsaved registration cannot be the origin of a request.
    fn pending_request(&self, registration: &Registration) -> Option<OwnershipTransferRequest> {
        let id = registration.id()?;
        self.requests.find_pending(EntityRef::registration(id))
    }
}

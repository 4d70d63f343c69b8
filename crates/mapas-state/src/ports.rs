//! # Collaborator Ports
//!
//! Narrow interfaces to the infrastructure a registration depends on but
//! does not implement: storage, directories of agents and projects, the
//! ownership-request store, the permission layer, and hook dispatch.
//!
//! All ports are object-safe and taken as `&dyn Trait`, so tests can pass
//! spies and the service can pass adapters over its own stores.

use std::sync::Arc;

use mapas_core::{Actor, AgentId, Capability, EntityRef, PersistenceError, ProjectId, RegistrationId};

use crate::ownership::OwnershipTransferRequest;
use crate::registration::{Agent, Project, Registration};
use crate::status::StatusHook;

/// Durable storage for registrations.
pub trait RegistrationRepository {
    /// Persist `registration`, assigning its id on first save.
    ///
    /// `force_immediate` asks the store to flush now instead of deferring
    /// the write to the end of the unit of work.
    fn save(
        &self,
        registration: &mut Registration,
        force_immediate: bool,
    ) -> Result<(), PersistenceError>;

    fn find(&self, id: RegistrationId) -> Option<Registration>;

    /// Delete `registration` together with its metadata. The project and
    /// owner it references are left alone.
    fn delete(&self, registration: Registration) -> Result<(), PersistenceError>;
}

pub trait AgentDirectory {
    fn find_agent(&self, id: AgentId) -> Option<Arc<Agent>>;
}

pub trait ProjectDirectory {
    fn find_project(&self, id: ProjectId) -> Option<Arc<Project>>;
}

/// Lookup of pending ownership-transfer requests, scoped by origin entity.
pub trait OwnershipRequestLookup {
    fn find_pending(&self, origin: EntityRef) -> Option<OwnershipTransferRequest>;
}

/// The platform permission layer.
pub trait PermissionChecker {
    fn actor_has_capability(&self, target: EntityRef, capability: Capability, actor: &Actor)
        -> bool;
}

/// Synchronous, fire-and-forget hook dispatch. Observers cannot abort the
/// operation that fired the hook.
pub trait StatusNotifier {
    fn notify(&self, hook: StatusHook, registration: &Registration);
}

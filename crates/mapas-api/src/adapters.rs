//! # In-Memory Port Adapters
//!
//! Development stand-ins for the collaborators a registration reaches
//! through `mapas_state::ports`. Each adapter wraps [`Store`]s and is cheap
//! to clone; clones share data.
//!
//! | Port                     | Adapter                     |
//! |--------------------------|-----------------------------|
//! | `RegistrationRepository` | [`MemoryRegistrations`]     |
//! | `AgentDirectory`         | [`MemoryDirectory`]         |
//! | `ProjectDirectory`       | [`MemoryDirectory`]         |
//! | `OwnershipRequestLookup` | [`MemoryOwnershipRequests`] |
//! | `PermissionChecker`      | [`MemoryPermissions`]       |
//! | `StatusNotifier`         | [`HookLog`]                 |

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use mapas_core::{
    Actor, AgentId, Capability, EntityKind, EntityRef, PersistenceError, ProjectId, RegistrationId,
};
use mapas_state::{
    Agent, AgentDirectory, OwnershipRequestLookup, OwnershipTransferRequest, PermissionChecker,
    Project, ProjectDirectory, Registration, RegistrationRepository, RegistrationStatus,
    StatusHook, StatusNotifier,
};

use crate::state::Store;

// ── Registrations ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryRegistrations {
    rows: Store<Registration>,
    next_id: Arc<AtomicU64>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryRegistrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `PersistenceError::Unavailable`
    /// until switched back. Reads keep working.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_available(&self) -> Result<(), PersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "registration store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

impl RegistrationRepository for MemoryRegistrations {
    fn save(
        &self,
        registration: &mut Registration,
        force_immediate: bool,
    ) -> Result<(), PersistenceError> {
        self.check_available()?;
        let id = match registration.id() {
            Some(id) => id,
            None => {
                let id = RegistrationId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                registration
                    .assign_id(id)
                    .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
                id
            }
        };
        self.rows.insert(id.get(), registration.clone());
        tracing::debug!(registration_id = id.get(), force_immediate, "registration saved");
        Ok(())
    }

    fn find(&self, id: RegistrationId) -> Option<Registration> {
        self.rows.get(id.get())
    }

    /// Metadata, files and relations live inside the row and go with it.
    fn delete(&self, registration: Registration) -> Result<(), PersistenceError> {
        self.check_available()?;
        let id = registration
            .id()
            .ok_or_else(|| PersistenceError::Missing("unsaved registration".to_string()))?;
        match self.rows.remove(id.get()) {
            Some(_) => {
                tracing::debug!(registration_id = id.get(), "registration deleted");
                Ok(())
            }
            None => Err(PersistenceError::Missing(id.to_string())),
        }
    }
}

// ── Agents & Projects ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    agents: Store<Arc<Agent>>,
    projects: Store<Arc<Project>>,
}

impl MemoryDirectory {
    pub fn add_agent(&self, agent: Agent) -> Arc<Agent> {
        let agent = Arc::new(agent);
        self.agents.insert(agent.id.get(), Arc::clone(&agent));
        agent
    }

    pub fn add_project(&self, project: Project) -> Arc<Project> {
        let project = Arc::new(project);
        self.projects.insert(project.id.get(), Arc::clone(&project));
        project
    }
}

impl AgentDirectory for MemoryDirectory {
    fn find_agent(&self, id: AgentId) -> Option<Arc<Agent>> {
        self.agents.get(id.get())
    }
}

impl ProjectDirectory for MemoryDirectory {
    fn find_project(&self, id: ProjectId) -> Option<Arc<Project>> {
        self.projects.get(id.get())
    }
}

// ── Ownership Transfer Requests ─────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MemoryOwnershipRequests {
    requests: Store<OwnershipTransferRequest>,
    next_id: Arc<AtomicU64>,
}

impl MemoryOwnershipRequests {
    pub fn open(&self, request: OwnershipTransferRequest) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(
            origin = %request.origin,
            agent = %request.agent.id,
            "ownership transfer requested"
        );
        self.requests.insert(id, request);
    }

    /// Drop every pending request originating from `origin`, e.g. once it
    /// has been accepted, rejected, or the origin deleted.
    pub fn withdraw(&self, origin: EntityRef) -> usize {
        self.requests.remove_where(|r| r.origin == origin)
    }
}

impl OwnershipRequestLookup for MemoryOwnershipRequests {
    fn find_pending(&self, origin: EntityRef) -> Option<OwnershipTransferRequest> {
        self.requests.find(|r| r.origin == origin)
    }
}

// ── Permissions ─────────────────────────────────────────────────────────────

/// Explicit `@control` grants plus the platform's implicit ones:
///
/// - an agent controls itself (the actor's profile agent);
/// - whoever controls a registration's owner controls the registration;
/// - so does whoever controls an enabled related agent with `has_control`.
///
/// Only `@control` is answered here; `view` and `changeStatus` are derived
/// by the registration from control of related entities.
#[derive(Debug, Clone)]
pub struct MemoryPermissions {
    grants: Arc<RwLock<HashSet<(EntityRef, AgentId)>>>,
    registrations: MemoryRegistrations,
}

impl MemoryPermissions {
    pub fn new(registrations: MemoryRegistrations) -> Self {
        Self {
            grants: Arc::new(RwLock::new(HashSet::new())),
            registrations,
        }
    }

    pub fn grant(&self, target: EntityRef, agent: AgentId) {
        self.grants.write().insert((target, agent));
    }

    pub fn revoke(&self, target: EntityRef, agent: AgentId) -> bool {
        self.grants.write().remove(&(target, agent))
    }

    fn granted(&self, target: EntityRef, agent: AgentId) -> bool {
        self.grants.read().contains(&(target, agent))
    }

    fn controls(&self, target: EntityRef, agent: AgentId) -> bool {
        if self.granted(target, agent) {
            return true;
        }
        match target.kind {
            EntityKind::Agent => target.id == agent.get(),
            EntityKind::Project => false,
            EntityKind::Registration => self
                .registrations
                .find(RegistrationId(target.id))
                .map_or(false, |reg| self.controls_registration(&reg, agent)),
        }
    }

    /// Through the owner, or through an enabled relation that shares control.
    fn controls_registration(&self, registration: &Registration, agent: AgentId) -> bool {
        if self.controls(EntityRef::agent(registration.owner().id), agent) {
            return true;
        }
        registration
            .agent_relations()
            .iter()
            .filter(|r| r.is_enabled() && r.has_control)
            .any(|r| self.controls(EntityRef::agent(r.agent.id), agent))
    }
}

impl PermissionChecker for MemoryPermissions {
    fn actor_has_capability(
        &self,
        target: EntityRef,
        capability: Capability,
        actor: &Actor,
    ) -> bool {
        if capability != Capability::Control {
            return false;
        }
        actor
            .profile
            .map_or(false, |agent| self.controls(target, agent))
    }
}

// ── Hooks ───────────────────────────────────────────────────────────────────

const HOOK_LOG_CAPACITY: usize = 1024;

/// A status hook as it was fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEvent {
    pub hook: StatusHook,
    pub registration: Option<RegistrationId>,
    /// Status of the registration when the hook fired.
    pub status: RegistrationStatus,
}

/// Records fired status hooks and traces them. Keeps the most recent
/// [`HOOK_LOG_CAPACITY`] events.
#[derive(Debug, Clone, Default)]
pub struct HookLog {
    events: Arc<RwLock<VecDeque<HookEvent>>>,
}

impl HookLog {
    pub fn events(&self) -> Vec<HookEvent> {
        self.events.read().iter().cloned().collect()
    }
}

impl StatusNotifier for HookLog {
    fn notify(&self, hook: StatusHook, registration: &Registration) {
        tracing::info!(
            hook = hook.name(),
            registration_id = registration.id().map(|id| id.get()),
            status = %registration.status(),
            "status hook"
        );
        let mut events = self.events.write();
        if events.len() == HOOK_LOG_CAPACITY {
            events.pop_front();
        }
        events.push_back(HookEvent {
            hook,
            registration: registration.id(),
            status: registration.status(),
        });
    }
}

#[cfg(test)]
mod tests {
    use mapas_state::AgentRelation;

    use super::*;

    fn registration(owner: u64) -> Registration {
        Registration::with_owner(
            Arc::new(Project::new(ProjectId(7), "Edital")),
            Arc::new(Agent::new(AgentId(owner), "Owner")),
        )
    }

    #[test]
    fn first_save_assigns_sequential_ids() {
        let repo = MemoryRegistrations::new();
        let mut a = registration(1);
        let mut b = registration(1);
        repo.save(&mut a, false).unwrap();
        repo.save(&mut b, false).unwrap();
        assert_eq!(a.id(), Some(RegistrationId(1)));
        assert_eq!(b.id(), Some(RegistrationId(2)));
        repo.save(&mut a, true).unwrap();
        assert_eq!(a.id(), Some(RegistrationId(1)));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn unavailable_store_refuses_writes() {
        let repo = MemoryRegistrations::new();
        let mut reg = registration(1);
        repo.set_unavailable(true);
        assert!(matches!(
            repo.save(&mut reg, true),
            Err(PersistenceError::Unavailable(_))
        ));
        assert_eq!(reg.id(), None);
        repo.set_unavailable(false);
        repo.save(&mut reg, true).unwrap();
        assert!(repo.find(RegistrationId(1)).is_some());
    }

    #[test]
    fn delete_unknown_is_missing() {
        let repo = MemoryRegistrations::new();
        let mut reg = registration(1);
        repo.save(&mut reg, false).unwrap();
        let copy = reg.clone();
        repo.delete(reg).unwrap();
        assert!(matches!(repo.delete(copy), Err(PersistenceError::Missing(_))));
    }

    #[test]
    fn registration_control_follows_owner() {
        let repo = MemoryRegistrations::new();
        let perms = MemoryPermissions::new(repo.clone());
        let mut reg = registration(1);
        repo.save(&mut reg, false).unwrap();
        let target = EntityRef::registration(RegistrationId(1));

        assert!(perms.actor_has_capability(target, Capability::Control, &Actor::user(AgentId(1))));
        assert!(!perms.actor_has_capability(target, Capability::Control, &Actor::user(AgentId(2))));
        assert!(!perms.actor_has_capability(target, Capability::View, &Actor::user(AgentId(1))));

        perms.grant(EntityRef::agent(AgentId(1)), AgentId(2));
        assert!(perms.actor_has_capability(target, Capability::Control, &Actor::user(AgentId(2))));
        assert!(perms.revoke(EntityRef::agent(AgentId(1)), AgentId(2)));
        assert!(!perms.actor_has_capability(target, Capability::Control, &Actor::user(AgentId(2))));
    }

    #[test]
    fn related_agent_with_control_controls_registration() {
        let repo = MemoryRegistrations::new();
        let perms = MemoryPermissions::new(repo.clone());
        let mut reg = registration(1);
        reg.agent_relations_mut().relate(
            AgentRelation::enabled("coletivo", Arc::new(Agent::new(AgentId(2), "Grupo")))
                .with_control(true),
        );
        reg.agent_relations_mut().relate(AgentRelation::enabled(
            "instituicao",
            Arc::new(Agent::new(AgentId(3), "Instituto")),
        ));
        reg.agent_relations_mut().relate(
            AgentRelation::pending("instituicao", Arc::new(Agent::new(AgentId(4), "Fundação")))
                .with_control(true),
        );
        repo.save(&mut reg, false).unwrap();

        assert!(reg.can_control(&Actor::user(AgentId(2)), &perms));
        assert!(!reg.can_control(&Actor::user(AgentId(3)), &perms));
        assert!(!reg.can_control(&Actor::user(AgentId(4)), &perms));

        perms.grant(EntityRef::agent(AgentId(2)), AgentId(5));
        assert!(reg.can_control(&Actor::user(AgentId(5)), &perms));
    }

    #[test]
    fn projects_need_explicit_grants() {
        let perms = MemoryPermissions::new(MemoryRegistrations::new());
        let project = EntityRef::project(ProjectId(7));
        let curator = Actor::user(AgentId(9));
        assert!(!perms.actor_has_capability(project, Capability::Control, &curator));
        perms.grant(project, AgentId(9));
        assert!(perms.actor_has_capability(project, Capability::Control, &curator));
        assert!(!perms.actor_has_capability(project, Capability::Control, &Actor::guest()));
    }

    #[test]
    fn withdrawn_requests_no_longer_resolve() {
        let requests = MemoryOwnershipRequests::default();
        let origin = EntityRef::registration(RegistrationId(3));
        requests.open(OwnershipTransferRequest {
            origin,
            agent: Arc::new(Agent::new(AgentId(2), "Bruno")),
            requested_by: None,
        });
        assert!(requests.find_pending(origin).is_some());
        assert!(requests
            .find_pending(EntityRef::registration(RegistrationId(4)))
            .is_none());
        assert_eq!(requests.withdraw(origin), 1);
        assert!(requests.find_pending(origin).is_none());
    }

    #[test]
    fn hook_log_is_bounded() {
        let log = HookLog::default();
        let reg = registration(1);
        for _ in 0..HOOK_LOG_CAPACITY + 5 {
            log.notify(StatusHook::Before, &reg);
        }
        assert_eq!(log.events().len(), HOOK_LOG_CAPACITY);
    }
}

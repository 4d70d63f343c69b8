//! # Registration Lifecycle Tests
//!
//! Drives a registration through creation, persistence, status changes,
//! ownership transfer and deletion against in-process spy ports.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mapas_core::{
    Actor, AgentId, Capability, EntityRef, PersistenceError, ProjectId, RegistrationId, UrlBuilder,
};
use mapas_state::{
    Agent, AgentDirectory, AgentRelation, OwnerStatus, OwnershipRequestLookup, OwnershipResolver,
    OwnershipTransferRequest, PermissionChecker, Project, Registration, RegistrationError,
    RegistrationRepository, RegistrationStatus, RegistrationView, RelationDefinition,
    RelationRegistry, StatusHook, StatusMachine, StatusNotifier,
};

// ── Spy Ports ───────────────────────────────────────────────────────────────

struct Directory {
    agents: HashMap<AgentId, Arc<Agent>>,
    projects: HashMap<ProjectId, Arc<Project>>,
}

impl Directory {
    fn new() -> Self {
        let agents = [(1, "AgentA"), (2, "AgentB"), (9, "Curadoria")]
            .into_iter()
            .map(|(id, name)| (AgentId(id), Arc::new(Agent::new(AgentId(id), name))))
            .collect();
        let projects = [(ProjectId(7), Arc::new(Project::new(ProjectId(7), "Edital 2024")))]
            .into_iter()
            .collect();
        Self { agents, projects }
    }

    fn project(&self) -> Arc<Project> {
        Arc::clone(&self.projects[&ProjectId(7)])
    }
}

impl AgentDirectory for Directory {
    fn find_agent(&self, id: AgentId) -> Option<Arc<Agent>> {
        self.agents.get(&id).cloned()
    }
}

#[derive(Default)]
struct Grants(HashSet<(EntityRef, AgentId)>);

impl Grants {
    fn grant(mut self, target: EntityRef, agent: u64) -> Self {
        self.0.insert((target, AgentId(agent)));
        self
    }
}

impl PermissionChecker for Grants {
    fn actor_has_capability(&self, target: EntityRef, capability: Capability, actor: &Actor) -> bool {
        capability == Capability::Control
            && actor
                .profile
                .map_or(false, |agent| self.0.contains(&(target, agent)))
    }
}

#[derive(Default)]
struct HookSpy(RefCell<Vec<(StatusHook, RegistrationStatus)>>);

impl HookSpy {
    fn count(&self, hook: StatusHook) -> usize {
        self.0.borrow().iter().filter(|(h, _)| *h == hook).count()
    }
}

impl StatusNotifier for HookSpy {
    fn notify(&self, hook: StatusHook, registration: &Registration) {
        self.0.borrow_mut().push((hook, registration.status()));
    }
}

#[derive(Default)]
struct MemoryRepository {
    rows: RefCell<HashMap<RegistrationId, Registration>>,
    next_id: Cell<u64>,
    saves: Cell<usize>,
    unavailable: Cell<bool>,
}

impl RegistrationRepository for MemoryRepository {
    fn save(&self, registration: &mut Registration, _force_immediate: bool) -> Result<(), PersistenceError> {
        if self.unavailable.get() {
            return Err(PersistenceError::Unavailable("database offline".into()));
        }
        self.saves.set(self.saves.get() + 1);
        let id = match registration.id() {
            Some(id) => id,
            None => {
                self.next_id.set(self.next_id.get() + 1);
                let id = RegistrationId(self.next_id.get());
                registration
                    .assign_id(id)
                    .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
                id
            }
        };
        self.rows.borrow_mut().insert(id, registration.clone());
        Ok(())
    }

    fn find(&self, id: RegistrationId) -> Option<Registration> {
        self.rows.borrow().get(&id).cloned()
    }

    fn delete(&self, registration: Registration) -> Result<(), PersistenceError> {
        let id = registration
            .id()
            .ok_or_else(|| PersistenceError::Missing("unsaved registration".into()))?;
        self.rows
            .borrow_mut()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::Missing(id.to_string()))
    }
}

#[derive(Default)]
struct Requests(RefCell<Vec<OwnershipTransferRequest>>);

impl OwnershipRequestLookup for Requests {
    fn find_pending(&self, origin: EntityRef) -> Option<OwnershipTransferRequest> {
        self.0.borrow().iter().find(|r| r.origin == origin).cloned()
    }
}

fn persisted(directory: &Directory, repository: &MemoryRepository) -> Registration {
    let mut reg = Registration::new(directory.project(), &Actor::user(AgentId(1)), directory).unwrap();
    repository.save(&mut reg, false).unwrap();
    reg
}

// ── Status Changes ──────────────────────────────────────────────────────────

#[test]
fn applicant_cannot_approve_but_project_controller_can() {
    let directory = Directory::new();
    let repository = MemoryRepository::default();
    let hooks = HookSpy::default();
    let perms = Grants::default().grant(EntityRef::project(ProjectId(7)), 9);
    let machine = StatusMachine::new(&perms, &hooks, &repository);

    let mut reg = persisted(&directory, &repository);
    assert_eq!(reg.status(), RegistrationStatus::Draft);
    let saves_before = repository.saves.get();

    let err = machine
        .transition_to_approved(&mut reg, &Actor::user(AgentId(1)))
        .unwrap_err();
    assert!(matches!(err, RegistrationError::PermissionDenied { .. }));
    assert_eq!(reg.status(), RegistrationStatus::Draft);
    assert_eq!(repository.saves.get(), saves_before);
    assert!(hooks.0.borrow().is_empty());

    machine
        .transition_to_approved(&mut reg, &Actor::user(AgentId(9)))
        .unwrap();
    assert_eq!(reg.status(), RegistrationStatus::Approved);
    assert_eq!(repository.saves.get(), saves_before + 1);
    assert_eq!(hooks.count(StatusHook::Before), 1);
    assert_eq!(hooks.count(StatusHook::After), 1);

    let stored = repository.find(reg.id().unwrap()).unwrap();
    assert_eq!(stored.status(), RegistrationStatus::Approved);
}

#[test]
fn failed_save_leaves_status_changed_without_after_hook() {
    let directory = Directory::new();
    let repository = MemoryRepository::default();
    let hooks = HookSpy::default();
    let perms = Grants::default().grant(EntityRef::project(ProjectId(7)), 9);
    let machine = StatusMachine::new(&perms, &hooks, &repository);
    let mut reg = persisted(&directory, &repository);

    repository.unavailable.set(true);
    let err = machine
        .transition_to_waitlist(&mut reg, &Actor::user(AgentId(9)))
        .unwrap_err();

    assert!(matches!(
        err,
        RegistrationError::Persistence(PersistenceError::Unavailable(_))
    ));
    assert_eq!(reg.status(), RegistrationStatus::Waitlist);
    assert_eq!(
        *hooks.0.borrow(),
        vec![(StatusHook::Before, RegistrationStatus::Draft)]
    );
    let stored = repository.find(reg.id().unwrap()).unwrap();
    assert_eq!(stored.status(), RegistrationStatus::Draft);
}

#[test]
fn sent_is_only_reachable_from_storage() {
    let directory = Directory::new();
    let reg = Registration::new(directory.project(), &Actor::user(AgentId(1)), &directory).unwrap();
    let mut value = serde_json::to_value(&reg).unwrap();
    value["status"] = serde_json::json!(RegistrationStatus::SENT);
    let loaded: Registration = serde_json::from_value(value).unwrap();
    assert_eq!(loaded.status(), RegistrationStatus::Sent);
}

// ── Ownership ───────────────────────────────────────────────────────────────

#[test]
fn pending_transfer_shows_target_until_withdrawn() {
    let directory = Directory::new();
    let repository = MemoryRepository::default();
    let requests = Requests::default();
    let reg = persisted(&directory, &repository);
    let resolver = OwnershipResolver::new(&requests);

    requests.0.borrow_mut().push(OwnershipTransferRequest {
        origin: EntityRef::registration(reg.id().unwrap()),
        agent: Arc::clone(&directory.agents[&AgentId(2)]),
        requested_by: Some(AgentId(1)),
    });
    let pending = resolver.resolve(&reg);
    assert_eq!(pending.agent.name, "AgentB");
    assert_eq!(pending.status, OwnerStatus::Pending);
    assert_eq!(reg.owner().name, "AgentA");

    requests.0.borrow_mut().clear();
    let settled = resolver.resolve(&reg);
    assert_eq!(settled.agent.name, "AgentA");
    assert_eq!(settled.status, OwnerStatus::Enabled);
}

// ── Access ──────────────────────────────────────────────────────────────────

#[test]
fn admins_view_and_guests_do_not() {
    let directory = Directory::new();
    let repository = MemoryRepository::default();
    let reg = persisted(&directory, &repository);
    let perms = Grants::default();

    assert!(reg.can_view(&Actor::admin(None), &perms));
    assert!(!reg.can_view(&Actor::guest(), &perms));
    assert!(reg.can_user(Capability::View, &Actor::admin(Some(AgentId(2))), &perms));
    assert!(!reg.can_user(Capability::View, &Actor::user(AgentId(2)), &perms));
}

#[test]
fn guests_cannot_register() {
    let directory = Directory::new();
    let err = Registration::new(directory.project(), &Actor::guest(), &directory).unwrap_err();
    assert!(matches!(err, RegistrationError::OwnerRequired(_)));
}

// ── Projection & Deletion ───────────────────────────────────────────────────

#[test]
fn projection_reflects_persisted_state() {
    let directory = Directory::new();
    let repository = MemoryRepository::default();
    let mut reg = persisted(&directory, &repository);
    reg.agent_relations_mut().relate(
        AgentRelation::enabled("coletivo", Arc::clone(&directory.agents[&AgentId(2)])).with_control(true),
    );
    let registry: RelationRegistry = [RelationDefinition {
        group: "coletivo".into(),
        label: "Coletivo".into(),
        description: "Agente coletivo sem CNPJ".into(),
    }]
    .into_iter()
    .collect();
    let urls = UrlBuilder::new("http://localhost:8080/").unwrap();

    let view = RegistrationView::from_registration(&reg, &registry, &urls);

    assert_eq!(view.number.as_deref(), Some("7-001"));
    assert_eq!(view.owner.name, "AgentA");
    assert_eq!(
        view.agent_relations[0].agent.as_ref().map(|a| a.name.as_str()),
        Some("AgentB")
    );
    assert_eq!(
        view.single_url.as_deref(),
        Some("http://localhost:8080/registration/1/")
    );
}

#[test]
fn delete_removes_registration_and_metadata_only() {
    let directory = Directory::new();
    let repository = MemoryRepository::default();
    let mut reg = persisted(&directory, &repository);
    reg.metadata_mut().set("phone", "555-0100");
    repository.save(&mut reg, true).unwrap();
    let id = reg.id().unwrap();

    repository.delete(reg).unwrap();

    assert!(repository.find(id).is_none());
    assert!(directory.find_agent(AgentId(1)).is_some());
    assert!(directory.projects.contains_key(&ProjectId(7)));
}

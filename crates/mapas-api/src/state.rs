//! # Application State
//!
//! Shared state for the Axum application: configuration, the in-memory
//! stores, and the port adapters built over them. Cloning an `AppState` is
//! cheap; every store is behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use mapas_core::{AgentId, EntityRef, ProjectId, RegistrationId};
use mapas_state::{Agent, OwnershipTransferRequest, Project, RelationDefinition, RelationRegistry};

use crate::adapters::{
    HookLog, MemoryDirectory, MemoryOwnershipRequests, MemoryPermissions, MemoryRegistrations,
};
use crate::config::AppConfig;

// ── Generic In-Memory Store ─────────────────────────────────────────────────

/// Thread-safe, cloneable in-memory key-value store keyed by integer id.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not `tokio::sync`)
/// because we never hold the lock across `.await` points or across a status
/// transition.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<u64, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: u64, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    pub fn get(&self, id: u64) -> Option<T> {
        self.data.read().get(&id).cloned()
    }

    /// Any one record matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| predicate(v)).cloned()
    }

    pub fn remove(&self, id: u64) -> Option<T> {
        self.data.write().remove(&id)
    }

    /// Remove every record matching `predicate`, returning how many went.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> usize {
        let mut guard = self.data.write();
        let before = guard.len();
        guard.retain(|_, v| !predicate(v));
        before - guard.len()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Application State ───────────────────────────────────────────────────────

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registrations: MemoryRegistrations,
    pub directory: MemoryDirectory,
    pub ownership_requests: MemoryOwnershipRequests,
    pub permissions: MemoryPermissions,
    pub hooks: HookLog,
    /// Relation groups offered on registration forms, in display order.
    pub relations: Arc<RelationRegistry>,
}

impl AppState {
    /// State with default configuration (auth disabled).
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let registrations = MemoryRegistrations::new();
        let permissions = MemoryPermissions::new(registrations.clone());
        Self {
            config,
            registrations,
            directory: MemoryDirectory::default(),
            ownership_requests: MemoryOwnershipRequests::default(),
            permissions,
            hooks: HookLog::default(),
            relations: Arc::new(default_relations()),
        }
    }

    // ── Development seeding ──
    //
    // The directories, grants and transfer requests are owned by other
    // services on a real deployment. These helpers populate the in-memory
    // stand-ins.

    pub fn add_agent(&self, id: u64, name: &str) -> Arc<Agent> {
        self.directory.add_agent(Agent::new(AgentId(id), name))
    }

    pub fn add_project(&self, id: u64, name: &str) -> Arc<Project> {
        self.directory.add_project(Project::new(ProjectId(id), name))
    }

    /// Grant agent `agent` `@control` over `target`.
    pub fn grant_control(&self, target: EntityRef, agent: u64) {
        self.permissions.grant(target, AgentId(agent));
    }

    /// Open a pending transfer of `registration` to agent `to`.
    pub fn request_ownership_transfer(
        &self,
        registration: RegistrationId,
        to: Arc<Agent>,
        requested_by: Option<AgentId>,
    ) {
        self.ownership_requests.open(OwnershipTransferRequest {
            origin: EntityRef::registration(registration),
            agent: to,
            requested_by,
        });
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Relation groups registered for registrations out of the box.
fn default_relations() -> RelationRegistry {
    [
        RelationDefinition {
            group: "coletivo".to_string(),
            label: "Agente coletivo sem CNPJ".to_string(),
            description: "Grupo ou coletivo que participa da inscrição".to_string(),
        },
        RelationDefinition {
            group: "instituicao".to_string(),
            label: "Instituição responsável".to_string(),
            description: "Agente coletivo com CNPJ responsável pela inscrição".to_string(),
        },
    ]
    .into_iter()
    .collect()
}

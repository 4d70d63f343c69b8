//! # Registration Entity
//!
//! A registration ties an owning [`Agent`] to a [`Project`] and tracks its
//! review status. Metadata, files and agent relations are composed in as
//! sub-objects rather than flattened onto the entity.
//!
//! ## Invariants
//!
//! - `id` is assigned once, by storage, and never changes afterwards.
//! - `owner` is always present. Construction fails without one, and the
//!   id-based setter leaves the current owner in place on a miss.
//! - `status` is written only by the [`StatusMachine`](crate::StatusMachine).
//!   [`Registration::set_status`] accepts a value and ignores it.
//! - `number` is derived from `project.id` and `id`, never stored.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mapas_core::{Actor, AgentId, ProjectId, RegistrationId};

use crate::error::RegistrationError;
use crate::files::FileGroups;
use crate::metadata::MetadataStore;
use crate::ports::{AgentDirectory, ProjectDirectory};
use crate::relations::AgentRelations;
use crate::status::RegistrationStatus;

// ── Referenced Entities ─────────────────────────────────────────────────────

/// A participant (person or organization). Shared by reference; never
/// owned by a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The call a registration is submitted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
}

impl Project {
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

// ── Registration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    id: Option<RegistrationId>,
    category: String,
    project: Arc<Project>,
    owner: Arc<Agent>,
    status: RegistrationStatus,
    #[serde(default)]
    agent_relations: AgentRelations,
    #[serde(default)]
    files: FileGroups,
    #[serde(default)]
    metadata: MetadataStore,
}

impl Registration {
    /// Create a draft registration owned by the actor's profile agent.
    ///
    /// # Errors
    ///
    /// - `OwnerRequired` if the actor has no profile (guests).
    /// - `AgentNotFound` if the profile agent cannot be resolved.
    pub fn new(
        project: Arc<Project>,
        actor: &Actor,
        agents: &dyn AgentDirectory,
    ) -> Result<Self, RegistrationError> {
        let profile = actor
            .profile
            .ok_or_else(|| RegistrationError::OwnerRequired(actor.clone()))?;
        let owner = agents
            .find_agent(profile)
            .ok_or(RegistrationError::AgentNotFound(profile))?;
        Ok(Self::with_owner(project, owner))
    }

    /// Create a draft registration with an explicit owner.
    pub fn with_owner(project: Arc<Project>, owner: Arc<Agent>) -> Self {
        Self {
            id: None,
            category: String::new(),
            project,
            owner,
            status: RegistrationStatus::Draft,
            agent_relations: AgentRelations::new(),
            files: FileGroups::new(),
            metadata: MetadataStore::new(),
        }
    }

    pub fn id(&self) -> Option<RegistrationId> {
        self.id
    }

    /// Record the storage-assigned id.
    ///
    /// # Errors
    ///
    /// Returns `IdAlreadyAssigned` if the registration already has one.
    pub fn assign_id(&mut self, id: RegistrationId) -> Result<(), RegistrationError> {
        match self.id {
            Some(existing) => Err(RegistrationError::IdAlreadyAssigned { existing }),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    /// Display number `"{project id}-{id padded to 3 digits}"`, or `None`
    /// before the registration has been persisted.
    pub fn number(&self) -> Option<String> {
        self.id
            .map(|id| format!("{}-{:03}", self.project.id.0, id.0))
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    pub fn set_project(&mut self, project: Arc<Project>) {
        self.project = project;
    }

    /// Replace the project by id.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` on a miss; the current project is kept.
    pub fn set_project_id(
        &mut self,
        id: ProjectId,
        projects: &dyn ProjectDirectory,
    ) -> Result<(), RegistrationError> {
        let project = projects
            .find_project(id)
            .ok_or(RegistrationError::ProjectNotFound(id))?;
        self.project = project;
        Ok(())
    }

    /// The recorded owner. For "who owns this now", ask the
    /// [`OwnershipResolver`](crate::OwnershipResolver): a transfer in
    /// flight does not touch this field.
    pub fn owner(&self) -> &Arc<Agent> {
        &self.owner
    }

    pub fn set_owner(&mut self, owner: Arc<Agent>) {
        self.owner = owner;
    }

    /// Replace the owner by id.
    ///
    /// # Errors
    ///
    /// Returns `AgentNotFound` on a miss; the current owner is kept.
    pub fn set_owner_id(
        &mut self,
        id: AgentId,
        agents: &dyn AgentDirectory,
    ) -> Result<(), RegistrationError> {
        let agent = agents
            .find_agent(id)
            .ok_or(RegistrationError::AgentNotFound(id))?;
        self.owner = agent;
        Ok(())
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    /// Plain field setter. Always a no-op: status moves only through the
    /// status machine, which authorizes and notifies.
    pub fn set_status(&mut self, status: RegistrationStatus) {
        tracing::debug!(
            registration = ?self.id,
            ignored = %status,
            current = %self.status,
            "plain status assignment ignored"
        );
    }

    pub(crate) fn apply_status(&mut self, status: RegistrationStatus) {
        self.status = status;
    }

    pub fn agent_relations(&self) -> &AgentRelations {
        &self.agent_relations
    }

    pub fn agent_relations_mut(&mut self) -> &mut AgentRelations {
        &mut self.agent_relations
    }

    pub fn files(&self) -> &FileGroups {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut FileGroups {
        &mut self.files
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.metadata
    }

    /// Short label for logs and error messages.
    pub(crate) fn label(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => "unsaved registration".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Agents(HashMap<AgentId, Arc<Agent>>);

    impl AgentDirectory for Agents {
        fn find_agent(&self, id: AgentId) -> Option<Arc<Agent>> {
            self.0.get(&id).cloned()
        }
    }

    struct Projects(HashMap<ProjectId, Arc<Project>>);

    impl ProjectDirectory for Projects {
        fn find_project(&self, id: ProjectId) -> Option<Arc<Project>> {
            self.0.get(&id).cloned()
        }
    }

    fn agents() -> Agents {
        Agents(
            [(1, "Ana"), (2, "Bruno")]
                .into_iter()
                .map(|(id, name)| (AgentId(id), Arc::new(Agent::new(AgentId(id), name))))
                .collect(),
        )
    }

    fn project(id: u64) -> Arc<Project> {
        Arc::new(Project::new(ProjectId(id), format!("Project {id}")))
    }

    #[test]
    fn new_defaults_owner_to_actor_profile() {
        let reg = Registration::new(project(7), &Actor::user(AgentId(1)), &agents()).unwrap();
        assert_eq!(reg.owner().id, AgentId(1));
        assert_eq!(reg.status(), RegistrationStatus::Draft);
        assert_eq!(reg.id(), None);
        assert_eq!(reg.category(), "");
    }

    #[test]
    fn guest_cannot_own_a_registration() {
        let err = Registration::new(project(7), &Actor::guest(), &agents()).unwrap_err();
        assert!(matches!(err, RegistrationError::OwnerRequired(_)));
    }

    #[test]
    fn unknown_profile_is_reported() {
        let err = Registration::new(project(7), &Actor::user(AgentId(99)), &agents()).unwrap_err();
        assert!(matches!(err, RegistrationError::AgentNotFound(AgentId(99))));
    }

    #[test]
    fn number_is_absent_until_persisted() {
        let mut reg = Registration::new(project(7), &Actor::user(AgentId(1)), &agents()).unwrap();
        assert_eq!(reg.number(), None);
        reg.assign_id(RegistrationId(42)).unwrap();
        assert_eq!(reg.number().as_deref(), Some("7-042"));
    }

    #[test]
    fn number_does_not_truncate_long_ids() {
        let mut reg = Registration::new(project(7), &Actor::user(AgentId(1)), &agents()).unwrap();
        reg.assign_id(RegistrationId(1234)).unwrap();
        assert_eq!(reg.number().as_deref(), Some("7-1234"));
    }

    #[test]
    fn id_is_immutable_once_assigned() {
        let mut reg = Registration::new(project(7), &Actor::user(AgentId(1)), &agents()).unwrap();
        reg.assign_id(RegistrationId(1)).unwrap();
        let err = reg.assign_id(RegistrationId(2)).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::IdAlreadyAssigned {
                existing: RegistrationId(1)
            }
        ));
        assert_eq!(reg.id(), Some(RegistrationId(1)));
    }

    #[test]
    fn plain_status_setter_is_inert() {
        let mut reg = Registration::new(project(7), &Actor::user(AgentId(1)), &agents()).unwrap();
        reg.set_status(RegistrationStatus::Approved);
        assert_eq!(reg.status(), RegistrationStatus::Draft);
    }

    #[test]
    fn set_owner_id_keeps_owner_on_miss() {
        let directory = agents();
        let mut reg = Registration::new(project(7), &Actor::user(AgentId(1)), &directory).unwrap();
        reg.set_owner_id(AgentId(2), &directory).unwrap();
        assert_eq!(reg.owner().id, AgentId(2));
        let err = reg.set_owner_id(AgentId(50), &directory).unwrap_err();
        assert!(matches!(err, RegistrationError::AgentNotFound(AgentId(50))));
        assert_eq!(reg.owner().id, AgentId(2));
    }

    #[test]
    fn set_project_id_keeps_project_on_miss() {
        let projects = Projects([(ProjectId(8), project(8))].into_iter().collect());
        let mut reg = Registration::new(project(7), &Actor::user(AgentId(1)), &agents()).unwrap();
        reg.set_project_id(ProjectId(8), &projects).unwrap();
        assert_eq!(reg.project().id, ProjectId(8));
        assert!(reg.set_project_id(ProjectId(9), &projects).is_err());
        assert_eq!(reg.project().id, ProjectId(8));
    }

    #[test]
    fn serialization_roundtrip_keeps_status() {
        let mut reg = Registration::new(project(3), &Actor::user(AgentId(1)), &agents()).unwrap();
        reg.assign_id(RegistrationId(5)).unwrap();
        reg.apply_status(RegistrationStatus::Waitlist);
        reg.metadata_mut().set("phone", "555");
        let json = serde_json::to_string(&reg).unwrap();
        let parsed: Registration = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reg);
    }
}

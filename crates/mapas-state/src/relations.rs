//! # Agent Relations
//!
//! Role-tagged links between a registration and other agents, each filed
//! under a relation group (`coletivo`, `instituicao`, ...). A relation
//! created on behalf of an agent the requester does not control starts
//! out `Pending` until that agent accepts; pending relations are invisible
//! to [`AgentRelations::related_agents`] and to access checks.
//!
//! The platform registers a fixed, ordered list of [`RelationDefinition`]s
//! for registrations. The projection emits one entry per definition.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mapas_core::AgentId;

use crate::registration::Agent;

// ── Relations ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationStatus {
    Enabled,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRelation {
    pub group: String,
    pub agent: Arc<Agent>,
    /// Whether the related agent shares control of the registration.
    pub has_control: bool,
    pub status: RelationStatus,
}

impl AgentRelation {
    pub fn enabled(group: impl Into<String>, agent: Arc<Agent>) -> Self {
        Self {
            group: group.into(),
            agent,
            has_control: false,
            status: RelationStatus::Enabled,
        }
    }

    pub fn pending(group: impl Into<String>, agent: Arc<Agent>) -> Self {
        Self {
            status: RelationStatus::Pending,
            ..Self::enabled(group, agent)
        }
    }

    pub fn with_control(mut self, has_control: bool) -> Self {
        self.has_control = has_control;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.status == RelationStatus::Enabled
    }
}

/// The relations of one registration, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRelations {
    relations: Vec<AgentRelation>,
}

impl AgentRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relation. Returns `false` if the agent is already related in
    /// that group.
    pub fn relate(&mut self, relation: AgentRelation) -> bool {
        if self.find(&relation.group, relation.agent.id).is_some() {
            return false;
        }
        self.relations.push(relation);
        true
    }

    pub fn unrelate(&mut self, group: &str, agent: AgentId) -> bool {
        let before = self.relations.len();
        self.relations
            .retain(|r| !(r.group == group && r.agent.id == agent));
        self.relations.len() != before
    }

    /// Accept a pending relation. Returns `false` if there is no such
    /// relation.
    pub fn enable(&mut self, group: &str, agent: AgentId) -> bool {
        match self
            .relations
            .iter_mut()
            .find(|r| r.group == group && r.agent.id == agent)
        {
            Some(relation) => {
                relation.status = RelationStatus::Enabled;
                true
            }
            None => false,
        }
    }

    /// Enabled related agents grouped by relation group, each group in
    /// insertion order.
    pub fn related_agents(&self) -> BTreeMap<String, Vec<Arc<Agent>>> {
        let mut grouped: BTreeMap<String, Vec<Arc<Agent>>> = BTreeMap::new();
        for relation in self.relations.iter().filter(|r| r.is_enabled()) {
            grouped
                .entry(relation.group.clone())
                .or_default()
                .push(Arc::clone(&relation.agent));
        }
        grouped
    }

    /// Every enabled related agent, across groups.
    pub fn agents(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.relations
            .iter()
            .filter(|r| r.is_enabled())
            .map(|r| &r.agent)
    }

    /// The first enabled agent related in `group`.
    pub fn first_in_group(&self, group: &str) -> Option<&Arc<Agent>> {
        self.relations
            .iter()
            .find(|r| r.is_enabled() && r.group == group)
            .map(|r| &r.agent)
    }

    /// All relations, pending included.
    pub fn iter(&self) -> impl Iterator<Item = &AgentRelation> {
        self.relations.iter()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn find(&self, group: &str, agent: AgentId) -> Option<&AgentRelation> {
        self.relations
            .iter()
            .find(|r| r.group == group && r.agent.id == agent)
    }
}

// ── Definitions ─────────────────────────────────────────────────────────────

/// A relation group offered on registration forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// Group name relations of this kind are filed under.
    pub group: String,
    pub label: String,
    pub description: String,
}

/// Ordered list of the relation groups registered for registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationRegistry {
    definitions: Vec<RelationDefinition>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. A definition for an already-registered group
    /// replaces it in place, keeping its position.
    pub fn register(&mut self, definition: RelationDefinition) {
        match self
            .definitions
            .iter_mut()
            .find(|d| d.group == definition.group)
        {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
    }

    pub fn get(&self, group: &str) -> Option<&RelationDefinition> {
        self.definitions.iter().find(|d| d.group == group)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<RelationDefinition> for RelationRegistry {
    fn from_iter<I: IntoIterator<Item = RelationDefinition>>(iter: I) -> Self {
        let mut registry = Self::new();
        for definition in iter {
            registry.register(definition);
        }
        registry
    }
}

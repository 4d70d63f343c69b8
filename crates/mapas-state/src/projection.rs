//! # Display Projection
//!
//! Read-only JSON document a presentation layer renders a registration from.
//!
//! ```text
//! { id, project: {id, name, singleUrl}, number, owner: {id, name, singleUrl},
//!   agentRelations: [ {label, description, agent: {id, name, singleUrl} | null} ],
//!   files: { group: {id, url, name, deleteUrl} },
//!   singleUrl, editUrl, status }
//! ```
//!
//! `agentRelations` has one entry per registered relation definition, in
//! registry order. The agent shown is the first enabled related agent of the
//! definition's group. `owner` is the recorded owner, not the effective one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mapas_core::{FileId, RegistrationId, UrlBuilder};

use crate::registration::{Agent, Project, Registration};
use crate::relations::RelationRegistry;
use crate::status::RegistrationStatus;

/// `{id, name, singleUrl}` summary of a referenced entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySummary {
    pub id: u64,
    pub name: String,
    pub single_url: String,
}

impl EntitySummary {
    pub fn of_agent(agent: &Agent, urls: &UrlBuilder) -> Self {
        Self {
            id: agent.id.get(),
            name: agent.name.clone(),
            single_url: urls.agent_single(agent.id),
        }
    }

    pub fn of_project(project: &Project, urls: &UrlBuilder) -> Self {
        Self {
            id: project.id.get(),
            name: project.name.clone(),
            single_url: urls.project_single(project.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRelationView {
    pub label: String,
    pub description: String,
    pub agent: Option<EntitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub id: FileId,
    pub url: String,
    pub name: String,
    pub delete_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    pub id: Option<RegistrationId>,
    pub project: EntitySummary,
    pub number: Option<String>,
    pub owner: EntitySummary,
    pub agent_relations: Vec<AgentRelationView>,
    pub files: BTreeMap<String, FileView>,
    pub single_url: Option<String>,
    pub edit_url: Option<String>,
    pub status: RegistrationStatus,
}

impl RegistrationView {
    pub fn from_registration(
        registration: &Registration,
        registry: &RelationRegistry,
        urls: &UrlBuilder,
    ) -> Self {
        let related = registration.agent_relations();

        let agent_relations = registry
            .iter()
            .map(|definition| AgentRelationView {
                label: definition.label.clone(),
                description: definition.description.clone(),
                agent: related
                    .first_in_group(&definition.group)
                    .map(|agent| EntitySummary::of_agent(agent, urls)),
            })
            .collect();

        let files = registration
            .files()
            .iter()
            .map(|(group, file)| {
                let view = FileView {
                    id: file.id,
                    url: file.url.clone(),
                    name: file.name.clone(),
                    delete_url: urls.file_delete(file.id),
                };
                (group.to_string(), view)
            })
            .collect();

        let id = registration.id();
        Self {
            id,
            project: EntitySummary::of_project(registration.project(), urls),
            number: registration.number(),
            owner: EntitySummary::of_agent(registration.owner(), urls),
            agent_relations,
            files,
            single_url: id.map(|id| urls.registration_single(id)),
            edit_url: id.map(|id| urls.registration_edit(id)),
            status: registration.status(),
        }
    }
}

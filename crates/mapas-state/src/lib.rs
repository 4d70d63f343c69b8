//! # mapas-state: Registration Entity and Status Machine
//!
//! A registration is an application an agent submits against a project.
//! This crate holds the entity, the rules that govern its status, and the
//! read-only views built from it.
//!
//! ## Status Machine
//!
//! ```text
//! DRAFT ──▶ SENT ──▶ APPROVED | WAITLIST | NOTAPPROVED | INVALID
//!   ▲                              │
//!   └──────── transition_to_draft ─┘
//! ```
//!
//! Every transition runs the same procedure (`machine.rs`):
//! authorize → notify before → mutate → force save → notify after.
//! There is no source-state guard; only the actor's right to change
//! status is checked.
//!
//! ## Collaborators
//!
//! Storage, permission checks, hook dispatch and ownership-transfer
//! requests are external. They are reached through the traits in
//! [`ports`] and injected by the caller.
//!
//! ## Modules
//!
//! - `registration.rs`: the entity and its invariants.
//! - `status.rs`: status codes and hook names.
//! - `machine.rs`: the [`StatusMachine`].
//! - `ownership.rs`: the [`OwnershipResolver`].
//! - `access.rs`: `can_view` / `can_change_status` predicates.
//! - `metadata.rs`, `files.rs`, `relations.rs`: composed sub-objects.
//! - `projection.rs`: the display document.

pub mod access;
pub mod error;
pub mod files;
pub mod machine;
pub mod metadata;
pub mod ownership;
pub mod ports;
pub mod projection;
pub mod registration;
pub mod relations;
pub mod status;

pub use error::RegistrationError;
pub use files::{FileGroups, FileRef};
pub use machine::StatusMachine;
pub use metadata::MetadataStore;
pub use ownership::{EffectiveOwner, OwnerStatus, OwnershipResolver, OwnershipTransferRequest};
pub use ports::{
    AgentDirectory, OwnershipRequestLookup, PermissionChecker, ProjectDirectory,
    RegistrationRepository, StatusNotifier,
};
pub use projection::{AgentRelationView, EntitySummary, FileView, RegistrationView};
pub use registration::{Agent, Project, Registration};
pub use relations::{AgentRelation, AgentRelations, RelationDefinition, RelationRegistry, RelationStatus};
pub use status::{RegistrationStatus, StatusError, StatusHook, Transition};

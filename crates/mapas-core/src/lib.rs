//! # mapas-core: Foundational Types for the Registration Domain
//!
//! Defines the primitives every other crate in the workspace builds on.
//! It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `RegistrationId`, `AgentId`,
//!    `ProjectId`, `FileId`: you cannot pass an agent id where a project id
//!    is expected.
//!
//! 2. **Explicit actors.** There is no ambient "current user". Every
//!    permission-checked operation receives an [`Actor`].
//!
//! 3. **Named capabilities.** Permission questions are asked with a
//!    [`Capability`] against an [`EntityRef`], never with free-form strings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mapas-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod actor;
pub mod capability;
pub mod error;
pub mod identity;
pub mod urls;

pub use actor::{Actor, Role};
pub use capability::Capability;
pub use error::{PersistenceError, UrlError};
pub use identity::{AgentId, EntityKind, EntityRef, FileId, ProjectId, RegistrationId};
pub use urls::UrlBuilder;

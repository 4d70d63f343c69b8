//! # Access Predicates
//!
//! Who may view a registration, control it, or change its status.
//!
//! | Capability     | Guest | Admin | Otherwise |
//! |----------------|-------|-------|-----------|
//! | `view`         | no    | yes   | control of the registration, its project, or any enabled related agent |
//! | `changeStatus` | no    | -     | control of the project (admins get no bypass) |
//! | `@control`     | no    | yes   | the permission layer, on the registration itself |

use mapas_core::{Actor, Capability, EntityRef};

use crate::error::RegistrationError;
use crate::ports::PermissionChecker;
use crate::registration::Registration;

impl Registration {
    /// Capability dispatch: the registration answers `view` and
    /// `changeStatus` itself and asks the permission layer for `@control`.
    pub fn can_user(
        &self,
        capability: Capability,
        actor: &Actor,
        perms: &dyn PermissionChecker,
    ) -> bool {
        match capability {
            Capability::View => self.can_view(actor, perms),
            Capability::ChangeStatus => self.can_change_status(actor, perms),
            Capability::Control => self.can_control(actor, perms),
        }
    }

    /// # Errors
    ///
    /// Returns `PermissionDenied` when [`Registration::can_user`] is false.
    pub fn require_capability(
        &self,
        capability: Capability,
        actor: &Actor,
        perms: &dyn PermissionChecker,
    ) -> Result<(), RegistrationError> {
        if self.can_user(capability, actor, perms) {
            return Ok(());
        }
        tracing::warn!(
            registration = %self.label(),
            actor = %actor,
            capability = %capability,
            "permission denied"
        );
        Err(RegistrationError::PermissionDenied {
            capability,
            actor: actor.clone(),
            target: self.label(),
        })
    }

    pub fn can_view(&self, actor: &Actor, perms: &dyn PermissionChecker) -> bool {
        if actor.is_guest() {
            return false;
        }
        if actor.is_admin() {
            return true;
        }
        if self.controls_self(actor, perms) {
            return true;
        }
        let project = EntityRef::project(self.project().id);
        if perms.actor_has_capability(project, Capability::Control, actor) {
            return true;
        }
        self.agent_relations().agents().any(|agent| {
            perms.actor_has_capability(EntityRef::agent(agent.id), Capability::Control, actor)
        })
    }

    pub fn can_change_status(&self, actor: &Actor, perms: &dyn PermissionChecker) -> bool {
        if actor.is_guest() {
            return false;
        }
        let project = EntityRef::project(self.project().id);
        perms.actor_has_capability(project, Capability::Control, actor)
    }

    pub fn can_control(&self, actor: &Actor, perms: &dyn PermissionChecker) -> bool {
        if actor.is_guest() {
            return false;
        }
        if actor.is_admin() {
            return true;
        }
        self.controls_self(actor, perms)
    }

    /// Control of the registration record itself. An unsaved registration
    /// has no identity the permission layer could answer for.
    fn controls_self(&self, actor: &Actor, perms: &dyn PermissionChecker) -> bool {
        self.id().map_or(false, |id| {
            perms.actor_has_capability(EntityRef::registration(id), Capability::Control, actor)
        })
    }
}

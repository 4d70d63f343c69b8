//! # Status Machine
//!
//! Moves a registration between statuses. Every public transition funnels
//! into one procedure:
//!
//! 1. **Authorize**: the actor must hold `changeStatus`. On failure nothing
//!    else happens.
//! 2. **Notify before**: [`StatusHook::Before`].
//! 3. **Mutate**: the new status is written.
//! 4. **Persist**: forced, immediate save.
//! 5. **Notify after**: [`StatusHook::After`], only once the save succeeded.
//!
//! The sequence is not transactional. If the save fails, the error is
//! returned with the in-memory status already changed and no rollback; the
//! caller decides whether to discard the instance. Two concurrent
//! transitions on the same record are last-write-wins at the store.

use mapas_core::{Actor, Capability};

use crate::error::RegistrationError;
use crate::ports::{PermissionChecker, RegistrationRepository, StatusNotifier};
use crate::registration::Registration;
use crate::status::{StatusHook, Transition};

pub struct StatusMachine<'a> {
    permissions: &'a dyn PermissionChecker,
    notifier: &'a dyn StatusNotifier,
    repository: &'a dyn RegistrationRepository,
}

impl std::fmt::Debug for StatusMachine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMachine").finish_non_exhaustive()
    }
}

impl<'a> StatusMachine<'a> {
    pub fn new(
        permissions: &'a dyn PermissionChecker,
        notifier: &'a dyn StatusNotifier,
        repository: &'a dyn RegistrationRepository,
    ) -> Self {
        Self {
            permissions,
            notifier,
            repository,
        }
    }

    pub fn transition_to_draft(
        &self,
        registration: &mut Registration,
        actor: &Actor,
    ) -> Result<(), RegistrationError> {
        self.apply(registration, actor, Transition::ToDraft)
    }

    pub fn transition_to_approved(
        &self,
        registration: &mut Registration,
        actor: &Actor,
    ) -> Result<(), RegistrationError> {
        self.apply(registration, actor, Transition::ToApproved)
    }

    pub fn transition_to_not_approved(
        &self,
        registration: &mut Registration,
        actor: &Actor,
    ) -> Result<(), RegistrationError> {
        self.apply(registration, actor, Transition::ToNotApproved)
    }

    pub fn transition_to_waitlist(
        &self,
        registration: &mut Registration,
        actor: &Actor,
    ) -> Result<(), RegistrationError> {
        self.apply(registration, actor, Transition::ToWaitlist)
    }

    pub fn transition_to_invalid(
        &self,
        registration: &mut Registration,
        actor: &Actor,
    ) -> Result<(), RegistrationError> {
        self.apply(registration, actor, Transition::ToInvalid)
    }

    /// Run `transition` through the authorize/notify/mutate/persist/notify
    /// procedure.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied`: nothing changed, no hook fired.
    /// - `Persistence`: status changed in memory, before-hook fired,
    ///   after-hook not fired.
    pub fn apply(
        &self,
        registration: &mut Registration,
        actor: &Actor,
        transition: Transition,
    ) -> Result<(), RegistrationError> {
        registration.require_capability(Capability::ChangeStatus, actor, self.permissions)?;

        let from = registration.status();
        let to = transition.target();

        self.notifier.notify(StatusHook::Before, registration);

        registration.apply_status(to);

        if let Err(err) = self.repository.save(registration, true) {
            tracing::error!(
                registration = %registration.label(),
                %from,
                %to,
                error = %err,
                "status change not persisted; in-memory status left at target"
            );
            return Err(err.into());
        }

        self.notifier.notify(StatusHook::After, registration);

        tracing::info!(
            registration = %registration.label(),
            actor = %actor,
            %from,
            %to,
            "registration status changed"
        );
        Ok(())
    }
}

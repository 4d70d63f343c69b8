//! # Registration Status
//!
//! Status codes and the hooks fired around a status change.
//!
//! The numeric codes are historical and persisted as-is. They carry no
//! ordering: `APPROVED = 10` is not "greater" than `SENT = 1` in any
//! meaningful way, so [`RegistrationStatus`] deliberately does not
//! implement `PartialOrd`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Status ──────────────────────────────────────────────────────────────────

/// The status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum RegistrationStatus {
    /// Being edited by its owner; not yet submitted.
    #[default]
    Draft,
    /// Submitted. Shares its code with the platform's generic "enabled".
    Sent,
    /// Accepted by the project's controllers.
    Approved,
    /// Accepted conditionally, pending a free slot.
    Waitlist,
    /// Rejected on merit.
    NotApproved,
    /// Rejected as not meeting the call's requirements.
    Invalid,
}

impl RegistrationStatus {
    pub const DRAFT: i16 = 0;
    pub const ENABLED: i16 = 1;
    pub const SENT: i16 = Self::ENABLED;
    pub const APPROVED: i16 = 10;
    pub const WAITLIST: i16 = 8;
    pub const NOTAPPROVED: i16 = 3;
    pub const INVALID: i16 = 2;

    /// The persisted integer code.
    pub fn code(&self) -> i16 {
        match self {
            Self::Draft => Self::DRAFT,
            Self::Sent => Self::SENT,
            Self::Approved => Self::APPROVED,
            Self::Waitlist => Self::WAITLIST,
            Self::NotApproved => Self::NOTAPPROVED,
            Self::Invalid => Self::INVALID,
        }
    }

    /// Decode a persisted integer code.
    pub fn from_code(code: i16) -> Result<Self, StatusError> {
        match code {
            Self::DRAFT => Ok(Self::Draft),
            Self::SENT => Ok(Self::Sent),
            Self::APPROVED => Ok(Self::Approved),
            Self::WAITLIST => Ok(Self::Waitlist),
            Self::NOTAPPROVED => Ok(Self::NotApproved),
            Self::INVALID => Ok(Self::Invalid),
            other => Err(StatusError::UnknownCode(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Sent => "SENT",
            Self::Approved => "APPROVED",
            Self::Waitlist => "WAITLIST",
            Self::NotApproved => "NOTAPPROVED",
            Self::Invalid => "INVALID",
        }
    }
}

impl From<RegistrationStatus> for i16 {
    fn from(status: RegistrationStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i16> for RegistrationStatus {
    type Error = StatusError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Transitions ─────────────────────────────────────────────────────────────

/// The publicly reachable status transitions.
///
/// `SENT` is absent: submission is not a status-machine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    ToDraft,
    ToApproved,
    ToNotApproved,
    ToWaitlist,
    ToInvalid,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Self::ToDraft,
        Self::ToApproved,
        Self::ToNotApproved,
        Self::ToWaitlist,
        Self::ToInvalid,
    ];

    /// The status this transition sets.
    pub fn target(&self) -> RegistrationStatus {
        match self {
            Self::ToDraft => RegistrationStatus::Draft,
            Self::ToApproved => RegistrationStatus::Approved,
            Self::ToNotApproved => RegistrationStatus::NotApproved,
            Self::ToWaitlist => RegistrationStatus::Waitlist,
            Self::ToInvalid => RegistrationStatus::Invalid,
        }
    }

    /// Lowercase name used in request paths (`approved`, `waitlist`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToDraft => "draft",
            Self::ToApproved => "approved",
            Self::ToNotApproved => "notapproved",
            Self::ToWaitlist => "waitlist",
            Self::ToInvalid => "invalid",
        }
    }
}

impl std::str::FromStr for Transition {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StatusError::UnknownTransition(s.to_string()))
    }
}

// ── Hooks ───────────────────────────────────────────────────────────────────

/// Notifications emitted around every status change.
///
/// Both names are shared by all target statuses; observers read the new
/// status off the registration they receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusHook {
    Before,
    After,
}

impl StatusHook {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Before => "entity(Registration).approve:before",
            Self::After => "entity(Registration).approve:after",
        }
    }
}

impl std::fmt::Display for StatusHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("unknown registration status code {0}")]
    UnknownCode(i16),

    #[error("unknown status transition {0:?}")]
    UnknownTransition(String),
}

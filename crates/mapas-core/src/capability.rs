//! # Capabilities
//!
//! The named abilities an actor can hold on an entity. The string forms
//! match the action names the platform's permission layer uses
//! (`@control`, `changeStatus`, `view`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Full control over the entity (owner or delegated controller).
    #[serde(rename = "@control")]
    Control,
    /// May move a registration through its status transitions.
    #[serde(rename = "changeStatus")]
    ChangeStatus,
    /// May read the entity.
    #[serde(rename = "view")]
    View,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "@control",
            Self::ChangeStatus => "changeStatus",
            Self::View => "view",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_action_names() {
        let json = serde_json::to_string(&Capability::Control).unwrap();
        assert_eq!(json, "\"@control\"");
        let parsed: Capability = serde_json::from_str("\"changeStatus\"").unwrap();
        assert_eq!(parsed, Capability::ChangeStatus);
    }

    #[test]
    fn display_matches_as_str() {
        for cap in [Capability::Control, Capability::ChangeStatus, Capability::View] {
            assert_eq!(cap.to_string(), cap.as_str());
        }
    }
}

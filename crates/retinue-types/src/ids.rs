//! Type-safe identifier wrappers.
//!
//! Agents and traits are addressed by human-readable string identifiers
//! (they appear verbatim in save data and in the trait template table).
//! Investments are opaque references owned by an external ledger, so they
//! wrap a [`Uuid`] instead.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id! {
    /// Unique identifier for an agent (individual or family head).
    ///
    /// Immutable after construction. The manager rejects a second agent
    /// carrying an id that is already on the roster.
    AgentId
}

define_string_id! {
    /// Unique identifier for a heritable trait (e.g. `"shrewd"`).
    TraitId
}

impl AgentId {
    /// Generate a fresh agent identifier of the form `agent-<uuid>`.
    ///
    /// Uses UUID v7 so generated ids sort by creation time.
    pub fn generate() -> Self {
        Self(format!("agent-{}", Uuid::now_v7().simple()))
    }
}

/// Opaque reference to an investment held by the external ledger.
///
/// Agents never interpret the referenced investment; they only count and
/// move these references during succession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InvestmentId(pub Uuid);

impl InvestmentId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for InvestmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for InvestmentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for InvestmentId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_agent_ids_are_unique() {
        let a = AgentId::generate();
        let b = AgentId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("agent-"));
    }

    #[test]
    fn string_id_display_matches_inner() {
        let id = TraitId::new("shrewd");
        assert_eq!(id.to_string(), "shrewd");
        assert_eq!(id.as_str(), "shrewd");
    }

    #[test]
    fn agent_id_serializes_transparently() {
        let id = AgentId::from("agent-001");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"agent-001\""));
    }

    #[test]
    fn investment_id_display_matches_uuid() {
        let id = InvestmentId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}

//! Enumeration types for the agent lifecycle engine.
//!
//! Each enum carries a stable integer tag used by the persistence layer.
//! The tag order is part of the save format and must not be reordered.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Cover Status
// ---------------------------------------------------------------------------

/// Status of an agent's cover identity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CoverStatus {
    /// Cover is secure.
    #[default]
    Secure,
    /// Cover is under suspicion.
    Suspicious,
    /// Cover is compromised.
    Compromised,
    /// Cover is fully exposed.
    Exposed,
}

impl CoverStatus {
    /// Base exposure points contributed by an agent with this cover.
    ///
    /// Secure=0, Suspicious=2, Compromised=5, Exposed=10.
    pub const fn base_exposure(self) -> u32 {
        match self {
            Self::Secure => 0,
            Self::Suspicious => 2,
            Self::Compromised => 5,
            Self::Exposed => 10,
        }
    }

    /// Stable integer tag for persistence.
    pub const fn tag(self) -> i64 {
        match self {
            Self::Secure => 0,
            Self::Suspicious => 1,
            Self::Compromised => 2,
            Self::Exposed => 3,
        }
    }

    /// Decode a persisted tag. Returns `None` for unknown values.
    pub const fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Self::Secure),
            1 => Some(Self::Suspicious),
            2 => Some(Self::Compromised),
            3 => Some(Self::Exposed),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Knowledge Level
// ---------------------------------------------------------------------------

/// How much an agent knows about the true nature of who they serve.
///
/// Gates loyalty decay, betrayal severity, and exposure scaling.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum KnowledgeLevel {
    /// Believes they serve an ordinary benefactor.
    #[default]
    None,
    /// Suspects something is not what it seems.
    Suspicious,
    /// Knows they serve something other than a mortal patron.
    Aware,
    /// Knows exactly what they serve.
    Full,
}

impl KnowledgeLevel {
    /// Divisor applied to the raw betrayal chance (`100 - loyalty`).
    ///
    /// None=10, Suspicious=5, Aware=2, Full=1.
    pub const fn betrayal_damping(self) -> i32 {
        match self {
            Self::None => 10,
            Self::Suspicious => 5,
            Self::Aware => 2,
            Self::Full => 1,
        }
    }

    /// Scale a base exposure value by this knowledge level.
    ///
    /// None x1, Suspicious x1.5 (truncated), Aware x2, Full x3.
    pub const fn scale_exposure(self, base: u32) -> u32 {
        match self {
            Self::None => base,
            Self::Suspicious => base.saturating_add(base / 2),
            Self::Aware => base.saturating_mul(2),
            Self::Full => base.saturating_mul(3),
        }
    }

    /// Stable integer tag for persistence.
    pub const fn tag(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Suspicious => 1,
            Self::Aware => 2,
            Self::Full => 3,
        }
    }

    /// Decode a persisted tag. Returns `None` for unknown values.
    pub const fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Self::None),
            1 => Some(Self::Suspicious),
            2 => Some(Self::Aware),
            3 => Some(Self::Full),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent Type
// ---------------------------------------------------------------------------

/// Concrete agent variant, used for persistence and dispatch.
///
/// `Cult` and `Bound` are reserved tags with no behavior attached; the
/// loader maps them back to `Individual`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AgentType {
    /// A single mortal agent with an optional successor.
    #[default]
    Individual,
    /// A bloodline dynasty that regenerates on the head's death.
    Family,
    /// Reserved: an organization of followers.
    Cult,
    /// Reserved: magically bound servants.
    Bound,
}

impl AgentType {
    /// Stable integer tag for persistence.
    pub const fn tag(self) -> i64 {
        match self {
            Self::Individual => 0,
            Self::Family => 1,
            Self::Cult => 2,
            Self::Bound => 3,
        }
    }

    /// Decode a persisted tag. Returns `None` for unknown values.
    pub const fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            0 => Some(Self::Individual),
            1 => Some(Self::Family),
            2 => Some(Self::Cult),
            3 => Some(Self::Bound),
            _ => None,
        }
    }

    /// Whether this tag has lifecycle behavior implemented.
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::Cult | Self::Bound)
    }
}

impl core::fmt::Display for AgentType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Family => write!(f, "family"),
            Self::Cult => write!(f, "cult"),
            Self::Bound => write!(f, "bound"),
        }
    }
}

//! Lifecycle notifications.
//!
//! These are the only externally observable events the lifecycle engine
//! emits. Agents queue them in their own outbox as their state changes;
//! the manager drains each outbox in processing order and appends its own
//! roster-level events (added, removed, died-with-successor).

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, TraitId};

/// A single lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// An agent joined the active roster.
    AgentAdded {
        /// The agent that was added.
        agent_id: AgentId,
    },
    /// An agent was detached from the active roster.
    AgentRemoved {
        /// The agent that was removed.
        agent_id: AgentId,
    },
    /// The manager resolved an individual's death.
    AgentDied {
        /// The agent that died.
        agent_id: AgentId,
        /// The successor that took over, if any.
        successor_id: Option<AgentId>,
    },
    /// A family head died and the next generation took over.
    GenerationAdvanced {
        /// The family agent.
        agent_id: AgentId,
        /// The new generation number.
        generation: u32,
    },
    /// A new trait entered a family's bloodline.
    NewTraitEmerged {
        /// The family agent.
        agent_id: AgentId,
        /// The trait that emerged.
        trait_id: TraitId,
    },
    /// An individual finished training their successor.
    SuccessorTrained {
        /// The mentoring agent.
        agent_id: AgentId,
        /// The successor that completed training.
        successor_id: AgentId,
    },
    /// An agent's loyalty changed value.
    LoyaltyChanged {
        /// The agent whose loyalty changed.
        agent_id: AgentId,
        /// Loyalty before the change.
        old: u32,
        /// Loyalty after the change.
        new: u32,
    },
    /// An agent's own death notification.
    Died {
        /// The agent that died.
        agent_id: AgentId,
    },
    /// An agent betrayed its master.
    Betrayed {
        /// The agent that betrayed.
        agent_id: AgentId,
    },
}

impl LifecycleEvent {
    /// The agent this event concerns.
    pub const fn agent_id(&self) -> &AgentId {
        match self {
            Self::AgentAdded { agent_id }
            | Self::AgentRemoved { agent_id }
            | Self::AgentDied { agent_id, .. }
            | Self::GenerationAdvanced { agent_id, .. }
            | Self::NewTraitEmerged { agent_id, .. }
            | Self::SuccessorTrained { agent_id, .. }
            | Self::LoyaltyChanged { agent_id, .. }
            | Self::Died { agent_id }
            | Self::Betrayed { agent_id } => agent_id,
        }
    }
}

//! Error types for the retinue-agents crate.
//!
//! Most lifecycle operations follow a documented-default contract (they
//! return `false`, `None`, or a neutral value instead of failing). Errors
//! are reserved for caller mistakes against the manager's addressable API.

use retinue_types::{AgentId, AgentType};

/// Errors that can occur during agent manager operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID was not found in the manager.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An agent with this ID already exists on the roster or apprentice pool.
    #[error("duplicate agent id: {0}")]
    DuplicateId(AgentId),

    /// The operation requires a different agent variant.
    #[error("agent {agent_id} is a {actual} agent, expected {expected}")]
    WrongAgentType {
        /// The agent the operation was attempted on.
        agent_id: AgentId,
        /// The variant the operation requires.
        expected: AgentType,
        /// The agent's actual variant.
        actual: AgentType,
    },

    /// The agent does not currently meet the recruitment requirements.
    #[error("agent {0} cannot recruit")]
    RecruitmentDenied(AgentId),

    /// A successor designation was rejected.
    #[error("invalid successor for {agent_id}: {reason}")]
    InvalidSuccessor {
        /// The agent whose successor was being set.
        agent_id: AgentId,
        /// Description of why the designation was rejected.
        reason: String,
    },
}

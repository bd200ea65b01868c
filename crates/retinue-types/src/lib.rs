//! Shared type definitions for the Retinue agent lifecycle engine.
//!
//! This crate is the single source of truth for identifiers, closed
//! enumerations, and lifecycle notifications used across the workspace.
//!
//! # Modules
//!
//! - [`ids`] -- Strongly-typed identifiers for agents, traits, and investments
//! - [`enums`] -- Cover status, knowledge level, and agent variant tags
//! - [`events`] -- Lifecycle notifications emitted by agents and the manager

pub mod enums;
pub mod events;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{AgentType, CoverStatus, KnowledgeLevel};
pub use events::LifecycleEvent;
pub use ids::{AgentId, InvestmentId, TraitId};

//! Agent lifecycle, succession, and trait inheritance for the Retinue engine.
//!
//! This crate contains the logic layer for agents -- everything that operates
//! on agent state without touching I/O. It sits between `retinue-types`
//! (identifiers, enums, notifications) and the persistence and runner crates.
//!
//! # Modules
//!
//! - [`agent`] -- The polymorphic agent ([`Agent`]): shared core state plus a
//!   closed set of variants dispatched through [`AgentBehavior`]
//! - [`config`] -- Tunable lifecycle parameters ([`LifecycleConfig`])
//! - [`error`] -- Error types for manager operations ([`AgentError`])
//! - [`family`] -- Bloodline dynasties: inheritance, emergence, generations
//! - [`individual`] -- Mortal agents: successor training and succession
//! - [`manager`] -- The roster owner and per-year orchestration ([`AgentManager`])
//! - [`traits`] -- Heritable traits, conflicts, and the template table

pub mod agent;
pub mod config;
pub mod error;
pub mod family;
pub mod individual;
pub mod manager;
pub mod traits;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, AgentBehavior, AgentCore, AgentVariant, DeathOutcome, MAX_TRAITS, YearOutcome};
pub use config::{BloodlineConfig, HeirConfig, LifecycleConfig, LoyaltyDecayConfig, RecruitConfig};
pub use error::AgentError;
pub use family::FamilyState;
pub use individual::IndividualState;
pub use manager::{AgentManager, YearReport};
pub use traits::{TRAIT_TEMPLATES, Trait, TraitTemplate, random_template};

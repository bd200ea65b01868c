//! Tunable parameters for the agent lifecycle.
//!
//! The [`LifecycleConfig`] struct bundles every probability and range the
//! yearly lifecycle consults so that callers (the chronicle runner, tests)
//! can override defaults. Every field has a default, so a partial YAML
//! section deserializes cleanly.
//!
//! Percent chances are whole numbers compared against a uniform roll in
//! `0..100`. Ranges are inclusive on both ends.

use rand::Rng;
use retinue_types::KnowledgeLevel;
use serde::{Deserialize, Serialize};

/// Configuration for the yearly agent lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Per-knowledge-level chance of losing one loyalty point each year.
    pub loyalty_decay: LoyaltyDecayConfig,

    /// Upper bound on the yearly betrayal chance, in percent (default: 25).
    pub betrayal_cap_pct: u32,

    /// Stat ranges for successors recruited by individual agents.
    pub recruit: RecruitConfig,

    /// Ranges applied to a freshly regenerated family head.
    pub heir: HeirConfig,

    /// Bloodline promotion and trait emergence tuning.
    pub bloodline: BloodlineConfig,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            loyalty_decay: LoyaltyDecayConfig::default(),
            betrayal_cap_pct: 25,
            recruit: RecruitConfig::default(),
            heir: HeirConfig::default(),
            bloodline: BloodlineConfig::default(),
        }
    }
}

/// Chance (in percent) of a one-point loyalty loss per year, keyed by how
/// much the agent knows about the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyDecayConfig {
    /// Knowledge level `None` (default: 0).
    pub none_pct: u32,
    /// Knowledge level `Suspicious` (default: 10).
    pub suspicious_pct: u32,
    /// Knowledge level `Aware` (default: 20).
    pub aware_pct: u32,
    /// Knowledge level `Full` (default: 30).
    pub full_pct: u32,
}

impl Default for LoyaltyDecayConfig {
    fn default() -> Self {
        Self {
            none_pct: 0,
            suspicious_pct: 10,
            aware_pct: 20,
            full_pct: 30,
        }
    }
}

impl LoyaltyDecayConfig {
    /// Decay chance for the given knowledge level.
    pub const fn chance_pct(&self, level: KnowledgeLevel) -> u32 {
        match level {
            KnowledgeLevel::None => self.none_pct,
            KnowledgeLevel::Suspicious => self.suspicious_pct,
            KnowledgeLevel::Aware => self.aware_pct,
            KnowledgeLevel::Full => self.full_pct,
        }
    }
}

/// Stat ranges for a freshly recruited successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecruitConfig {
    /// Youngest recruit age (default: 18).
    pub age_min: u32,
    /// Oldest recruit age (default: 29).
    pub age_max: u32,
    /// Shortest recruit lifespan (default: 60).
    pub lifespan_min: u32,
    /// Longest recruit lifespan (default: 84).
    pub lifespan_max: u32,
    /// Lowest starting loyalty (default: 40).
    pub loyalty_min: u32,
    /// Highest starting loyalty (default: 69).
    pub loyalty_max: u32,
    /// Lowest starting competence (default: 20).
    pub competence_min: u32,
    /// Highest starting competence (default: 49).
    pub competence_max: u32,
}

impl Default for RecruitConfig {
    fn default() -> Self {
        Self {
            age_min: 18,
            age_max: 29,
            lifespan_min: 60,
            lifespan_max: 84,
            loyalty_min: 40,
            loyalty_max: 69,
            competence_min: 20,
            competence_max: 49,
        }
    }
}

/// Ranges applied when a family head is replaced by the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeirConfig {
    /// Youngest heir age (default: 18).
    pub age_min: u32,
    /// Oldest heir age (default: 24).
    pub age_max: u32,
    /// Shortest heir lifespan (default: 60).
    pub lifespan_min: u32,
    /// Longest heir lifespan (default: 84).
    pub lifespan_max: u32,
    /// Largest loyalty loss on a generational change (default: 9).
    ///
    /// The actual loss is uniform in `0..=max_loyalty_penalty`.
    pub max_loyalty_penalty: u32,
}

impl Default for HeirConfig {
    fn default() -> Self {
        Self {
            age_min: 18,
            age_max: 24,
            lifespan_min: 60,
            lifespan_max: 84,
            max_loyalty_penalty: 9,
        }
    }
}

/// Bloodline promotion and new-trait emergence tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloodlineConfig {
    /// Chance that a head trait absent from the bloodline joins it (default: 50).
    pub promotion_chance_pct: u32,

    /// Base probability of a new trait emerging per generation (default: 0.05).
    pub emergence_base: f64,

    /// Emergence probability added per generation (default: 0.01).
    pub emergence_per_generation: f64,

    /// Upper bound on the emergence probability (default: 0.15).
    pub emergence_cap: f64,

    /// Template draws attempted before emergence gives up (default: 5).
    pub emergence_attempts: u32,
}

impl Default for BloodlineConfig {
    fn default() -> Self {
        Self {
            promotion_chance_pct: 50,
            emergence_base: 0.05,
            emergence_per_generation: 0.01,
            emergence_cap: 0.15,
            emergence_attempts: 5,
        }
    }
}

impl BloodlineConfig {
    /// Probability that a new trait emerges for a family at `generation`.
    ///
    /// ```text
    /// chance = min(emergence_base + emergence_per_generation * generation, emergence_cap)
    /// ```
    pub fn emergence_chance(&self, generation: u32) -> f64 {
        let raw = self.emergence_per_generation.mul_add(f64::from(generation), self.emergence_base);
        raw.min(self.emergence_cap)
    }
}

/// Draw a value uniformly from `min..=max`.
///
/// A misconfigured range where `max < min` collapses to `min` instead of
/// panicking inside the RNG.
pub fn roll_between(rng: &mut impl Rng, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Roll a whole-number percent chance against a uniform draw in `0..100`.
///
/// A zero chance never consumes randomness.
pub fn roll_percent(rng: &mut impl Rng, chance_pct: u32) -> bool {
    if chance_pct == 0 {
        return false;
    }
    rng.random_range(0..100_u32) < chance_pct
}

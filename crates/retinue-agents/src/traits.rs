//! Heritable traits and the template table families draw new traits from.
//!
//! A [`Trait`] is an immutable-after-construction record of modifiers. Agents
//! and family bloodlines hold traits behind [`Arc`] so the same trait can sit
//! in a head's trait list and a bloodline at once; membership is compared by
//! [`TraitId`], never by pointer.
//!
//! Conflict lists are declared one-directionally on each trait. Callers that
//! need a symmetric check use [`Trait::clashes_with`].

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use retinue_types::TraitId;
use serde::{Deserialize, Serialize};

use crate::agent::AgentCore;

/// Additional inheritance probability granted per family generation.
pub const GENERATION_INHERITANCE_BONUS: f64 = 0.02;

/// Ceiling on the effective inheritance probability.
pub const MAX_INHERITANCE_CHANCE: f64 = 0.95;

/// A named, heritable modifier bundle attached to agents and bloodlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trait {
    id: TraitId,
    name: String,
    description: Option<String>,
    inheritance_chance: f64,
    income_modifier: f64,
    loyalty_modifier: i32,
    discovery_modifier: f64,
    conflicts_with: BTreeSet<TraitId>,
}

impl Trait {
    /// Create a trait with neutral modifiers.
    ///
    /// Defaults: inheritance 0.5, income 1.0, loyalty 0, discovery 1.0,
    /// no description, no conflicts.
    pub fn new(id: impl Into<TraitId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            inheritance_chance: 0.5,
            income_modifier: 1.0,
            loyalty_modifier: 0,
            discovery_modifier: 1.0,
            conflicts_with: BTreeSet::new(),
        }
    }

    /// Create a trait with every modifier specified.
    ///
    /// `inheritance_chance` is clamped to `[0, 1]`.
    pub fn with_modifiers(
        id: impl Into<TraitId>,
        name: impl Into<String>,
        description: Option<String>,
        inheritance_chance: f64,
        income_modifier: f64,
        loyalty_modifier: i32,
        discovery_modifier: f64,
    ) -> Self {
        let mut t = Self::new(id, name);
        t.description = description;
        t.set_inheritance_chance(inheritance_chance);
        t.income_modifier = income_modifier;
        t.loyalty_modifier = loyalty_modifier;
        t.discovery_modifier = discovery_modifier;
        t
    }

    /// Stable trait identifier.
    pub const fn id(&self) -> &TraitId {
        &self.id
    }

    /// Build a fresh trait from a template entry.
    pub fn from_template(template: &TraitTemplate) -> Self {
        Self::with_modifiers(
            template.id,
            template.name,
            Some(template.description.to_owned()),
            template.inheritance_chance,
            template.income_modifier,
            template.loyalty_modifier,
            template.discovery_modifier,
        )
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the trait.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Optional flavour text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Replace the flavour text.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Base probability of passing to the next generation, in `[0, 1]`.
    pub const fn inheritance_chance(&self) -> f64 {
        self.inheritance_chance
    }

    /// Set the base inheritance probability, clamped to `[0, 1]`.
    ///
    /// A NaN input is treated as zero.
    pub fn set_inheritance_chance(&mut self, chance: f64) {
        self.inheritance_chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
    }

    /// Multiplicative income modifier (1.0 is neutral).
    pub const fn income_modifier(&self) -> f64 {
        self.income_modifier
    }

    /// Set the income modifier.
    pub const fn set_income_modifier(&mut self, modifier: f64) {
        self.income_modifier = modifier;
    }

    /// Additive loyalty modifier applied by [`Trait::apply_effects`].
    pub const fn loyalty_modifier(&self) -> i32 {
        self.loyalty_modifier
    }

    /// Set the loyalty modifier.
    pub const fn set_loyalty_modifier(&mut self, modifier: i32) {
        self.loyalty_modifier = modifier;
    }

    /// Multiplicative discovery-risk modifier (1.0 is neutral).
    pub const fn discovery_modifier(&self) -> f64 {
        self.discovery_modifier
    }

    /// Set the discovery modifier.
    pub const fn set_discovery_modifier(&mut self, modifier: f64) {
        self.discovery_modifier = modifier;
    }

    /// Trait ids this trait declares itself incompatible with.
    pub const fn conflicts(&self) -> &BTreeSet<TraitId> {
        &self.conflicts_with
    }

    /// Declare a conflict with another trait. Duplicates are ignored.
    ///
    /// Returns `true` if the conflict was newly added.
    pub fn add_conflict(&mut self, other: impl Into<TraitId>) -> bool {
        self.conflicts_with.insert(other.into())
    }

    /// Whether this trait lists `other` among its conflicts.
    pub fn conflicts_with(&self, other: &TraitId) -> bool {
        self.conflicts_with.contains(other)
    }

    /// Whether this trait lists `other`'s id among its conflicts.
    pub fn conflicts_with_trait(&self, other: &Self) -> bool {
        self.conflicts_with(&other.id)
    }

    /// Symmetric conflict check: either trait lists the other.
    pub fn clashes_with(&self, other: &Self) -> bool {
        self.conflicts_with(&other.id) || other.conflicts_with(&self.id)
    }

    /// Roll whether this trait passes to a family's next generation.
    ///
    /// ```text
    /// effective = min(inheritance_chance + 0.02 * generation, 0.95)
    /// ```
    ///
    /// Succeeds when a uniform draw in `[0, 1)` falls below `effective`.
    pub fn roll_inheritance(&self, generation: u32, rng: &mut impl Rng) -> bool {
        let effective = self.effective_inheritance_chance(generation);
        rng.random::<f64>() < effective
    }

    /// The generation-adjusted inheritance probability.
    pub fn effective_inheritance_chance(&self, generation: u32) -> f64 {
        GENERATION_INHERITANCE_BONUS
            .mul_add(f64::from(generation), self.inheritance_chance)
            .min(MAX_INHERITANCE_CHANCE)
    }

    /// Apply this trait's loyalty modifier to an agent.
    ///
    /// The agent's loyalty setter clamps the result to `[0, 100]`.
    pub fn apply_effects(&self, agent: &mut AgentCore) {
        if self.loyalty_modifier == 0 {
            return;
        }
        let adjusted = i64::from(agent.loyalty()).saturating_add(i64::from(self.loyalty_modifier));
        agent.set_loyalty(adjusted);
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Static description of a trait that can emerge in a family bloodline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitTemplate {
    /// Trait id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Flavour text.
    pub description: &'static str,
    /// Base inheritance probability.
    pub inheritance_chance: f64,
    /// Income multiplier.
    pub income_modifier: f64,
    /// Additive loyalty modifier.
    pub loyalty_modifier: i32,
    /// Discovery-risk multiplier.
    pub discovery_modifier: f64,
}

impl TraitTemplate {
    /// Build a fresh [`Trait`] from this template.
    pub fn instantiate(&self) -> Trait {
        Trait::from_template(self)
    }
}

/// The templates new bloodline traits are drawn from.
pub const TRAIT_TEMPLATES: [TraitTemplate; 8] = [
    TraitTemplate {
        id: "shrewd",
        name: "Shrewd",
        description: "Natural business acumen",
        inheritance_chance: 0.6,
        income_modifier: 1.15,
        loyalty_modifier: 0,
        discovery_modifier: 1.0,
    },
    TraitTemplate {
        id: "loyal",
        name: "Devoted",
        description: "Exceptional loyalty",
        inheritance_chance: 0.5,
        income_modifier: 1.0,
        loyalty_modifier: 15,
        discovery_modifier: 0.8,
    },
    TraitTemplate {
        id: "cunning",
        name: "Cunning",
        description: "Skilled at deception",
        inheritance_chance: 0.4,
        income_modifier: 1.1,
        loyalty_modifier: -5,
        discovery_modifier: 0.7,
    },
    TraitTemplate {
        id: "ambitious",
        name: "Ambitious",
        description: "Driven to succeed",
        inheritance_chance: 0.5,
        income_modifier: 1.2,
        loyalty_modifier: -10,
        discovery_modifier: 1.1,
    },
    TraitTemplate {
        id: "cautious",
        name: "Cautious",
        description: "Avoids unnecessary risks",
        inheritance_chance: 0.6,
        income_modifier: 0.95,
        loyalty_modifier: 5,
        discovery_modifier: 0.6,
    },
    TraitTemplate {
        id: "charismatic",
        name: "Charismatic",
        description: "Natural leader",
        inheritance_chance: 0.4,
        income_modifier: 1.1,
        loyalty_modifier: 5,
        discovery_modifier: 1.0,
    },
    TraitTemplate {
        id: "secretive",
        name: "Secretive",
        description: "Keeps secrets well",
        inheritance_chance: 0.5,
        income_modifier: 1.0,
        loyalty_modifier: 0,
        discovery_modifier: 0.5,
    },
    TraitTemplate {
        id: "greedy",
        name: "Greedy",
        description: "Motivated by wealth",
        inheritance_chance: 0.4,
        income_modifier: 1.25,
        loyalty_modifier: -15,
        discovery_modifier: 1.2,
    },
];

/// Pick a template uniformly at random.
pub fn random_template(rng: &mut impl Rng) -> Option<&'static TraitTemplate> {
    TRAIT_TEMPLATES.choose(rng)
}

/// Find a template by trait id.
pub fn template_by_id(id: &str) -> Option<&'static TraitTemplate> {
    TRAIT_TEMPLATES.iter().find(|t| t.id == id)
}

/// Whether any trait in `held` clashes with `candidate`.
pub(crate) fn clashes_with_any(candidate: &Trait, held: &[Arc<Trait>]) -> bool {
    held.iter().any(|t| t.clashes_with(candidate))
}

/// Whether `held` contains a trait with the given id.
pub(crate) fn contains_id(held: &[Arc<Trait>], id: &TraitId) -> bool {
    held.iter().any(|t| t.id() == id)
}

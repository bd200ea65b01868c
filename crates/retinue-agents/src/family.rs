//! Bloodline dynasties whose head is replaced each generation.
//!
//! A family agent never leaves the roster through death. When the current
//! head outlives their lifespan the family advances a generation in place:
//!
//! 1. Increment the generation counter.
//! 2. Roll inheritance over the bloodline, then give each head trait missing
//!    from the bloodline a chance to be promoted into it.
//! 3. Replace the head's traits with the inherited set (at most
//!    [`MAX_TRAITS`], never two clashing traits).
//! 4. Possibly let a brand-new trait emerge from the template table.
//! 5. Roll the heir's age, lifespan, and title; apply a small loyalty loss.
//!
//! The bloodline only grows. Traits held by the head but dropped during
//! inheritance stay in the bloodline and may resurface in later generations.

use std::sync::Arc;

use rand::Rng;
use retinue_types::{AgentId, AgentType, LifecycleEvent, TraitId};
use tracing::{debug, info};

use crate::agent::{Agent, AgentBehavior, AgentCore, AgentVariant, DeathOutcome, MAX_TRAITS};
use crate::config::{LifecycleConfig, roll_between, roll_percent};
use crate::traits::{Trait, clashes_with_any, contains_id, random_template};

/// Family name used when none is supplied.
pub const DEFAULT_FAMILY_NAME: &str = "Unknown Family";

/// Founding year used when none is supplied.
pub const DEFAULT_FOUNDING_YEAR: u32 = 847;

/// Variant state of a family agent.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyState {
    family_name: String,
    generation: u32,
    founding_year: u32,
    bloodline: Vec<Arc<Trait>>,
}

impl Default for FamilyState {
    fn default() -> Self {
        Self::new(DEFAULT_FAMILY_NAME, DEFAULT_FOUNDING_YEAR)
    }
}

impl FamilyState {
    /// A first-generation family with an empty bloodline.
    pub fn new(family_name: impl Into<String>, founding_year: u32) -> Self {
        Self {
            family_name: family_name.into(),
            generation: 1,
            founding_year,
            bloodline: Vec::new(),
        }
    }

    /// Rebuild state from persisted values.
    ///
    /// Bloodline entries with duplicate ids are dropped.
    pub fn restore(
        family_name: impl Into<String>,
        generation: u32,
        founding_year: u32,
        bloodline: impl IntoIterator<Item = Arc<Trait>>,
    ) -> Self {
        let mut state = Self {
            family_name: family_name.into(),
            generation,
            founding_year,
            bloodline: Vec::new(),
        };
        for t in bloodline {
            state.add_bloodline_trait(t);
        }
        state
    }

    /// The dynasty's surname.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Current generation, starting at 1.
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Year the family was founded.
    pub const fn founding_year(&self) -> u32 {
        self.founding_year
    }

    /// Years since founding, zero if `current_year` precedes it.
    pub const fn years_established(&self, current_year: u32) -> u32 {
        current_year.saturating_sub(self.founding_year)
    }

    /// Every trait the family line carries.
    pub fn bloodline(&self) -> &[Arc<Trait>] {
        &self.bloodline
    }

    /// Add a trait to the bloodline. Returns `false` for a duplicate id.
    pub fn add_bloodline_trait(&mut self, new_trait: Arc<Trait>) -> bool {
        if contains_id(&self.bloodline, new_trait.id()) {
            return false;
        }
        self.bloodline.push(new_trait);
        true
    }

    /// Remove a trait from the bloodline. Returns `true` if one was removed.
    pub fn remove_bloodline_trait(&mut self, trait_id: &TraitId) -> bool {
        let before = self.bloodline.len();
        self.bloodline.retain(|t| t.id() != trait_id);
        self.bloodline.len() != before
    }

    /// Trait capacity of each generation's head.
    pub const fn max_traits() -> usize {
        MAX_TRAITS
    }

    /// Whether the bloodline carries a trait with this id.
    pub fn has_bloodline_trait(&self, trait_id: &TraitId) -> bool {
        contains_id(&self.bloodline, trait_id)
    }

    /// Decide which traits the next head inherits.
    ///
    /// Each bloodline trait rolls at the current generation's odds; a
    /// success is kept when fewer than [`MAX_TRAITS`] are already accepted
    /// and it clashes with none of them. Each trait in `head_traits` that
    /// the bloodline lacks is then promoted into the bloodline with the
    /// configured chance, and joins the inherited set under the same rules.
    pub fn roll_inheritance(
        &mut self,
        head_traits: &[Arc<Trait>],
        config: &LifecycleConfig,
        rng: &mut impl Rng,
    ) -> Vec<Arc<Trait>> {
        let mut inherited: Vec<Arc<Trait>> = Vec::with_capacity(MAX_TRAITS);

        for t in &self.bloodline {
            if t.roll_inheritance(self.generation, rng)
                && inherited.len() < MAX_TRAITS
                && !clashes_with_any(t, &inherited)
            {
                inherited.push(Arc::clone(t));
            }
        }

        for t in head_traits {
            if contains_id(&self.bloodline, t.id()) {
                continue;
            }
            if !roll_percent(rng, config.bloodline.promotion_chance_pct) {
                continue;
            }
            debug!(
                family = %self.family_name,
                trait_id = %t.id(),
                "Head trait promoted into bloodline"
            );
            self.bloodline.push(Arc::clone(t));
            if inherited.len() < MAX_TRAITS && !clashes_with_any(t, &inherited) {
                inherited.push(Arc::clone(t));
            }
        }

        inherited
    }

    /// Roll for a brand-new trait emerging in this generation.
    ///
    /// After the emergence roll succeeds, up to the configured number of
    /// templates are drawn; the first one absent from the bloodline and not
    /// clashing with it wins. Returns `None` if every draw is rejected.
    pub fn roll_new_trait(&self, config: &LifecycleConfig, rng: &mut impl Rng) -> Option<Trait> {
        let chance = config.bloodline.emergence_chance(self.generation);
        if rng.random::<f64>() >= chance {
            return None;
        }

        for _ in 0..config.bloodline.emergence_attempts {
            let template = random_template(rng)?;
            if self.bloodline.iter().any(|t| t.id().as_str() == template.id) {
                continue;
            }
            let candidate = template.instantiate();
            if clashes_with_any(&candidate, &self.bloodline) {
                continue;
            }
            return Some(candidate);
        }
        None
    }

    /// Replace the head with the next generation's heir.
    ///
    /// Returns the new generation number.
    pub fn advance_generation(
        &mut self,
        core: &mut AgentCore,
        config: &LifecycleConfig,
        rng: &mut impl Rng,
    ) -> u32 {
        self.generation = self.generation.saturating_add(1);

        let inherited = self.roll_inheritance(core.traits(), config, rng);
        core.clear_traits();
        for t in inherited {
            core.add_trait(t);
        }

        if let Some(emerged) = self.roll_new_trait(config, rng) {
            let emerged = Arc::new(emerged);
            let trait_id = emerged.id().clone();
            self.bloodline.push(Arc::clone(&emerged));
            core.add_trait(emerged);
            info!(
                family = %self.family_name,
                generation = self.generation,
                trait_id = %trait_id,
                "New trait emerged in bloodline"
            );
            core.emit(LifecycleEvent::NewTraitEmerged {
                agent_id: core.id().clone(),
                trait_id,
            });
        }

        let heir = &config.heir;
        let age = roll_between(rng, heir.age_min, heir.age_max);
        let max_age = roll_between(rng, heir.lifespan_min, heir.lifespan_max);
        core.set_age(age);
        core.set_max_age(max_age.max(age.saturating_add(1)));

        let title = if rng.random_range(0..2_u32) == 0 { "Junior" } else { "Senior" };
        core.set_name(format!("{} {} (Gen {})", self.family_name, title, self.generation));

        let penalty = roll_between(rng, 0, heir.max_loyalty_penalty);
        core.set_loyalty(i64::from(core.loyalty()).saturating_sub(i64::from(penalty)));

        info!(
            family = %self.family_name,
            generation = self.generation,
            head = %core.name(),
            traits = core.traits().len(),
            "Family advanced a generation"
        );
        core.emit(LifecycleEvent::GenerationAdvanced {
            agent_id: core.id().clone(),
            generation: self.generation,
        });

        self.generation
    }
}

impl AgentBehavior for FamilyState {
    fn agent_type(&self) -> AgentType {
        AgentType::Family
    }

    /// Families grow through generations, not recruitment.
    fn can_recruit(&self, _core: &AgentCore) -> bool {
        false
    }

    fn regenerates_on_death(&self) -> bool {
        true
    }

    fn on_death(
        &mut self,
        core: &mut AgentCore,
        _successor: Option<&mut Agent>,
        config: &LifecycleConfig,
        rng: &mut impl Rng,
    ) -> DeathOutcome {
        let generation = self.advance_generation(core, config, rng);
        DeathOutcome::Regenerated { generation }
    }
}

// ---------------------------------------------------------------------------
// Construction and agent-level shortcuts
// ---------------------------------------------------------------------------

impl Agent {
    /// New first-generation family headed by "Head of {family_name}".
    pub fn new_family(id: AgentId, family_name: impl Into<String>, founding_year: u32) -> Self {
        let family_name = family_name.into();
        let head = format!("Head of {family_name}");
        Self::from_parts(
            AgentCore::new(id, head),
            AgentVariant::Family(FamilyState::new(family_name, founding_year)),
        )
    }

    /// New first-generation family with an explicitly described head.
    pub fn family_with_head(
        id: AgentId,
        family_name: impl Into<String>,
        head_name: impl Into<String>,
        founding_year: u32,
        head_age: u32,
        head_max_age: u32,
    ) -> Self {
        let mut core = AgentCore::new(id, head_name);
        core.set_age(head_age);
        core.set_max_age(head_max_age);
        Self::from_parts(core, AgentVariant::Family(FamilyState::new(family_name, founding_year)))
    }

    /// Advance a family one generation.
    ///
    /// Returns the new generation, or `None` for non-families.
    pub fn advance_generation(&mut self, config: &LifecycleConfig, rng: &mut impl Rng) -> Option<u32> {
        let (core, variant) = self.split_mut();
        match variant {
            AgentVariant::Family(family) => Some(family.advance_generation(core, config, rng)),
            AgentVariant::Individual(_) => None,
        }
    }

    /// Roll inheritance against the current head's traits.
    ///
    /// Returns an empty set for non-families.
    pub fn roll_inheritance(&mut self, config: &LifecycleConfig, rng: &mut impl Rng) -> Vec<Arc<Trait>> {
        let (core, variant) = self.split_mut();
        match variant {
            AgentVariant::Family(family) => family.roll_inheritance(core.traits(), config, rng),
            AgentVariant::Individual(_) => Vec::new(),
        }
    }

    /// Roll for an emerging trait. Returns `None` for non-families.
    pub fn roll_new_trait(&self, config: &LifecycleConfig, rng: &mut impl Rng) -> Option<Trait> {
        self.as_family()?.roll_new_trait(config, rng)
    }
}

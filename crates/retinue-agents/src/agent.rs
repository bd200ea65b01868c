//! The polymorphic agent: shared core state plus a closed set of variants.
//!
//! Every agent carries an [`AgentCore`] (identity, vitals, cover, traits,
//! investments, and an event outbox) and an [`AgentVariant`] holding the
//! variant-specific state. Per-variant behavior lives behind the
//! [`AgentBehavior`] trait, implemented by [`IndividualState`] and
//! [`FamilyState`]; [`Agent`] matches on the variant and forwards.
//!
//! Keeping the core and the variant state in separate fields lets variant
//! hooks borrow both mutably at once.
//!
//! # Yearly lifecycle
//!
//! [`Agent::on_year_passed`] runs, in order:
//!
//! 1. Age one year.
//! 2. If the agent outlived its lifespan, handle death. Families regenerate
//!    in place; individuals report [`YearOutcome::Died`] and wait for the
//!    caller to resolve their successor through [`Agent::on_death`].
//! 3. Otherwise roll loyalty decay, roll betrayal, then run the variant's
//!    post-year hook (successor training for individuals).
//!
//! [`IndividualState`]: crate::individual::IndividualState
//! [`FamilyState`]: crate::family::FamilyState

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use retinue_types::{AgentId, AgentType, CoverStatus, InvestmentId, KnowledgeLevel, LifecycleEvent, TraitId};
use tracing::{debug, warn};

use crate::config::{LifecycleConfig, roll_percent};
use crate::family::FamilyState;
use crate::individual::IndividualState;
use crate::traits::{Trait, contains_id};

/// Maximum number of traits an agent can hold at once.
pub const MAX_TRAITS: usize = 4;

/// Default starting age for a new agent.
pub const DEFAULT_AGE: u32 = 25;

/// Default lifespan for a new agent.
pub const DEFAULT_MAX_AGE: u32 = 70;

/// Default starting loyalty for a new agent.
pub const DEFAULT_LOYALTY: u32 = 50;

/// Default starting competence for a new agent.
pub const DEFAULT_COMPETENCE: u32 = 50;

/// Minimum loyalty required to recruit.
pub const RECRUIT_MIN_LOYALTY: u32 = 50;

/// Minimum competence required to recruit.
pub const RECRUIT_MIN_COMPETENCE: u32 = 30;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to an agent during one call to [`Agent::on_year_passed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a `Died` outcome is only resolved by calling `Agent::on_death`"]
pub enum YearOutcome {
    /// The agent is still alive after the year.
    Survived,
    /// The agent died and must be resolved with [`Agent::on_death`].
    Died,
    /// A family head died and the next generation took over in place.
    Regenerated {
        /// The family's generation after advancing.
        generation: u32,
    },
}

/// Result of handling an agent's death.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeathOutcome {
    /// The agent is gone. Carries the successor that inherited its
    /// competence and investments, if any.
    Succeeded {
        /// Id of the successor that took over, if one was resolved.
        successor_id: Option<AgentId>,
    },
    /// The agent survives as its own next generation.
    Regenerated {
        /// The family's generation after advancing.
        generation: u32,
    },
}

// ---------------------------------------------------------------------------
// Core state
// ---------------------------------------------------------------------------

/// State shared by every agent variant.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCore {
    id: AgentId,
    name: String,
    age: u32,
    max_age: u32,
    loyalty: u32,
    competence: u32,
    cover_status: CoverStatus,
    knowledge_level: KnowledgeLevel,
    traits: Vec<Arc<Trait>>,
    assigned_investments: BTreeSet<InvestmentId>,
    outbox: Vec<LifecycleEvent>,
}

impl AgentCore {
    /// Create core state with default vitals.
    ///
    /// Defaults: age 25, lifespan 70, loyalty 50, competence 50, secure
    /// cover, no knowledge, no traits, no investments.
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self::with_stats(id, name, DEFAULT_AGE, DEFAULT_MAX_AGE, DEFAULT_LOYALTY, DEFAULT_COMPETENCE)
    }

    /// Create core state with explicit vitals.
    ///
    /// Loyalty and competence are clamped to `[0, 100]`. No events are
    /// emitted during construction.
    pub fn with_stats(
        id: AgentId,
        name: impl Into<String>,
        age: u32,
        max_age: u32,
        loyalty: u32,
        competence: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            max_age,
            loyalty: loyalty.min(100),
            competence: competence.min(100),
            cover_status: CoverStatus::default(),
            knowledge_level: KnowledgeLevel::default(),
            traits: Vec::new(),
            assigned_investments: BTreeSet::new(),
            outbox: Vec::new(),
        }
    }

    /// Unique agent identifier.
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the agent.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Current age in years.
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Set the current age.
    pub const fn set_age(&mut self, age: u32) {
        self.age = age;
    }

    /// Age at which the agent dies.
    pub const fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Set the lifespan. Zero is rejected and the old value kept.
    pub fn set_max_age(&mut self, max_age: u32) {
        if max_age == 0 {
            warn!(agent_id = %self.id, "Ignoring zero lifespan");
            return;
        }
        self.max_age = max_age;
    }

    /// Loyalty in `[0, 100]`.
    pub const fn loyalty(&self) -> u32 {
        self.loyalty
    }

    /// Set loyalty, clamped to `[0, 100]`.
    ///
    /// Emits [`LifecycleEvent::LoyaltyChanged`] only when the stored value
    /// actually changes.
    pub fn set_loyalty(&mut self, value: i64) {
        let clamped = clamp_stat(value);
        if clamped == self.loyalty {
            return;
        }
        let old = self.loyalty;
        self.loyalty = clamped;
        self.emit(LifecycleEvent::LoyaltyChanged {
            agent_id: self.id.clone(),
            old,
            new: clamped,
        });
    }

    /// Competence in `[0, 100]`.
    pub const fn competence(&self) -> u32 {
        self.competence
    }

    /// Set competence, clamped to `[0, 100]`.
    pub fn set_competence(&mut self, value: i64) {
        self.competence = clamp_stat(value);
    }

    /// Current cover status.
    pub const fn cover_status(&self) -> CoverStatus {
        self.cover_status
    }

    /// Set the cover status.
    pub const fn set_cover_status(&mut self, status: CoverStatus) {
        self.cover_status = status;
    }

    /// What the agent knows about the operation.
    pub const fn knowledge_level(&self) -> KnowledgeLevel {
        self.knowledge_level
    }

    /// Set the knowledge level.
    pub const fn set_knowledge_level(&mut self, level: KnowledgeLevel) {
        self.knowledge_level = level;
    }

    /// Whether the agent has not yet outlived its lifespan.
    pub const fn is_alive(&self) -> bool {
        self.age < self.max_age
    }

    /// Years until death, zero once dead.
    pub const fn years_remaining(&self) -> u32 {
        self.max_age.saturating_sub(self.age)
    }

    // -- traits --------------------------------------------------------------

    /// Traits currently held, in insertion order.
    pub fn traits(&self) -> &[Arc<Trait>] {
        &self.traits
    }

    /// Add a trait.
    ///
    /// Ignored (returns `false`) when the agent already holds a trait with
    /// the same id or already holds [`MAX_TRAITS`] traits.
    pub fn add_trait(&mut self, new_trait: Arc<Trait>) -> bool {
        if contains_id(&self.traits, new_trait.id()) {
            return false;
        }
        if self.traits.len() >= MAX_TRAITS {
            debug!(
                agent_id = %self.id,
                trait_id = %new_trait.id(),
                "Trait list full, ignoring add"
            );
            return false;
        }
        self.traits.push(new_trait);
        true
    }

    /// Remove a trait by id. Returns `true` if one was removed.
    pub fn remove_trait(&mut self, trait_id: &TraitId) -> bool {
        let before = self.traits.len();
        self.traits.retain(|t| t.id() != trait_id);
        self.traits.len() != before
    }

    /// Whether the agent holds a trait with this id.
    pub fn has_trait(&self, trait_id: &TraitId) -> bool {
        contains_id(&self.traits, trait_id)
    }

    /// Apply every held trait's loyalty modifier, in trait order.
    pub fn apply_trait_effects(&mut self) {
        let traits = self.traits.clone();
        for t in &traits {
            t.apply_effects(self);
        }
    }

    pub(crate) fn clear_traits(&mut self) {
        self.traits.clear();
    }

    // -- investments ---------------------------------------------------------

    /// Investments this agent manages.
    pub const fn assigned_investments(&self) -> &BTreeSet<InvestmentId> {
        &self.assigned_investments
    }

    /// Assign an investment. Returns `false` if it was already assigned.
    pub fn assign_investment(&mut self, investment: InvestmentId) -> bool {
        self.assigned_investments.insert(investment)
    }

    /// Unassign an investment. Returns `false` if it was not assigned.
    pub fn unassign_investment(&mut self, investment: &InvestmentId) -> bool {
        self.assigned_investments.remove(investment)
    }

    pub(crate) fn take_investments(&mut self) -> BTreeSet<InvestmentId> {
        std::mem::take(&mut self.assigned_investments)
    }

    // -- derived metrics -----------------------------------------------------

    /// Income multiplier for investments managed by this agent.
    ///
    /// ```text
    /// modifier = (0.5 + competence / 100) * product(trait.income_modifier)
    /// ```
    pub fn income_modifier(&self) -> f64 {
        let base = 0.5 + f64::from(self.competence) / 100.0;
        self.traits.iter().fold(base, |acc, t| acc * t.income_modifier())
    }

    /// Exposure points this agent contributes to the operation.
    ///
    /// The cover status sets the base, and knowledge scales it.
    pub const fn exposure_contribution(&self) -> u32 {
        self.knowledge_level.scale_exposure(self.cover_status.base_exposure())
    }

    /// Yearly betrayal probability in percent.
    ///
    /// ```text
    /// chance = clamp((100 - loyalty) / damping(knowledge), 0, cap)
    /// ```
    pub fn betrayal_chance_pct(&self, config: &LifecycleConfig) -> u32 {
        let disloyalty = 100_u32.saturating_sub(self.loyalty);
        let damping = self.knowledge_level.betrayal_damping().max(1);
        let raw = disloyalty.checked_div(damping.unsigned_abs()).unwrap_or(0);
        raw.min(config.betrayal_cap_pct)
    }

    /// Roll whether the agent betrays the operation this year.
    pub fn roll_betrayal(&self, config: &LifecycleConfig, rng: &mut impl Rng) -> bool {
        roll_percent(rng, self.betrayal_chance_pct(config))
    }

    /// Recruitment requirements shared by every recruiting variant.
    ///
    /// Loyalty of at least 50, competence of at least 30, and a cover that
    /// is not blown.
    pub fn meets_recruit_requirements(&self) -> bool {
        self.loyalty >= RECRUIT_MIN_LOYALTY
            && self.competence >= RECRUIT_MIN_COMPETENCE
            && self.cover_status != CoverStatus::Exposed
    }

    // -- events --------------------------------------------------------------

    /// Take every event emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Events emitted since the last drain.
    pub fn pending_events(&self) -> &[LifecycleEvent] {
        &self.outbox
    }

    pub(crate) fn emit(&mut self, event: LifecycleEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn discard_events(&mut self) {
        self.outbox.clear();
    }

    // -- yearly steps --------------------------------------------------------

    /// Age one year. Returns `true` if the agent is still alive.
    pub(crate) const fn age_one_year(&mut self) -> bool {
        self.age = self.age.saturating_add(1);
        self.is_alive()
    }

    /// Roll the knowledge-driven loyalty decay of one point.
    pub(crate) fn decay_loyalty(&mut self, config: &LifecycleConfig, rng: &mut impl Rng) {
        let chance = config.loyalty_decay.chance_pct(self.knowledge_level);
        if roll_percent(rng, chance) {
            let lowered = i64::from(self.loyalty).saturating_sub(1);
            self.set_loyalty(lowered);
        }
    }
}

/// Clamp a signed stat update into `[0, 100]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
const fn clamp_stat(value: i64) -> u32 {
    if value < 0 {
        0
    } else if value > 100 {
        100
    } else {
        value as u32
    }
}

// ---------------------------------------------------------------------------
// Variant behavior
// ---------------------------------------------------------------------------

/// Variant-specific lifecycle hooks.
///
/// Implementors receive the agent's [`AgentCore`] alongside their own state,
/// so a hook can update both without going through [`Agent`].
pub trait AgentBehavior {
    /// The variant tag reported for this state.
    fn agent_type(&self) -> AgentType;

    /// Whether the agent may recruit right now.
    fn can_recruit(&self, core: &AgentCore) -> bool {
        core.meets_recruit_requirements()
    }

    /// Runs after a year the agent survived (decay and betrayal included).
    fn after_year(&mut self, _core: &mut AgentCore) {}

    /// Whether death is handled in place during [`Agent::on_year_passed`].
    ///
    /// Variants that return `false` report [`YearOutcome::Died`] and rely
    /// on the caller to supply a resolved successor to [`Agent::on_death`].
    fn regenerates_on_death(&self) -> bool;

    /// Handle the agent's death.
    fn on_death(
        &mut self,
        core: &mut AgentCore,
        successor: Option<&mut Agent>,
        config: &LifecycleConfig,
        rng: &mut impl Rng,
    ) -> DeathOutcome;
}

/// Variant-specific state of an agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentVariant {
    /// A single mortal person who hands off to a successor.
    Individual(IndividualState),
    /// A dynasty whose head is replaced each generation.
    Family(FamilyState),
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A managed agent: core state plus variant state.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    core: AgentCore,
    variant: AgentVariant,
}

impl Agent {
    /// Assemble an agent from its parts.
    pub const fn from_parts(core: AgentCore, variant: AgentVariant) -> Self {
        Self { core, variant }
    }

    /// Shared core state.
    pub const fn core(&self) -> &AgentCore {
        &self.core
    }

    /// Mutable shared core state.
    pub const fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    /// Shortcut for `core().id()`.
    pub const fn id(&self) -> &AgentId {
        self.core.id()
    }

    /// Variant state.
    pub const fn variant(&self) -> &AgentVariant {
        &self.variant
    }

    /// Borrow core and variant state mutably at once.
    pub(crate) const fn split_mut(&mut self) -> (&mut AgentCore, &mut AgentVariant) {
        (&mut self.core, &mut self.variant)
    }

    /// Individual state, if this agent is an individual.
    pub const fn as_individual(&self) -> Option<&IndividualState> {
        match &self.variant {
            AgentVariant::Individual(s) => Some(s),
            AgentVariant::Family(_) => None,
        }
    }

    /// Mutable individual state, if this agent is an individual.
    pub const fn as_individual_mut(&mut self) -> Option<&mut IndividualState> {
        match &mut self.variant {
            AgentVariant::Individual(s) => Some(s),
            AgentVariant::Family(_) => None,
        }
    }

    /// Family state, if this agent is a family.
    pub const fn as_family(&self) -> Option<&FamilyState> {
        match &self.variant {
            AgentVariant::Family(f) => Some(f),
            AgentVariant::Individual(_) => None,
        }
    }

    /// Mutable family state, if this agent is a family.
    pub const fn as_family_mut(&mut self) -> Option<&mut FamilyState> {
        match &mut self.variant {
            AgentVariant::Family(f) => Some(f),
            AgentVariant::Individual(_) => None,
        }
    }

    /// The agent's variant tag.
    pub fn agent_type(&self) -> AgentType {
        match &self.variant {
            AgentVariant::Individual(s) => s.agent_type(),
            AgentVariant::Family(f) => f.agent_type(),
        }
    }

    /// Whether the agent may recruit right now.
    pub fn can_recruit(&self) -> bool {
        match &self.variant {
            AgentVariant::Individual(s) => s.can_recruit(&self.core),
            AgentVariant::Family(f) => f.can_recruit(&self.core),
        }
    }

    /// Designated successor id, if this is an individual that has one.
    pub fn successor_id(&self) -> Option<&AgentId> {
        self.as_individual().and_then(IndividualState::successor)
    }

    /// Advance the agent by one year.
    ///
    /// Families whose head dies regenerate inside this call. Individuals
    /// that die return [`YearOutcome::Died`] with their state untouched; the
    /// caller resolves the successor and calls [`Agent::on_death`]. An agent
    /// that was already dead before the call also reports `Died`.
    ///
    /// Nothing is emitted for a `Died` outcome until `on_death` runs, so a
    /// caller driving agents outside [`crate::AgentManager`] must make that
    /// call itself.
    pub fn on_year_passed(&mut self, config: &LifecycleConfig, rng: &mut impl Rng) -> YearOutcome {
        if !self.core.age_one_year() {
            let regenerates = match &self.variant {
                AgentVariant::Individual(s) => s.regenerates_on_death(),
                AgentVariant::Family(f) => f.regenerates_on_death(),
            };
            if !regenerates {
                return YearOutcome::Died;
            }
            return match self.on_death(None, config, rng) {
                DeathOutcome::Regenerated { generation } => YearOutcome::Regenerated { generation },
                DeathOutcome::Succeeded { .. } => YearOutcome::Died,
            };
        }

        self.core.decay_loyalty(config, rng);

        if self.core.roll_betrayal(config, rng) {
            self.on_betrayal();
        }

        match &mut self.variant {
            AgentVariant::Individual(s) => s.after_year(&mut self.core),
            AgentVariant::Family(f) => f.after_year(&mut self.core),
        }

        YearOutcome::Survived
    }

    /// Handle the agent's death.
    ///
    /// For individuals, `successor` is the resolved designated successor (or
    /// `None` if it could not be found). Families ignore it and advance a
    /// generation instead.
    pub fn on_death(
        &mut self,
        successor: Option<&mut Self>,
        config: &LifecycleConfig,
        rng: &mut impl Rng,
    ) -> DeathOutcome {
        match &mut self.variant {
            AgentVariant::Individual(s) => s.on_death(&mut self.core, successor, config, rng),
            AgentVariant::Family(f) => f.on_death(&mut self.core, successor, config, rng),
        }
    }

    /// Record a betrayal.
    pub fn on_betrayal(&mut self) {
        warn!(
            agent_id = %self.core.id,
            name = %self.core.name,
            loyalty = self.core.loyalty,
            "Agent betrayed the operation"
        );
        let agent_id = self.core.id.clone();
        self.core.emit(LifecycleEvent::Betrayed { agent_id });
    }
}

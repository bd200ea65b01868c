//! Mortal agents who hand off to a trained successor.
//!
//! An individual may designate one successor (by id) and train them over
//! time. Training progress is a fraction in `[0, 1]`; crossing `1.0` emits
//! [`LifecycleEvent::SuccessorTrained`] exactly once per successor. When the
//! individual dies, the successor inherits a share of their competence and
//! every investment they managed.
//!
//! # Training and retention
//!
//! ```text
//! rate      = years * (0.05 + 0.15 * competence / 100)
//! retention = 0.25 + 0.5 * training_progress
//! inherited = round(competence * retention)
//! ```
//!
//! A successor never loses competence through succession: they keep the
//! larger of their own competence and the inherited amount.

use rand::Rng;
use retinue_types::{AgentId, AgentType, LifecycleEvent};
use tracing::{info, warn};

use crate::agent::{Agent, AgentBehavior, AgentCore, AgentVariant, DeathOutcome};
use crate::config::{LifecycleConfig, roll_between};

/// Training progress gained per year regardless of competence.
pub const TRAINING_BASE_RATE: f64 = 0.05;

/// Additional training per year at competence 100.
pub const TRAINING_COMPETENCE_RATE: f64 = 0.15;

/// Competence share retained by an untrained successor.
pub const BASE_SKILL_RETENTION: f64 = 0.25;

/// Extra retention a fully trained successor gains over an untrained one.
pub const TRAINING_RETENTION_SPAN: f64 = 0.5;

/// Variant state of an individual agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndividualState {
    successor: Option<AgentId>,
    training_progress: f64,
}

impl IndividualState {
    /// State with no successor and no training.
    pub const fn new() -> Self {
        Self {
            successor: None,
            training_progress: 0.0,
        }
    }

    /// Rebuild state from persisted values without emitting events.
    ///
    /// Progress is clamped to `[0, 1]`.
    pub fn restore(successor: Option<AgentId>, training_progress: f64) -> Self {
        Self {
            successor,
            training_progress: clamp_progress(training_progress),
        }
    }

    /// Designated successor, if any.
    pub const fn successor(&self) -> Option<&AgentId> {
        self.successor.as_ref()
    }

    /// Designate (or clear) the successor.
    ///
    /// Training progress resets to zero whenever the successor changes.
    pub fn set_successor(&mut self, successor: Option<AgentId>) {
        if self.successor == successor {
            return;
        }
        self.successor = successor;
        self.training_progress = 0.0;
    }

    /// Training progress of the current successor, in `[0, 1]`.
    pub const fn training_progress(&self) -> f64 {
        self.training_progress
    }

    /// Set training progress, clamped to `[0, 1]`.
    ///
    /// Emits [`LifecycleEvent::SuccessorTrained`] on `core` when progress
    /// crosses from below `1.0` to `1.0` while a successor is designated.
    pub fn set_training_progress(&mut self, core: &mut AgentCore, progress: f64) {
        let clamped = clamp_progress(progress);
        if (clamped - self.training_progress).abs() < f64::EPSILON {
            return;
        }
        let was_trained = self.training_progress >= 1.0;
        self.training_progress = clamped;

        if !was_trained && clamped >= 1.0 {
            if let Some(successor_id) = self.successor.clone() {
                info!(
                    agent_id = %core.id(),
                    successor_id = %successor_id,
                    "Successor fully trained"
                );
                core.emit(LifecycleEvent::SuccessorTrained {
                    agent_id: core.id().clone(),
                    successor_id,
                });
            }
        }
    }

    /// Whether a successor is designated and fully trained.
    pub fn has_trained_successor(&self) -> bool {
        self.successor.is_some() && self.training_progress >= 1.0
    }

    /// Advance successor training by `years`.
    ///
    /// No effect without a successor or once training is complete.
    pub fn train_successor(&mut self, core: &mut AgentCore, years: u32) {
        if self.successor.is_none() || self.training_progress >= 1.0 {
            return;
        }
        let per_year = TRAINING_COMPETENCE_RATE.mul_add(f64::from(core.competence()) / 100.0, TRAINING_BASE_RATE);
        let progress = per_year.mul_add(f64::from(years), self.training_progress);
        self.set_training_progress(core, progress);
    }

    /// Fraction of competence a successor inherits, in `[0.25, 0.75]`.
    ///
    /// Without a successor this is the untrained retention of 0.25.
    pub fn skill_retention(&self) -> f64 {
        if self.successor.is_none() {
            return BASE_SKILL_RETENTION;
        }
        TRAINING_RETENTION_SPAN.mul_add(self.training_progress, BASE_SKILL_RETENTION)
    }

    /// Hand competence and investments to the resolved successor.
    ///
    /// `successor` must be the agent whose id is designated; a mismatched or
    /// missing successor is treated as unresolved. On success the successor
    /// reference is cleared and the successor's id is returned.
    pub fn process_succession(&mut self, core: &mut AgentCore, successor: Option<&mut Agent>) -> Option<AgentId> {
        let Some(designated) = self.successor.clone() else {
            warn!(
                agent_id = %core.id(),
                name = %core.name(),
                "Agent died with no successor"
            );
            return None;
        };

        let Some(successor) = successor.filter(|s| s.id() == &designated) else {
            warn!(
                agent_id = %core.id(),
                successor_id = %designated,
                "Designated successor could not be resolved"
            );
            self.set_successor(None);
            return None;
        };

        let inherited = inherited_competence(core.competence(), self.skill_retention());
        let kept = inherited.max(successor.core().competence());
        successor.core_mut().set_competence(i64::from(kept));

        for investment in core.take_investments() {
            successor.core_mut().assign_investment(investment);
        }

        info!(
            agent_id = %core.id(),
            successor_id = %designated,
            inherited_competence = inherited,
            training_progress = self.training_progress,
            "Succession complete"
        );

        self.set_successor(None);
        Some(designated)
    }
}

impl AgentBehavior for IndividualState {
    fn agent_type(&self) -> AgentType {
        AgentType::Individual
    }

    /// Individuals with a successor already designated cannot recruit another.
    fn can_recruit(&self, core: &AgentCore) -> bool {
        self.successor.is_none() && core.meets_recruit_requirements()
    }

    /// One year of on-the-job training for an untrained successor.
    fn after_year(&mut self, core: &mut AgentCore) {
        self.train_successor(core, 1);
    }

    fn regenerates_on_death(&self) -> bool {
        false
    }

    fn on_death(
        &mut self,
        core: &mut AgentCore,
        successor: Option<&mut Agent>,
        _config: &LifecycleConfig,
        _rng: &mut impl Rng,
    ) -> DeathOutcome {
        let successor_id = self.process_succession(core, successor);
        info!(
            agent_id = %core.id(),
            name = %core.name(),
            age = core.age(),
            "Agent died"
        );
        core.emit(LifecycleEvent::Died {
            agent_id: core.id().clone(),
        });
        DeathOutcome::Succeeded { successor_id }
    }
}

// ---------------------------------------------------------------------------
// Construction and agent-level shortcuts
// ---------------------------------------------------------------------------

impl Agent {
    /// New individual with default vitals.
    pub fn new_individual(id: AgentId, name: impl Into<String>) -> Self {
        Self::from_parts(AgentCore::new(id, name), AgentVariant::Individual(IndividualState::new()))
    }

    /// New individual with explicit vitals.
    pub fn individual_with_stats(
        id: AgentId,
        name: impl Into<String>,
        age: u32,
        max_age: u32,
        loyalty: u32,
        competence: u32,
    ) -> Self {
        Self::from_parts(
            AgentCore::with_stats(id, name, age, max_age, loyalty, competence),
            AgentVariant::Individual(IndividualState::new()),
        )
    }

    /// Roll a fresh successor candidate for this agent.
    ///
    /// Returns `None` if this agent cannot recruit. The recruit is not
    /// designated as successor here; the caller decides where it lives.
    pub fn recruit_successor(&self, config: &LifecycleConfig, rng: &mut impl Rng) -> Option<Self> {
        if !self.can_recruit() {
            return None;
        }
        let r = &config.recruit;
        let age = roll_between(rng, r.age_min, r.age_max);
        let max_age = roll_between(rng, r.lifespan_min, r.lifespan_max);
        let loyalty = roll_between(rng, r.loyalty_min, r.loyalty_max);
        let competence = roll_between(rng, r.competence_min, r.competence_max);
        let name = format!("Recruit of {}", self.core().name());

        Some(Self::individual_with_stats(AgentId::generate(), name, age, max_age.max(age), loyalty, competence))
    }

    /// Advance successor training. No effect for non-individuals.
    pub fn train_successor(&mut self, years: u32) {
        let (core, variant) = self.split_mut();
        if let AgentVariant::Individual(state) = variant {
            state.train_successor(core, years);
        }
    }

    /// Set successor training progress. No effect for non-individuals.
    pub fn set_training_progress(&mut self, progress: f64) {
        let (core, variant) = self.split_mut();
        if let AgentVariant::Individual(state) = variant {
            state.set_training_progress(core, progress);
        }
    }

    /// Competence share a successor would inherit now.
    ///
    /// Non-individuals report the untrained retention of 0.25.
    pub fn skill_retention(&self) -> f64 {
        self.as_individual()
            .map_or(BASE_SKILL_RETENTION, IndividualState::skill_retention)
    }

    /// Run succession against a resolved successor.
    ///
    /// Returns `None` for non-individuals.
    pub fn process_succession(&mut self, successor: Option<&mut Self>) -> Option<AgentId> {
        let (core, variant) = self.split_mut();
        match variant {
            AgentVariant::Individual(state) => state.process_succession(core, successor),
            AgentVariant::Family(_) => None,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn inherited_competence(competence: u32, retention: f64) -> u32 {
    let raw = (f64::from(competence) * retention).round();
    raw.clamp(0.0, 100.0) as u32
}

fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use retinue_types::InvestmentId;

    fn mentor(competence: u32) -> Agent {
        Agent::individual_with_stats(AgentId::new("m1"), "Marek", 40, 70, 60, competence)
    }

    fn with_successor(competence: u32, successor: &str) -> Agent {
        let mut agent = mentor(competence);
        if let Some(state) = agent.as_individual_mut() {
            state.set_successor(Some(AgentId::new(successor)));
        }
        agent
    }

    #[test]
    fn changing_successor_resets_training() {
        let mut state = IndividualState::restore(Some(AgentId::new("s1")), 0.6);
        state.set_successor(Some(AgentId::new("s1")));
        assert!((state.training_progress() - 0.6).abs() < 1e-9);
        state.set_successor(Some(AgentId::new("s2")));
        assert!(state.training_progress().abs() < f64::EPSILON);
    }

    #[test]
    fn training_rate_follows_competence() {
        let mut agent = with_successor(100, "s1");
        agent.train_successor(1);
        assert!((agent.as_individual().map_or(0.0, IndividualState::training_progress) - 0.2).abs() < 1e-9);

        let mut agent = with_successor(0, "s1");
        agent.train_successor(2);
        assert!((agent.as_individual().map_or(0.0, IndividualState::training_progress) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn training_without_successor_is_noop() {
        let mut agent = mentor(80);
        agent.train_successor(10);
        assert!(agent.as_individual().map_or(1.0, IndividualState::training_progress).abs() < f64::EPSILON);
    }

    #[test]
    fn trained_event_fires_once() {
        let mut agent = with_successor(100, "s1");
        agent.train_successor(10);
        agent.train_successor(10);
        agent.set_training_progress(1.0);
        let events = agent.core_mut().drain_events();
        assert_eq!(
            events,
            vec![LifecycleEvent::SuccessorTrained {
                agent_id: AgentId::new("m1"),
                successor_id: AgentId::new("s1"),
            }]
        );
        assert!(agent.as_individual().is_some_and(IndividualState::has_trained_successor));
    }

    #[test]
    fn no_trained_event_without_successor() {
        let mut agent = mentor(50);
        agent.set_training_progress(1.0);
        assert!(agent.core().pending_events().is_empty());
        assert!(!agent.as_individual().is_some_and(IndividualState::has_trained_successor));
    }

    #[test]
    fn progress_is_clamped() {
        let mut agent = with_successor(50, "s1");
        agent.set_training_progress(-3.0);
        assert!(agent.as_individual().map_or(1.0, IndividualState::training_progress).abs() < f64::EPSILON);
        agent.set_training_progress(7.5);
        assert!((agent.as_individual().map_or(0.0, IndividualState::training_progress) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn retention_spans_quarter_to_three_quarters() {
        let mut agent = with_successor(50, "s1");
        assert!((agent.skill_retention() - 0.25).abs() < f64::EPSILON);
        agent.set_training_progress(0.5);
        assert!((agent.skill_retention() - 0.5).abs() < 1e-9);
        agent.set_training_progress(1.0);
        assert!((agent.skill_retention() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn retention_without_successor_is_untrained() {
        let state = IndividualState::restore(None, 1.0);
        assert!((state.skill_retention() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn succession_transfers_competence_and_investments() {
        let mut parent = with_successor(80, "s1");
        parent.set_training_progress(0.5);
        let inv_a = InvestmentId::new();
        let inv_b = InvestmentId::new();
        parent.core_mut().assign_investment(inv_a);
        parent.core_mut().assign_investment(inv_b);

        let mut successor = Agent::individual_with_stats(AgentId::new("s1"), "Sava", 20, 80, 50, 30);
        let result = parent.process_succession(Some(&mut successor));

        assert_eq!(result, Some(AgentId::new("s1")));
        // round(80 * 0.5) = 40
        assert_eq!(successor.core().competence(), 40);
        assert!(successor.core().assigned_investments().contains(&inv_a));
        assert!(successor.core().assigned_investments().contains(&inv_b));
        assert!(parent.core().assigned_investments().is_empty());
        assert!(parent.successor_id().is_none());
    }

    #[test]
    fn fully_trained_successor_keeps_three_quarters() {
        let mut parent = with_successor(80, "s1");
        parent.set_training_progress(1.0);
        let mut successor = Agent::individual_with_stats(AgentId::new("s1"), "Sava", 20, 80, 50, 10);
        parent.process_succession(Some(&mut successor));
        assert_eq!(successor.core().competence(), 60);
    }

    #[test]
    fn succession_never_lowers_successor_competence() {
        let mut parent = with_successor(40, "s1");
        let mut successor = Agent::individual_with_stats(AgentId::new("s1"), "Sava", 20, 80, 50, 90);
        parent.process_succession(Some(&mut successor));
        assert_eq!(successor.core().competence(), 90);
    }

    #[test]
    fn succession_without_successor_is_noop() {
        let mut parent = mentor(80);
        let inv = InvestmentId::new();
        parent.core_mut().assign_investment(inv);
        assert_eq!(parent.process_succession(None), None);
        assert!(parent.core().assigned_investments().contains(&inv));
    }

    #[test]
    fn mismatched_successor_is_unresolved() {
        let mut parent = with_successor(80, "s1");
        let mut stranger = Agent::individual_with_stats(AgentId::new("x9"), "X", 20, 80, 50, 10);
        assert_eq!(parent.process_succession(Some(&mut stranger)), None);
        assert_eq!(stranger.core().competence(), 10);
        assert!(parent.successor_id().is_none());
    }

    #[test]
    fn recruit_successor_respects_ranges() {
        let cfg = LifecycleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let parent = mentor(60);
        for _ in 0..50 {
            let Some(recruit) = parent.recruit_successor(&cfg, &mut rng) else {
                panic!("eligible parent must recruit");
            };
            let c = recruit.core();
            assert!((18..=29).contains(&c.age()));
            assert!((60..=84).contains(&c.max_age()));
            assert!((40..=69).contains(&c.loyalty()));
            assert!((20..=49).contains(&c.competence()));
            assert_eq!(c.name(), "Recruit of Marek");
            assert_eq!(recruit.agent_type(), AgentType::Individual);
        }
    }

    #[test]
    fn cannot_recruit_with_successor_or_low_stats() {
        let cfg = LifecycleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        assert!(with_successor(60, "s1").recruit_successor(&cfg, &mut rng).is_none());

        let mut disloyal = mentor(60);
        disloyal.core_mut().set_loyalty(10);
        assert!(!disloyal.can_recruit());
        assert!(disloyal.recruit_successor(&cfg, &mut rng).is_none());
    }

    #[test]
    fn death_emits_died_after_succession() {
        let cfg = LifecycleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut parent = with_successor(80, "s1");
        let mut successor = Agent::individual_with_stats(AgentId::new("s1"), "Sava", 20, 80, 50, 10);
        let outcome = parent.on_death(Some(&mut successor), &cfg, &mut rng);
        assert_eq!(
            outcome,
            DeathOutcome::Succeeded {
                successor_id: Some(AgentId::new("s1"))
            }
        );
        assert_eq!(
            parent.core_mut().drain_events(),
            vec![LifecycleEvent::Died {
                agent_id: AgentId::new("m1")
            }]
        );
    }

    #[test]
    fn surviving_year_trains_successor() {
        let cfg = LifecycleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut agent = with_successor(100, "s1");
        agent.core_mut().set_loyalty(100);
        let outcome = agent.on_year_passed(&cfg, &mut rng);
        assert_eq!(outcome, crate::agent::YearOutcome::Survived);
        assert_eq!(agent.core().age(), 41);
        assert!((agent.as_individual().map_or(0.0, IndividualState::training_progress) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn dying_individual_defers_resolution() {
        let cfg = LifecycleConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut agent = with_successor(50, "s1");
        agent.core_mut().set_age(69);
        agent.core_mut().drain_events();
        assert_eq!(agent.on_year_passed(&cfg, &mut rng), crate::agent::YearOutcome::Died);
        assert_eq!(agent.successor_id(), Some(&AgentId::new("s1")));
        assert!(agent.core().pending_events().is_empty());
    }
}

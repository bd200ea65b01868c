//! The roster owner: yearly orchestration, succession wiring, and queries.
//!
//! [`AgentManager`] owns every agent in two pools:
//!
//! - the **roster**, in insertion order, processed once per year
//! - the **apprentice pool**, holding recruited successors that have not yet
//!   taken over; apprentices do not age and are not counted in aggregates
//!
//! Successor links are stored by id. When an individual dies the manager
//! removes it from the roster, resolves its successor from either pool, and
//! only then runs succession, so the dead agent and its successor are never
//! borrowed from the same map at once.
//!
//! Events emitted by agents are collected into the manager's queue in the
//! order they occurred. Callers drain them with [`AgentManager::drain_events`].

use indexmap::IndexMap;
use rand::Rng;
use retinue_types::{AgentId, AgentType, LifecycleEvent};
use tracing::{debug, info, warn};

use crate::agent::{Agent, AgentVariant, DeathOutcome, YearOutcome};
use crate::config::LifecycleConfig;
use crate::error::AgentError;

/// Loyalty or competence average reported for an empty roster.
pub const EMPTY_ROSTER_AVERAGE: f64 = -1.0;

/// Tally of what happened during one processed year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearReport {
    /// Agents on the roster when the year started.
    pub processed: u32,
    /// Individuals that died this year.
    pub deaths: u32,
    /// Deaths where a successor took over.
    pub successions: u32,
    /// Families that advanced a generation.
    pub generations_advanced: u32,
    /// Betrayals rolled this year.
    pub betrayals: u32,
}

impl YearReport {
    /// Combine two reports.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            processed: self.processed.saturating_add(other.processed),
            deaths: self.deaths.saturating_add(other.deaths),
            successions: self.successions.saturating_add(other.successions),
            generations_advanced: self.generations_advanced.saturating_add(other.generations_advanced),
            betrayals: self.betrayals.saturating_add(other.betrayals),
        }
    }
}

/// Owns the roster and drives the yearly lifecycle.
#[derive(Debug, Clone, Default)]
pub struct AgentManager {
    roster: IndexMap<AgentId, Agent>,
    apprentices: IndexMap<AgentId, Agent>,
    config: LifecycleConfig,
    events: Vec<LifecycleEvent>,
}

impl AgentManager {
    /// Empty manager using the given lifecycle configuration.
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            roster: IndexMap::new(),
            apprentices: IndexMap::new(),
            config,
            events: Vec::new(),
        }
    }

    /// The lifecycle configuration applied each year.
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Replace the lifecycle configuration.
    pub fn set_config(&mut self, config: LifecycleConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Roster membership
    // -----------------------------------------------------------------------

    /// Add an agent to the roster.
    ///
    /// Rejects (returns `false`) an id already present in either pool.
    /// Events the agent emitted before joining are discarded.
    pub fn add_agent(&mut self, mut agent: Agent) -> bool {
        let agent_id = agent.id().clone();
        if self.contains_any(&agent_id) {
            warn!(agent_id = %agent_id, "Agent already managed, ignoring add");
            return false;
        }
        agent.core_mut().discard_events();
        debug!(
            agent_id = %agent_id,
            agent_type = %agent.agent_type(),
            "Agent added to roster"
        );
        self.roster.insert(agent_id.clone(), agent);
        self.events.push(LifecycleEvent::AgentAdded { agent_id });
        true
    }

    /// Park an agent in the apprentice pool.
    ///
    /// Apprentices can be designated as successors but are not processed
    /// yearly. Rejects an id already present in either pool.
    pub fn add_apprentice(&mut self, mut agent: Agent) -> bool {
        let agent_id = agent.id().clone();
        if self.contains_any(&agent_id) {
            warn!(agent_id = %agent_id, "Agent already managed, ignoring apprentice");
            return false;
        }
        agent.core_mut().discard_events();
        self.apprentices.insert(agent_id, agent);
        true
    }

    /// Remove an agent from the roster.
    ///
    /// Any successor links pointing at the removed agent are cleared.
    pub fn remove_agent(&mut self, agent_id: &AgentId) -> Option<Agent> {
        let removed = self.roster.shift_remove(agent_id)?;
        self.clear_links_to(agent_id);
        info!(agent_id = %agent_id, "Agent removed from roster");
        self.events.push(LifecycleEvent::AgentRemoved {
            agent_id: agent_id.clone(),
        });
        Some(removed)
    }

    /// Remove an agent from the apprentice pool.
    pub fn remove_apprentice(&mut self, agent_id: &AgentId) -> Option<Agent> {
        let removed = self.apprentices.shift_remove(agent_id)?;
        self.clear_links_to(agent_id);
        Some(removed)
    }

    /// Drop every agent and pending event.
    ///
    /// No removal events are emitted.
    pub fn reset(&mut self) {
        info!(
            roster = self.roster.len(),
            apprentices = self.apprentices.len(),
            "Resetting agent manager"
        );
        self.roster.clear();
        self.apprentices.clear();
        self.events.clear();
    }

    /// Look up a roster agent.
    pub fn get(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.roster.get(agent_id)
    }

    /// Look up a roster agent mutably.
    pub fn get_mut(&mut self, agent_id: &AgentId) -> Option<&mut Agent> {
        self.roster.get_mut(agent_id)
    }

    /// Look up an apprentice.
    pub fn apprentice(&self, agent_id: &AgentId) -> Option<&Agent> {
        self.apprentices.get(agent_id)
    }

    /// Whether the roster holds this id.
    pub fn contains(&self, agent_id: &AgentId) -> bool {
        self.roster.contains_key(agent_id)
    }

    fn contains_any(&self, agent_id: &AgentId) -> bool {
        self.roster.contains_key(agent_id) || self.apprentices.contains_key(agent_id)
    }

    /// Number of agents on the roster.
    pub fn agent_count(&self) -> usize {
        self.roster.len()
    }

    /// Roster agents in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.roster.values()
    }

    /// Apprentices in insertion order.
    pub fn apprentices(&self) -> impl Iterator<Item = &Agent> {
        self.apprentices.values()
    }

    // -----------------------------------------------------------------------
    // Succession wiring
    // -----------------------------------------------------------------------

    /// Designate (or clear, with `None`) a roster individual's successor.
    ///
    /// The successor must be an individual in either pool and must not be
    /// the parent itself.
    pub fn designate_successor(
        &mut self,
        parent_id: &AgentId,
        successor_id: Option<AgentId>,
    ) -> Result<(), AgentError> {
        let parent = self
            .roster
            .get(parent_id)
            .ok_or_else(|| AgentError::AgentNotFound(parent_id.clone()))?;
        require_individual(parent)?;

        if let Some(successor_id) = &successor_id {
            if successor_id == parent_id {
                return Err(AgentError::InvalidSuccessor {
                    agent_id: parent_id.clone(),
                    reason: "an agent cannot succeed itself".to_owned(),
                });
            }
            let successor = self
                .roster
                .get(successor_id)
                .or_else(|| self.apprentices.get(successor_id))
                .ok_or_else(|| AgentError::AgentNotFound(successor_id.clone()))?;
            require_individual(successor)?;
        }

        if let Some(state) = self.roster.get_mut(parent_id).and_then(Agent::as_individual_mut) {
            state.set_successor(successor_id);
        }
        Ok(())
    }

    /// Recruit a fresh successor for a roster individual.
    ///
    /// The recruit is placed in the apprentice pool and designated as the
    /// parent's successor. Returns the recruit's id.
    pub fn recruit_successor(
        &mut self,
        parent_id: &AgentId,
        rng: &mut impl Rng,
    ) -> Result<AgentId, AgentError> {
        let parent = self
            .roster
            .get(parent_id)
            .ok_or_else(|| AgentError::AgentNotFound(parent_id.clone()))?;
        require_individual(parent)?;

        let recruit = parent
            .recruit_successor(&self.config, rng)
            .ok_or_else(|| AgentError::RecruitmentDenied(parent_id.clone()))?;
        let recruit_id = recruit.id().clone();

        if !self.add_apprentice(recruit) {
            return Err(AgentError::DuplicateId(recruit_id));
        }
        info!(
            agent_id = %parent_id,
            recruit_id = %recruit_id,
            "Successor recruited"
        );
        self.designate_successor(parent_id, Some(recruit_id.clone()))?;
        Ok(recruit_id)
    }

    /// Clear successor links in both pools that point at `target`.
    fn clear_links_to(&mut self, target: &AgentId) {
        for agent in self.roster.values_mut().chain(self.apprentices.values_mut()) {
            if let Some(state) = agent.as_individual_mut() {
                if state.successor() == Some(target) {
                    state.set_successor(None);
                }
            }
        }
    }

    /// Drop successor links whose target is in neither pool.
    ///
    /// Returns how many links were cleared. Used after loading a save.
    pub fn resolve_successor_links(&mut self) -> usize {
        let known: Vec<AgentId> = self.roster.keys().chain(self.apprentices.keys()).cloned().collect();
        let mut cleared: usize = 0;
        for agent in self.roster.values_mut().chain(self.apprentices.values_mut()) {
            let agent_id = agent.id().clone();
            if let Some(state) = agent.as_individual_mut() {
                let dangling = state.successor().is_some_and(|s| !known.contains(s));
                if dangling {
                    warn!(agent_id = %agent_id, "Dropping unresolvable successor link");
                    state.set_successor(None);
                    cleared = cleared.saturating_add(1);
                }
            }
        }
        cleared
    }

    // -----------------------------------------------------------------------
    // Yearly processing
    // -----------------------------------------------------------------------

    /// Run one year for every agent on the roster.
    ///
    /// Agents are visited in roster order over a snapshot taken at the start,
    /// so successors promoted onto the roster mid-year are not processed
    /// until next year. Agents that were already dead before the year are
    /// skipped by succession resolution.
    pub fn process_year(&mut self, rng: &mut impl Rng) -> YearReport {
        let snapshot: Vec<AgentId> = self.roster.keys().cloned().collect();
        let mut report = YearReport {
            processed: u32::try_from(snapshot.len()).unwrap_or(u32::MAX),
            ..YearReport::default()
        };

        for agent_id in snapshot {
            let Some(agent) = self.roster.get_mut(&agent_id) else {
                continue;
            };
            let was_alive = agent.core().is_alive();
            let outcome = agent.on_year_passed(&self.config, rng);
            let emitted = agent.core_mut().drain_events();
            report.betrayals = report
                .betrayals
                .saturating_add(count_betrayals(&emitted));
            self.events.extend(emitted);

            match outcome {
                YearOutcome::Died if was_alive => {
                    report.deaths = report.deaths.saturating_add(1);
                    if self.resolve_death(&agent_id, rng).is_some() {
                        report.successions = report.successions.saturating_add(1);
                    }
                }
                YearOutcome::Regenerated { .. } => {
                    report.generations_advanced = report.generations_advanced.saturating_add(1);
                }
                YearOutcome::Died | YearOutcome::Survived => {}
            }
        }

        debug!(
            processed = report.processed,
            deaths = report.deaths,
            successions = report.successions,
            generations = report.generations_advanced,
            betrayals = report.betrayals,
            "Year processed"
        );
        report
    }

    /// Run `years` consecutive years. Zero years is a no-op.
    pub fn advance_years(&mut self, years: u32, rng: &mut impl Rng) -> YearReport {
        (0..years).fold(YearReport::default(), |acc, _| acc.merge(self.process_year(rng)))
    }

    /// Remove a dead individual, run succession, and promote its successor.
    ///
    /// Returns the successor's id when one took over.
    fn resolve_death(&mut self, dead_id: &AgentId, rng: &mut impl Rng) -> Option<AgentId> {
        let mut dead = self.roster.shift_remove(dead_id)?;
        let designated = dead.successor_id().cloned();

        let mut promoted: Option<Agent> = None;
        let outcome = match designated {
            Some(successor_id) => {
                if let Some(successor) = self.roster.get_mut(&successor_id) {
                    dead.on_death(Some(successor), &self.config, rng)
                } else if let Some(mut apprentice) = self.apprentices.shift_remove(&successor_id) {
                    let outcome = dead.on_death(Some(&mut apprentice), &self.config, rng);
                    promoted = Some(apprentice);
                    outcome
                } else {
                    dead.on_death(None, &self.config, rng)
                }
            }
            None => dead.on_death(None, &self.config, rng),
        };
        self.events.extend(dead.core_mut().drain_events());

        let successor_id = match outcome {
            DeathOutcome::Succeeded { successor_id } => successor_id,
            DeathOutcome::Regenerated { .. } => None,
        };

        if let Some(mut apprentice) = promoted {
            let apprentice_id = apprentice.id().clone();
            if successor_id.as_ref() == Some(&apprentice_id) {
                apprentice.core_mut().discard_events();
                info!(agent_id = %apprentice_id, "Successor joined roster");
                self.roster.insert(apprentice_id.clone(), apprentice);
                self.events.push(LifecycleEvent::AgentAdded {
                    agent_id: apprentice_id,
                });
            } else {
                self.apprentices.insert(apprentice_id, apprentice);
            }
        }

        self.events.push(LifecycleEvent::AgentDied {
            agent_id: dead_id.clone(),
            successor_id: successor_id.clone(),
        });
        self.clear_links_to(dead_id);
        self.events.push(LifecycleEvent::AgentRemoved {
            agent_id: dead_id.clone(),
        });
        successor_id
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queued events not yet drained.
    pub fn pending_events(&self) -> &[LifecycleEvent] {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    /// Sum of every roster agent's exposure contribution.
    pub fn total_exposure(&self) -> u32 {
        self.roster
            .values()
            .fold(0_u32, |acc, a| acc.saturating_add(a.core().exposure_contribution()))
    }

    /// Mean roster loyalty, or [`EMPTY_ROSTER_AVERAGE`] when empty.
    pub fn average_loyalty(&self) -> f64 {
        self.average_of(|a| a.core().loyalty())
    }

    /// Mean roster competence, or [`EMPTY_ROSTER_AVERAGE`] when empty.
    pub fn average_competence(&self) -> f64 {
        self.average_of(|a| a.core().competence())
    }

    #[allow(clippy::cast_precision_loss)]
    fn average_of(&self, stat: impl Fn(&Agent) -> u32) -> f64 {
        if self.roster.is_empty() {
            return EMPTY_ROSTER_AVERAGE;
        }
        let total: u64 = self.roster.values().map(|a| u64::from(stat(a))).sum();
        total as f64 / self.roster.len() as f64
    }

    /// Roster agents of the given variant, in roster order.
    pub fn agents_by_type(&self, agent_type: AgentType) -> Vec<&Agent> {
        self.roster
            .values()
            .filter(|a| a.agent_type() == agent_type)
            .collect()
    }

    /// Roster agents managing no investments, in roster order.
    pub fn available_agents(&self) -> Vec<&Agent> {
        self.roster
            .values()
            .filter(|a| a.core().assigned_investments().is_empty())
            .collect()
    }
}

fn require_individual(agent: &Agent) -> Result<(), AgentError> {
    match agent.variant() {
        AgentVariant::Individual(_) => Ok(()),
        AgentVariant::Family(_) => Err(AgentError::WrongAgentType {
            agent_id: agent.id().clone(),
            expected: AgentType::Individual,
            actual: agent.agent_type(),
        }),
    }
}

fn count_betrayals(events: &[LifecycleEvent]) -> u32 {
    let count = events
        .iter()
        .filter(|e| matches!(e, LifecycleEvent::Betrayed { .. }))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use retinue_types::{CoverStatus, InvestmentId, KnowledgeLevel};

    fn individual(id: &str, age: u32, max_age: u32, competence: u32) -> Agent {
        Agent::individual_with_stats(AgentId::new(id), id.to_uppercase(), age, max_age, 100, competence)
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut mgr = AgentManager::default();
        assert!(mgr.add_agent(individual("a", 30, 70, 50)));
        assert!(!mgr.add_agent(individual("a", 30, 70, 50)));
        assert!(!mgr.add_apprentice(individual("a", 30, 70, 50)));
        assert_eq!(mgr.agent_count(), 1);
        assert_eq!(
            mgr.drain_events(),
            vec![LifecycleEvent::AgentAdded {
                agent_id: AgentId::new("a")
            }]
        );
    }

    #[test]
    fn remove_clears_links_and_emits() {
        let mut mgr = AgentManager::default();
        mgr.add_agent(individual("p", 30, 70, 50));
        mgr.add_agent(individual("s", 20, 70, 50));
        assert!(mgr.designate_successor(&AgentId::new("p"), Some(AgentId::new("s"))).is_ok());
        mgr.drain_events();

        assert!(mgr.remove_agent(&AgentId::new("s")).is_some());
        assert!(mgr.get(&AgentId::new("p")).and_then(Agent::successor_id).is_none());
        assert_eq!(
            mgr.drain_events(),
            vec![LifecycleEvent::AgentRemoved {
                agent_id: AgentId::new("s")
            }]
        );
        assert!(mgr.remove_agent(&AgentId::new("s")).is_none());
    }

    #[test]
    fn designate_successor_validates() {
        let mut mgr = AgentManager::default();
        mgr.add_agent(individual("p", 30, 70, 50));
        mgr.add_agent(Agent::new_family(AgentId::new("f"), "Orsini", 847));

        let missing = mgr.designate_successor(&AgentId::new("nope"), None);
        assert!(matches!(missing, Err(AgentError::AgentNotFound(_))));

        let on_family = mgr.designate_successor(&AgentId::new("f"), None);
        assert!(matches!(on_family, Err(AgentError::WrongAgentType { .. })));

        let family_successor = mgr.designate_successor(&AgentId::new("p"), Some(AgentId::new("f")));
        assert!(matches!(family_successor, Err(AgentError::WrongAgentType { .. })));

        let itself = mgr.designate_successor(&AgentId::new("p"), Some(AgentId::new("p")));
        assert!(matches!(itself, Err(AgentError::InvalidSuccessor { .. })));
    }

    #[test]
    fn recruit_places_apprentice_and_designates() {
        let mut mgr = AgentManager::default();
        let mut rng = SmallRng::seed_from_u64(42);
        mgr.add_agent(individual("p", 30, 70, 50));

        let recruit_id = mgr.recruit_successor(&AgentId::new("p"), &mut rng);
        let Ok(recruit_id) = recruit_id else {
            panic!("recruitment should succeed");
        };
        assert!(mgr.apprentice(&recruit_id).is_some());
        assert!(!mgr.contains(&recruit_id));
        assert_eq!(
            mgr.get(&AgentId::new("p")).and_then(Agent::successor_id),
            Some(&recruit_id)
        );

        let again = mgr.recruit_successor(&AgentId::new("p"), &mut rng);
        assert!(matches!(again, Err(AgentError::RecruitmentDenied(_))));
    }

    #[test]
    fn aggregates_on_empty_roster() {
        let mgr = AgentManager::default();
        assert_eq!(mgr.total_exposure(), 0);
        assert!((mgr.average_loyalty() - EMPTY_ROSTER_AVERAGE).abs() < f64::EPSILON);
        assert!((mgr.average_competence() - EMPTY_ROSTER_AVERAGE).abs() < f64::EPSILON);
        assert!(mgr.available_agents().is_empty());
    }

    #[test]
    fn aggregates_over_roster() {
        let mut mgr = AgentManager::default();
        let mut a = individual("a", 30, 70, 40);
        a.core_mut().set_cover_status(CoverStatus::Exposed);
        a.core_mut().set_knowledge_level(KnowledgeLevel::Aware);
        let mut b = individual("b", 30, 70, 60);
        b.core_mut().set_loyalty(50);
        a.core_mut().assign_investment(InvestmentId::new());
        mgr.add_agent(a);
        mgr.add_agent(b);
        mgr.add_agent(Agent::new_family(AgentId::new("f"), "Orsini", 847));

        assert_eq!(mgr.total_exposure(), 20);
        // (100 + 50 + 50) / 3
        assert!((mgr.average_loyalty() - 200.0 / 3.0).abs() < 1e-9);
        assert!((mgr.average_competence() - 50.0).abs() < 1e-9);
        assert_eq!(mgr.agents_by_type(AgentType::Individual).len(), 2);
        assert_eq!(mgr.agents_by_type(AgentType::Family).len(), 1);
        assert_eq!(mgr.agents_by_type(AgentType::Cult).len(), 0);
        let available: Vec<&str> = mgr.available_agents().iter().map(|a| a.id().as_str()).collect();
        assert_eq!(available, vec!["b", "f"]);
    }

    #[test]
    fn reset_empties_everything_silently() {
        let mut mgr = AgentManager::default();
        let mut rng = SmallRng::seed_from_u64(42);
        mgr.add_agent(individual("p", 30, 70, 50));
        assert!(mgr.recruit_successor(&AgentId::new("p"), &mut rng).is_ok());
        mgr.reset();
        assert_eq!(mgr.agent_count(), 0);
        assert_eq!(mgr.apprentices().count(), 0);
        assert!(mgr.pending_events().is_empty());
    }

    #[test]
    fn advance_zero_years_is_noop() {
        let mut mgr = AgentManager::default();
        let mut rng = SmallRng::seed_from_u64(42);
        mgr.add_agent(individual("a", 30, 70, 50));
        mgr.drain_events();
        assert_eq!(mgr.advance_years(0, &mut rng), YearReport::default());
        assert_eq!(mgr.get(&AgentId::new("a")).map(|a| a.core().age()), Some(30));
        assert!(mgr.pending_events().is_empty());
    }

    #[test]
    fn already_dead_agent_is_not_resolved_again() {
        let mut mgr = AgentManager::default();
        let mut rng = SmallRng::seed_from_u64(42);
        mgr.add_agent(individual("ghost", 90, 70, 50));
        mgr.drain_events();
        let report = mgr.process_year(&mut rng);
        assert_eq!(report.deaths, 0);
        assert!(mgr.contains(&AgentId::new("ghost")));
    }

    #[test]
    fn dangling_links_are_cleared() {
        let mut mgr = AgentManager::default();
        let mut parent = individual("p", 30, 70, 50);
        if let Some(state) = parent.as_individual_mut() {
            state.set_successor(Some(AgentId::new("lost")));
        }
        mgr.add_agent(parent);
        assert_eq!(mgr.resolve_successor_links(), 1);
        assert!(mgr.get(&AgentId::new("p")).and_then(Agent::successor_id).is_none());
        assert_eq!(mgr.resolve_successor_links(), 0);
    }
}

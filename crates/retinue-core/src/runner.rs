//! The yearly chronicle runner.
//!
//! A [`Chronicle`] owns everything a running game needs to move agents
//! through time: the [`AgentManager`], a seeded RNG, the current in-game
//! year, and the configuration it was built from. Each advanced year runs
//! the manager once, then reports to a [`LifecycleObserver`]:
//!
//! 1. every lifecycle event emitted during the year, in order
//! 2. a [`YearSummary`] of what happened
//!
//! The RNG is seeded from `world.seed`, so two chronicles built from the
//! same configuration and fed the same calls evolve identically.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use retinue_agents::{AgentError, AgentManager, YearReport};
use retinue_persist::manager::load_into;
use retinue_persist::{JsonSaveReader, JsonSaveWriter, SaveError, SaveReader, SaveWriter, Saveable};
use retinue_types::{AgentId, LifecycleEvent};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SimulationConfig};

/// Section holding the roster inside a chronicle save.
const ROSTER_SECTION: &str = "roster";

/// Errors that can occur while running or persisting a chronicle.
#[derive(Debug, thiserror::Error)]
pub enum ChronicleError {
    /// Loading the configuration failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// Writing or reading a save failed.
    #[error("save error: {source}")]
    Save {
        /// The underlying save error.
        #[from]
        source: SaveError,
    },

    /// A roster operation was rejected.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// What happened during one advanced year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearSummary {
    /// The year that just began.
    pub year: u32,
    /// Agents on the roster after the year was processed.
    pub roster_size: usize,
    /// Individuals that died.
    pub deaths: u32,
    /// Deaths where a successor took over.
    pub successions: u32,
    /// Families that advanced a generation.
    pub generations_advanced: u32,
    /// Betrayals rolled.
    pub betrayals: u32,
    /// Sum of the roster's exposure contributions.
    pub total_exposure: u32,
}

/// Callback invoked as the chronicle advances.
pub trait LifecycleObserver {
    /// Called once per lifecycle event, in emission order.
    fn on_event(&mut self, year: u32, event: &LifecycleEvent);

    /// Called after every event of the year has been delivered.
    fn on_year_end(&mut self, summary: &YearSummary);
}

/// An observer that ignores everything.
pub struct NoOpObserver;

impl LifecycleObserver for NoOpObserver {
    fn on_event(&mut self, _year: u32, _event: &LifecycleEvent) {}

    fn on_year_end(&mut self, _summary: &YearSummary) {}
}

/// Owns the roster, the RNG, and the calendar.
#[derive(Debug, Clone)]
pub struct Chronicle {
    manager: AgentManager,
    rng: StdRng,
    year: u32,
    config: SimulationConfig,
}

impl Chronicle {
    /// Start a chronicle at `world.starting_year` with an empty roster.
    pub fn new(config: SimulationConfig) -> Self {
        info!(
            seed = config.world.seed,
            starting_year = config.world.starting_year,
            "Chronicle starting"
        );
        Self {
            manager: AgentManager::new(config.lifecycle.clone()),
            rng: StdRng::seed_from_u64(config.world.seed),
            year: config.world.starting_year,
            config,
        }
    }

    /// Start a chronicle from a YAML configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, ChronicleError> {
        Ok(Self::new(SimulationConfig::from_file(path)?))
    }

    /// The current in-game year.
    pub const fn year(&self) -> u32 {
        self.year
    }

    /// The configuration this chronicle was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The roster.
    pub const fn manager(&self) -> &AgentManager {
        &self.manager
    }

    /// Mutable access to the roster, for adding agents and wiring
    /// successors.
    pub const fn manager_mut(&mut self) -> &mut AgentManager {
        &mut self.manager
    }

    /// Recruit a successor for a roster individual using the chronicle's RNG.
    pub fn recruit_successor(&mut self, parent_id: &AgentId) -> Result<AgentId, ChronicleError> {
        Ok(self.manager.recruit_successor(parent_id, &mut self.rng)?)
    }

    /// Advance one year and report it to `observer`.
    pub fn advance_year(&mut self, observer: &mut impl LifecycleObserver) -> YearSummary {
        self.step(observer).1
    }

    /// Advance `years` years, reporting each to `observer`.
    ///
    /// Returns the combined tally. Zero years is a no-op.
    pub fn advance_years(&mut self, years: u32, observer: &mut impl LifecycleObserver) -> YearReport {
        let mut total = YearReport::default();
        for _ in 0..years {
            let (report, _) = self.step(observer);
            total = total.merge(report);
        }
        total
    }

    fn step(&mut self, observer: &mut impl LifecycleObserver) -> (YearReport, YearSummary) {
        let report = self.manager.process_year(&mut self.rng);
        self.year = self.year.saturating_add(1);

        for event in self.manager.drain_events() {
            debug!(year = self.year, agent_id = %event.agent_id(), "Forwarding lifecycle event");
            observer.on_event(self.year, &event);
        }

        let summary = self.summarize(&report);
        info!(
            year = summary.year,
            roster = summary.roster_size,
            deaths = summary.deaths,
            successions = summary.successions,
            generations = summary.generations_advanced,
            betrayals = summary.betrayals,
            exposure = summary.total_exposure,
            "Year advanced"
        );
        observer.on_year_end(&summary);
        (report, summary)
    }

    fn summarize(&self, report: &YearReport) -> YearSummary {
        YearSummary {
            year: self.year,
            roster_size: self.manager.agent_count(),
            deaths: report.deaths,
            successions: report.successions,
            generations_advanced: report.generations_advanced,
            betrayals: report.betrayals,
            total_exposure: self.manager.total_exposure(),
        }
    }

    /// Clear the roster and apprentice pool for a new game.
    ///
    /// The year and RNG carry on.
    pub fn reset(&mut self) {
        info!(year = self.year, "Chronicle reset");
        self.manager.reset();
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the year and the roster.
    pub fn save(&self, writer: &mut impl SaveWriter) -> Result<(), SaveError> {
        writer.write_uint("year", u64::from(self.year));
        writer.begin_section(ROSTER_SECTION);
        self.manager.save(writer)?;
        writer.end_section()
    }

    /// Replace the year and roster with the saved ones.
    ///
    /// A save without a roster section leaves an empty roster. The RNG and
    /// configuration are kept. Returns the number of agents loaded.
    pub fn load(&mut self, reader: &mut impl SaveReader) -> usize {
        self.year = u32::try_from(reader.read_uint("year", u64::from(self.year))).unwrap_or(self.year);
        if !reader.enter_section(ROSTER_SECTION) {
            warn!(year = self.year, "Save has no roster section, starting empty");
            self.manager.reset();
            return 0;
        }
        let loaded = load_into(&mut self.manager, reader);
        reader.leave_section();
        loaded
    }

    /// Save the chronicle to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ChronicleError> {
        let mut writer = JsonSaveWriter::new();
        self.save(&mut writer)?;
        writer.finish_file(path)?;
        info!(path = %path.display(), year = self.year, "Chronicle saved");
        Ok(())
    }

    /// Load the chronicle from a JSON file written by [`Self::save_to_file`].
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize, ChronicleError> {
        let mut reader = JsonSaveReader::from_file(path)?;
        let loaded = self.load(&mut reader);
        info!(path = %path.display(), year = self.year, agents = loaded, "Chronicle loaded");
        Ok(loaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retinue_agents::Agent;

    use super::*;

    struct CountObserver {
        events: usize,
        years: Vec<u32>,
    }

    impl LifecycleObserver for CountObserver {
        fn on_event(&mut self, _year: u32, _event: &LifecycleEvent) {
            self.events = self.events.saturating_add(1);
        }

        fn on_year_end(&mut self, summary: &YearSummary) {
            self.years.push(summary.year);
        }
    }

    fn config_at(year: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.starting_year = year;
        config
    }

    #[test]
    fn starts_at_configured_year() {
        let chronicle = Chronicle::new(config_at(900));
        assert_eq!(chronicle.year(), 900);
        assert_eq!(chronicle.manager().agent_count(), 0);
    }

    #[test]
    fn observer_sees_every_year() {
        let mut chronicle = Chronicle::new(config_at(100));
        let mut observer = CountObserver {
            events: 0,
            years: Vec::new(),
        };
        chronicle.advance_years(3, &mut observer);
        assert_eq!(observer.years, vec![101, 102, 103]);
        assert_eq!(observer.events, 0);
        assert_eq!(chronicle.year(), 103);
    }

    #[test]
    fn zero_years_is_noop() {
        let mut chronicle = Chronicle::new(config_at(100));
        let report = chronicle.advance_years(0, &mut NoOpObserver);
        assert_eq!(report, YearReport::default());
        assert_eq!(chronicle.year(), 100);
    }

    #[test]
    fn reset_keeps_year() {
        let mut chronicle = Chronicle::new(config_at(100));
        chronicle
            .manager_mut()
            .add_agent(Agent::new_individual(AgentId::new("a"), "Ada"));
        chronicle.advance_years(2, &mut NoOpObserver);
        chronicle.reset();
        assert_eq!(chronicle.year(), 102);
        assert_eq!(chronicle.manager().agent_count(), 0);
    }

    #[test]
    fn save_without_roster_loads_empty() {
        let mut chronicle = Chronicle::new(config_at(100));
        chronicle
            .manager_mut()
            .add_agent(Agent::new_individual(AgentId::new("a"), "Ada"));
        let mut reader = JsonSaveReader::from_json_str(r#"{"year": 1200}"#).unwrap();
        assert_eq!(chronicle.load(&mut reader), 0);
        assert_eq!(chronicle.year(), 1200);
        assert_eq!(chronicle.manager().agent_count(), 0);
    }

    #[test]
    fn recruit_unknown_parent_is_error() {
        let mut chronicle = Chronicle::new(SimulationConfig::default());
        let result = chronicle.recruit_successor(&AgentId::new("ghost"));
        assert!(matches!(
            result,
            Err(ChronicleError::Agent {
                source: AgentError::AgentNotFound(_)
            })
        ));
    }
}

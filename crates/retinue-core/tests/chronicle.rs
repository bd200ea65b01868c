//! Integration tests for the `retinue-core` chronicle runner.
//!
//! A recording observer captures everything the chronicle reports, so the
//! tests can check event forwarding, yearly summaries, and that saved
//! chronicles come back with the same calendar and roster.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use retinue_agents::Agent;
use retinue_core::config::SimulationConfig;
use retinue_core::runner::{Chronicle, LifecycleObserver, NoOpObserver, YearSummary};
use retinue_types::{AgentId, LifecycleEvent};

#[derive(Default)]
struct Recorder {
    events: Vec<(u32, LifecycleEvent)>,
    summaries: Vec<YearSummary>,
}

impl LifecycleObserver for Recorder {
    fn on_event(&mut self, year: u32, event: &LifecycleEvent) {
        self.events.push((year, event.clone()));
    }

    fn on_year_end(&mut self, summary: &YearSummary) {
        self.summaries.push(*summary);
    }
}

fn config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.seed = seed;
    config.world.starting_year = 1000;
    config
}

/// A loyal individual that will neither betray nor lose loyalty.
fn steady(id: &str, age: u32, max_age: u32) -> Agent {
    Agent::individual_with_stats(AgentId::new(id), id, age, max_age, 100, 80)
}

#[test]
fn death_with_apprentice_is_reported_in_order() {
    let mut chronicle = Chronicle::new(config(42));
    chronicle.manager_mut().add_agent(steady("elder", 69, 70));
    chronicle.manager_mut().drain_events();
    let heir = chronicle.recruit_successor(&AgentId::new("elder")).unwrap();

    let mut recorder = Recorder::default();
    let summary = chronicle.advance_year(&mut recorder);

    assert_eq!(summary.year, 1001);
    assert_eq!(summary.deaths, 1);
    assert_eq!(summary.successions, 1);
    assert_eq!(summary.roster_size, 1);
    assert_eq!(recorder.summaries, vec![summary]);

    let events: Vec<&LifecycleEvent> = recorder.events.iter().map(|(_, e)| e).collect();
    assert!(recorder.events.iter().all(|(year, _)| *year == 1001));
    let involved = [AgentId::new("elder"), heir.clone()];
    assert!(recorder.events.iter().all(|(_, e)| involved.contains(e.agent_id())));
    let tail: Vec<&LifecycleEvent> = events.iter().rev().take(4).rev().copied().collect();
    assert_eq!(
        tail,
        vec![
            &LifecycleEvent::Died {
                agent_id: AgentId::new("elder")
            },
            &LifecycleEvent::AgentAdded {
                agent_id: heir.clone()
            },
            &LifecycleEvent::AgentDied {
                agent_id: AgentId::new("elder"),
                successor_id: Some(heir.clone())
            },
            &LifecycleEvent::AgentRemoved {
                agent_id: AgentId::new("elder")
            },
        ]
    );
    assert!(chronicle.manager().get(&heir).is_some());
    assert!(chronicle.manager().pending_events().is_empty());
}

#[test]
fn family_generations_show_up_in_summaries() {
    let mut chronicle = Chronicle::new(config(7));
    chronicle.manager_mut().add_agent(Agent::family_with_head(
        AgentId::new("house"),
        "Dray",
        "Tomas Dray",
        990,
        59,
        60,
    ));

    let mut recorder = Recorder::default();
    let report = chronicle.advance_years(1, &mut recorder);

    assert_eq!(report.generations_advanced, 1);
    assert_eq!(recorder.summaries[0].generations_advanced, 1);
    assert_eq!(recorder.summaries[0].roster_size, 1);
    assert!(recorder.events.iter().any(|(_, e)| matches!(
        e,
        LifecycleEvent::GenerationAdvanced { generation: 2, .. }
    )));
}

#[test]
fn same_seed_same_chronicle() {
    fn run(seed: u64) -> Vec<(u32, LifecycleEvent)> {
        let mut chronicle = Chronicle::new(config(seed));
        for i in 0..6 {
            let id = format!("agent-{i}");
            chronicle.manager_mut().add_agent(Agent::individual_with_stats(
                AgentId::new(id.as_str()),
                id.as_str(),
                30,
                45,
                55,
                60,
            ));
        }
        chronicle.manager_mut().add_agent(Agent::new_family(AgentId::new("house"), "Orlo", 900));
        let mut recorder = Recorder::default();
        chronicle.advance_years(60, &mut recorder);
        recorder.events
    }

    assert_eq!(run(314), run(314));
}

#[test]
fn saved_chronicle_restores_year_and_roster() {
    let mut chronicle = Chronicle::new(config(3));
    chronicle.manager_mut().add_agent(steady("keeper", 40, 90));
    chronicle
        .manager_mut()
        .add_agent(Agent::new_family(AgentId::new("house"), "Brannoc", 950));
    let heir = chronicle.recruit_successor(&AgentId::new("keeper")).unwrap();
    chronicle.advance_years(5, &mut NoOpObserver);

    let path = std::env::temp_dir().join(format!("retinue-chronicle-{}.json", std::process::id()));
    chronicle.save_to_file(&path).unwrap();

    let mut restored = Chronicle::new(config(3));
    let loaded = restored.load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, 3);
    assert_eq!(restored.year(), 1005);
    let saved: Vec<&Agent> = chronicle.manager().agents().collect();
    let back: Vec<&Agent> = restored.manager().agents().collect();
    assert_eq!(saved, back);
    assert_eq!(
        restored.manager().get(&AgentId::new("keeper")).unwrap().successor_id(),
        Some(&heir)
    );
}

#[test]
fn config_file_drives_the_chronicle() {
    let path = std::env::temp_dir().join(format!("retinue-config-{}.yaml", std::process::id()));
    std::fs::write(&path, "world:\n  starting_year: 1200\nlifecycle:\n  betrayal_cap_pct: 3\n").unwrap();

    let chronicle = Chronicle::from_config_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(chronicle.year(), 1200);
    assert_eq!(chronicle.manager().config().betrayal_cap_pct, 3);
    assert_eq!(chronicle.config().lifecycle.betrayal_cap_pct, 3);
}

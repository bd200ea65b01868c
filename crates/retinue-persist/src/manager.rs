//! Roster and apprentice pool records.
//!
//! Keys: `agent-count` with `agent-N` sections, then `apprentice-count`
//! with `apprentice-N` sections. The lifecycle configuration is not part of
//! the record; it belongs to whoever owns the manager.

use retinue_agents::{Agent, AgentManager};
use tracing::{info, warn};

use crate::context::{SaveReader, SaveWriter};
use crate::error::SaveError;
use crate::saveable::{Saveable, load_section, read_count, save_section, write_count};

impl Saveable for AgentManager {
    fn save(&self, writer: &mut impl SaveWriter) -> Result<(), SaveError> {
        write_count(writer, "agent-count", self.agent_count());
        for (i, agent) in self.agents().enumerate() {
            save_section(writer, &format!("agent-{i}"), agent)?;
        }

        write_count(writer, "apprentice-count", self.apprentices().count());
        for (i, agent) in self.apprentices().enumerate() {
            save_section(writer, &format!("apprentice-{i}"), agent)?;
        }
        Ok(())
    }

    /// Loads with the default lifecycle configuration. Use [`load_into`] to
    /// keep an existing configuration.
    fn load(reader: &mut impl SaveReader) -> Self {
        let mut manager = Self::default();
        load_into(&mut manager, reader);
        manager
    }
}

/// Replace `manager`'s agents with the ones in the current section.
///
/// The manager's configuration is kept. Loading emits no events; successor
/// links that point at agents missing from the save are dropped. Returns the
/// number of agents loaded into both pools.
pub fn load_into(manager: &mut AgentManager, reader: &mut impl SaveReader) -> usize {
    manager.reset();
    let mut loaded: usize = 0;

    for i in 0..read_count(&*reader, "agent-count") {
        let Some(agent) = load_section::<Agent>(reader, &format!("agent-{i}")) else {
            warn!(index = i, "Missing agent record, skipping");
            continue;
        };
        if manager.add_agent(agent) {
            loaded = loaded.saturating_add(1);
        }
    }

    for i in 0..read_count(&*reader, "apprentice-count") {
        let Some(agent) = load_section::<Agent>(reader, &format!("apprentice-{i}")) else {
            warn!(index = i, "Missing apprentice record, skipping");
            continue;
        };
        if manager.add_apprentice(agent) {
            loaded = loaded.saturating_add(1);
        }
    }

    let cleared = manager.resolve_successor_links();
    manager.drain_events();
    info!(agents = loaded, cleared_links = cleared, "Roster loaded");
    loaded
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retinue_agents::LifecycleConfig;
    use retinue_types::AgentId;

    use super::*;
    use crate::json::{JsonSaveReader, JsonSaveWriter};

    #[test]
    fn load_into_keeps_config_and_emits_nothing() {
        let mut source = AgentManager::default();
        source.add_agent(Agent::new_individual(AgentId::new("a"), "Ada"));
        source.add_agent(Agent::new_family(AgentId::new("f"), "Marrow", 847));

        let mut w = JsonSaveWriter::new();
        source.save(&mut w).unwrap();
        let mut r = JsonSaveReader::new(w.finish().unwrap()).unwrap();

        let config = LifecycleConfig {
            betrayal_cap_pct: 5,
            ..LifecycleConfig::default()
        };
        let mut target = AgentManager::new(config);
        target.add_agent(Agent::new_individual(AgentId::new("stale"), "Old"));

        assert_eq!(load_into(&mut target, &mut r), 2);
        assert_eq!(target.config().betrayal_cap_pct, 5);
        assert!(!target.contains(&AgentId::new("stale")));
        assert!(target.pending_events().is_empty());
        let ids: Vec<&str> = target.agents().map(|a| a.id().as_str()).collect();
        assert_eq!(ids, ["a", "f"]);
    }

    #[test]
    fn duplicate_records_load_once() {
        let mut r = JsonSaveReader::from_json_str(
            r#"{"agent-count": 2, "agent-0": {"id": "dup"}, "agent-1": {"id": "dup"},
                "apprentice-count": 1, "apprentice-0": {"id": "dup"}}"#,
        )
        .unwrap();
        let manager = AgentManager::load(&mut r);
        assert_eq!(manager.agent_count(), 1);
        assert_eq!(manager.apprentices().count(), 0);
    }
}

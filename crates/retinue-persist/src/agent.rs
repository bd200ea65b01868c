//! Agent records: shared core fields plus the variant's fields.
//!
//! Core keys: `id`, `name`, `age`, `max-age`, `loyalty`, `competence`,
//! `cover-status`, `knowledge-level`, `agent-type`, `trait-count` with
//! `trait-N` sections, and `investment-count` with `investment-N` uuid
//! strings.
//!
//! Individual keys: `training-progress`, and `successor-id` when a
//! successor is designated.
//!
//! Family keys: `family-name`, `generation`, `founding-year`, and
//! `bloodline-trait-count` with `bloodline-trait-N` sections.
//!
//! Reserved or unknown `agent-type` tags load as individuals. Events are
//! never persisted; a loaded agent has an empty outbox.

use std::sync::Arc;

use retinue_agents::agent::{DEFAULT_AGE, DEFAULT_COMPETENCE, DEFAULT_LOYALTY, DEFAULT_MAX_AGE};
use retinue_agents::family::{DEFAULT_FAMILY_NAME, DEFAULT_FOUNDING_YEAR};
use retinue_agents::{Agent, AgentCore, AgentVariant, FamilyState, IndividualState, Trait};
use retinue_types::{AgentId, AgentType, CoverStatus, InvestmentId, KnowledgeLevel};
use tracing::warn;
use uuid::Uuid;

use crate::context::{SaveReader, SaveWriter, read_u32};
use crate::error::SaveError;
use crate::saveable::{Saveable, load_section, read_count, save_section, write_count};

/// Name given to an agent record with no `name` field.
pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";

impl Saveable for Agent {
    fn save(&self, writer: &mut impl SaveWriter) -> Result<(), SaveError> {
        save_core(self.core(), self.agent_type(), writer)?;
        match self.variant() {
            AgentVariant::Individual(state) => {
                save_individual(state, writer);
                Ok(())
            }
            AgentVariant::Family(state) => save_family(state, writer),
        }
    }

    fn load(reader: &mut impl SaveReader) -> Self {
        let mut core = load_core_fields(&*reader);
        let tag = reader.read_int("agent-type", AgentType::Individual.tag());

        let variant = match AgentType::from_tag(tag) {
            Some(AgentType::Family) => AgentVariant::Family(load_family(reader)),
            Some(AgentType::Individual) => AgentVariant::Individual(load_individual(&*reader)),
            Some(reserved) => {
                warn!(agent_id = %core.id(), agent_type = %reserved, "Reserved agent type, loading as individual");
                AgentVariant::Individual(load_individual(&*reader))
            }
            None => {
                warn!(agent_id = %core.id(), tag, "Unknown agent type tag, loading as individual");
                AgentVariant::Individual(load_individual(&*reader))
            }
        };

        let bloodline: &[Arc<Trait>] = match &variant {
            AgentVariant::Family(state) => state.bloodline(),
            AgentVariant::Individual(_) => &[],
        };
        load_head_traits(&mut core, bloodline, reader);

        Self::from_parts(core, variant)
    }
}

// ---------------------------------------------------------------------------
// Core
// ---------------------------------------------------------------------------

fn save_core(core: &AgentCore, agent_type: AgentType, writer: &mut impl SaveWriter) -> Result<(), SaveError> {
    writer.write_string("id", core.id().as_str());
    writer.write_string("name", core.name());
    writer.write_uint("age", u64::from(core.age()));
    writer.write_uint("max-age", u64::from(core.max_age()));
    writer.write_int("loyalty", i64::from(core.loyalty()));
    writer.write_int("competence", i64::from(core.competence()));
    writer.write_int("cover-status", core.cover_status().tag());
    writer.write_int("knowledge-level", core.knowledge_level().tag());
    writer.write_int("agent-type", agent_type.tag());

    write_count(writer, "trait-count", core.traits().len());
    for (i, t) in core.traits().iter().enumerate() {
        save_section::<Trait>(writer, &format!("trait-{i}"), t)?;
    }

    write_count(writer, "investment-count", core.assigned_investments().len());
    for (i, investment) in core.assigned_investments().iter().enumerate() {
        writer.write_string(&format!("investment-{i}"), &investment.to_string());
    }
    Ok(())
}

fn load_core_fields(reader: &impl SaveReader) -> AgentCore {
    let id = if reader.has_key("id") {
        AgentId::new(reader.read_string("id", ""))
    } else {
        let generated = AgentId::generate();
        warn!(agent_id = %generated, "Agent record has no id, generated one");
        generated
    };

    let max_age = match read_u32(reader, "max-age", DEFAULT_MAX_AGE) {
        0 => DEFAULT_MAX_AGE,
        n => n,
    };

    let mut core = AgentCore::with_stats(
        id,
        reader.read_string("name", UNKNOWN_AGENT_NAME),
        read_u32(reader, "age", DEFAULT_AGE),
        max_age,
        read_stat(reader, "loyalty", DEFAULT_LOYALTY),
        read_stat(reader, "competence", DEFAULT_COMPETENCE),
    );

    let cover = CoverStatus::from_tag(reader.read_int("cover-status", CoverStatus::default().tag()))
        .unwrap_or_default();
    core.set_cover_status(cover);
    let knowledge = KnowledgeLevel::from_tag(reader.read_int("knowledge-level", KnowledgeLevel::default().tag()))
        .unwrap_or_default();
    core.set_knowledge_level(knowledge);

    for i in 0..read_count(reader, "investment-count") {
        let raw = reader.read_string(&format!("investment-{i}"), "");
        match Uuid::parse_str(&raw) {
            Ok(uuid) => {
                core.assign_investment(InvestmentId::from(uuid));
            }
            Err(_) => warn!(agent_id = %core.id(), value = %raw, "Skipping malformed investment id"),
        }
    }
    core
}

/// Head traits that match a bloodline trait by id share its allocation.
fn load_head_traits(core: &mut AgentCore, bloodline: &[Arc<Trait>], reader: &mut impl SaveReader) {
    for i in 0..read_count(&*reader, "trait-count") {
        let Some(loaded) = load_section::<Trait>(reader, &format!("trait-{i}")) else {
            warn!(agent_id = %core.id(), index = i, "Missing trait record, skipping");
            continue;
        };
        let shared = bloodline
            .iter()
            .find(|t| t.id() == loaded.id())
            .map_or_else(|| Arc::new(loaded), Arc::clone);
        core.add_trait(shared);
    }
}

/// Read a stat stored as a signed integer, clamped to `[0, 100]`.
fn read_stat(reader: &impl SaveReader, key: &str, default: u32) -> u32 {
    let raw = reader.read_int(key, i64::from(default));
    u32::try_from(raw.clamp(0, 100)).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

fn save_individual(state: &IndividualState, writer: &mut impl SaveWriter) {
    writer.write_double("training-progress", state.training_progress());
    if let Some(successor) = state.successor() {
        writer.write_string("successor-id", successor.as_str());
    }
}

fn load_individual(reader: &impl SaveReader) -> IndividualState {
    let successor = reader
        .has_key("successor-id")
        .then(|| AgentId::new(reader.read_string("successor-id", "")));
    IndividualState::restore(successor, reader.read_double("training-progress", 0.0))
}

fn save_family(state: &FamilyState, writer: &mut impl SaveWriter) -> Result<(), SaveError> {
    writer.write_string("family-name", state.family_name());
    writer.write_uint("generation", u64::from(state.generation()));
    writer.write_uint("founding-year", u64::from(state.founding_year()));
    write_count(writer, "bloodline-trait-count", state.bloodline().len());
    for (i, t) in state.bloodline().iter().enumerate() {
        save_section::<Trait>(writer, &format!("bloodline-trait-{i}"), t)?;
    }
    Ok(())
}

fn load_family(reader: &mut impl SaveReader) -> FamilyState {
    let family_name = reader.read_string("family-name", DEFAULT_FAMILY_NAME);
    let generation = read_u32(&*reader, "generation", 1).max(1);
    let founding_year = read_u32(&*reader, "founding-year", DEFAULT_FOUNDING_YEAR);

    let mut bloodline = Vec::new();
    for i in 0..read_count(&*reader, "bloodline-trait-count") {
        if let Some(t) = load_section::<Trait>(reader, &format!("bloodline-trait-{i}")) {
            bloodline.push(Arc::new(t));
        }
    }
    FamilyState::restore(family_name, generation, founding_year, bloodline)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retinue_agents::traits::template_by_id;

    use super::*;
    use crate::json::{JsonSaveReader, JsonSaveWriter};

    fn round_trip(agent: &Agent) -> Agent {
        let mut w = JsonSaveWriter::new();
        agent.save(&mut w).unwrap();
        let mut r = JsonSaveReader::new(w.finish().unwrap()).unwrap();
        Agent::load(&mut r)
    }

    #[test]
    fn individual_record_keeps_core_and_succession() {
        let mut agent = Agent::individual_with_stats(AgentId::new("spy"), "Vesna", 40, 75, 66, 72);
        agent.core_mut().set_cover_status(CoverStatus::Suspicious);
        agent.core_mut().set_knowledge_level(KnowledgeLevel::Aware);
        agent
            .core_mut()
            .add_trait(Arc::new(template_by_id("shrewd").unwrap().instantiate()));
        agent.core_mut().assign_investment(InvestmentId::new());
        agent
            .as_individual_mut()
            .unwrap()
            .set_successor(Some(AgentId::new("heir")));
        agent.set_training_progress(0.4);
        agent.core_mut().drain_events();

        let loaded = round_trip(&agent);
        assert_eq!(loaded, agent);
        assert_eq!(loaded.successor_id(), Some(&AgentId::new("heir")));
    }

    #[test]
    fn family_head_traits_share_bloodline_allocation() {
        let mut family = Agent::new_family(AgentId::new("house"), "Corvin", 820);
        let cunning = Arc::new(template_by_id("cunning").unwrap().instantiate());
        family
            .as_family_mut()
            .unwrap()
            .add_bloodline_trait(Arc::clone(&cunning));
        family.core_mut().add_trait(cunning);
        family.core_mut().drain_events();

        let loaded = round_trip(&family);
        assert_eq!(loaded, family);
        let state = loaded.as_family().unwrap();
        assert_eq!(state.founding_year(), 820);
        let head = loaded.core().traits().first().unwrap();
        let blood = state.bloodline().first().unwrap();
        assert!(Arc::ptr_eq(head, blood));
    }

    #[test]
    fn sparse_record_loads_defaults() {
        let mut r = JsonSaveReader::from_json_str(r#"{"id": "bare", "max-age": 0, "loyalty": 250}"#).unwrap();
        let loaded = Agent::load(&mut r);
        assert_eq!(loaded.id().as_str(), "bare");
        assert_eq!(loaded.core().name(), UNKNOWN_AGENT_NAME);
        assert_eq!(loaded.core().age(), DEFAULT_AGE);
        assert_eq!(loaded.core().max_age(), DEFAULT_MAX_AGE);
        assert_eq!(loaded.core().loyalty(), 100);
        assert_eq!(loaded.agent_type(), AgentType::Individual);
        assert!(loaded.core().pending_events().is_empty());
    }

    #[test]
    fn reserved_type_loads_as_individual() {
        let mut r = JsonSaveReader::from_json_str(r#"{"id": "c", "agent-type": 2}"#).unwrap();
        assert_eq!(Agent::load(&mut r).agent_type(), AgentType::Individual);
        let mut r = JsonSaveReader::from_json_str(r#"{"id": "x", "agent-type": 99}"#).unwrap();
        assert_eq!(Agent::load(&mut r).agent_type(), AgentType::Individual);
    }

    #[test]
    fn malformed_investment_is_skipped() {
        let good = Uuid::now_v7();
        let source = format!(r#"{{"id": "i", "investment-count": 2, "investment-0": "nope", "investment-1": "{good}"}}"#);
        let mut r = JsonSaveReader::from_json_str(&source).unwrap();
        let loaded = Agent::load(&mut r);
        assert_eq!(loaded.core().assigned_investments().len(), 1);
        assert!(
            loaded
                .core()
                .assigned_investments()
                .contains(&InvestmentId::from(good))
        );
    }
}

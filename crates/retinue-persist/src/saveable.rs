//! The [`Saveable`] trait and the trait record format.
//!
//! Trait record fields:
//!
//! | Key                  | Kind   | Default           |
//! |----------------------|--------|-------------------|
//! | `id`                 | string | `"unknown"`       |
//! | `name`               | string | `"Unknown Trait"` |
//! | `description`        | string | absent            |
//! | `inheritance-chance` | double | `0.5`             |
//! | `income-modifier`    | double | `1.0`             |
//! | `loyalty-modifier`   | int    | `0`               |
//! | `discovery-modifier` | double | `1.0`             |
//! | `conflict-count`     | uint   | `0`               |
//! | `conflict-N`         | string | skipped           |

use retinue_agents::Trait;

use crate::context::{SaveReader, SaveWriter};
use crate::error::SaveError;

/// Id given to a trait record with no `id` field.
pub const UNKNOWN_TRAIT_ID: &str = "unknown";

/// Name given to a trait record with no `name` field.
pub const UNKNOWN_TRAIT_NAME: &str = "Unknown Trait";

/// Something that can be written to and rebuilt from a save context.
///
/// Loading never fails: every field has a default, so a partial record
/// still produces a usable value.
pub trait Saveable: Sized {
    /// Write this value's fields into the current section.
    fn save(&self, writer: &mut impl SaveWriter) -> Result<(), SaveError>;

    /// Rebuild a value from the current section.
    fn load(reader: &mut impl SaveReader) -> Self;
}

/// Write `value` inside a new child section called `name`.
pub fn save_section<T: Saveable>(writer: &mut impl SaveWriter, name: &str, value: &T) -> Result<(), SaveError> {
    writer.begin_section(name);
    value.save(writer)?;
    writer.end_section()
}

/// Load a value from the child section called `name`, if it exists.
pub fn load_section<T: Saveable>(reader: &mut impl SaveReader, name: &str) -> Option<T> {
    if !reader.enter_section(name) {
        return None;
    }
    let value = T::load(reader);
    reader.leave_section();
    Some(value)
}

/// Read a list length stored under `key` as a `usize`.
///
/// Each entry of a list occupies its own key in the section, so the length
/// is capped at the section's key count.
pub(crate) fn read_count(reader: &impl SaveReader, key: &str) -> usize {
    let declared = usize::try_from(reader.read_uint(key, 0)).unwrap_or(usize::MAX);
    declared.min(reader.key_count())
}

/// Store a list length under `key`.
pub(crate) fn write_count(writer: &mut impl SaveWriter, key: &str, count: usize) {
    writer.write_uint(key, u64::try_from(count).unwrap_or(u64::MAX));
}

impl Saveable for Trait {
    fn save(&self, writer: &mut impl SaveWriter) -> Result<(), SaveError> {
        writer.write_string("id", self.id().as_str());
        writer.write_string("name", self.name());
        if let Some(description) = self.description() {
            writer.write_string("description", description);
        }
        writer.write_double("inheritance-chance", self.inheritance_chance());
        writer.write_double("income-modifier", self.income_modifier());
        writer.write_int("loyalty-modifier", i64::from(self.loyalty_modifier()));
        writer.write_double("discovery-modifier", self.discovery_modifier());

        write_count(writer, "conflict-count", self.conflicts().len());
        for (i, other) in self.conflicts().iter().enumerate() {
            writer.write_string(&format!("conflict-{i}"), other.as_str());
        }
        Ok(())
    }

    fn load(reader: &mut impl SaveReader) -> Self {
        let description = reader
            .has_key("description")
            .then(|| reader.read_string("description", ""));
        let loyalty_modifier = i32::try_from(reader.read_int("loyalty-modifier", 0)).unwrap_or(0);

        let mut loaded = Self::with_modifiers(
            reader.read_string("id", UNKNOWN_TRAIT_ID),
            reader.read_string("name", UNKNOWN_TRAIT_NAME),
            description,
            reader.read_double("inheritance-chance", 0.5),
            reader.read_double("income-modifier", 1.0),
            loyalty_modifier,
            reader.read_double("discovery-modifier", 1.0),
        );

        for i in 0..read_count(&*reader, "conflict-count") {
            let key = format!("conflict-{i}");
            if reader.has_key(&key) {
                loaded.add_conflict(reader.read_string(&key, ""));
            }
        }
        loaded
    }
}

//! The persistence interfaces entities write to and read from.
//!
//! A save is a tree of named sections, each holding named scalar fields.
//! Writers open a child section with [`SaveWriter::begin_section`] and close
//! it with [`SaveWriter::end_section`]; readers descend with
//! [`SaveReader::enter_section`] and climb back with
//! [`SaveReader::leave_section`]. Field names are kebab-case.

use crate::error::SaveError;

/// Write side of a save context.
pub trait SaveWriter {
    /// Write a string field in the current section.
    fn write_string(&mut self, key: &str, value: &str);

    /// Write a signed integer field.
    fn write_int(&mut self, key: &str, value: i64);

    /// Write an unsigned integer field.
    fn write_uint(&mut self, key: &str, value: u64);

    /// Write a floating-point field.
    fn write_double(&mut self, key: &str, value: f64);

    /// Write a boolean field.
    fn write_bool(&mut self, key: &str, value: bool);

    /// Open a child section; subsequent writes land inside it.
    fn begin_section(&mut self, name: &str);

    /// Close the innermost open section.
    fn end_section(&mut self) -> Result<(), SaveError>;
}

/// Read side of a save context.
///
/// Every read takes the value to return when the field is missing or has
/// the wrong shape.
pub trait SaveReader {
    /// Whether the current section holds a field with this name.
    fn has_key(&self, key: &str) -> bool;

    /// Number of fields and child sections in the current section.
    fn key_count(&self) -> usize;

    /// Read a string field.
    fn read_string(&self, key: &str, default: &str) -> String;

    /// Read a signed integer field.
    fn read_int(&self, key: &str, default: i64) -> i64;

    /// Read an unsigned integer field.
    fn read_uint(&self, key: &str, default: u64) -> u64;

    /// Read a floating-point field.
    fn read_double(&self, key: &str, default: f64) -> f64;

    /// Read a boolean field.
    fn read_bool(&self, key: &str, default: bool) -> bool;

    /// Descend into a child section. Returns `false` (and stays put) if the
    /// current section has no child with that name.
    fn enter_section(&mut self, name: &str) -> bool;

    /// Return to the parent section. No effect at the root.
    fn leave_section(&mut self);
}

/// Read an unsigned field that must fit in `u32`, falling back to `default`.
pub fn read_u32(reader: &impl SaveReader, key: &str, default: u32) -> u32 {
    u32::try_from(reader.read_uint(key, u64::from(default))).unwrap_or(default)
}

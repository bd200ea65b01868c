//! A `serde_json` tree implementation of the save interfaces.
//!
//! Sections map to nested JSON objects and fields to object members, so a
//! save is a single JSON document:
//!
//! ```text
//! { "agent-count": 1, "agent-0": { "id": "agent-...", "age": 31, ... } }
//! ```
//!
//! Non-finite doubles cannot be represented in JSON and are written as
//! `null`; reading them back yields the caller's default.

use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::context::{SaveReader, SaveWriter};
use crate::error::SaveError;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Builds a JSON document from [`SaveWriter`] calls.
#[derive(Debug, Default)]
pub struct JsonSaveWriter {
    root: Map<String, Value>,
    open: Vec<(String, Map<String, Value>)>,
}

impl JsonSaveWriter {
    /// Writer with an empty root section.
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&mut self) -> &mut Map<String, Value> {
        match self.open.last_mut() {
            Some((_, section)) => section,
            None => &mut self.root,
        }
    }

    fn put(&mut self, key: &str, value: Value) {
        self.current().insert(key.to_owned(), value);
    }

    /// Number of sections currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Finish writing and return the document.
    ///
    /// Fails if any section is still open.
    pub fn finish(self) -> Result<Value, SaveError> {
        if !self.open.is_empty() {
            return Err(SaveError::UnclosedSections {
                depth: self.open.len(),
            });
        }
        Ok(Value::Object(self.root))
    }

    /// Finish writing and render the document as pretty-printed JSON.
    pub fn finish_string(self) -> Result<String, SaveError> {
        let document = self.finish()?;
        Ok(serde_json::to_string_pretty(&document)?)
    }

    /// Finish writing and store the document at `path`.
    pub fn finish_file(self, path: impl AsRef<Path>) -> Result<(), SaveError> {
        let path = path.as_ref();
        let rendered = self.finish_string()?;
        std::fs::write(path, rendered)?;
        debug!(path = %path.display(), "Save written");
        Ok(())
    }
}

impl SaveWriter for JsonSaveWriter {
    fn write_string(&mut self, key: &str, value: &str) {
        self.put(key, Value::String(value.to_owned()));
    }

    fn write_int(&mut self, key: &str, value: i64) {
        self.put(key, Value::from(value));
    }

    fn write_uint(&mut self, key: &str, value: u64) {
        self.put(key, Value::from(value));
    }

    fn write_double(&mut self, key: &str, value: f64) {
        let number = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.put(key, number);
    }

    fn write_bool(&mut self, key: &str, value: bool) {
        self.put(key, Value::Bool(value));
    }

    fn begin_section(&mut self, name: &str) {
        self.open.push((name.to_owned(), Map::new()));
    }

    fn end_section(&mut self) -> Result<(), SaveError> {
        let (name, section) = self.open.pop().ok_or(SaveError::UnbalancedSection)?;
        self.current().insert(name, Value::Object(section));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Reads a JSON document through [`SaveReader`] calls.
#[derive(Debug, Clone)]
pub struct JsonSaveReader {
    root: Value,
    path: Vec<String>,
}

impl JsonSaveReader {
    /// Reader positioned at the root of `document`.
    ///
    /// Fails if the root is not a JSON object.
    pub fn new(document: Value) -> Result<Self, SaveError> {
        if !document.is_object() {
            return Err(SaveError::RootNotObject);
        }
        Ok(Self {
            root: document,
            path: Vec::new(),
        })
    }

    /// Parse a JSON string into a reader.
    pub fn from_json_str(source: &str) -> Result<Self, SaveError> {
        let document: Value = serde_json::from_str(source)?;
        Self::new(document)
    }

    /// Read and parse the save file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// Number of sections currently entered.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    fn current(&self) -> Option<&Map<String, Value>> {
        let mut node = self.root.as_object()?;
        for name in &self.path {
            node = node.get(name)?.as_object()?;
        }
        Some(node)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.current()?.get(key)
    }
}

impl SaveReader for JsonSaveReader {
    fn has_key(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    fn key_count(&self) -> usize {
        self.current().map_or(0, Map::len)
    }

    fn read_string(&self, key: &str, default: &str) -> String {
        self.field(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    }

    fn read_int(&self, key: &str, default: i64) -> i64 {
        self.field(key).and_then(Value::as_i64).unwrap_or(default)
    }

    fn read_uint(&self, key: &str, default: u64) -> u64 {
        self.field(key).and_then(Value::as_u64).unwrap_or(default)
    }

    fn read_double(&self, key: &str, default: f64) -> f64 {
        self.field(key).and_then(Value::as_f64).unwrap_or(default)
    }

    fn read_bool(&self, key: &str, default: bool) -> bool {
        self.field(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn enter_section(&mut self, name: &str) -> bool {
        let exists = self.field(name).is_some_and(Value::is_object);
        if exists {
            self.path.push(name.to_owned());
        }
        exists
    }

    fn leave_section(&mut self) {
        self.path.pop();
    }
}

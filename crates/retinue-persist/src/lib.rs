//! Key-value save contexts and agent persistence for the Retinue engine.
//!
//! Entities never see a file format. They write named scalars and nested
//! named sections through [`SaveWriter`], and read them back through
//! [`SaveReader`] with a default for every field, so a partial or older save
//! still loads.
//!
//! # Modules
//!
//! - [`context`] -- The reader/writer interfaces
//! - [`json`] -- A `serde_json` tree implementation of both interfaces
//! - [`saveable`] -- The [`Saveable`] trait and the trait record format
//! - [`agent`] -- Agent records (core, individual, family)
//! - [`manager`] -- Roster and apprentice pool records
//! - [`error`] -- Error types ([`SaveError`])

pub mod agent;
pub mod context;
pub mod error;
pub mod json;
pub mod manager;
pub mod saveable;

pub use context::{SaveReader, SaveWriter};
pub use error::SaveError;
pub use json::{JsonSaveReader, JsonSaveWriter};
pub use saveable::Saveable;

//! Error types for the retinue-persist crate.
//!
//! Reading a field never fails; missing or malformed values fall back to
//! defaults. Errors cover the framing around the fields: unbalanced
//! sections, unparsable documents, and file I/O.

/// Errors that can occur while writing or reading a save.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// `end_section` was called with no open section.
    #[error("end_section called with no open section")]
    UnbalancedSection,

    /// The writer was finished while sections were still open.
    #[error("{depth} section(s) left open when finishing the save")]
    UnclosedSections {
        /// Number of sections still open.
        depth: usize,
    },

    /// The document root is not a JSON object.
    #[error("save document root must be an object")]
    RootNotObject,

    /// The document could not be parsed or rendered as JSON.
    #[error("save document JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the save file failed.
    #[error("save file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

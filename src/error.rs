//! Error types for record correction.
//!
//! This module provides the [`MarcfixError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all marcfix operations.
///
/// Per-record anomalies (an unparseable pubinfo string, a failed category
/// lookup) are also expressed as variants here so that correction rules can
/// report them; the pipeline turns those into review items instead of
/// aborting the run.
#[derive(Error, Debug)]
pub enum MarcfixError {
    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// A request to a remote service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Free-text publication info did not match the expected citation shape.
    #[error("Pattern mismatch: {0}")]
    PatternMismatch(String),

    /// An external lookup returned nothing usable.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// Error reading a CSV export.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serializing output.
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Caller supplied something unusable (bad pattern, bad ID list, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<quick_xml::Error> for MarcfixError {
    fn from(err: quick_xml::Error) -> Self {
        MarcfixError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for MarcfixError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        MarcfixError::Xml(err.to_string())
    }
}

impl From<quick_xml::DeError> for MarcfixError {
    fn from(err: quick_xml::DeError) -> Self {
        MarcfixError::Serialize(err.to_string())
    }
}

impl From<serde_json::Error> for MarcfixError {
    fn from(err: serde_json::Error) -> Self {
        MarcfixError::Serialize(err.to_string())
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcfixError`].
pub type Result<T> = std::result::Result<T, MarcfixError>;

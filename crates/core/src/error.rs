//! Error types for Chromap

use thiserror::Error;

/// Main error type for Chromap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hex color {0:?}: expected exactly 6 hex digits")]
    InvalidHex(String),

    #[error("Unknown color name: {0:?}")]
    UnknownColorName(String),

    #[error("Invalid color component: {0:?}")]
    InvalidComponent(String),

    #[error("Line {line}: {count} tokens do not form a ramp line (expected 4, 6 or 8)")]
    TokenCount { line: usize, count: usize },

    #[error("Line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Element <{element}> is missing required attribute {attribute:?}")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
}

/// Result type alias for Chromap operations
pub type Result<T> = std::result::Result<T, Error>;

//! Construction-time configuration errors.
//!
//! Steady-state tick paths never return errors; degenerate inputs there
//! degrade to "no result" or "skip this contribution". Misconfiguration
//! is caught once, at construction.

use thiserror::Error;

/// Errors raised while building components from configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A history buffer was configured with a zero retention window.
    #[error("history retention window must be non-zero")]
    EmptyRetention,

    /// An area polygon has fewer than 3 vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    /// Two cameras were registered under the same name.
    #[error("duplicate camera name: {0}")]
    DuplicateCamera(String),
}

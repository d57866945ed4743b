//! Reveal error types

use thiserror::Error;

use crate::choreographer::SegmentId;

/// Errors reported by the choreography
///
/// Misconfiguration is reported by `start()` before anything is hidden or
/// played. Degenerate geometry is never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevealError {
    /// A configured element is not attached to the host tree
    #[error("Element {0} is not attached to the host tree")]
    UnknownElement(String),

    /// A fraction setting is NaN or infinite
    #[error("Invalid {name}: {value} is not a finite fraction")]
    InvalidFraction { name: &'static str, value: f32 },

    /// A segment event for an id that was never issued or already finished
    #[error("Unknown or already finished segment: {0:?}")]
    UnknownSegment(SegmentId),
}

/// Result type for reveal operations
pub type Result<T> = std::result::Result<T, RevealError>;

//! Per-frame error taxonomy.
//!
//! Every variant is scoped to the frame that produced it: the caller logs it,
//! drops the frame and keeps processing the stream.

use std::fmt;

/// Which landmark schema a set was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkKind {
    /// Face-mesh schema.
    Face,
    /// Hand schema.
    Hand,
}

impl fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Face => f.write_str("face"),
            Self::Hand => f.write_str("hand"),
        }
    }
}

/// Reasons a frame is dropped without emitting a result.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The inbound payload could not be turned into an image.
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// A landmark provider returned a set that does not cover the schema.
    #[error("malformed {kind} landmark set: need at least {required} points, got {found}")]
    MalformedLandmarks {
        /// Schema the set was checked against.
        kind: LandmarkKind,
        /// Minimum number of points the schema needs.
        required: usize,
        /// Number of points the provider returned.
        found: usize,
    },

    /// The landmark provider itself failed.
    #[error("landmark detection failed: {0}")]
    Detection(String),
}

impl FrameError {
    /// Returns true when the error points at a provider/schema mismatch
    /// rather than bad input.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::MalformedLandmarks { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_names_schema() {
        let err = FrameError::MalformedLandmarks {
            kind: LandmarkKind::Hand,
            required: 21,
            found: 5,
        };
        assert_eq!(
            err.to_string(),
            "malformed hand landmark set: need at least 21 points, got 5"
        );
        assert!(err.is_defect());
    }

    #[test]
    fn test_decode_is_not_defect() {
        let err = FrameError::Decode("bad base64".into());
        assert!(!err.is_defect());
        assert!(err.to_string().contains("bad base64"));
    }
}

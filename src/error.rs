// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error taxonomy for bisection and scheduling

use thiserror::Error;

/// Errors that can occur while cutting a mesh.
///
/// Every variant is delivered as a value through the result channel of the
/// scheduler; none of them stops a worker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CutError {
    /// The plane does not cross the mesh: every vertex fell on one side.
    #[error("plane does not intersect the mesh")]
    NoIntersection,

    /// An unexpected fault while classifying, splitting or capping.
    #[error("computation fault during bisection: {message}")]
    ComputationFault { message: String },

    /// The input snapshot breaks its own invariants.
    #[error("invalid mesh snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// A plane was requested with a zero-length normal.
    #[error("plane normal has zero length")]
    DegeneratePlane,

    /// A world-to-local matrix could not be inverted for normal transport.
    #[error("transform matrix is singular")]
    SingularTransform,
}

impl CutError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            reason: reason.into(),
        }
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::ComputationFault {
            message: message.into(),
        }
    }

    /// Whether a consumer should treat this failure as a benign no-op
    pub fn is_no_intersection(&self) -> bool {
        matches!(self, Self::NoIntersection)
    }
}

/// Result type for cut operations.
pub type CutResult<T> = std::result::Result<T, CutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CutError::NoIntersection;
        assert_eq!(format!("{err}"), "plane does not intersect the mesh");

        let err = CutError::invalid("index 9 out of range");
        assert!(format!("{err}").contains("index 9"));
    }

    #[test]
    fn test_no_intersection_is_benign() {
        assert!(CutError::NoIntersection.is_no_intersection());
        assert!(!CutError::fault("boom").is_no_intersection());
    }
}

//! Error types shared by the sculpting kernel and the assembly pipeline.

use thiserror::Error;

/// Errors reported at every kernel boundary.
///
/// The kernel never panics on bad geometry input; it logs a warning and hands
/// one of these back so the caller can decide whether to fail fast.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// A ring has too few vertices, or an odd count where an even one is required.
    #[error("invalid ring length {len}: need at least {min}{}", even_suffix(.even))]
    InvalidRingLength { len: usize, min: usize, even: bool },

    /// A zero-length or non-finite vector was normalized or used as an axis.
    #[error("degenerate vector in {context}")]
    DegenerateVector { context: &'static str },

    /// A spline was built from unusable control points.
    #[error("invalid spline control points ({count} given): {reason}")]
    InvalidSplineControlPoints { count: usize, reason: &'static str },

    /// A handle referenced a vertex the builder does not own.
    #[error("vertex index {index} out of range (buffer holds {len})")]
    IndexOutOfRange { index: u32, len: usize },

    /// A length used as a divisor was zero, negative or non-finite.
    #[error("degenerate length {value}")]
    DegenerateLength { value: f32 },

    /// A count or size parameter outside the range the kernel can build.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: &'static str },
}

fn even_suffix(even: &bool) -> &'static str {
    if *even {
        " and an even count"
    } else {
        ""
    }
}

impl MeshError {
    pub fn ring_too_short(len: usize, min: usize) -> Self {
        Self::InvalidRingLength { len, min, even: false }
    }

    pub fn ring_not_even(len: usize, min: usize) -> Self {
        Self::InvalidRingLength { len, min, even: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_length_message_mentions_even_requirement() {
        let msg = MeshError::ring_not_even(5, 4).to_string();
        assert!(msg.contains("even"), "message was {msg}");
        let msg = MeshError::ring_too_short(2, 3).to_string();
        assert!(!msg.contains("even"), "message was {msg}");
    }
}

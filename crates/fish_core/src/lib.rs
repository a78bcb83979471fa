//! Core math and error types for the fish mesh generator.
//!
//! This crate provides the foundational types used by the sculpting kernel:
//! - Safe vector helpers (normalization that reports instead of producing NaN)
//! - Orthonormal bases and the basis point transform
//! - The shared `MeshError` taxonomy

pub mod basis;
pub mod error;
pub mod vector;

pub use basis::*;
pub use error::*;
pub use vector::*;

// Re-export commonly used types
pub use glam::{Mat3, Vec3};

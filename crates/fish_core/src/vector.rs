//! Vector helpers that report degenerate input instead of producing NaN.

use glam::Vec3;

use crate::error::MeshError;

/// Lengths below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Normalize `v`, or return `DegenerateVector` if it has no usable direction.
pub fn try_normalize(v: Vec3, context: &'static str) -> Result<Vec3, MeshError> {
    let len = v.length();
    if !len.is_finite() || len < EPSILON {
        log::warn!("normalize: zero-length vector {:?} in {}", v, context);
        return Err(MeshError::DegenerateVector { context });
    }
    Ok(v / len)
}

/// Cartesian axis selector used by the bend deformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component of `v` along this axis.
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Mutable access to the component of `v` along this axis.
    pub fn component_mut(self, v: &mut Vec3) -> &mut f32 {
        match self {
            Axis::X => &mut v.x,
            Axis::Y => &mut v.y,
            Axis::Z => &mut v.z,
        }
    }
}

/// Average of a set of points. Returns `Vec3::ZERO` for an empty set.
pub fn centroid(points: impl IntoIterator<Item = Vec3>) -> Vec3 {
    let mut sum = Vec3::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    if count == 0 {
        Vec3::ZERO
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_vector_is_error() {
        let err = try_normalize(Vec3::ZERO, "test").unwrap_err();
        assert_eq!(err, MeshError::DegenerateVector { context: "test" });
    }

    #[test]
    fn normalize_nan_vector_is_error() {
        assert!(try_normalize(Vec3::new(f32::NAN, 0.0, 0.0), "test").is_err());
    }

    #[test]
    fn normalize_returns_unit_length() {
        let n = try_normalize(Vec3::new(3.0, 4.0, 0.0), "test").unwrap();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n - Vec3::new(0.6, 0.8, 0.0)).length() < 1e-6);
    }

    #[test]
    fn axis_component_mut_writes_through() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        *Axis::Y.component_mut(&mut v) += 5.0;
        assert_eq!(v, Vec3::new(1.0, 7.0, 3.0));
        assert_eq!(Axis::Z.component(v), 3.0);
    }

    #[test]
    fn centroid_of_square() {
        let c = centroid([
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        ]);
        assert!(c.length() < 1e-6);
        assert_eq!(centroid(std::iter::empty()), Vec3::ZERO);
    }
}

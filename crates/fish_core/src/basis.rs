//! Orthonormal bases and the basis point transform used to graft features.

use glam::{Mat3, Vec3};

use crate::error::MeshError;
use crate::vector::{try_normalize, EPSILON};

/// Three axes (columns) of a local frame expressed in the parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis3 {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl Default for Basis3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Basis3 {
    pub const IDENTITY: Self = Self {
        x: Vec3::X,
        y: Vec3::Y,
        z: Vec3::Z,
    };

    /// Build a right-handed orthonormal basis whose Z axis is `normal` and whose
    /// Y axis is `up` with its `normal` component removed (Gram-Schmidt).
    ///
    /// The inputs need not be orthogonal or unit length. X is `y × z`, so the
    /// result never mirrors geometry and triangle winding survives the remap.
    pub fn from_normal_and_up(normal: Vec3, up: Vec3) -> Result<Self, MeshError> {
        let z = try_normalize(normal, "basis normal")?;
        let projected = up - z * up.dot(z);
        if projected.length() < EPSILON {
            log::warn!("basis: up {:?} is parallel to normal {:?}", up, normal);
            return Err(MeshError::DegenerateVector {
                context: "basis up parallel to normal",
            });
        }
        let y = try_normalize(projected, "basis up")?;
        let x = y.cross(z);
        Ok(Self { x, y, z })
    }

    /// Column matrix of this basis.
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_cols(self.x, self.y, self.z)
    }
}

/// Rotation matrix for Euler angles in degrees, applied X first, then Y, then Z.
pub fn rotation_from_euler_degrees(degrees: Vec3) -> Mat3 {
    Mat3::from_rotation_z(degrees.z.to_radians())
        * Mat3::from_rotation_y(degrees.y.to_radians())
        * Mat3::from_rotation_x(degrees.x.to_radians())
}

/// Remap the indexed vertices through `basis` about `origin`:
/// `p' = origin + M · (p − origin)`, with the basis axes as the columns of `M`.
///
/// Each vertex is moved once even if its index appears several times.
pub fn apply_matrix_transform(
    positions: &mut [Vec3],
    indices: &[u32],
    basis: &Basis3,
    origin: Vec3,
) -> Result<(), MeshError> {
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(MeshError::IndexOutOfRange {
            index,
            len: positions.len(),
        });
    }

    let m = basis.to_mat3();
    let mut seen = vec![false; positions.len()];
    for &i in indices {
        let i = i as usize;
        if std::mem::replace(&mut seen[i], true) {
            continue;
        }
        positions[i] = origin + m * (positions[i] - origin);
    }
    Ok(())
}

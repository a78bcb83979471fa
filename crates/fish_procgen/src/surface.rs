//! Surface frames on spline-defined hulls, used to graft eyes and fins.
//!
//! A frame is measured rather than assumed: the outward normal comes from how
//! the surface actually moves between two nearby samples, so it tilts correctly
//! where the hull tapers or curves.

use fish_core::{try_normalize, Basis3, MeshError, EPSILON};
use glam::Vec3;

use crate::mesh_builder::{MeshBuilder, VertexHandle};
use crate::spline::SurfaceSplines;

/// Default forward step (in normalized spline parameter) used to measure slope.
pub const DEFAULT_FRAME_DELTA: f32 = 0.01;

/// A point on a hull with its outward normal and a surface tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeaturePoint {
    pub position: Vec3,
    pub normal: Vec3,
    /// Circumferential "surface up" direction, perpendicular to the normal.
    pub tangent: Vec3,
}

impl FeaturePoint {
    /// Local frame for grafting: Z along the normal, Y along the tangent.
    pub fn basis(&self) -> Result<Basis3, MeshError> {
        Basis3::from_normal_and_up(self.normal, self.tangent)
    }
}

/// Mirrored placement for a symmetric pair of features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeaturePair {
    /// Fish's left (−X) side.
    pub left: FeaturePoint,
    /// Fish's right (+X) side.
    pub right: FeaturePoint,
}

impl SurfaceSplines {
    /// Point on the hull at parameter `shift`, `angle_deg` around the cross-section
    /// (0° = +X, 90° = +Y).
    pub fn surface_point(&self, shift: f32, angle_deg: f32) -> Vec3 {
        let angle = angle_deg.to_radians();
        let center = self.position.get_point(shift);
        let radius = self.scale.get_point(shift);
        center + Vec3::new(radius.x * angle.cos(), radius.y * angle.sin(), 0.0)
    }

    /// Surface point and frame at (`shift`, `angle_deg`).
    ///
    /// The slope is measured towards `shift + delta`; near the end of the
    /// spline the pair of samples steps backwards so it still points along +t.
    pub fn surface_frame(&self, shift: f32, angle_deg: f32, delta: f32) -> Result<FeaturePoint, MeshError> {
        let shift = shift.clamp(0.0, 1.0);
        let delta = if delta.abs() < EPSILON { DEFAULT_FRAME_DELTA } else { delta.abs() };
        let (t0, t1) = if shift + delta <= 1.0 {
            (shift, shift + delta)
        } else {
            (shift - delta, shift)
        };

        let position = self.surface_point(shift, angle_deg);
        let slope = try_normalize(
            self.surface_point(t1, angle_deg) - self.surface_point(t0, angle_deg),
            "surface slope",
        )?;

        let spine = self.position.get_point(shift);
        let radial = try_normalize(position - spine, "surface radial")?;
        let spine_tangent = try_normalize(self.position.get_tangent(shift), "spine tangent")?;

        let up = try_normalize(radial.cross(spine_tangent), "surface up")?;
        let normal = try_normalize(slope.cross(up), "surface normal")?;

        Ok(FeaturePoint {
            position,
            normal,
            tangent: up,
        })
    }

    /// Frames for a symmetric pair: right at `angle_deg`, left mirrored to `180° − angle_deg`.
    pub fn feature_pair(&self, shift: f32, angle_deg: f32, delta: f32) -> Result<FeaturePair, MeshError> {
        Ok(FeaturePair {
            left: self.surface_frame(shift, 180.0 - angle_deg, delta)?,
            right: self.surface_frame(shift, angle_deg, delta)?,
        })
    }
}

impl MeshBuilder {
    /// Move a feature authored around the local origin (pointing out along +Z)
    /// onto the hull at `point`, sunk `embed` units below the surface.
    pub fn graft(&mut self, handle: &(impl VertexHandle + ?Sized), point: &FeaturePoint, embed: f32) -> Result<(), MeshError> {
        let basis = point.basis()?;
        self.apply_basis(handle, &basis, Vec3::ZERO)?;
        self.translate(handle, point.position - point.normal * embed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_builder::RingSplineSpec;
    use crate::topology::{enclosed_volume, is_closed_manifold};

    fn cylinder() -> SurfaceSplines {
        SurfaceSplines::new(
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 4.0)],
            vec![Vec3::ONE; 3],
            0.5,
        )
        .unwrap()
    }

    fn cone() -> SurfaceSplines {
        SurfaceSplines::new(
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 3.0)],
            vec![Vec3::new(2.0, 2.0, 1.0), Vec3::new(0.5, 0.5, 1.0)],
            0.0,
        )
        .unwrap()
    }

    #[test]
    fn cylinder_frame_side() {
        let frame = cylinder().surface_frame(0.5, 0.0, DEFAULT_FRAME_DELTA).unwrap();
        assert!((frame.position - Vec3::new(1.0, 0.0, 2.0)).length() < 1e-3);
        assert!((frame.normal - Vec3::X).length() < 1e-3);
        assert!((frame.tangent - Vec3::NEG_Y).length() < 1e-3);
    }

    #[test]
    fn cylinder_frame_top() {
        let frame = cylinder().surface_frame(0.5, 90.0, DEFAULT_FRAME_DELTA).unwrap();
        assert!((frame.position - Vec3::new(0.0, 1.0, 2.0)).length() < 1e-3);
        assert!((frame.normal - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn cone_normal_tilts_toward_narrow_end() {
        let frame = cone().surface_frame(0.5, 0.0, DEFAULT_FRAME_DELTA).unwrap();
        assert!(frame.normal.x > 0.0);
        assert!(frame.normal.z > 0.0);
        // Radius drops 1.5 over 3 units: normal ∝ (3, 0, 1.5).
        let expected = Vec3::new(3.0, 0.0, 1.5).normalize();
        assert!((frame.normal - expected).length() < 0.05, "normal = {:?}", frame.normal);
        assert!(frame.normal.dot(frame.tangent).abs() < 1e-4);
    }

    #[test]
    fn frame_at_end_of_spline_is_finite() {
        let frame = cone().surface_frame(1.0, 45.0, DEFAULT_FRAME_DELTA).unwrap();
        assert!(frame.normal.is_finite());
        assert!(frame.normal.dot(Vec3::new(1.0, 1.0, 0.0)) > 0.0);
    }

    #[test]
    fn feature_pair_is_mirrored() {
        let pair = cone().feature_pair(0.3, -20.0, DEFAULT_FRAME_DELTA).unwrap();
        assert!(pair.right.position.x > 0.0);
        assert!((pair.left.position.x + pair.right.position.x).abs() < 1e-4);
        assert!((pair.left.position.y - pair.right.position.y).abs() < 1e-4);
        assert!((pair.left.normal.x + pair.right.normal.x).abs() < 1e-4);
        assert!((pair.left.normal.z - pair.right.normal.z).abs() < 1e-4);
    }

    #[test]
    fn zero_radius_frame_is_error() {
        let splines = SurfaceSplines::new(vec![Vec3::ZERO, Vec3::Z], vec![Vec3::ZERO; 2], 0.5).unwrap();
        assert!(matches!(
            splines.surface_frame(0.5, 0.0, DEFAULT_FRAME_DELTA),
            Err(MeshError::DegenerateVector { .. })
        ));
    }

    #[test]
    fn graft_moves_local_z_onto_normal() {
        let mut b = MeshBuilder::new();
        let v = b.push_vertex(Vec3::Z);
        let frame = cylinder().surface_frame(0.5, 0.0, DEFAULT_FRAME_DELTA).unwrap();
        b.graft(&vec![v], &frame, 0.25).unwrap();
        assert!((b.position(v).unwrap() - Vec3::new(1.75, 0.0, 2.0)).length() < 1e-3);
    }

    #[test]
    fn graft_keeps_outward_winding() {
        let mut b = MeshBuilder::new();
        let spec = RingSplineSpec::new(
            6,
            4,
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 0.5)],
            vec![Vec3::new(0.2, 0.1, 1.0), Vec3::new(0.1, 0.05, 1.0)],
        );
        let tube = b.create_ring_spline(&spec).unwrap();
        let frame = cone().surface_frame(0.4, 130.0, DEFAULT_FRAME_DELTA).unwrap();
        b.graft(&tube, &frame, 0.05).unwrap();
        assert!(is_closed_manifold(b.indices()));
        assert!(enclosed_volume(b.positions(), b.indices()) > 0.0);
    }
}

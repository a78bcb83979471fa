//! Mouth seam: splits an open even-sided ring into two lips.

use fish_core::{try_normalize, MeshError};
use glam::Vec3;

use crate::mesh_builder::{MeshBuilder, Ring, Selection, VertexHandle};

/// A ring whose vertex count is known to be even (and at least four), so it
/// can be split into two halves at vertices `0` and `len / 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvenRing(Ring);

impl EvenRing {
    pub const MIN_LEN: usize = 4;

    pub fn new(ring: Ring) -> Result<Self, MeshError> {
        let len = ring.len();
        if len < Self::MIN_LEN || len % 2 != 0 {
            log::warn!("mouth: ring of {} vertices cannot be split into lips", len);
            return Err(MeshError::ring_not_even(len, Self::MIN_LEN));
        }
        Ok(Self(ring))
    }

    pub fn ring(&self) -> &Ring {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn half(&self) -> usize {
        self.0.len() / 2
    }
}

impl TryFrom<Ring> for EvenRing {
    type Error = MeshError;

    fn try_from(ring: Ring) -> Result<Self, Self::Error> {
        Self::new(ring)
    }
}

impl VertexHandle for EvenRing {
    fn indices(&self) -> &[u32] {
        self.0.indices()
    }
}

/// Lip shaping for [`MeshBuilder::fill_ring_mouth`].
#[derive(Debug, Clone)]
pub struct MouthShape {
    /// Direction the open ring faces (the ring winds counter-clockwise around it).
    pub forward: Vec3,
    pub up: Vec3,
    /// How far each lip pushes out along `forward`.
    pub stick_out: f32,
    /// Fraction of `stick_out` added along ±`up` to part the lips.
    pub tilt: f32,
    pub top_scale: Vec3,
    pub bottom_scale: Vec3,
    pub top_offset: Vec3,
    pub bottom_offset: Vec3,
    /// Forward offset of each lip's cap pole.
    pub cap_offset: f32,
}

impl Default for MouthShape {
    fn default() -> Self {
        Self {
            forward: Vec3::Z,
            up: Vec3::Y,
            stick_out: 0.1,
            tilt: 0.5,
            top_scale: Vec3::new(1.0, 0.8, 1.0),
            bottom_scale: Vec3::new(0.9, 0.7, 1.0),
            top_offset: Vec3::ZERO,
            bottom_offset: Vec3::ZERO,
            cap_offset: 0.02,
        }
    }
}

impl MeshBuilder {
    /// Close an open ring with two lips joined along a flat slit.
    ///
    /// Corners sit at ring positions `0` and `n/2`. `n/2 − 1` slit vertices
    /// are interpolated between them at the corners' average height, giving a
    /// top loop (upper arc + slit) and a bottom loop (lower arc + slit). Each
    /// loop is extruded forward and up/down, resized, shifted and capped.
    /// The extrusion bands are what stitch the ring to the slit, so the
    /// result stays closed.
    ///
    /// Returns every vertex created.
    pub fn fill_ring_mouth(&mut self, ring: &EvenRing, shape: &MouthShape) -> Result<Selection, MeshError> {
        self.check(ring)?;
        let forward = try_normalize(shape.forward, "mouth forward")?;
        let up = try_normalize(shape.up, "mouth up")?;

        let half = ring.half();
        let ring = ring.ring();
        let n = ring.len();

        let start = self.positions()[ring.at(0) as usize];
        let end = self.positions()[ring.at(half) as usize];
        let flat_y = (start.y + end.y) * 0.5;

        let slit: Vec<u32> = (1..half)
            .map(|j| {
                let mut p = start.lerp(end, j as f32 / half as f32);
                p.y = flat_y;
                self.push_vertex(p)
            })
            .collect();

        let top: Vec<u32> = (0..=half)
            .map(|i| ring.at(i))
            .chain(slit.iter().rev().copied())
            .collect();
        let bottom: Vec<u32> = (half..=n)
            .map(|i| ring.at(i))
            .chain(slit.iter().copied())
            .collect();

        let mut created: Selection = slit.iter().copied().collect();
        let lips = [
            (top, 1.0, shape.top_scale, shape.top_offset),
            (bottom, -1.0, shape.bottom_scale, shape.bottom_offset),
        ];
        for (indices, sign, scale, offset) in lips {
            let lip = Ring::new(indices)?;
            let direction = forward * shape.stick_out + up * (sign * shape.stick_out * shape.tilt);
            // This band is the strip joining the ring arc and the slit to the lip.
            let outer = self.extrude_ring(&lip, direction)?;

            let center = self.ring_centroid(&outer);
            self.scale_around_point(&outer, center, scale)?;
            self.translate(&outer, offset)?;
            let pole = self.fill_ring_pole(&outer, forward * shape.cap_offset, false)?;

            created.extend_from(&outer);
            created.push(pole);
        }

        log::debug!("mouth: {} vertices from a {}-vertex ring", created.len(), n);
        Ok(created)
    }
}

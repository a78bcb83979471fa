//! Ring/extrude/pole mesh sculpting kernel.
//!
//! Every operation appends to the builder's buffers and hands back a handle to
//! the vertices it created, which later operations (affine edits, bend, further
//! extrusion) take as their working set. Buffers are append-only, so a handle
//! stays valid until the builder is finished.

use std::collections::HashSet;
use std::ops::Range;

use fish_core::{apply_matrix_transform, centroid, rotation_from_euler_degrees, Axis, Basis3, MeshError, EPSILON};
use glam::Vec3;

use crate::spline::SurfaceSplines;

/// Anything that names a set of vertices in a [`MeshBuilder`].
pub trait VertexHandle {
    fn indices(&self) -> &[u32];
}

impl VertexHandle for [u32] {
    fn indices(&self) -> &[u32] {
        self
    }
}

impl VertexHandle for Vec<u32> {
    fn indices(&self) -> &[u32] {
        self
    }
}

/// Ordered closed loop of vertex indices (one tube cross-section).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring(Vec<u32>);

impl Ring {
    /// Smallest loop that can bound a surface.
    pub const MIN_LEN: usize = 3;

    pub fn new(indices: Vec<u32>) -> Result<Self, MeshError> {
        if indices.len() < Self::MIN_LEN {
            log::warn!("ring: {} vertices, need at least {}", indices.len(), Self::MIN_LEN);
            return Err(MeshError::ring_too_short(indices.len(), Self::MIN_LEN));
        }
        Ok(Self(indices))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Vertex at loop position `i`, wrapping around.
    pub fn at(&self, i: usize) -> u32 {
        self.0[i % self.0.len()]
    }
}

impl VertexHandle for Ring {
    fn indices(&self) -> &[u32] {
        &self.0
    }
}

/// Unordered set of vertex indices, free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<u32>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(range: Range<u32>) -> Self {
        Self(range.collect())
    }

    /// Add every index of `handle` not already present.
    pub fn extend_from(&mut self, handle: &(impl VertexHandle + ?Sized)) {
        let mut seen: HashSet<u32> = self.0.iter().copied().collect();
        for &i in handle.indices() {
            if seen.insert(i) {
                self.0.push(i);
            }
        }
    }

    pub fn union(mut self, other: &(impl VertexHandle + ?Sized)) -> Self {
        self.extend_from(other);
        self
    }

    pub fn push(&mut self, index: u32) {
        if !self.0.contains(&index) {
            self.0.push(index);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl VertexHandle for Selection {
    fn indices(&self) -> &[u32] {
        &self.0
    }
}

impl From<Ring> for Selection {
    fn from(ring: Ring) -> Self {
        Self(ring.0)
    }
}

impl FromIterator<u32> for Selection {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut sel = Selection::new();
        let mut seen = HashSet::new();
        for i in iter {
            if seen.insert(i) {
                sel.0.push(i);
            }
        }
        sel
    }
}

/// Result of [`MeshBuilder::create_ring_spline`].
#[derive(Debug, Clone)]
pub struct Tube {
    /// Cross-sections from the start of the spline to its end.
    pub rings: Vec<Ring>,
    pub start_pole: Option<u32>,
    pub end_pole: Option<u32>,
    /// Every vertex the tube created.
    pub vertices: Selection,
}

impl Tube {
    pub fn last_ring(&self) -> &Ring {
        &self.rings[self.rings.len() - 1]
    }
}

impl VertexHandle for Tube {
    fn indices(&self) -> &[u32] {
        self.vertices.indices()
    }
}

/// Parameters for a spline-driven tube.
///
/// Position control points should advance along +Z: rings are always built in
/// the XY plane and the caps are offset along Z.
#[derive(Debug, Clone)]
pub struct RingSplineSpec {
    pub verts_per_ring: usize,
    pub rings: usize,
    pub positions: Vec<Vec3>,
    /// Per-control-point radii; only X and Y are used.
    pub scales: Vec<Vec3>,
    pub alpha: f32,
    /// Distance of the end pole past the last ring's centroid.
    pub end_pole_offset: f32,
    /// Distance of the start pole before the first ring's centroid.
    pub begin_pole_offset: f32,
    pub fill_end: bool,
    pub fill_start: bool,
}

impl Default for RingSplineSpec {
    fn default() -> Self {
        Self {
            verts_per_ring: 8,
            rings: 10,
            positions: Vec::new(),
            scales: Vec::new(),
            alpha: 0.5,
            end_pole_offset: 0.0,
            begin_pole_offset: 0.0,
            fill_end: true,
            fill_start: true,
        }
    }
}

impl RingSplineSpec {
    pub fn new(verts_per_ring: usize, rings: usize, positions: Vec<Vec3>, scales: Vec<Vec3>) -> Self {
        Self {
            verts_per_ring,
            rings,
            positions,
            scales,
            ..Default::default()
        }
    }

    pub fn with_poles(mut self, begin_offset: f32, end_offset: f32) -> Self {
        self.begin_pole_offset = begin_offset;
        self.end_pole_offset = end_offset;
        self
    }

    pub fn with_caps(mut self, fill_start: bool, fill_end: bool) -> Self {
        self.fill_start = fill_start;
        self.fill_end = fill_end;
        self
    }

    /// Position and scale splines through the control points.
    pub fn splines(&self) -> Result<SurfaceSplines, MeshError> {
        SurfaceSplines::new(self.positions.clone(), self.scales.clone(), self.alpha)
    }
}

/// Finished flat buffers, ready to hand to a renderer.
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub colors: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Positions as `[x, y, z, x, y, z, ...]`.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Debug colors as `[r, g, b, r, g, b, ...]`.
    pub fn colors_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Owns the position, color and index storage for one generation pass.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    indices: Vec<u32>,
    color: Vec3,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
            color: Vec3::ONE,
        }
    }

    /// Debug color given to every vertex appended from now on.
    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn position(&self, index: u32) -> Option<Vec3> {
        self.positions.get(index as usize).copied()
    }

    /// Freeze the buffers.
    pub fn finish(self) -> MeshBuffers {
        MeshBuffers {
            positions: self.positions,
            colors: self.colors,
            indices: self.indices,
        }
    }

    pub(crate) fn push_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.colors.push(self.color);
        index
    }

    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Reject handles naming vertices this builder does not hold.
    pub(crate) fn check(&self, handle: &(impl VertexHandle + ?Sized)) -> Result<(), MeshError> {
        let len = self.positions.len();
        match handle.indices().iter().find(|&&i| i as usize >= len) {
            Some(&index) => {
                log::warn!("mesh: handle references vertex {} but only {} exist", index, len);
                Err(MeshError::IndexOutOfRange { index, len })
            }
            None => Ok(()),
        }
    }

    pub(crate) fn ring_centroid(&self, ring: &Ring) -> Vec3 {
        centroid(ring.iter().map(|i| self.positions[i as usize]))
    }

    /// Apply `f` to each distinct vertex of `handle` once.
    fn for_each_unique(&mut self, handle: &(impl VertexHandle + ?Sized), mut f: impl FnMut(&mut Vec3)) -> Result<(), MeshError> {
        self.check(handle)?;
        let mut seen = HashSet::new();
        for &i in handle.indices() {
            if seen.insert(i) {
                f(&mut self.positions[i as usize]);
            }
        }
        Ok(())
    }

    /// `n` vertices evenly spaced on an ellipse in the XY plane, counter-clockwise
    /// when viewed from +Z, centred on `translate`.
    pub fn create_ring(&mut self, n: usize, radius_x: f32, radius_y: f32, translate: Vec3) -> Result<Ring, MeshError> {
        if n < Ring::MIN_LEN {
            log::warn!("create_ring: {} vertices, need at least {}", n, Ring::MIN_LEN);
            return Err(MeshError::ring_too_short(n, Ring::MIN_LEN));
        }

        let step = std::f32::consts::TAU / n as f32;
        let indices = (0..n)
            .map(|k| {
                let angle = k as f32 * step;
                let offset = Vec3::new(angle.cos() * radius_x, angle.sin() * radius_y, 0.0);
                self.push_vertex(translate + offset)
            })
            .collect();
        Ok(Ring(indices))
    }

    /// Copy `ring` shifted by `offset` and bridge the two loops with two
    /// triangles per edge. The new ring keeps the old ring's index order.
    pub fn extrude_ring(&mut self, ring: &Ring, offset: Vec3) -> Result<Ring, MeshError> {
        self.check(ring)?;

        let new_ring: Vec<u32> = ring
            .iter()
            .map(|i| {
                let p = self.positions[i as usize] + offset;
                self.push_vertex(p)
            })
            .collect();

        let n = ring.len();
        for i in 0..n {
            let next = (i + 1) % n;
            let (a0, a1) = (ring.0[i], ring.0[next]);
            let (b0, b1) = (new_ring[i], new_ring[next]);

            // Two triangles per quad
            self.push_triangle(a0, a1, b0);
            self.push_triangle(a1, b1, b0);
        }

        Ok(Ring(new_ring))
    }

    /// Cap `ring` with a fan to a new pole vertex at its centroid plus `offset`.
    ///
    /// Unreversed fans face the direction the ring winds counter-clockwise
    /// around (tube ends); `reverse` flips them for tube starts.
    pub fn fill_ring_pole(&mut self, ring: &Ring, offset: Vec3, reverse: bool) -> Result<u32, MeshError> {
        self.check(ring)?;

        let pole = self.ring_centroid(ring) + offset;
        let pole = self.push_vertex(pole);

        let n = ring.len();
        for i in 0..n {
            let (a, b) = (ring.0[i], ring.0[(i + 1) % n]);
            if reverse {
                self.push_triangle(b, a, pole);
            } else {
                self.push_triangle(a, b, pole);
            }
        }

        Ok(pole)
    }

    /// Triangulate `ring` as a fan anchored at its first vertex, without adding
    /// vertices. Returns the number of triangles emitted.
    ///
    /// `reverse` is accepted for call-site symmetry with [`fill_ring_pole`]
    /// but both orientations currently emit the same winding.
    ///
    /// [`fill_ring_pole`]: MeshBuilder::fill_ring_pole
    pub fn fill_ring_fan(&mut self, ring: &Ring, reverse: bool) -> Result<usize, MeshError> {
        self.check(ring)?;

        let anchor = ring.0[0];
        for i in 1..ring.len() - 1 {
            let (b, c) = (ring.0[i], ring.0[i + 1]);
            if reverse {
                self.push_triangle(anchor, b, c);
            } else {
                self.push_triangle(anchor, b, c);
            }
        }
        Ok(ring.len() - 2)
    }

    pub fn scale_around_point(&mut self, handle: &(impl VertexHandle + ?Sized), origin: Vec3, scale: Vec3) -> Result<(), MeshError> {
        self.for_each_unique(handle, |p| *p = origin + (*p - origin) * scale)
    }

    /// Rotate by Euler angles in degrees, X first, then Y, then Z.
    pub fn rotate_around_point(&mut self, handle: &(impl VertexHandle + ?Sized), origin: Vec3, euler_degrees: Vec3) -> Result<(), MeshError> {
        let rotation = rotation_from_euler_degrees(euler_degrees);
        self.for_each_unique(handle, |p| *p = origin + rotation * (*p - origin))
    }

    pub fn translate(&mut self, handle: &(impl VertexHandle + ?Sized), offset: Vec3) -> Result<(), MeshError> {
        self.for_each_unique(handle, |p| *p += offset)
    }

    /// Remap vertices authored in a local frame through `basis` about `origin`.
    pub fn apply_basis(&mut self, handle: &(impl VertexHandle + ?Sized), basis: &Basis3, origin: Vec3) -> Result<(), MeshError> {
        self.check(handle)?;
        apply_matrix_transform(&mut self.positions, handle.indices(), basis, origin)
    }

    /// One-sided quartic sway.
    ///
    /// Each vertex's distance from `origin` along `scale_axis`, divided by
    /// `max_length` and clamped to `[0, 1]`, is raised to the fourth power and
    /// scaled by `amount`, then added to its `apply_axis` coordinate.
    pub fn bend(
        &mut self,
        handle: &(impl VertexHandle + ?Sized),
        amount: f32,
        origin: Vec3,
        max_length: f32,
        scale_axis: Axis,
        apply_axis: Axis,
    ) -> Result<(), MeshError> {
        if !max_length.is_finite() || max_length < EPSILON {
            log::warn!("bend: max_length {} is not a usable length", max_length);
            return Err(MeshError::DegenerateLength { value: max_length });
        }

        self.for_each_unique(handle, |p| {
            let dist = scale_axis.component(*p - origin);
            let normalized = (dist / max_length).clamp(0.0, 1.0);
            *apply_axis.component_mut(p) += normalized.powi(4) * amount;
        })
    }

    /// Sweep a tube along a position spline, sizing each ring from a scale spline.
    ///
    /// The first ring comes from [`create_ring`]; each following ring is an
    /// extrusion of the previous one by the position delta, rescaled about its
    /// centre by the ratio of consecutive scale samples.
    ///
    /// [`create_ring`]: MeshBuilder::create_ring
    pub fn create_ring_spline(&mut self, spec: &RingSplineSpec) -> Result<Tube, MeshError> {
        let splines = spec.splines()?;
        self.sweep_splines(&splines, spec)
    }

    /// [`create_ring_spline`](MeshBuilder::create_ring_spline) over prebuilt splines.
    pub fn sweep_splines(&mut self, splines: &SurfaceSplines, spec: &RingSplineSpec) -> Result<Tube, MeshError> {
        if spec.verts_per_ring < Ring::MIN_LEN {
            log::warn!("ring spline: {} vertices per ring", spec.verts_per_ring);
            return Err(MeshError::ring_too_short(spec.verts_per_ring, Ring::MIN_LEN));
        }
        if spec.rings < 2 {
            log::warn!("ring spline: {} rings, need at least 2", spec.rings);
            return Err(MeshError::InvalidParameter {
                name: "rings",
                reason: "need at least two rings",
            });
        }

        // Sample everything up front so a bad scale leaves the buffers untouched.
        let samples: Vec<(Vec3, Vec3)> = (0..spec.rings)
            .map(|k| {
                let t = k as f32 / (spec.rings - 1) as f32;
                (splines.position.get_point(t), splines.scale.get_point(t))
            })
            .collect();
        if let Some((_, s)) = samples[..samples.len() - 1]
            .iter()
            .find(|(_, s)| s.x.abs() < EPSILON || s.y.abs() < EPSILON)
        {
            log::warn!("ring spline: zero radius {:?} cannot be rescaled", s);
            return Err(MeshError::DegenerateVector {
                context: "ring spline scale sample",
            });
        }

        let first_vertex = self.vertex_count() as u32;
        let (p0, s0) = samples[0];
        let mut rings = vec![self.create_ring(spec.verts_per_ring, s0.x, s0.y, p0)?];

        for pair in samples.windows(2) {
            let (prev_pos, prev_scale) = pair[0];
            let (pos, scale) = pair[1];
            let prev = &rings[rings.len() - 1];
            let ring = self.extrude_ring(prev, pos - prev_pos)?;
            let ratio = Vec3::new(scale.x / prev_scale.x, scale.y / prev_scale.y, 1.0);
            self.scale_around_point(&ring, pos, ratio)?;
            rings.push(ring);
        }

        // Poles push out along the spline's end tangents; rings lie in XY, so
        // a degenerate tangent falls back to the tube's nominal +Z axis.
        let end_pole = if spec.fill_end {
            let last = &rings[rings.len() - 1];
            let dir = splines.position.get_tangent(1.0).try_normalize().unwrap_or(Vec3::Z);
            Some(self.fill_ring_pole(last, dir * spec.end_pole_offset, false)?)
        } else {
            None
        };
        let start_pole = if spec.fill_start {
            let dir = splines.position.get_tangent(0.0).try_normalize().unwrap_or(Vec3::Z);
            Some(self.fill_ring_pole(&rings[0], -dir * spec.begin_pole_offset, true)?)
        } else {
            None
        };

        Ok(Tube {
            rings,
            start_pole,
            end_pole,
            vertices: Selection::from_range(first_vertex..self.vertex_count() as u32),
        })
    }
}

//! Procedural stylized fish mesh generation
//! Builds a torso, head with eyes and a seamed mouth, paired pectoral/pelvic fins,
//! a bent two-lobed caudal fin, and dorsal/anal ridges from a handful of shape parameters.

use std::ops::Range;

use fish_core::{Axis, MeshError};
use glam::Vec3;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::mesh_builder::{MeshBuffers, MeshBuilder, RingSplineSpec, Selection, Tube};
use crate::mouth::{EvenRing, MouthShape};
use crate::spline::SurfaceSplines;
use crate::surface::{FeaturePoint, DEFAULT_FRAME_DELTA};
use crate::topology::{compute_vertex_normals, is_closed_manifold};

/// Torso radius at each position control point, as a fraction of the half width/height.
const TORSO_PROFILE: [f32; 5] = [0.6, 0.95, 1.0, 0.55, 0.15];
/// Back arch at each position control point, as a fraction of `back_arch`.
const TORSO_ARCH: [f32; 5] = [0.0, 0.6, 1.0, 0.4, 0.0];
/// Dorsal/anal fin height along the ridge, as a fraction of the half height.
const RIDGE_PROFILE: [f32; 4] = [0.4, 1.0, 0.75, 0.3];
/// Fraction of a ridge's half height sunk below the skin.
const RIDGE_EMBED: f32 = 0.2;
/// Fraction of the head length pushed back inside the torso.
const NECK_EMBED: f32 = 0.3;
/// Eye placement above the head's horizontal midline, in degrees.
const EYE_ANGLE: f32 = 35.0;
const EYE_RING_VERTS: usize = 8;
const PECTORAL_ANGLE: f32 = -35.0;
const PELVIC_ANGLE: f32 = -70.0;

/// How far an eye stands proud of the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeStyle {
    Flush,
    Round,
    Bulging,
}

impl EyeStyle {
    /// Eye depth as a multiple of its radius.
    pub fn protrusion(self) -> f32 {
        match self {
            EyeStyle::Flush => 0.25,
            EyeStyle::Round => 0.6,
            EyeStyle::Bulging => 1.1,
        }
    }
}

/// Configuration for procedural fish generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FishParams {
    /// Random seed for jitter and debug tints
    pub seed: u64,
    /// Relative parameter variation in `[0, 0.5]`; 0 disables jitter
    pub jitter: f32,

    pub body_length: f32,
    pub body_height: f32,
    pub body_width: f32,
    /// Height of the back's hump above the head-tail line
    pub back_arch: f32,

    pub head_size: f32,
    pub eye_size: f32,
    /// Eye placement along the head, 0 = neck, 1 = snout
    pub eye_position: f32,
    pub eye_style: EyeStyle,
    pub mouth_tilt: f32,
    pub mouth_stick_out: f32,

    pub caudal_length: f32,
    pub caudal_width: f32,
    /// Angle between each lobe and the body axis, degrees
    pub caudal_spread: f32,
    /// Sideways swish of each lobe tip
    pub caudal_bend: f32,

    /// Fraction of the torso the dorsal ridge spans
    pub dorsal_length: f32,
    pub dorsal_height: f32,
    pub dorsal_attach: f32,
    /// Backward lean, degrees
    pub dorsal_angle: f32,

    pub anal_length: f32,
    pub anal_height: f32,
    pub anal_attach: f32,
    pub anal_angle: f32,

    pub pectoral_length: f32,
    pub pectoral_width: f32,
    pub pectoral_attach: f32,
    /// Sweep toward the tail, degrees
    pub pectoral_angle: f32,

    pub pelvic_length: f32,
    pub pelvic_width: f32,
    pub pelvic_attach: f32,
    pub pelvic_angle: f32,

    pub fin_thickness: f32,
    /// Vertices per torso/head ring; must be even for the mouth
    pub ring_verts: usize,
    pub body_rings: usize,
    pub head_rings: usize,
    pub fin_ring_verts: usize,
    pub fin_rings: usize,
}

/// Named starting points for [`FishParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FishPreset {
    Goldfish,
    Tuna,
    Angelfish,
    Eel,
}

impl FishPreset {
    pub const ALL: [FishPreset; 4] = [FishPreset::Goldfish, FishPreset::Tuna, FishPreset::Angelfish, FishPreset::Eel];

    pub fn params(self) -> FishParams {
        match self {
            FishPreset::Goldfish => FishParams::goldfish(),
            FishPreset::Tuna => FishParams::tuna(),
            FishPreset::Angelfish => FishParams::angelfish(),
            FishPreset::Eel => FishParams::eel(),
        }
    }
}

impl Default for FishParams {
    fn default() -> Self {
        Self {
            seed: 0,
            jitter: 0.0,
            body_length: 2.0,
            body_height: 1.0,
            body_width: 0.6,
            back_arch: 0.15,
            head_size: 0.55,
            eye_size: 0.1,
            eye_position: 0.45,
            eye_style: EyeStyle::Round,
            mouth_tilt: 0.5,
            mouth_stick_out: 0.06,
            caudal_length: 0.8,
            caudal_width: 0.35,
            caudal_spread: 35.0,
            caudal_bend: 0.12,
            dorsal_length: 0.4,
            dorsal_height: 0.35,
            dorsal_attach: 0.3,
            dorsal_angle: 15.0,
            anal_length: 0.25,
            anal_height: 0.2,
            anal_attach: 0.6,
            anal_angle: 15.0,
            pectoral_length: 0.35,
            pectoral_width: 0.18,
            pectoral_attach: 0.2,
            pectoral_angle: 40.0,
            pelvic_length: 0.25,
            pelvic_width: 0.12,
            pelvic_attach: 0.45,
            pelvic_angle: 50.0,
            fin_thickness: 0.03,
            ring_verts: 12,
            body_rings: 12,
            head_rings: 6,
            fin_ring_verts: 6,
            fin_rings: 5,
        }
    }
}

impl FishParams {
    pub fn goldfish() -> Self {
        Self {
            body_length: 1.6,
            body_height: 1.1,
            body_width: 0.7,
            back_arch: 0.12,
            head_size: 0.5,
            eye_size: 0.14,
            eye_style: EyeStyle::Bulging,
            caudal_length: 0.9,
            caudal_width: 0.5,
            caudal_spread: 40.0,
            caudal_bend: 0.2,
            ..Default::default()
        }
    }

    pub fn tuna() -> Self {
        Self {
            body_length: 3.0,
            body_height: 0.9,
            body_width: 0.7,
            back_arch: 0.1,
            head_size: 0.7,
            eye_style: EyeStyle::Flush,
            caudal_length: 0.9,
            caudal_width: 0.25,
            caudal_spread: 55.0,
            dorsal_height: 0.25,
            pectoral_length: 0.4,
            pectoral_width: 0.1,
            body_rings: 16,
            ..Default::default()
        }
    }

    pub fn angelfish() -> Self {
        Self {
            body_length: 1.2,
            body_height: 1.6,
            body_width: 0.3,
            back_arch: 0.2,
            head_size: 0.4,
            dorsal_length: 0.5,
            dorsal_height: 0.9,
            dorsal_angle: 30.0,
            anal_length: 0.5,
            anal_height: 0.8,
            anal_attach: 0.4,
            anal_angle: 30.0,
            pelvic_length: 0.6,
            pelvic_width: 0.06,
            pelvic_angle: 65.0,
            ..Default::default()
        }
    }

    pub fn eel() -> Self {
        Self {
            body_length: 4.0,
            body_height: 0.45,
            body_width: 0.4,
            back_arch: 0.0,
            head_size: 0.6,
            eye_size: 0.06,
            dorsal_length: 0.75,
            dorsal_height: 0.15,
            dorsal_attach: 0.15,
            dorsal_angle: 5.0,
            anal_length: 0.5,
            anal_height: 0.12,
            anal_attach: 0.4,
            anal_angle: 5.0,
            caudal_length: 0.3,
            caudal_width: 0.15,
            pectoral_length: 0.15,
            pelvic_length: 0.08,
            pelvic_width: 0.05,
            body_rings: 20,
            ..Default::default()
        }
    }

    /// A copy with every dimension multiplied by a random factor in `[1 − amount, 1 + amount]`.
    ///
    /// A non-finite `amount` leaves the copy unjittered; [`validate`](Self::validate)
    /// reports it.
    pub fn jittered(&self, rng: &mut impl Rng, amount: f32) -> Self {
        let mut out = self.clone();
        if !amount.is_finite() {
            log::warn!("fish: jitter {} is not finite, skipping variation", amount);
            return out;
        }
        let amount = amount.clamp(0.0, 0.5);
        if amount == 0.0 {
            return out;
        }
        let dims = [
            &mut out.body_length,
            &mut out.body_height,
            &mut out.body_width,
            &mut out.back_arch,
            &mut out.head_size,
            &mut out.eye_size,
            &mut out.caudal_length,
            &mut out.caudal_width,
            &mut out.caudal_spread,
            &mut out.dorsal_height,
            &mut out.anal_height,
            &mut out.pectoral_length,
            &mut out.pectoral_width,
            &mut out.pelvic_length,
            &mut out.pelvic_width,
        ];
        for dim in dims {
            *dim *= 1.0 + rng.gen_range(-amount..=amount);
        }
        out
    }

    /// Reject parameters that would produce inverted or unclosable geometry.
    pub fn validate(&self) -> Result<(), MeshError> {
        let finite = [
            ("jitter", self.jitter),
            ("back_arch", self.back_arch),
            ("mouth_tilt", self.mouth_tilt),
            ("mouth_stick_out", self.mouth_stick_out),
            ("caudal_spread", self.caudal_spread),
            ("caudal_bend", self.caudal_bend),
            ("dorsal_angle", self.dorsal_angle),
            ("anal_angle", self.anal_angle),
            ("pectoral_angle", self.pectoral_angle),
            ("pelvic_angle", self.pelvic_angle),
        ];
        if let Some((name, value)) = finite.into_iter().find(|&(_, v)| !v.is_finite()) {
            log::warn!("fish: {} = {} is not finite", name, value);
            return Err(MeshError::InvalidParameter {
                name,
                reason: "must be finite",
            });
        }

        let positive = [
            ("body_length", self.body_length),
            ("body_height", self.body_height),
            ("body_width", self.body_width),
            ("head_size", self.head_size),
            ("eye_size", self.eye_size),
            ("caudal_length", self.caudal_length),
            ("caudal_width", self.caudal_width),
            ("dorsal_length", self.dorsal_length),
            ("dorsal_height", self.dorsal_height),
            ("anal_length", self.anal_length),
            ("anal_height", self.anal_height),
            ("pectoral_length", self.pectoral_length),
            ("pectoral_width", self.pectoral_width),
            ("pelvic_length", self.pelvic_length),
            ("pelvic_width", self.pelvic_width),
            ("fin_thickness", self.fin_thickness),
        ];
        if let Some((name, value)) = positive.into_iter().find(|&(_, v)| !(v.is_finite() && v > 0.0)) {
            log::warn!("fish: {} = {} must be a positive length", name, value);
            return Err(MeshError::InvalidParameter {
                name,
                reason: "must be positive and finite",
            });
        }

        let fractions = [
            ("eye_position", self.eye_position),
            ("dorsal_attach", self.dorsal_attach),
            ("anal_attach", self.anal_attach),
            ("pectoral_attach", self.pectoral_attach),
            ("pelvic_attach", self.pelvic_attach),
        ];
        if let Some((name, value)) = fractions.into_iter().find(|&(_, v)| !(0.0..=1.0).contains(&v)) {
            log::warn!("fish: {} = {} is not a fraction", name, value);
            return Err(MeshError::InvalidParameter {
                name,
                reason: "must lie in [0, 1]",
            });
        }

        if self.ring_verts < EvenRing::MIN_LEN || self.ring_verts % 2 != 0 {
            log::warn!("fish: ring_verts = {} cannot host a mouth", self.ring_verts);
            return Err(MeshError::ring_not_even(self.ring_verts, EvenRing::MIN_LEN));
        }
        Ok(())
    }
}

/// Anatomical part of a generated fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FishPart {
    Torso,
    PectoralFins,
    PelvicFins,
    Head,
    Eyes,
    CaudalFin,
    DorsalFin,
    AnalFin,
}

impl FishPart {
    /// Debug color before per-instance tinting.
    pub fn base_color(self) -> Vec3 {
        match self {
            FishPart::Torso => Vec3::new(0.85, 0.45, 0.15),
            FishPart::PectoralFins => Vec3::new(0.95, 0.75, 0.3),
            FishPart::PelvicFins => Vec3::new(0.9, 0.7, 0.35),
            FishPart::Head => Vec3::new(0.9, 0.55, 0.2),
            FishPart::Eyes => Vec3::new(0.05, 0.05, 0.1),
            FishPart::CaudalFin => Vec3::new(0.95, 0.6, 0.25),
            FishPart::DorsalFin => Vec3::new(0.8, 0.4, 0.2),
            FishPart::AnalFin => Vec3::new(0.8, 0.5, 0.25),
        }
    }
}

/// Vertex and index ranges one part occupies in the final buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRange {
    pub part: FishPart,
    pub vertices: Range<u32>,
    pub indices: Range<u32>,
}

/// Generated fish mesh data
#[derive(Debug, Clone)]
pub struct FishMesh {
    pub buffers: MeshBuffers,
    pub parts: Vec<PartRange>,
}

impl FishMesh {
    pub fn positions(&self) -> &[Vec3] {
        &self.buffers.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.buffers.colors
    }

    pub fn indices(&self) -> &[u32] {
        &self.buffers.indices
    }

    pub fn positions_flat(&self) -> &[f32] {
        self.buffers.positions_flat()
    }

    pub fn colors_flat(&self) -> &[f32] {
        self.buffers.colors_flat()
    }

    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.buffers.triangle_count()
    }

    pub fn part(&self, part: FishPart) -> Option<&PartRange> {
        self.parts.iter().find(|p| p.part == part)
    }

    /// Area-weighted smooth normals, one per vertex.
    pub fn normals(&self) -> Vec<Vec3> {
        compute_vertex_normals(&self.buffers.positions, &self.buffers.indices)
    }

    pub fn is_watertight(&self) -> bool {
        is_closed_manifold(&self.buffers.indices)
    }
}

/// Procedural fish mesh generator
///
/// The fish faces −Z: the torso runs from its head end at the origin toward
/// the tail along +Z.
pub struct FishGenerator {
    rng: StdRng,
    params: FishParams,
    builder: MeshBuilder,
    parts: Vec<PartRange>,
}

impl FishGenerator {
    pub fn new(params: FishParams) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let params = params.jittered(&mut rng, params.jitter);
        Self {
            rng,
            params,
            builder: MeshBuilder::new(),
            parts: Vec::new(),
        }
    }

    /// Parameters after jitter.
    pub fn params(&self) -> &FishParams {
        &self.params
    }

    /// Generate the complete fish mesh
    pub fn generate(mut self) -> Result<FishMesh, MeshError> {
        self.params.validate()?;

        // Torso first; everything else is placed from its splines
        let torso = self.generate_torso()?;
        self.generate_paired_fins(&torso)?;
        self.generate_head(&torso)?;
        self.generate_caudal_fin(&torso)?;
        self.generate_ridges(&torso)?;

        let mesh = FishMesh {
            buffers: self.builder.finish(),
            parts: self.parts,
        };
        log::debug!(
            "fish: seed {} -> {} vertices, {} triangles",
            self.params.seed,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    fn begin_part(&mut self, part: FishPart) -> (u32, u32) {
        let tint: f32 = 1.0 + self.rng.gen_range(-0.08..0.08);
        let color = (part.base_color() * tint).clamp(Vec3::ZERO, Vec3::ONE);
        self.builder.set_color(color);
        (self.builder.vertex_count() as u32, self.builder.indices().len() as u32)
    }

    fn end_part(&mut self, part: FishPart, (vertex_start, index_start): (u32, u32)) -> Range<u32> {
        let vertices = vertex_start..self.builder.vertex_count() as u32;
        let indices = index_start..self.builder.indices().len() as u32;
        log::debug!(
            "fish: {:?} {} vertices, {} triangles",
            part,
            vertices.len(),
            indices.len() / 3
        );
        self.parts.push(PartRange {
            part,
            vertices: vertices.clone(),
            indices,
        });
        vertices
    }

    fn generate_torso(&mut self) -> Result<SurfaceSplines, MeshError> {
        let start = self.begin_part(FishPart::Torso);
        let p = &self.params;
        let (half_w, half_h) = (p.body_width * 0.5, p.body_height * 0.5);

        let positions = TORSO_ARCH
            .iter()
            .enumerate()
            .map(|(i, arch)| Vec3::new(0.0, p.back_arch * arch, p.body_length * i as f32 / 4.0))
            .collect();
        let scales = TORSO_PROFILE.iter().map(|k| Vec3::new(half_w * k, half_h * k, 1.0)).collect();
        let spec = RingSplineSpec::new(p.ring_verts, p.body_rings, positions, scales)
            .with_poles(p.body_length * 0.02, p.body_length * 0.03);

        let splines = spec.splines()?;
        self.builder.sweep_splines(&splines, &spec)?;
        self.end_part(FishPart::Torso, start);
        Ok(splines)
    }

    /// A flat paddle along local +Z, wide along local X, swept back by `angle` degrees.
    fn build_paddle(&mut self, length: f32, width: f32, angle: f32) -> Result<Tube, MeshError> {
        let t = self.params.fin_thickness;
        let spec = RingSplineSpec::new(
            self.params.fin_ring_verts,
            self.params.fin_rings,
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, length * 0.5), Vec3::new(0.0, 0.0, length)],
            vec![
                Vec3::new(width * 0.35, t, 1.0),
                Vec3::new(width * 0.5, t * 0.8, 1.0),
                Vec3::new(width * 0.3, t * 0.4, 1.0),
            ],
        )
        .with_poles(0.0, length * 0.05);

        let fin = self.builder.create_ring_spline(&spec)?;
        self.builder.rotate_around_point(&fin, Vec3::ZERO, Vec3::new(0.0, angle, 0.0))?;
        Ok(fin)
    }

    fn generate_paired_fins(&mut self, torso: &SurfaceSplines) -> Result<(), MeshError> {
        let p = self.params.clone();
        let sets = [
            (FishPart::PectoralFins, p.pectoral_attach, PECTORAL_ANGLE, p.pectoral_length, p.pectoral_width, p.pectoral_angle),
            (FishPart::PelvicFins, p.pelvic_attach, PELVIC_ANGLE, p.pelvic_length, p.pelvic_width, p.pelvic_angle),
        ];

        for (part, attach, around, length, width, sweep) in sets {
            let mount = torso.feature_pair(attach, around, DEFAULT_FRAME_DELTA)?;
            let start = self.begin_part(part);
            for point in [mount.left, mount.right] {
                let fin = self.build_paddle(length, width, sweep)?;
                self.builder.graft(&fin, &point, width * 0.25)?;
            }
            self.end_part(part, start);
        }
        Ok(())
    }

    fn build_eye(&mut self, point: &FeaturePoint) -> Result<(), MeshError> {
        let r = self.params.eye_size;
        let depth = r * self.params.eye_style.protrusion();
        let spec = RingSplineSpec::new(
            EYE_RING_VERTS,
            4,
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, depth * 0.5), Vec3::new(0.0, 0.0, depth)],
            vec![Vec3::new(r, r, 1.0), Vec3::new(r * 0.9, r * 0.9, 1.0), Vec3::new(r * 0.45, r * 0.45, 1.0)],
        )
        .with_poles(0.0, depth * 0.3);

        let eye = self.builder.create_ring_spline(&spec)?;
        self.builder.graft(&eye, point, r * 0.35)
    }

    fn generate_head(&mut self, torso: &SurfaceSplines) -> Result<(), MeshError> {
        let start = self.begin_part(FishPart::Head);
        let p = &self.params;
        let size = p.head_size;
        let front = torso.scale.get_point(0.0);

        let spec = RingSplineSpec::new(
            p.ring_verts,
            p.head_rings,
            vec![
                Vec3::ZERO,
                Vec3::new(0.0, size * 0.03, size * 0.5),
                Vec3::new(0.0, -size * 0.05, size),
            ],
            vec![
                Vec3::new(front.x, front.y, 1.0),
                Vec3::new(front.x * 0.85, front.y * 0.85, 1.0),
                Vec3::new(front.x * 0.4, front.y * 0.35, 1.0),
            ],
        )
        .with_poles(size * 0.05, 0.0)
        .with_caps(true, false);
        let shape = MouthShape {
            stick_out: p.mouth_stick_out,
            tilt: p.mouth_tilt,
            cap_offset: p.mouth_stick_out * 0.3,
            ..Default::default()
        };
        let eye_position = p.eye_position;

        // Built snout-forward along +Z, then turned around onto the torso
        let splines = spec.splines()?;
        let tube = self.builder.sweep_splines(&splines, &spec)?;
        let mouth = EvenRing::new(tube.last_ring().clone())?;
        self.builder.fill_ring_mouth(&mouth, &shape)?;
        let head = self.end_part(FishPart::Head, start);

        let start = self.begin_part(FishPart::Eyes);
        let eyes = splines.feature_pair(eye_position, EYE_ANGLE, DEFAULT_FRAME_DELTA)?;
        self.build_eye(&eyes.left)?;
        self.build_eye(&eyes.right)?;
        let eyes = self.end_part(FishPart::Eyes, start);

        let whole = Selection::from_range(head.start..eyes.end);
        self.builder.rotate_around_point(&whole, Vec3::ZERO, Vec3::new(0.0, 180.0, 0.0))?;
        let neck = torso.position.get_point(0.0) + Vec3::Z * size * NECK_EMBED;
        self.builder.translate(&whole, neck)
    }

    fn generate_caudal_fin(&mut self, torso: &SurfaceSplines) -> Result<(), MeshError> {
        let start = self.begin_part(FishPart::CaudalFin);
        let p = self.params.clone();
        let tail = torso.position.get_point(1.0) - Vec3::Z * p.caudal_length * 0.1;
        let t = p.fin_thickness;

        // Upper lobe swishes one way, lower lobe the other
        for sign in [1.0f32, -1.0] {
            let spec = RingSplineSpec::new(
                p.fin_ring_verts,
                p.fin_rings,
                vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 0.5), Vec3::Z],
                vec![
                    Vec3::new(t, 0.2, 1.0),
                    Vec3::new(t * 0.8, 0.45, 1.0),
                    Vec3::new(t * 0.3, 0.3, 1.0),
                ],
            )
            .with_poles(0.0, 0.03);

            let lobe = self.builder.create_ring_spline(&spec)?;
            self.builder.bend(&lobe, sign * p.caudal_bend, Vec3::ZERO, 1.0, Axis::Z, Axis::X)?;
            self.builder
                .scale_around_point(&lobe, Vec3::ZERO, Vec3::new(1.0, p.caudal_width, p.caudal_length))?;
            self.builder
                .rotate_around_point(&lobe, Vec3::ZERO, Vec3::new(-sign * p.caudal_spread, 0.0, 0.0))?;
            self.builder.translate(&lobe, tail)?;
        }
        self.end_part(FishPart::CaudalFin, start);
        Ok(())
    }

    /// A thin fin running along the back (`side = 1`) or belly (`side = -1`).
    ///
    /// Ring centres follow the torso surface so the base sits just under the skin.
    fn build_ridge(
        &mut self,
        torso: &SurfaceSplines,
        attach: f32,
        length: f32,
        height: f32,
        lean: f32,
        side: f32,
    ) -> Result<(), MeshError> {
        let first = attach.clamp(0.0, 0.95);
        let last = (attach + length).clamp(first + 0.02, 0.98);
        let half = height * 0.5;
        let embed = half * RIDGE_EMBED;
        let t = self.params.fin_thickness;

        let (positions, scales): (Vec<Vec3>, Vec<Vec3>) = RIDGE_PROFILE
            .iter()
            .enumerate()
            .map(|(i, k)| {
                let s = first + (last - first) * i as f32 / (RIDGE_PROFILE.len() - 1) as f32;
                let h = half * k;
                let lift = torso.scale.get_point(s).y + h - embed;
                let center = torso.position.get_point(s) + Vec3::Y * side * lift;
                (center, Vec3::new(t, h, 1.0))
            })
            .unzip();
        let pivot = positions[0] - Vec3::Y * side * scales[0].y;

        let spec = RingSplineSpec::new(self.params.fin_ring_verts, self.params.fin_rings, positions, scales)
            .with_poles(half * 0.05, half * 0.05);
        let ridge = self.builder.create_ring_spline(&spec)?;
        self.builder.rotate_around_point(&ridge, pivot, Vec3::new(side * lean, 0.0, 0.0))
    }

    fn generate_ridges(&mut self, torso: &SurfaceSplines) -> Result<(), MeshError> {
        let p = self.params.clone();

        let start = self.begin_part(FishPart::DorsalFin);
        self.build_ridge(torso, p.dorsal_attach, p.dorsal_length, p.dorsal_height, p.dorsal_angle, 1.0)?;
        self.end_part(FishPart::DorsalFin, start);

        let start = self.begin_part(FishPart::AnalFin);
        self.build_ridge(torso, p.anal_attach, p.anal_length, p.anal_height, p.anal_angle, -1.0)?;
        self.end_part(FishPart::AnalFin, start);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::enclosed_volume;
    use fish_core::centroid;

    fn part_positions(mesh: &FishMesh, part: FishPart) -> Vec<Vec3> {
        let range = mesh.part(part).unwrap().vertices.clone();
        mesh.positions()[range.start as usize..range.end as usize].to_vec()
    }

    #[test]
    fn default_fish_is_watertight() {
        let mesh = FishGenerator::new(FishParams::default()).generate().unwrap();
        assert!(mesh.is_watertight());
        assert!(enclosed_volume(mesh.positions(), mesh.indices()) > 0.0);
    }

    #[test]
    fn every_preset_generates() {
        for preset in FishPreset::ALL {
            let mesh = FishGenerator::new(preset.params()).generate().unwrap();
            assert!(mesh.is_watertight(), "{:?} is not watertight", preset);
            assert!(mesh.positions().iter().all(|p| p.is_finite()), "{:?} has NaN", preset);
        }
    }

    #[test]
    fn indices_are_valid() {
        let mesh = FishGenerator::new(FishParams::goldfish()).generate().unwrap();
        let n = mesh.vertex_count() as u32;
        assert_eq!(mesh.indices().len() % 3, 0);
        assert!(mesh.indices().iter().all(|&i| i < n));
        assert_eq!(mesh.positions_flat().len(), mesh.vertex_count() * 3);
        assert_eq!(mesh.colors_flat().len(), mesh.vertex_count() * 3);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let params = FishParams {
            seed: 7,
            jitter: 0.2,
            ..Default::default()
        };
        let a = FishGenerator::new(params.clone()).generate().unwrap();
        let b = FishGenerator::new(params).generate().unwrap();
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.colors(), b.colors());
        assert_eq!(a.indices(), b.indices());
    }

    #[test]
    fn different_seeds_differ() {
        let a = FishGenerator::new(FishParams {
            seed: 1,
            jitter: 0.2,
            ..Default::default()
        })
        .generate()
        .unwrap();
        let b = FishGenerator::new(FishParams {
            seed: 2,
            jitter: 0.2,
            ..Default::default()
        })
        .generate()
        .unwrap();
        assert_eq!(a.indices(), b.indices());
        assert_ne!(a.positions(), b.positions());
    }

    #[test]
    fn zero_jitter_keeps_params() {
        let params = FishParams::tuna();
        let gen = FishGenerator::new(params.clone());
        assert_eq!(gen.params(), &params);
    }

    #[test]
    fn jitter_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = FishParams::default();
        let jittered = base.jittered(&mut rng, 0.1);
        assert!((jittered.body_length / base.body_length - 1.0).abs() <= 0.1 + 1e-6);
        assert!((jittered.head_size / base.head_size - 1.0).abs() <= 0.1 + 1e-6);
        assert_eq!(jittered.ring_verts, base.ring_verts);
    }

    #[test]
    fn part_ranges_tile_the_buffers() {
        let mesh = FishGenerator::new(FishParams::default()).generate().unwrap();
        assert_eq!(mesh.parts.len(), 8);
        let mut next_vertex = 0;
        let mut next_index = 0;
        for part in &mesh.parts {
            assert_eq!(part.vertices.start, next_vertex, "{:?}", part.part);
            assert_eq!(part.indices.start, next_index, "{:?}", part.part);
            assert!(!part.vertices.is_empty());
            next_vertex = part.vertices.end;
            next_index = part.indices.end;
        }
        assert_eq!(next_vertex as usize, mesh.vertex_count());
        assert_eq!(next_index as usize, mesh.indices().len());
    }

    #[test]
    fn parts_land_where_expected() {
        let params = FishParams::default();
        let mesh = FishGenerator::new(params.clone()).generate().unwrap();

        let head = part_positions(&mesh, FishPart::Head);
        assert!(head.iter().any(|p| p.z < -params.head_size * 0.5));

        let tail = part_positions(&mesh, FishPart::CaudalFin);
        assert!(tail.iter().any(|p| p.z > params.body_length + params.caudal_length * 0.5));

        let dorsal = centroid(part_positions(&mesh, FishPart::DorsalFin));
        assert!(dorsal.y > params.back_arch);
        let anal = centroid(part_positions(&mesh, FishPart::AnalFin));
        assert!(anal.y < 0.0);

        let eyes = part_positions(&mesh, FishPart::Eyes);
        assert!(eyes.iter().any(|p| p.x > 0.0) && eyes.iter().any(|p| p.x < 0.0));
        assert!(eyes.iter().all(|p| p.z < NECK_EMBED * params.head_size));
    }

    #[test]
    fn paired_fins_are_mirrored() {
        let mesh = FishGenerator::new(FishParams::default()).generate().unwrap();
        let fins = part_positions(&mesh, FishPart::PectoralFins);
        let (left, right) = fins.split_at(fins.len() / 2);
        assert!(left.iter().all(|p| p.x < 0.0));
        // Same shape as a set; vertex order runs the other way round the ring.
        for l in left {
            let mirrored = Vec3::new(-l.x, l.y, l.z);
            assert!(
                right.iter().any(|r| (*r - mirrored).length() < 1e-3),
                "no mirror for {:?}",
                l
            );
        }
    }

    #[test]
    fn eye_color_differs_from_body() {
        let mesh = FishGenerator::new(FishParams::default()).generate().unwrap();
        let eye = mesh.part(FishPart::Eyes).unwrap().vertices.start as usize;
        let body = mesh.part(FishPart::Torso).unwrap().vertices.start as usize;
        assert!((mesh.colors()[eye] - mesh.colors()[body]).length() > 0.3);
    }

    #[test]
    fn odd_ring_count_is_rejected() {
        let params = FishParams {
            ring_verts: 11,
            ..Default::default()
        };
        let err = FishGenerator::new(params).generate().unwrap_err();
        assert_eq!(err, MeshError::ring_not_even(11, 4));
    }

    #[test]
    fn non_positive_length_is_rejected() {
        let params = FishParams {
            caudal_length: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            FishGenerator::new(params).generate(),
            Err(MeshError::InvalidParameter { name: "caudal_length", .. })
        ));
    }

    #[test]
    fn non_finite_jitter_is_an_error() {
        for jitter in [f32::NAN, f32::INFINITY] {
            let params = FishParams { jitter, ..Default::default() };
            let gen = FishGenerator::new(params);
            assert_eq!(gen.params().body_length, FishParams::default().body_length);
            assert!(matches!(
                gen.generate(),
                Err(MeshError::InvalidParameter { name: "jitter", .. })
            ));
        }
    }

    #[test]
    fn non_finite_shape_params_are_rejected() {
        let cases = [
            ("back_arch", FishParams { back_arch: f32::NAN, ..Default::default() }),
            ("mouth_stick_out", FishParams { mouth_stick_out: f32::INFINITY, ..Default::default() }),
            ("caudal_bend", FishParams { caudal_bend: f32::NEG_INFINITY, ..Default::default() }),
            ("dorsal_angle", FishParams { dorsal_angle: f32::NAN, ..Default::default() }),
            ("pelvic_angle", FishParams { pelvic_angle: f32::INFINITY, ..Default::default() }),
        ];
        for (expected, params) in cases {
            match FishGenerator::new(params).generate() {
                Err(MeshError::InvalidParameter { name, .. }) => assert_eq!(name, expected),
                other => panic!("{expected}: expected InvalidParameter, got {other:?}"),
            }
        }
    }

    #[test]
    fn generated_positions_are_finite() {
        for preset in FishPreset::ALL {
            let params = FishParams { jitter: 0.1, seed: 11, ..preset.params() };
            let mesh = FishGenerator::new(params).generate().unwrap();
            assert!(mesh.positions().iter().all(|p| p.is_finite()), "{:?}", preset);
        }
    }

    #[test]
    fn normals_match_vertex_count() {
        let mesh = FishGenerator::new(FishParams::eel()).generate().unwrap();
        let normals = mesh.normals();
        assert_eq!(normals.len(), mesh.vertex_count());
        assert!(normals.iter().all(|n| (n.length() - 1.0).abs() < 1e-4));
    }
}

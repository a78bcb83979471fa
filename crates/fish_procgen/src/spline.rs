//! Arc-length parameterized Catmull-Rom spline.
//!
//! Curves are evaluated by a global normalized parameter `t ∈ [0, 1]` that is
//! remapped through per-segment arc lengths, so equal steps in `t` travel
//! roughly equal distances no matter how unevenly the control points are spaced.

use fish_core::{MeshError, EPSILON};
use glam::Vec3;

/// Sub-steps used to approximate each segment's arc length.
const ARC_LENGTH_STEPS: usize = 10;

/// Catmull-Rom curve through 3D control points with alpha knot spacing
/// (0.0 = uniform, 0.5 = centripetal, 1.0 = chordal).
#[derive(Debug, Clone)]
pub struct CatmullRomSpline3D {
    points: Vec<Vec3>,
    alpha: f32,
    segment_lengths: Vec<f32>,
    total_length: f32,
}

impl CatmullRomSpline3D {
    /// Build a spline and measure its segments.
    ///
    /// Needs at least two finite control points. If they all coincide the
    /// curve is a constant and `t` is spread evenly over the segments.
    pub fn new(points: Vec<Vec3>, alpha: f32) -> Result<Self, MeshError> {
        let count = points.len();
        if count < 2 {
            log::warn!("spline: {} control point(s), need at least 2", count);
            return Err(MeshError::InvalidSplineControlPoints {
                count,
                reason: "need at least two points",
            });
        }
        if points.iter().any(|p| !p.is_finite()) {
            log::warn!("spline: non-finite control point in {:?}", points);
            return Err(MeshError::InvalidSplineControlPoints {
                count,
                reason: "non-finite control point",
            });
        }

        let mut spline = Self {
            points,
            alpha,
            segment_lengths: Vec::with_capacity(count - 1),
            total_length: 0.0,
        };

        for seg in 0..spline.segment_count() {
            let mut length = 0.0;
            let mut prev = spline.raw_point(seg, 0.0);
            for step in 1..=ARC_LENGTH_STEPS {
                let p = spline.raw_point(seg, step as f32 / ARC_LENGTH_STEPS as f32);
                length += p.distance(prev);
                prev = p;
            }
            spline.segment_lengths.push(length);
        }
        spline.total_length = spline.segment_lengths.iter().sum();

        if spline.is_degenerate() {
            log::debug!("spline: all {} control points coincide, curve is constant", count);
        }

        Ok(spline)
    }

    /// Point at normalized arc-length parameter `t` (clamped to `[0, 1]`).
    pub fn get_point(&self, t: f32) -> Vec3 {
        let (seg, local) = self.locate(t);
        self.raw_point(seg, local)
    }

    /// Unnormalized derivative at normalized parameter `t`.
    pub fn get_tangent(&self, t: f32) -> Vec3 {
        let (seg, local) = self.locate(t);
        let [a, b, c, _] = self.coefficients(seg);
        a * (3.0 * local * local) + b * (2.0 * local) + c
    }

    /// `n` points at evenly spaced normalized parameters, both ends included.
    pub fn sample(&self, n: usize) -> Vec<Vec3> {
        match n {
            0 => Vec::new(),
            1 => vec![self.get_point(0.0)],
            _ => (0..n)
                .map(|i| self.get_point(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    pub fn segment_lengths(&self) -> &[f32] {
        &self.segment_lengths
    }

    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// True when the curve has no measurable length.
    pub fn is_degenerate(&self) -> bool {
        self.total_length < EPSILON
    }

    /// Map a global parameter to (segment, local parameter within that segment).
    fn locate(&self, t: f32) -> (usize, f32) {
        let last = self.segment_count() - 1;
        if t.is_nan() || t <= 0.0 {
            return (0, 0.0);
        }
        if t >= 1.0 {
            return (last, 1.0);
        }

        if self.is_degenerate() {
            let scaled = t * self.segment_count() as f32;
            let seg = (scaled.floor() as usize).min(last);
            return (seg, scaled - seg as f32);
        }

        let target = t * self.total_length;
        let mut travelled = 0.0;
        for (seg, &length) in self.segment_lengths.iter().enumerate() {
            if target <= travelled + length || seg == last {
                let local = if length < EPSILON {
                    0.0
                } else {
                    ((target - travelled) / length).clamp(0.0, 1.0)
                };
                return (seg, local);
            }
            travelled += length;
        }
        (last, 1.0)
    }

    /// Control point with endpoint duplication instead of wrap-around.
    fn control(&self, i: isize) -> Vec3 {
        let max = self.points.len() as isize - 1;
        self.points[i.clamp(0, max) as usize]
    }

    /// Knot interval between two control points.
    fn knot_interval(&self, a: Vec3, b: Vec3) -> f32 {
        // Coincident neighbours (including the duplicated ends) fall back to a uniform knot.
        let dt = a.distance(b).powf(self.alpha);
        if dt < EPSILON {
            1.0
        } else {
            dt
        }
    }

    /// Hermite cubic coefficients `[a, b, c, d]` of segment `seg`:
    /// `p(u) = a·u³ + b·u² + c·u + d`.
    fn coefficients(&self, seg: usize) -> [Vec3; 4] {
        let i = seg as isize;
        let p0 = self.control(i - 1);
        let p1 = self.control(i);
        let p2 = self.control(i + 1);
        let p3 = self.control(i + 2);

        let t01 = self.knot_interval(p0, p1);
        let t12 = self.knot_interval(p1, p2);
        let t23 = self.knot_interval(p2, p3);

        let m1 = (p2 - p1) + ((p1 - p0) / t01 - (p2 - p0) / (t01 + t12)) * t12;
        let m2 = (p2 - p1) + ((p3 - p2) / t23 - (p3 - p1) / (t12 + t23)) * t12;

        let a = (p1 - p2) * 2.0 + m1 + m2;
        let b = (p1 - p2) * -3.0 - m1 * 2.0 - m2;
        [a, b, m1, p1]
    }

    /// Point on segment `seg` at raw (non-reparameterized) parameter `u`.
    fn raw_point(&self, seg: usize, u: f32) -> Vec3 {
        let [a, b, c, d] = self.coefficients(seg);
        a * (u * u * u) + b * (u * u) + c * u + d
    }
}

/// A position spline and a scale spline describing a tapering, curving hull.
///
/// Scale samples are ellipse radii: X across, Y vertical. Z is carried but unused.
#[derive(Debug, Clone)]
pub struct SurfaceSplines {
    pub position: CatmullRomSpline3D,
    pub scale: CatmullRomSpline3D,
}

impl SurfaceSplines {
    pub fn new(positions: Vec<Vec3>, scales: Vec<Vec3>, alpha: f32) -> Result<Self, MeshError> {
        let position = CatmullRomSpline3D::new(positions, alpha)?;
        if position.is_degenerate() {
            log::warn!("surface: position spline has no length");
            return Err(MeshError::InvalidSplineControlPoints {
                count: position.control_points().len(),
                reason: "position spline has zero length",
            });
        }
        let scale = CatmullRomSpline3D::new(scales, alpha)?;
        Ok(Self { position, scale })
    }
}

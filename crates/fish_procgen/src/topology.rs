//! Triangle-soup checks and derived attributes for generated meshes.

use std::collections::HashMap;

use glam::Vec3;

fn triangles(indices: &[u32]) -> impl Iterator<Item = [u32; 3]> + '_ {
    indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
}

/// How many triangles use each undirected edge, keyed `(min, max)`.
pub fn edge_use_counts(indices: &[u32]) -> HashMap<(u32, u32), usize> {
    let mut counts = HashMap::new();
    for [a, b, c] in triangles(indices) {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            *counts.entry((u.min(v), u.max(v))).or_insert(0) += 1;
        }
    }
    counts
}

/// True when every edge borders exactly two triangles that traverse it in
/// opposite directions, i.e. the surface is closed and consistently wound.
pub fn is_closed_manifold(indices: &[u32]) -> bool {
    if indices.is_empty() || indices.len() % 3 != 0 {
        return false;
    }
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    for [a, b, c] in triangles(indices) {
        if a == b || b == c || c == a {
            return false;
        }
        for edge in [(a, b), (b, c), (c, a)] {
            *directed.entry(edge).or_insert(0) += 1;
        }
    }
    directed
        .iter()
        .all(|(&(u, v), &count)| count == 1 && directed.get(&(v, u)) == Some(&1))
}

/// Signed volume enclosed by a closed mesh; positive when faces wind outward.
pub fn enclosed_volume(positions: &[Vec3], indices: &[u32]) -> f32 {
    triangles(indices)
        .map(|[a, b, c]| {
            let (pa, pb, pc) = (positions[a as usize], positions[b as usize], positions[c as usize]);
            pa.dot(pb.cross(pc))
        })
        .sum::<f32>()
        / 6.0
}

/// Area-weighted smooth vertex normals.
///
/// Each face normal (unnormalized, so its length is twice the triangle's area)
/// is accumulated at its three corners and the sums are normalized. Vertices no
/// triangle touches keep a zero normal.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for [a, b, c] in triangles(indices) {
        let (a, b, c) = (a as usize, b as usize, c as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}

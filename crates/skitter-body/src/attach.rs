//! Attachment-point derivation from body-surface vertices.
//!
//! Consumes the raw vertex cloud the mesh collaborator supplies and
//! produces exactly `2 × pairs_per_side` attachment points as interleaved
//! left/right pairs ordered front to back. Callers index attachment points
//! positionally by leg slot, so the output length is guaranteed even for
//! degenerate meshes.

use nalgebra::Point3;

use skitter_core::config::AttachConfig;

/// Derive leg attachment points from a body-local surface vertex cloud.
///
/// Filtering policy:
/// 1. Partition vertices into left/right candidate sets by an X threshold
///    `inward_fraction` of the way out from the body's X center toward each
///    extreme.
/// 2. Keep only vertices inside a Z band that excludes the extreme
///    front/back `z_exclude_fraction` of the body.
/// 3. Sort each side by Z and pick, for `pairs_per_side` evenly spaced
///    target Zs, the nearest candidate by binary search.
/// 4. Flatten Y to 0 so the attachment ring sits on the body equator.
///
/// A side with no candidates (degenerate tessellation) gets synthesized
/// points at `±fallback_x_offset` spanning the Z band, so the result always
/// holds exactly `2 × pairs_per_side` finite points, ordered
/// `[L0, R0, L1, R1, …]`.
pub fn attachment_points(vertices: &[Point3<f32>], config: &AttachConfig) -> Vec<Point3<f32>> {
    let k = config.pairs_per_side;

    let (z_lo, z_hi) = z_band(vertices, config.z_exclude_fraction);
    let (mut left, mut right) = partition_sides(vertices, config, z_lo, z_hi);

    let by_z = |a: &Point3<f32>, b: &Point3<f32>| a.z.total_cmp(&b.z);
    left.sort_by(by_z);
    right.sort_by(by_z);

    if left.is_empty() {
        log::warn!("no left-side attachment candidates, synthesizing fallback points");
        left = fallback_side(-config.fallback_x_offset, z_lo, z_hi, k);
    }
    if right.is_empty() {
        log::warn!("no right-side attachment candidates, synthesizing fallback points");
        right = fallback_side(config.fallback_x_offset, z_lo, z_hi, k);
    }

    let mut points = Vec::with_capacity(2 * k);
    for i in 0..k {
        let t = if k > 1 { i as f32 / (k - 1) as f32 } else { 0.5 };
        let left_pick = nearest_by_z(&left, lerp(left[0].z, left[left.len() - 1].z, t));
        let right_pick = nearest_by_z(&right, lerp(right[0].z, right[right.len() - 1].z, t));
        points.push(Point3::new(left_pick.x, 0.0, left_pick.z));
        points.push(Point3::new(right_pick.x, 0.0, right_pick.z));
    }
    points
}

/// Single reference anchor on the body: the front-most vertex (max Z).
///
/// Not consumed by the IK core, but shares the geometry collaborator with
/// the attachment filter. Returns the origin for an empty cloud.
pub fn anchor_point(vertices: &[Point3<f32>]) -> Point3<f32> {
    vertices
        .iter()
        .copied()
        .max_by(|a, b| a.z.total_cmp(&b.z))
        .unwrap_or_else(Point3::origin)
}

/// Z band that excludes the extreme front/back fraction of the body.
/// Defaults to [-1, 1] for an empty cloud so fallback points stay bounded;
/// a cloud with no Z extent gets a unit band centered on its Z so fallback
/// points stay on the body.
fn z_band(vertices: &[Point3<f32>], exclude_fraction: f32) -> (f32, f32) {
    let mut min_z = f32::MAX;
    let mut max_z = f32::MIN;
    for vertex in vertices {
        min_z = min_z.min(vertex.z);
        max_z = max_z.max(vertex.z);
    }
    if vertices.is_empty() {
        return (-1.0, 1.0);
    }
    if min_z >= max_z {
        return (min_z - 1.0, min_z + 1.0);
    }
    let margin = (max_z - min_z) * exclude_fraction;
    (min_z + margin, max_z - margin)
}

fn partition_sides(
    vertices: &[Point3<f32>],
    config: &AttachConfig,
    z_lo: f32,
    z_hi: f32,
) -> (Vec<Point3<f32>>, Vec<Point3<f32>>) {
    let mut min_x = f32::MAX;
    let mut max_x = f32::MIN;
    for vertex in vertices {
        min_x = min_x.min(vertex.x);
        max_x = max_x.max(vertex.x);
    }

    let center_x = (min_x + max_x) / 2.0;
    let left_threshold = center_x + (min_x - center_x) * config.inward_fraction;
    let right_threshold = center_x + (max_x - center_x) * config.inward_fraction;

    let mut left = Vec::new();
    let mut right = Vec::new();
    for &vertex in vertices {
        if vertex.z < z_lo || vertex.z > z_hi {
            continue;
        }
        if vertex.x < left_threshold {
            left.push(vertex);
        } else if vertex.x > right_threshold {
            right.push(vertex);
        }
    }
    (left, right)
}

/// Evenly spaced synthetic side points at a fixed X offset.
fn fallback_side(x: f32, z_lo: f32, z_hi: f32, k: usize) -> Vec<Point3<f32>> {
    (0..k)
        .map(|i| {
            let t = if k > 1 { i as f32 / (k - 1) as f32 } else { 0.5 };
            Point3::new(x, 0.0, lerp(z_lo, z_hi, t))
        })
        .collect()
}

/// Nearest point by Z in a Z-sorted slice, via binary search.
fn nearest_by_z(sorted: &[Point3<f32>], z: f32) -> Point3<f32> {
    debug_assert!(!sorted.is_empty());
    let idx = sorted.partition_point(|p| p.z < z);
    let after = sorted.get(idx);
    let before = idx.checked_sub(1).and_then(|i| sorted.get(i));
    match (before, after) {
        (Some(b), Some(a)) => {
            if (z - b.z).abs() <= (a.z - z).abs() {
                *b
            } else {
                *a
            }
        }
        (Some(b), None) => *b,
        (None, Some(a)) => *a,
        (None, None) => unreachable!("nearest_by_z on empty slice"),
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

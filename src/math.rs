use glam::{Vec2, Vec3};

use crate::element::VH;

/// Compute the normal of a polygon using Newell's method. The points are
/// expected in boundary order. Returns zero for fewer than three points.
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    if points.len() < 3 {
        // Guard against degenerate cases.
        return Vec3::ZERO;
    }
    let n = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .fold(Vec3::ZERO, |n, (pc, pn)| {
            let (a, b) = (*pc - *pn, *pc + *pn);
            n + Vec3::new(a.y * b.z, a.z * b.x, a.x * b.y)
        });
    n.normalize_or_zero()
}

/// Unnormalized normal of a triangle. Its length is twice the area.
pub fn triangle_cross(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

pub fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    0.5 * triangle_cross(a, b, c).length()
}

/// Normalized sum of the triangle normals of a flat index list. Unlike
/// Newell's method this does not care about the order of the vertices.
pub fn triangles_normal(positions: &[Vec3], indices: &[VH]) -> Vec3 {
    indices
        .chunks_exact(3)
        .fold(Vec3::ZERO, |n, t| {
            n + triangle_cross(
                positions[t[0].slot()],
                positions[t[1].slot()],
                positions[t[2].slot()],
            )
        })
        .normalize_or_zero()
}

/// Same as [`triangles_normal`] over local triangles of a point list.
pub fn local_triangles_normal(points: &[Vec3], tris: &[[u32; 3]]) -> Vec3 {
    tris.iter()
        .fold(Vec3::ZERO, |n, t| {
            n + triangle_cross(
                points[t[0] as usize],
                points[t[1] as usize],
                points[t[2] as usize],
            )
        })
        .normalize_or_zero()
}

pub fn centroid(points: impl Iterator<Item = Vec3>) -> Vec3 {
    let (sum, count) = points.fold((Vec3::ZERO, 0usize), |(s, c), p| (s + p, c + 1));
    if count == 0 {
        Vec3::ZERO
    } else {
        sum / count as f32
    }
}

pub fn centroid_2d(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().fold(Vec2::ZERO, |s, p| s + *p) / points.len() as f32
}

/**
 * Project points onto the plane with the given normal. The 2D frame is a
 * right handed basis `(u, v)` with `u x v == normal`, so counter clockwise
 * polygons in 2D correspond to polygons wound around `normal` in 3D.
 */
pub fn project_to_plane(points: &[Vec3], normal: Vec3) -> Vec<Vec2> {
    let normal = normal.normalize_or_zero();
    let (u, v) = if normal == Vec3::ZERO {
        (Vec3::X, Vec3::Y)
    } else {
        normal.any_orthonormal_pair()
    };
    // any_orthonormal_pair gives u x v == normal.
    points.iter().map(|p| Vec2::new(p.dot(u), p.dot(v))).collect()
}

/// Twice the signed area of a 2D polygon. Positive when counter clockwise.
pub fn signed_area_2d(points: &[Vec2]) -> f32 {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum()
}

/// Intersection point of the segments `a0-a1` and `b0-b1`, if they cross.
/// Parallel segments never intersect.
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Option<Vec2> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.perp_dot(db);
    if denom.abs() < f32::EPSILON {
        return None;
    }
    let diff = b0 - a0;
    let s = diff.perp_dot(db) / denom;
    let t = diff.perp_dot(da) / denom;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(a0 + da * s)
    } else {
        None
    }
}

/// Counter clockwise angle from `from` to `to` in radians, in `[0, 2 pi)`.
pub fn ccw_angle(from: Vec2, to: Vec2) -> f32 {
    let a = from.perp_dot(to).atan2(from.dot(to));
    if a < 0.0 { a + std::f32::consts::TAU } else { a }
}

/// Strict point in triangle test, with points on the boundary counted as
/// inside.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

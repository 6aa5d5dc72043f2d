/*!
Triangulation of planar point sets that have already been projected to 2D.

The output triangles index into the input slice and are wound counter
clockwise in the 2D frame. Callers that need a specific 3D winding compare the
resulting normal against a reference and reverse the index list.
*/

use glam::Vec2;

use crate::{error::Error, math};

/// Cross products smaller than this are treated as collinear.
const COLLINEAR_EPS: f32 = 1e-9;

/// Relative distance within which a point counts as lying on a segment.
const ON_EDGE_EPS: f32 = 1e-5;

/**
 * Triangulate a polygon given in boundary order, either clockwise or counter
 * clockwise, using ear clipping. Collinear vertices are allowed and get
 * absorbed into neighbouring triangles. Triangles with zero area are dropped.
 */
pub fn triangulate_polygon(points: &[Vec2]) -> Result<Vec<[u32; 3]>, Error> {
    if points.len() < 3 {
        return Err(Error::TriangulationFailed(points.len()));
    }
    let mut ring: Vec<u32> = (0..points.len() as u32).collect();
    if math::signed_area_2d(points) < 0.0 {
        ring.reverse();
    }
    let pos = |i: u32| points[i as usize];
    let mut tris: Vec<[u32; 3]> = Vec::with_capacity(points.len() - 2);
    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| {
            let (a, b, c) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let (pa, pb, pc) = (pos(a), pos(b), pos(c));
            if (pb - pa).perp_dot(pc - pb) <= COLLINEAR_EPS {
                // Reflex or flat corner.
                return false;
            }
            !ring.iter().any(|&o| {
                o != a
                    && o != b
                    && o != c
                    && pos(o) != pa
                    && pos(o) != pb
                    && pos(o) != pc
                    && math::point_in_triangle(pos(o), pa, pb, pc)
            })
        });
        let Some(i) = ear else {
            return Err(Error::TriangulationFailed(points.len()));
        };
        tris.push([ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
        ring.remove(i);
    }
    tris.push([ring[0], ring[1], ring[2]]);
    tris.retain(|t| {
        let (a, b, c) = (pos(t[0]), pos(t[1]), pos(t[2]));
        (b - a).perp_dot(c - a).abs() > COLLINEAR_EPS
    });
    if tris.is_empty() {
        return Err(Error::TriangulationFailed(points.len()));
    }
    Ok(tris)
}

/**
 * Triangulate an unordered set of points that form a star shaped polygon
 * around their centroid, such as the vertices of a convex face plus points on
 * its edges. The points are sorted by angle around the centroid and the
 * resulting ring is ear clipped.
 */
pub fn triangulate_points(points: &[Vec2]) -> Result<Vec<[u32; 3]>, Error> {
    if points.len() < 3 {
        return Err(Error::TriangulationFailed(points.len()));
    }
    let center = math::centroid_2d(points);
    let mut order: Vec<u32> = (0..points.len() as u32).collect();
    order.sort_by(|&a, &b| {
        let (da, db) = (points[a as usize] - center, points[b as usize] - center);
        da.y.atan2(da.x)
            .total_cmp(&db.y.atan2(db.x))
            .then(da.length_squared().total_cmp(&db.length_squared()))
    });
    let sorted: Vec<Vec2> = order.iter().map(|i| points[*i as usize]).collect();
    let tris = triangulate_polygon(&sorted)?;
    Ok(tris
        .into_iter()
        .map(|t| [order[t[0] as usize], order[t[1] as usize], order[t[2] as usize]])
        .collect())
}

/// Flatten local triangles, swapping winding when `flip` is set.
pub fn flatten(tris: &[[u32; 3]], flip: bool) -> Vec<u32> {
    tris.iter()
        .flat_map(|t| if flip { [t[2], t[1], t[0]] } else { *t })
        .collect()
}

/// Whether `p` lies on the segment `a-b`, away from its end points.
fn on_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    let len2 = d.length_squared();
    if len2 <= COLLINEAR_EPS {
        return false;
    }
    let t = (p - a).dot(d) / len2;
    d.perp_dot(p - a).abs() <= ON_EDGE_EPS * len2 && t > ON_EDGE_EPS && t < 1.0 - ON_EDGE_EPS
}

/**
 * Insert points into an existing triangulation of `points`. The triangles
 * refer to `points`, and so do the indices in `new`.
 *
 * A point lying on an edge splits every triangle using that edge in two, a
 * point inside a triangle splits it in three. Either way the winding of the
 * triangles is preserved. Fails on points outside the triangulation or on
 * top of one of its vertices.
 */
pub fn insert_points(
    points: &[Vec2],
    tris: &mut Vec<[u32; 3]>,
    new: impl IntoIterator<Item = u32>,
) -> Result<(), Error> {
    let pos = |i: u32| points[i as usize];
    for i in new {
        let p = pos(i);
        if tris.iter().flatten().any(|v| pos(*v) == p) {
            return Err(Error::PointOutsideFace(i as usize));
        }
        let on_edge = tris
            .iter()
            .flat_map(|t| (0..3).map(move |k| (t[k], t[(k + 1) % 3])))
            .find(|&(a, b)| on_segment(p, pos(a), pos(b)));
        if let Some((a, b)) = on_edge {
            let mut split: Vec<[u32; 3]> = Vec::new();
            tris.retain(|t| {
                let found = (0..3).find(|&k| {
                    let (x, y) = (t[k], t[(k + 1) % 3]);
                    (x == a && y == b) || (x == b && y == a)
                });
                match found {
                    Some(k) => {
                        let (x, y, z) = (t[k], t[(k + 1) % 3], t[(k + 2) % 3]);
                        split.push([x, i, z]);
                        split.push([i, y, z]);
                        false
                    }
                    None => true,
                }
            });
            tris.extend(split);
            continue;
        }
        let Some(ti) = tris
            .iter()
            .position(|t| math::point_in_triangle(p, pos(t[0]), pos(t[1]), pos(t[2])))
        else {
            return Err(Error::PointOutsideFace(i as usize));
        };
        let [a, b, c] = tris.swap_remove(ti);
        tris.extend([[a, b, i], [b, c, i], [c, a, i]]);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use arrayvec::ArrayVec;
    use glam::vec2;

    use super::*;
    use crate::macros::assert_f32_eq;

    fn area(points: &[Vec2], tris: &[[u32; 3]]) -> f32 {
        tris.iter()
            .map(|t| {
                let (a, b, c) = (
                    points[t[0] as usize],
                    points[t[1] as usize],
                    points[t[2] as usize],
                );
                0.5 * (b - a).perp_dot(c - a)
            })
            .sum()
    }

    #[test]
    fn t_square() {
        let pts = [
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ];
        let tris = triangulate_polygon(&pts).expect("Unable to triangulate");
        assert_eq!(tris.len(), 2);
        assert_f32_eq!(area(&pts, &tris), 1.0);
    }

    #[test]
    fn t_clockwise_input_gives_ccw_triangles() {
        let pts = [
            vec2(0.0, 0.0),
            vec2(0.0, 1.0),
            vec2(1.0, 1.0),
            vec2(1.0, 0.0),
        ];
        let tris = triangulate_polygon(&pts).expect("Unable to triangulate");
        assert_f32_eq!(area(&pts, &tris), 1.0);
    }

    #[test]
    fn t_concave_polygon() {
        // L shape.
        let pts = [
            vec2(0.0, 0.0),
            vec2(2.0, 0.0),
            vec2(2.0, 1.0),
            vec2(1.0, 1.0),
            vec2(1.0, 2.0),
            vec2(0.0, 2.0),
        ];
        let tris = triangulate_polygon(&pts).expect("Unable to triangulate");
        assert_eq!(tris.len(), 4);
        assert_f32_eq!(area(&pts, &tris), 3.0, 1e-6);
    }

    #[test]
    fn t_unordered_points_with_edge_midpoint() {
        let pts = [
            vec2(1.0, 1.0),
            vec2(0.0, 0.0),
            vec2(0.5, 0.0),
            vec2(0.0, 1.0),
            vec2(1.0, 0.0),
        ];
        let tris = triangulate_points(&pts).expect("Unable to triangulate");
        assert_eq!(tris.len(), 3);
        assert_f32_eq!(area(&pts, &tris), 1.0, 1e-6);
        let used: ArrayVec<u32, 5> = (0..5u32)
            .filter(|i| tris.iter().any(|t| t.contains(i)))
            .collect();
        assert_eq!(used.len(), 5);
    }

    #[test]
    fn t_degenerate_input() {
        assert!(triangulate_points(&[vec2(0.0, 0.0), vec2(1.0, 0.0)]).is_err());
        let line = [vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(2.0, 0.0)];
        assert!(triangulate_polygon(&line).is_err());
    }

    #[test]
    fn t_insert_points() {
        let pts = [
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
            vec2(0.5, 0.5),
            vec2(0.5, 0.0),
            vec2(0.25, 0.5),
        ];
        let mut tris = vec![[0, 1, 2], [0, 2, 3]];
        // Centre lies on the diagonal, splitting both triangles.
        insert_points(&pts, &mut tris, [4]).expect("Unable to insert");
        assert_eq!(tris.len(), 4);
        // Boundary midpoint splits one triangle.
        insert_points(&pts, &mut tris, [5]).expect("Unable to insert");
        assert_eq!(tris.len(), 5);
        // Strictly interior point splits one triangle in three.
        insert_points(&pts, &mut tris, [6]).expect("Unable to insert");
        assert_eq!(tris.len(), 7);
        assert_f32_eq!(area(&pts, &tris), 1.0, 1e-6);
        assert!(tris.iter().all(|t| area(&pts, &[*t]) > 0.0));
    }

    #[test]
    fn t_insert_points_outside() {
        let pts = [
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(0.0, 1.0),
            vec2(2.0, 2.0),
        ];
        let mut tris = vec![[0, 1, 2]];
        assert!(insert_points(&pts, &mut tris, [3]).is_err());
        assert!(insert_points(&pts, &mut tris, [0]).is_err());
        assert_eq!(tris, vec![[0, 1, 2]]);
    }

    #[test]
    fn t_flatten_flip() {
        assert_eq!(flatten(&[[0, 1, 2]], true), vec![2, 1, 0]);
        assert_eq!(flatten(&[[0, 1, 2]], false), vec![0, 1, 2]);
    }
}

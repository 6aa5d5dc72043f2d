use glam::{Vec3, vec3};

use crate::{error::Error, mesh::EditMesh};

/// Corners of the unit cube centred at the origin.
///
///  ```text
///       7-----------6
///      /|          /|
///     / |         / |
///    4-----------5  |
///    |  |        |  |
///    |  3--------|--2
///    | /         | /
///    |/          |/
///    0-----------1
///  ```
pub const VERTICES_CUBE: [Vec3; 8] = [
    vec3(-0.5, -0.5, 0.5),
    vec3(0.5, -0.5, 0.5),
    vec3(0.5, -0.5, -0.5),
    vec3(-0.5, -0.5, -0.5),
    vec3(-0.5, 0.5, 0.5),
    vec3(0.5, 0.5, 0.5),
    vec3(0.5, 0.5, -0.5),
    vec3(-0.5, 0.5, -0.5),
];

/// Corners of the six cube quads, four per face, in the point order expected
/// by [`EditMesh::from_points`].
pub const TRIANGLES_CUBE: [usize; 24] = [
    0, 1, 4, 5, 1, 2, 5, 6, 2, 3, 6, 7, 3, 0, 7, 4, 4, 5, 7, 6, 3, 2, 0, 1,
];

impl EditMesh {
    /// Unit cube with 24 vertex slots, 6 quads and 8 shared groups.
    pub fn unit_cube() -> Result<Self, Error> {
        let points: Vec<Vec3> = TRIANGLES_CUBE.iter().map(|i| VERTICES_CUBE[*i]).collect();
        Self::from_points(&points)
    }

    /// Single quad in the XZ plane facing +Y, centred at the origin.
    pub fn plane(width: f32, depth: f32) -> Result<Self, Error> {
        let (x, z) = (0.5 * width, 0.5 * depth);
        Self::from_points(&[
            vec3(-x, 0.0, z),
            vec3(x, 0.0, z),
            vec3(-x, 0.0, -z),
            vec3(x, 0.0, -z),
        ])
    }

    /// Grid of `nx` by `nz` quads in the XZ plane facing +Y.
    pub fn grid(nx: usize, nz: usize, size: f32) -> Result<Self, Error> {
        let mut points = Vec::with_capacity(nx * nz * 4);
        for i in 0..nx {
            for j in 0..nz {
                let (x0, x1) = (i as f32 * size, (i + 1) as f32 * size);
                let (z0, z1) = (j as f32 * size, (j + 1) as f32 * size);
                points.extend([
                    vec3(x0, 0.0, z1),
                    vec3(x1, 0.0, z1),
                    vec3(x0, 0.0, z0),
                    vec3(x1, 0.0, z0),
                ]);
            }
        }
        Self::from_points(&points)
    }
}

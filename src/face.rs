use glam::{Vec2, Vec3};

use crate::{
    edge::Edge,
    element::{Handle, VH},
    error::Error,
    math,
};

/// Smoothing group meaning "no smoothing".
pub const SMOOTHING_NONE: u32 = 0;
/// Range of smoothing groups whose faces share averaged vertex normals.
pub const SMOOTH_RANGE: std::ops::RangeInclusive<u32> = 1..=24;
/// Range of smoothing groups that are explicitly hard.
pub const HARD_RANGE: std::ops::RangeInclusive<u32> = 25..=42;

/// Opaque material reference. Faces with the same material end up in the
/// same submesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MaterialId(pub u32);

/// 8-bit per channel RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color32 {
    pub const WHITE: Color32 = Color32::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color32 { r, g, b, a }
    }
}

impl Default for Color32 {
    fn default() -> Self {
        Color32::WHITE
    }
}

/// Texture projection parameters. The kernel only copies these around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvSettings {
    pub offset: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub world_space: bool,
    pub flip_u: bool,
    pub flip_v: bool,
}

impl Default for UvSettings {
    fn default() -> Self {
        UvSettings {
            offset: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            world_space: false,
            flip_u: false,
            flip_v: false,
        }
    }
}

/// Attributes a face carries besides its triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAttributes {
    pub material: MaterialId,
    pub uv: UvSettings,
    pub smoothing_group: u32,
    pub texture_group: Option<u32>,
    pub color: Color32,
}

impl Default for FaceAttributes {
    fn default() -> Self {
        FaceAttributes {
            material: MaterialId::default(),
            uv: UvSettings::default(),
            smoothing_group: SMOOTHING_NONE,
            texture_group: None,
            color: Color32::WHITE,
        }
    }
}

/**
 * A polygon stored as a flat triangle list over vertex slots.
 *
 * The distinct slots and the perimeter edges are cached. The caches are only
 * refreshed by [`Face::rebuild_caches`], which every mutating method of the
 * face calls before returning.
 */
#[derive(Debug, Clone)]
pub struct Face {
    indices: Vec<VH>,
    colors: Vec<Color32>,
    pub material: MaterialId,
    pub uv: UvSettings,
    pub smoothing_group: u32,
    pub texture_group: Option<u32>,
    distinct: Vec<VH>,
    edges: Vec<Edge>,
}

impl Face {
    /// Create a face with default attributes.
    pub fn new(indices: Vec<VH>) -> Self {
        Self::with_attributes(indices, &FaceAttributes::default())
    }

    pub fn from_u32(indices: &[u32]) -> Self {
        Self::new(indices.iter().map(VH::from).collect())
    }

    pub fn with_attributes(indices: Vec<VH>, attr: &FaceAttributes) -> Self {
        let colors = vec![attr.color; indices.len()];
        let mut face = Face {
            indices,
            colors,
            material: attr.material,
            uv: attr.uv,
            smoothing_group: attr.smoothing_group,
            texture_group: attr.texture_group,
            distinct: Vec::new(),
            edges: Vec::new(),
        };
        face.rebuild_caches();
        face
    }

    /// Snapshot of the attributes, used to stamp faces derived from this one.
    pub fn attributes(&self) -> FaceAttributes {
        FaceAttributes {
            material: self.material,
            uv: self.uv,
            smoothing_group: self.smoothing_group,
            texture_group: self.texture_group,
            color: self.color(),
        }
    }

    pub fn indices(&self) -> &[VH] {
        &self.indices
    }

    /// Triangles of this face.
    pub fn triangles(&self) -> impl Iterator<Item = [VH; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Slots used by this face, each once, in order of first appearance.
    pub fn distinct_indices(&self) -> &[VH] {
        &self.distinct
    }

    /// Perimeter edges, wound in the direction of the triangles.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Colour of the first index, or white for an empty face.
    pub fn color(&self) -> Color32 {
        self.colors.first().copied().unwrap_or(Color32::WHITE)
    }

    /// Per-index colours, parallel to [`Face::indices`].
    pub fn colors(&self) -> &[Color32] {
        &self.colors
    }

    pub fn set_color(&mut self, color: Color32) {
        self.colors.fill(color);
    }

    pub fn set_colors(&mut self, colors: &[Color32]) -> Result<(), Error> {
        if colors.len() != self.indices.len() {
            return Err(Error::MismatchedArrayLengths(
                colors.len(),
                self.indices.len(),
            ));
        }
        self.colors.copy_from_slice(colors);
        Ok(())
    }

    /// Replace the triangles, keeping the attributes.
    pub fn set_indices(&mut self, indices: Vec<VH>) {
        let color = self.color();
        self.colors = vec![color; indices.len()];
        self.indices = indices;
        self.rebuild_caches();
    }

    /// Recompute the distinct slot and perimeter edge caches.
    pub fn rebuild_caches(&mut self) {
        self.distinct.clear();
        for v in &self.indices {
            if !self.distinct.contains(v) {
                self.distinct.push(*v);
            }
        }
        self.edges = Edge::perimeter_of(&self.indices);
    }

    /// Smallest slot referenced by this face.
    pub fn smallest_index(&self) -> Option<VH> {
        self.indices.iter().min().copied()
    }

    /// Shift all indices so the smallest becomes zero.
    pub fn shift_indices_to_zero(&mut self) {
        if let Some(min) = self.smallest_index() {
            let min = min.index();
            for v in self.indices.iter_mut() {
                *v = VH::from(v.index() - min);
            }
            self.rebuild_caches();
        }
    }

    pub fn shift_indices(&mut self, offset: u32) {
        for v in self.indices.iter_mut() {
            *v = v.offset(offset);
        }
        self.rebuild_caches();
    }

    /// Apply `map` to every index.
    pub fn remap_indices(&mut self, map: impl Fn(VH) -> VH) {
        for v in self.indices.iter_mut() {
            *v = map(*v);
        }
        self.rebuild_caches();
    }

    /// Flip the winding of every triangle.
    pub fn reverse(&mut self) {
        self.indices.reverse();
        self.colors.reverse();
        self.rebuild_caches();
    }

    /// Keep only the triangles for which `keep` returns true.
    pub fn retain_triangles(&mut self, mut keep: impl FnMut([VH; 3]) -> bool) {
        let mut indices = Vec::with_capacity(self.indices.len());
        let mut colors = Vec::with_capacity(self.colors.len());
        for (t, c) in self.indices.chunks_exact(3).zip(self.colors.chunks_exact(3)) {
            if keep([t[0], t[1], t[2]]) {
                indices.extend_from_slice(t);
                colors.extend_from_slice(c);
            }
        }
        self.indices = indices;
        self.colors = colors;
        self.rebuild_caches();
    }

    /// A face needs at least one triangle over three distinct slots.
    pub fn is_valid(&self) -> bool {
        self.indices.len() > 2 && self.indices.len() % 3 == 0 && self.distinct.len() >= 3
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidFaceIndices {
                count: self.indices.len(),
                distinct: self.distinct.len(),
            })
        }
    }

    /// Check if the face contains the triangle in any rotation.
    pub fn contains_triangle(&self, tri: [VH; 3]) -> bool {
        self.triangles().any(|t| {
            (0..3).any(|r| t[r] == tri[0] && t[(r + 1) % 3] == tri[1] && t[(r + 2) % 3] == tri[2])
                || (0..3).any(|r| {
                    t[r] == tri[0] && t[(r + 2) % 3] == tri[1] && t[(r + 1) % 3] == tri[2]
                })
        })
    }

    /// Every triangle of this face appears in `other`, ignoring winding.
    pub fn same_triangles(&self, other: &Face) -> bool {
        self.triangles().all(|t| other.contains_triangle(t))
    }

    /// Area weighted normal over the triangles of the face.
    pub fn normal(&self, positions: &[Vec3]) -> Vec3 {
        math::triangles_normal(positions, &self.indices)
    }

    /// Average of the distinct vertex positions.
    pub fn center(&self, positions: &[Vec3]) -> Vec3 {
        math::centroid(self.distinct.iter().map(|v| positions[v.slot()]))
    }

    /// Positions of the distinct slots.
    pub fn distinct_positions(&self, positions: &[Vec3]) -> Vec<Vec3> {
        self.distinct.iter().map(|v| positions[v.slot()]).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn quad() -> Face {
        Face::from_u32(&[0, 1, 2, 1, 3, 2])
    }

    #[test]
    fn t_caches() {
        let face = quad();
        assert!(face.is_valid());
        assert_eq!(face.distinct_indices().len(), 4);
        assert_eq!(face.edges().len(), 4);
        assert_eq!(face.num_triangles(), 2);
    }

    #[test]
    fn t_shift_indices() {
        let mut face = Face::from_u32(&[4, 5, 6]);
        face.shift_indices_to_zero();
        assert_eq!(face.indices(), &[VH::from(0u32), VH::from(1u32), VH::from(2u32)]);
        face.shift_indices(10);
        assert_eq!(face.smallest_index(), Some(VH::from(10u32)));
        assert!(face.edges().contains(&Edge::new(10u32, 12u32)));
    }

    #[test]
    fn t_invalid_faces() {
        assert!(!Face::from_u32(&[0, 1]).is_valid());
        assert!(!Face::from_u32(&[0, 1, 1]).is_valid());
        assert!(!Face::from_u32(&[0, 1, 2, 3]).is_valid());
        assert!(Face::from_u32(&[0, 1, 1]).validate().is_err());
    }

    #[test]
    fn t_triangle_equality_ignores_winding() {
        let a = quad();
        let mut b = quad();
        b.reverse();
        assert!(a.same_triangles(&b));
        assert!(b.same_triangles(&a));
        let c = Face::from_u32(&[0, 1, 2]);
        assert!(c.same_triangles(&a));
        assert!(!a.same_triangles(&c));
    }

    #[test]
    fn t_retain_triangles() {
        let mut face = quad();
        face.set_color(Color32::new(255, 0, 0, 255));
        face.retain_triangles(|t| t[0] != VH::from(1u32));
        assert_eq!(face.num_triangles(), 1);
        assert_eq!(face.colors().len(), 3);
        assert_eq!(face.color(), Color32::new(255, 0, 0, 255));
    }
}

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use crate::{
    config::EditConfig,
    element::{FH, GH, Handle, VH},
    error::Error,
    face::{Color32, Face, FaceAttributes, MaterialId, SMOOTH_RANGE},
    math,
    shared::{SharedHint, SharedIndices},
};

/// What a mutation changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshEvent {
    /// Faces, vertex slots or shared groups changed.
    TopologyChanged,
    /// Only vertex positions changed.
    VerticesMoved,
    /// Only face attributes changed.
    AttributesChanged,
}

/**
 * Receives a notification at the end of every public mutation of an
 * [`EditMesh`], after all caches are rebuilt.
 */
pub trait MeshObserver {
    fn on_event(&mut self, mesh: &EditMesh, event: MeshEvent);
}

/// A face with its own positions and shared hints, ready to be appended.
/// The face indices are local to `positions`.
#[derive(Debug, Clone)]
pub struct FaceInsert {
    pub positions: Vec<Vec3>,
    pub face: Face,
    pub hints: Vec<SharedHint>,
}

/**
 * Polygon mesh made of faces over vertex slots, with a registry grouping
 * coincident slots.
 *
 * Faces never share slots directly. Adjacent faces each own their slots and
 * the [`SharedIndices`] registry records which slots sit at the same
 * position. Topological queries therefore go through the registry.
 */
pub struct EditMesh {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    shared: SharedIndices,
    unique: Vec<VH>,
    config: EditConfig,
    observers: Vec<Box<dyn MeshObserver>>,
}

impl Default for EditMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Observers are not cloned.
impl Clone for EditMesh {
    fn clone(&self) -> Self {
        EditMesh {
            vertices: self.vertices.clone(),
            faces: self.faces.clone(),
            shared: self.shared.clone(),
            unique: self.unique.clone(),
            config: self.config.clone(),
            observers: Vec::new(),
        }
    }
}

impl std::fmt::Debug for EditMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditMesh")
            .field("vertices", &self.vertices.len())
            .field("faces", &self.faces.len())
            .field("shared", &self.shared.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl EditMesh {
    pub fn new() -> Self {
        EditMesh {
            vertices: Vec::new(),
            faces: Vec::new(),
            shared: SharedIndices::new(),
            unique: Vec::new(),
            config: EditConfig::default(),
            observers: Vec::new(),
        }
    }

    /// Create a mesh from all of its parts. The result is checked for
    /// consistency.
    pub fn from_parts(
        vertices: Vec<Vec3>,
        faces: Vec<Face>,
        shared: SharedIndices,
    ) -> Result<Self, Error> {
        let mut mesh = EditMesh {
            vertices,
            faces,
            shared,
            ..Self::new()
        };
        mesh.rebuild_caches();
        mesh.check_topology()?;
        Ok(mesh)
    }

    /// Create a mesh, grouping slots with exactly equal positions.
    pub fn from_vertices_faces(vertices: Vec<Vec3>, faces: Vec<Face>) -> Result<Self, Error> {
        let shared = SharedIndices::from_positions(&vertices, None);
        Self::from_parts(vertices, faces, shared)
    }

    /**
     * Create a mesh of quads from points in groups of four. Each group
     * becomes a face with the triangles `0, 1, 2` and `1, 3, 2`.
     */
    pub fn from_points(points: &[Vec3]) -> Result<Self, Error> {
        if points.len() % 4 != 0 {
            return Err(Error::IncorrectNumberOfPoints(points.len()));
        }
        let faces = (0..points.len() as u32)
            .step_by(4)
            .map(|i| Face::from_u32(&[i, i + 1, i + 2, i + 1, i + 3, i + 2]))
            .collect();
        Self::from_vertices_faces(points.to_vec(), faces)
    }

    pub fn with_config(mut self, config: EditConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditConfig {
        &mut self.config
    }

    pub fn add_observer(&mut self, observer: Box<dyn MeshObserver>) {
        self.observers.push(observer);
    }

    pub fn clear_observers(&mut self) {
        self.observers.clear();
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face_handles(&self) -> impl Iterator<Item = FH> + use<> {
        (0..self.faces.len() as u32).map(FH::from)
    }

    pub fn face(&self, f: FH) -> Result<&Face, Error> {
        self.faces.get(f.slot()).ok_or(Error::InvalidFace(f))
    }

    /// Changing the indices through this reference requires a call to
    /// [`EditMesh::rebuild_caches`] afterwards.
    pub(crate) fn face_mut(&mut self, f: FH) -> Result<&mut Face, Error> {
        self.faces.get_mut(f.slot()).ok_or(Error::InvalidFace(f))
    }

    /// Replace the material, UV, smoothing, texture group and colour of a
    /// face. Its triangles are left alone.
    pub fn set_face_attributes(&mut self, f: FH, attr: &FaceAttributes) -> Result<(), Error> {
        let face = self.face_mut(f)?;
        face.material = attr.material;
        face.uv = attr.uv;
        face.smoothing_group = attr.smoothing_group;
        face.texture_group = attr.texture_group;
        face.set_color(attr.color);
        self.notify(MeshEvent::AttributesChanged);
        Ok(())
    }

    pub fn shared(&self) -> &SharedIndices {
        &self.shared
    }

    /// First slot of every shared group.
    pub fn unique_indices(&self) -> &[VH] {
        &self.unique
    }

    pub fn point(&self, v: VH) -> Result<Vec3, Error> {
        self.vertices
            .get(v.slot())
            .copied()
            .ok_or(Error::VertexOutOfBounds(v))
    }

    pub(crate) fn validate_faces(&self, faces: &[FH]) -> Result<(), Error> {
        match faces.iter().find(|f| f.slot() >= self.faces.len()) {
            Some(f) => Err(Error::InvalidFace(*f)),
            None => Ok(()),
        }
    }

    pub(crate) fn validate_slots(&self, slots: &[VH]) -> Result<(), Error> {
        match slots.iter().find(|v| v.slot() >= self.vertices.len()) {
            Some(v) => Err(Error::VertexOutOfBounds(*v)),
            None => Ok(()),
        }
    }

    /// Refresh the per-face caches and the unique index cache.
    pub fn rebuild_caches(&mut self) {
        for face in self.faces.iter_mut() {
            face.rebuild_caches();
        }
        self.unique = self.shared.unique_indices();
    }

    pub(crate) fn notify(&mut self, event: MeshEvent) {
        if self.observers.is_empty() {
            return;
        }
        let mut observers = std::mem::take(&mut self.observers);
        for obs in observers.iter_mut() {
            obs.on_event(self, event);
        }
        self.observers = observers;
    }

    /// Append a face with its own positions. See [`EditMesh::append_faces`].
    pub fn append_face(
        &mut self,
        positions: &[Vec3],
        face: Face,
        hints: &[SharedHint],
    ) -> Result<FH, Error> {
        let mut added = self.append_faces(vec![FaceInsert {
            positions: positions.to_vec(),
            face,
            hints: hints.to_vec(),
        }])?;
        added.pop().ok_or(Error::InvalidFaceIndices {
            count: 0,
            distinct: 0,
        })
    }

    /**
     * Append faces. Each face gets new vertex slots for its positions, its
     * indices are moved into the new slot range, and each slot is registered
     * according to its hint. Batch tags are shared by all faces of one call.
     *
     * Every face is validated before anything is modified.
     */
    pub fn append_faces(&mut self, inserts: Vec<FaceInsert>) -> Result<Vec<FH>, Error> {
        let added = self.insert_faces(inserts)?;
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        Ok(added)
    }

    pub(crate) fn insert_faces(&mut self, inserts: Vec<FaceInsert>) -> Result<Vec<FH>, Error> {
        for ins in inserts.iter() {
            if ins.positions.len() != ins.hints.len() {
                return Err(Error::MismatchedArrayLengths(
                    ins.positions.len(),
                    ins.hints.len(),
                ));
            }
            ins.face.validate()?;
            if let Some(v) = ins
                .face
                .indices()
                .iter()
                .find(|v| v.slot() >= ins.positions.len())
            {
                return Err(Error::FaceIndexOutOfBounds {
                    index: v.index(),
                    count: ins.positions.len(),
                });
            }
            if let Some(g) = ins.hints.iter().find_map(|h| match h {
                SharedHint::Existing(g) if g.slot() >= self.shared.len() => Some(*g),
                _ => None,
            }) {
                return Err(Error::InvalidGroup(g));
            }
        }
        let first = VH::from(self.vertices.len());
        let mut hints: Vec<SharedHint> = Vec::new();
        let mut added = Vec::with_capacity(inserts.len());
        for FaceInsert {
            positions,
            mut face,
            hints: face_hints,
        } in inserts
        {
            face.shift_indices(self.vertices.len() as u32);
            self.vertices.extend_from_slice(&positions);
            hints.extend(face_hints);
            added.push(FH::from(self.faces.len()));
            self.faces.push(face);
        }
        self.shared.append_hinted(first, &hints)?;
        Ok(added)
    }

    pub fn delete_face(&mut self, f: FH) -> Result<Vec<VH>, Error> {
        self.delete_faces(&[f])
    }

    /**
     * Delete faces and every vertex slot that only they referenced. The
     * remaining faces and shared groups are renumbered in a single pass.
     * Returns the removed slots, as indexed before the deletion.
     */
    pub fn delete_faces(&mut self, faces: &[FH]) -> Result<Vec<VH>, Error> {
        self.validate_faces(faces)?;
        let removed = self.remove_faces(faces);
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        Ok(removed)
    }

    pub(crate) fn remove_faces(&mut self, faces: &[FH]) -> Vec<VH> {
        let mut candidates: Vec<VH> = faces
            .iter()
            .filter_map(|f| self.faces.get(f.slot()))
            .flat_map(|f| f.distinct_indices().iter().copied())
            .collect();
        candidates.sort();
        candidates.dedup();
        self.drop_faces_keep_slots(faces);
        let still_used: HashSet<VH> = self
            .faces
            .iter()
            .flat_map(|f| f.distinct_indices().iter().copied())
            .collect();
        candidates.retain(|v| !still_used.contains(v));
        self.remove_slots(&candidates);
        candidates
    }

    /// Remove faces without touching the vertex slots.
    pub(crate) fn drop_faces_keep_slots(&mut self, faces: &[FH]) {
        let doomed: HashSet<FH> = faces.iter().copied().collect();
        let mut index = 0u32;
        self.faces.retain(|_| {
            let keep = !doomed.contains(&FH::from(index));
            index += 1;
            keep
        });
    }

    pub(crate) fn replace_shared(&mut self, shared: SharedIndices) {
        self.shared = shared;
    }

    pub(crate) fn shared_mut(&mut self) -> &mut SharedIndices {
        &mut self.shared
    }

    pub(crate) fn vertices_mut(&mut self) -> &mut [Vec3] {
        &mut self.vertices
    }

    pub(crate) fn faces_mut(&mut self) -> &mut Vec<Face> {
        &mut self.faces
    }

    /// Remove the sorted, unreferenced slots and renumber everything else.
    pub(crate) fn remove_slots(&mut self, removed: &[VH]) {
        if removed.is_empty() {
            return;
        }
        let mut index = 0usize;
        self.vertices.retain(|_| {
            let keep = removed.binary_search(&VH::from(index)).is_err();
            index += 1;
            keep
        });
        for face in self.faces.iter_mut() {
            face.remap_indices(|v| VH::from(v.index() - removed.partition_point(|r| *r < v) as u32));
        }
        self.shared.remove_and_shift(removed);
    }

    /// Remove slots not referenced by any face. Returns the removed slots.
    pub fn remove_unused_vertices(&mut self) -> Vec<VH> {
        let removed = self.drop_unused_slots();
        if !removed.is_empty() {
            self.rebuild_caches();
            self.notify(MeshEvent::TopologyChanged);
        }
        removed
    }

    pub(crate) fn drop_unused_slots(&mut self) -> Vec<VH> {
        let mut used = vec![false; self.vertices.len()];
        for v in self.faces.iter().flat_map(|f| f.indices().iter()) {
            used[v.slot()] = true;
        }
        let removed: Vec<VH> = used
            .iter()
            .enumerate()
            .filter(|(_, u)| !**u)
            .map(|(i, _)| VH::from(i))
            .collect();
        self.remove_slots(&removed);
        removed
    }

    /// Replace all positions. The topology is unchanged.
    pub fn set_vertices(&mut self, positions: Vec<Vec3>) -> Result<(), Error> {
        if positions.len() != self.vertices.len() {
            return Err(Error::MismatchedArrayLengths(
                positions.len(),
                self.vertices.len(),
            ));
        }
        self.vertices = positions;
        self.notify(MeshEvent::VerticesMoved);
        Ok(())
    }

    /// Move every slot in the shared group of `v` to `pos`.
    pub fn set_shared_vertex_position(&mut self, v: VH, pos: Vec3) -> Result<(), Error> {
        self.validate_slots(&[v])?;
        self.move_group(v, pos);
        self.notify(MeshEvent::VerticesMoved);
        Ok(())
    }

    pub(crate) fn move_group(&mut self, v: VH, pos: Vec3) {
        for s in self.shared.slots_sharing(&[v]) {
            self.vertices[s.slot()] = pos;
        }
    }

    /// Move the given slots and everything coincident with them, each once.
    pub fn translate_vertices(&mut self, slots: &[VH], offset: Vec3) -> Result<(), Error> {
        self.validate_slots(slots)?;
        for v in self.shared.slots_sharing(slots) {
            self.vertices[v.slot()] += offset;
        }
        self.notify(MeshEvent::VerticesMoved);
        Ok(())
    }

    /// Flip the winding of the given faces.
    pub fn reverse_winding(&mut self, faces: &[FH]) -> Result<(), Error> {
        self.validate_faces(faces)?;
        let mut faces = faces.to_vec();
        faces.sort();
        faces.dedup();
        for f in faces {
            self.faces[f.slot()].reverse();
        }
        self.notify(MeshEvent::TopologyChanged);
        Ok(())
    }

    /// Detach a face from its neighbours by splitting the shared groups of
    /// its slots.
    pub fn detach_face(&mut self, f: FH) -> Result<(), Error> {
        let slots = self.face(f)?.distinct_indices().to_vec();
        for v in slots {
            self.shared.add(None, v)?;
        }
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        Ok(())
    }

    /// Merge the given slots into one new shared group.
    pub fn merge_shared(&mut self, slots: &[VH]) -> Result<GH, Error> {
        self.validate_slots(slots)?;
        let g = self
            .shared
            .merge(slots)
            .ok_or(Error::InsufficientSelection {
                required: 2,
                found: slots.len(),
            })?;
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        Ok(g)
    }

    /// Smallest texture group at or above `start` (and at least 1) that no
    /// face uses.
    pub fn unused_texture_group(&self, start: u32) -> u32 {
        let used: HashSet<u32> = self.faces.iter().filter_map(|f| f.texture_group).collect();
        let start = start.max(1);
        (start..=start + used.len() as u32)
            .find(|g| !used.contains(g))
            .unwrap_or(start + used.len() as u32 + 1)
    }

    pub fn face_center(&self, f: FH) -> Result<Vec3, Error> {
        Ok(self.face(f)?.center(&self.vertices))
    }

    pub fn face_normal(&self, f: FH) -> Result<Vec3, Error> {
        Ok(self.face(f)?.normal(&self.vertices))
    }

    /// Every slot coincident with any of `slots`.
    pub fn shared_slots_with(&self, slots: &[VH]) -> Vec<VH> {
        self.shared.slots_sharing(slots)
    }

    /// Keep one slot per shared group.
    pub fn remove_duplicate_vertex_indices(&self, slots: &[VH]) -> Vec<VH> {
        let mut seen: HashSet<Option<GH>> = HashSet::new();
        slots
            .iter()
            .filter(|v| {
                let g = self.shared.index_of(**v);
                g.is_none() || seen.insert(g)
            })
            .copied()
            .collect()
    }

    /// Distinct slots of the given faces in order of first appearance.
    pub fn distinct_slots(&self, faces: &[FH]) -> Result<Vec<VH>, Error> {
        self.validate_faces(faces)?;
        let mut out: Vec<VH> = Vec::new();
        let mut seen: HashSet<VH> = HashSet::new();
        for f in faces {
            for v in self.faces[f.slot()].distinct_indices() {
                if seen.insert(*v) {
                    out.push(*v);
                }
            }
        }
        Ok(out)
    }

    /// The face containing the given triangle, in any rotation or winding.
    pub fn face_with_triangle(&self, tri: [VH; 3]) -> Option<FH> {
        self.faces
            .iter()
            .position(|f| f.contains_triangle(tri))
            .map(FH::from)
    }

    /// Flat triangle lists grouped by material, in order of first use.
    pub fn submesh_triangles(&self) -> Vec<(MaterialId, Vec<u32>)> {
        let mut out: Vec<(MaterialId, Vec<u32>)> = Vec::new();
        for face in &self.faces {
            let pos = match out.iter().position(|(m, _)| *m == face.material) {
                Some(pos) => pos,
                None => {
                    out.push((face.material, Vec::new()));
                    out.len() - 1
                }
            };
            out[pos].1.extend(face.indices().iter().map(|v| v.index()));
        }
        out
    }

    /// Axis aligned bounding box of all positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Per slot colours gathered from the faces. Unreferenced slots are white.
    pub fn vertex_colors(&self) -> Vec<Color32> {
        let mut colors = vec![Color32::WHITE; self.vertices.len()];
        for face in &self.faces {
            for (v, c) in face.indices().iter().zip(face.colors()) {
                colors[v.slot()] = *c;
            }
        }
        colors
    }

    /**
     * Per slot normals. Each slot gets the area weighted normal of the
     * triangles using it. Then, inside every smoothing group in the smooth
     * range, slots of the same shared group get their averaged normal.
     */
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for face in &self.faces {
            for t in face.triangles() {
                let n = math::triangle_cross(
                    self.vertices[t[0].slot()],
                    self.vertices[t[1].slot()],
                    self.vertices[t[2].slot()],
                );
                for v in t {
                    normals[v.slot()] += n;
                }
            }
        }
        for n in normals.iter_mut() {
            *n = n.normalize_or_zero();
        }
        let mut smooth: HashMap<(u32, GH), Vec<VH>> = HashMap::new();
        for face in self
            .faces
            .iter()
            .filter(|f| SMOOTH_RANGE.contains(&f.smoothing_group))
        {
            for v in face.distinct_indices() {
                if let Some(g) = self.shared.index_of(*v) {
                    smooth.entry((face.smoothing_group, g)).or_default().push(*v);
                }
            }
        }
        for slots in smooth.values() {
            let avg = slots
                .iter()
                .fold(Vec3::ZERO, |s, v| s + normals[v.slot()])
                .normalize_or_zero();
            for v in slots {
                normals[v.slot()] = avg;
            }
        }
        normals
    }
}

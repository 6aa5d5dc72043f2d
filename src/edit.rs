use glam::{Mat4, Vec3};

use crate::{
    element::{FH, Handle, VH},
    error::Error,
    math,
    mesh::{EditMesh, MeshEvent},
    shared::SharedIndices,
};

impl EditMesh {
    /**
     * Collapse the selected vertices into their centroid and merge them into
     * one shared group. Slots coincident with the selection come along.
     * Triangles that become degenerate are removed, along with slots left
     * unreferenced.
     *
     * Returns a surviving slot of the merged vertex, indexed after the
     * cleanup, or `None` if the merge removed every face touching it.
     */
    pub fn merge_vertices(&mut self, slots: &[VH]) -> Result<Option<VH>, Error> {
        self.validate_slots(slots)?;
        let groups = self.shared().groups_of(slots);
        let distinct = if groups.is_empty() { slots.len() } else { groups.len() };
        if distinct < 2 {
            return Err(Error::InsufficientSelection {
                required: 2,
                found: distinct,
            });
        }
        let unique = self.remove_duplicate_vertex_indices(slots);
        let center = math::centroid(unique.iter().map(|v| self.vertices()[v.slot()]));
        let members = self.shared_slots_with(slots);
        self.shared_mut().merge(&members);
        for v in members.iter() {
            self.vertices_mut()[v.slot()] = center;
        }
        let removed = self.strip_degenerate_triangles();
        self.rebuild_caches();
        let survivor = members
            .iter()
            .rev()
            .find(|v| removed.binary_search(*v).is_err())
            .map(|v| VH::from(v.index() - removed.partition_point(|r| r < v) as u32));
        log::debug!(
            "Merged {} vertices into {:?}, removed {} slots",
            members.len(),
            survivor,
            removed.len()
        );
        self.notify(MeshEvent::TopologyChanged);
        Ok(survivor)
    }

    /**
     * Weld vertices that are closer than `delta`. Every pair of selected
     * slots in different groups within `delta` of each other is moved to its
     * midpoint and their groups are merged. Every slot of the merged group
     * moves with them.
     */
    pub fn weld_vertices(&mut self, slots: &[VH], delta: f32) -> Result<(), Error> {
        self.validate_slots(slots)?;
        let welded = self.weld_slots(slots, delta);
        self.rebuild_caches();
        log::debug!("Welded {welded} vertex pairs");
        self.notify(MeshEvent::TopologyChanged);
        Ok(())
    }

    /// Weld using the configured default distance.
    pub fn weld_vertices_default(&mut self, slots: &[VH]) -> Result<(), Error> {
        let delta = self.config().weld_distance;
        self.weld_vertices(slots, delta)
    }

    /// Returns the number of merged pairs.
    pub(crate) fn weld_slots(&mut self, slots: &[VH], delta: f32) -> usize {
        let mut count = 0;
        for (i, &a) in slots.iter().enumerate() {
            for &b in &slots[i + 1..] {
                if self.shared().coincident(a, b) {
                    continue;
                }
                let (pa, pb) = (self.vertices()[a.slot()], self.vertices()[b.slot()]);
                if pa.distance(pb) < delta {
                    let mid = 0.5 * (pa + pb);
                    let members = self.shared_slots_with(&[a, b]);
                    self.shared_mut().merge(&members);
                    for v in members {
                        self.vertices_mut()[v.slot()] = mid;
                    }
                    count += 1;
                }
            }
        }
        count
    }

    /// Detach every slot coincident with the selection into its own group.
    pub fn split_vertices(&mut self, slots: &[VH]) -> Result<(), Error> {
        self.validate_slots(slots)?;
        self.shared_mut().split(slots);
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        Ok(())
    }

    /**
     * Remove triangles that have two corners in the same shared group, or
     * whose area is at or below the configured minimum. Faces left without
     * triangles are removed, then slots no longer referenced.
     *
     * Returns the removed slots, indexed as before the call.
     */
    pub fn remove_degenerate_triangles(&mut self) -> Vec<VH> {
        let removed = self.strip_degenerate_triangles();
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        removed
    }

    /// Same as [`EditMesh::remove_degenerate_triangles`]. Triangles repeated
    /// across faces are left alone.
    pub fn remove_duplicate_triangles(&mut self) -> Vec<VH> {
        self.remove_degenerate_triangles()
    }

    pub(crate) fn strip_degenerate_triangles(&mut self) -> Vec<VH> {
        let min_area = self.config().min_triangle_area;
        let shared = self.shared().clone();
        let vertices = self.vertices().to_vec();
        let mut emptied: Vec<FH> = Vec::new();
        for (fi, face) in self.faces_mut().iter_mut().enumerate() {
            face.retain_triangles(|t| {
                let collapsed = shared.coincident(t[0], t[1])
                    || shared.coincident(t[0], t[2])
                    || shared.coincident(t[1], t[2]);
                let area = math::triangle_area(
                    vertices[t[0].slot()],
                    vertices[t[1].slot()],
                    vertices[t[2].slot()],
                );
                !collapsed && area > min_area
            });
            if face.num_triangles() == 0 {
                emptied.push(fi.into());
            }
        }
        self.drop_faces_keep_slots(&emptied);
        self.drop_unused_slots()
    }

    /// Concatenate meshes. Vertices, faces and shared groups of later meshes
    /// are offset past those of earlier ones. Nothing is welded.
    pub fn combine(meshes: &[&EditMesh]) -> Result<EditMesh, Error> {
        let items: Vec<(&EditMesh, Mat4)> = meshes.iter().map(|m| (*m, Mat4::IDENTITY)).collect();
        Self::combine_transformed(&items)
    }

    /// Like [`EditMesh::combine`], with every mesh transformed into a common
    /// space first.
    pub fn combine_transformed(items: &[(&EditMesh, Mat4)]) -> Result<EditMesh, Error> {
        let Some((first, _)) = items.first() else {
            return Err(Error::NothingToCombine);
        };
        let mut vertices: Vec<Vec3> = Vec::new();
        let mut faces = Vec::new();
        let mut shared = SharedIndices::new();
        for (mesh, xform) in items {
            let offset = vertices.len() as u32;
            vertices.extend(mesh.vertices().iter().map(|p| xform.transform_point3(*p)));
            faces.extend(mesh.faces().iter().map(|f| {
                let mut f = f.clone();
                f.shift_indices(offset);
                f
            }));
            shared.extend(&mesh.shared().shifted(offset));
        }
        let config = first.config().clone();
        Ok(Self::from_parts(vertices, faces, shared)?.with_config(config))
    }
}

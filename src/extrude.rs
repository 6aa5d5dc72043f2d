use std::collections::HashMap;

use glam::Vec3;

use crate::{
    edge::Edge,
    element::{FH, GH, VH},
    error::Error,
    face::{Face, FaceAttributes, UvSettings},
    mesh::{EditMesh, FaceInsert, MeshEvent},
    shared::{SharedHint, SharedIndices},
};

/// Local triangles of a side quad `[x, y, x', y']` built on a face edge.
const FACE_SIDE_QUAD: [u32; 6] = [0, 1, 2, 1, 3, 2];
/// Local triangles of a quad grown out of a free edge. The winding is the
/// reverse of [`FACE_SIDE_QUAD`] so the new quad continues the surface of the
/// face it grows from.
const EDGE_QUAD: [u32; 6] = [2, 1, 0, 2, 3, 1];

/**
 * Average of the normals of the slots coincident with `v` that are listed in
 * `mask`. When none are, the slots coincident with `v` listed in `fallback`
 * are used instead.
 */
fn masked_normal(
    v: VH,
    shared: &SharedIndices,
    mask: &[VH],
    fallback: &[VH],
    normals: &[Vec3],
) -> Vec3 {
    let group = shared.slots_sharing(&[v]);
    let average = |pool: &[VH]| -> Option<Vec3> {
        let (sum, count) = pool
            .iter()
            .filter(|s| group.binary_search(*s).is_ok())
            .fold((Vec3::ZERO, 0usize), |(n, c), s| (n + normals[s.slot()], c + 1));
        (count > 0).then(|| (sum / count as f32).normalize_or_zero())
    };
    average(mask)
        .or_else(|| average(fallback))
        .unwrap_or(Vec3::ZERO)
}

/// Join the new slots that were grown out of the same original shared group.
fn merge_extruded(shared: &mut SharedIndices, extruded: &[(GH, VH)]) {
    for (i, (gi, vi)) in extruded.iter().enumerate() {
        if let Some((_, vn)) = extruded
            .iter()
            .enumerate()
            .find(|(n, (gn, _))| *n != i && gn == gi)
            .map(|(_, e)| e)
        {
            shared.merge_pair(*vn, *vi);
        }
    }
}

/// Side quad positions `[x, y, x + nx * d, y + ny * d]`.
fn quad_positions(px: Vec3, py: Vec3, nx: Vec3, ny: Vec3, distance: f32) -> Vec<Vec3> {
    vec![px, py, px + nx * distance, py + ny * distance]
}

impl EditMesh {
    /// Extrude faces by the configured distance.
    pub fn extrude(&mut self, faces: &[FH]) -> Result<Vec<FH>, Error> {
        let distance = self.config().extrude_distance;
        self.extrude_faces(faces, distance)
    }

    /**
     * Extrude a set of faces along their vertex normals.
     *
     * A side quad is built on every perimeter edge of the set. The faces
     * themselves are moved by `distance` and welded to the top of the side
     * quads, so the set stays connected to the rest of the mesh only through
     * the new quads. Faces with a texture group get a fresh one.
     *
     * Returns the side faces.
     */
    pub fn extrude_faces(&mut self, faces: &[FH], distance: f32) -> Result<Vec<FH>, Error> {
        let mut faces = faces.to_vec();
        faces.sort();
        faces.dedup();
        if faces.is_empty() {
            return Err(Error::InsufficientSelection {
                required: 1,
                found: 0,
            });
        }
        let perimeter = self.perimeter_edges_with_faces(&faces)?;
        if perimeter.len() < 3 {
            log::warn!(
                "Found {} perimeter edges for {} faces, a closed selection cannot be extruded",
                perimeter.len(),
                faces.len()
            );
            return Err(Error::NoPerimeterEdges);
        }
        let shared = self.shared().clone();
        let normals = self.vertex_normals();
        let mask = Edge::all_slots(&perimeter.iter().map(|(_, e)| *e).collect::<Vec<_>>());
        let selection = self.distinct_slots(&faces)?;
        let norm = |v: VH| masked_normal(v, &shared, &mask, &selection, &normals);

        let base = self.num_vertices() as u32;
        let mut inserts = Vec::with_capacity(perimeter.len());
        let mut extruded: Vec<(GH, VH)> = Vec::with_capacity(perimeter.len() * 2);
        for (i, (f, e)) in perimeter.iter().enumerate() {
            let gx = shared.index_of(e.x).ok_or(Error::UngroupedVertex(e.x))?;
            let gy = shared.index_of(e.y).ok_or(Error::UngroupedVertex(e.y))?;
            let attr = FaceAttributes {
                texture_group: None,
                ..self.face(*f)?.attributes()
            };
            inserts.push(FaceInsert {
                positions: quad_positions(
                    self.point(e.x)?,
                    self.point(e.y)?,
                    norm(e.x),
                    norm(e.y),
                    distance,
                ),
                face: Face::with_attributes(
                    FACE_SIDE_QUAD.iter().map(VH::from).collect(),
                    &attr,
                ),
                hints: vec![
                    SharedHint::Existing(gx),
                    SharedHint::Existing(gy),
                    SharedHint::NewSingleton,
                    SharedHint::NewSingleton,
                ],
            });
            let first = base + 4 * i as u32;
            extruded.push((gx, VH::from(first + 2)));
            extruded.push((gy, VH::from(first + 3)));
        }
        let moved: Vec<(VH, Vec3)> = selection.iter().map(|v| (*v, norm(*v))).collect();
        let sides = self.insert_faces(inserts)?;
        merge_extruded(self.shared_mut(), &extruded);

        let mut remapped: HashMap<u32, u32> = HashMap::new();
        for f in faces.iter() {
            if let Some(tg) = self.faces()[f.slot()].texture_group.filter(|tg| *tg > 0) {
                let fresh = match remapped.get(&tg) {
                    Some(fresh) => *fresh,
                    None => {
                        let fresh = self.unused_texture_group(1);
                        remapped.insert(tg, fresh);
                        fresh
                    }
                };
                self.faces_mut()[f.slot()].texture_group = Some(fresh);
            }
        }
        for (v, n) in moved {
            if let Some(g) = shared.index_of(v) {
                if let Some((_, top)) = extruded.iter().find(|(gx, _)| *gx == g) {
                    self.shared_mut().merge_pair(*top, v);
                }
            }
            self.vertices_mut()[v.slot()] += n * distance;
        }
        self.rebuild_caches();
        log::debug!(
            "Extruded {} faces, added {} side faces",
            faces.len(),
            sides.len()
        );
        self.notify(MeshEvent::TopologyChanged);
        Ok(sides)
    }

    /// Extrude edges by the configured distance and perimeter restriction.
    pub fn extrude_edges_default(&mut self, edges: &[Edge]) -> Result<Vec<Edge>, Error> {
        let distance = self.config().extrude_distance;
        let perimeter_only = self.config().perimeter_edge_extrusion_only;
        self.extrude_edges(edges, distance, perimeter_only)
    }

    /**
     * Grow a quad out of each edge, along the averaged normals of its
     * vertices. With `perimeter_only`, edges shared by two or more faces are
     * skipped. Returns the outer edge of every new quad.
     */
    pub fn extrude_edges(
        &mut self,
        edges: &[Edge],
        distance: f32,
        perimeter_only: bool,
    ) -> Result<Vec<Edge>, Error> {
        let mut valid: Vec<(FH, Edge)> = Vec::with_capacity(edges.len());
        for e in edges {
            let owners = self.faces_on_edge(*e);
            if owners.is_empty() || (perimeter_only && owners.len() > 1) {
                log::debug!("Skipping edge {e} shared by {} faces", owners.len());
                continue;
            }
            let f = owners[0];
            // Use the face's own winding of the edge.
            let own = self.faces()[f.slot()]
                .edges()
                .iter()
                .find(|o| o.eq_shared(e, self.shared()))
                .copied()
                .unwrap_or(*e);
            if !valid.iter().any(|(_, v)| v.eq_shared(&own, self.shared())) {
                valid.push((f, own));
            }
        }
        if valid.is_empty() {
            log::warn!("None of the {} edges can be extruded", edges.len());
            return Err(Error::NoPerimeterEdges);
        }
        let shared = self.shared().clone();
        let normals = self.vertex_normals();
        let mask = Edge::all_slots(&valid.iter().map(|(_, e)| *e).collect::<Vec<_>>());
        let norm = |v: VH| masked_normal(v, &shared, &mask, &[], &normals);

        let base = self.num_vertices() as u32;
        let mut inserts = Vec::with_capacity(valid.len());
        let mut extruded: Vec<(GH, VH)> = Vec::with_capacity(valid.len() * 2);
        let mut outer: Vec<Edge> = Vec::with_capacity(valid.len());
        for (i, (f, e)) in valid.iter().enumerate() {
            let gx = shared.index_of(e.x).ok_or(Error::UngroupedVertex(e.x))?;
            let gy = shared.index_of(e.y).ok_or(Error::UngroupedVertex(e.y))?;
            let src = self.face(*f)?;
            let attr = FaceAttributes {
                material: src.material,
                uv: UvSettings::default(),
                smoothing_group: 0,
                texture_group: None,
                color: src.color(),
            };
            inserts.push(FaceInsert {
                positions: quad_positions(
                    self.point(e.x)?,
                    self.point(e.y)?,
                    norm(e.x),
                    norm(e.y),
                    distance,
                ),
                face: Face::with_attributes(EDGE_QUAD.iter().map(VH::from).collect(), &attr),
                hints: vec![
                    SharedHint::Existing(gx),
                    SharedHint::Existing(gy),
                    SharedHint::NewSingleton,
                    SharedHint::NewSingleton,
                ],
            });
            let first = base + 4 * i as u32;
            outer.push(Edge::new(first + 2, first + 3));
            extruded.push((gx, VH::from(first + 2)));
            extruded.push((gy, VH::from(first + 3)));
        }
        self.insert_faces(inserts)?;
        merge_extruded(self.shared_mut(), &extruded);
        self.rebuild_caches();
        log::debug!("Extruded {} edges", outer.len());
        self.notify(MeshEvent::TopologyChanged);
        Ok(outer)
    }
}

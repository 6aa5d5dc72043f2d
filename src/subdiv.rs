/*!
Splitting faces: connecting edges or vertices across a face, radial
subdivision, poking and inserting points into a face.

Every operator here builds all of its new faces before touching the mesh.
The new faces are appended in one batch, coincident new vertices are welded,
and only then are the replaced faces deleted.
*/

use glam::{Vec2, Vec3};

use crate::{
    edge::Edge,
    element::{FH, GH, Handle, VH},
    error::Error,
    face::{Face, FaceAttributes},
    math,
    mesh::{EditMesh, FaceInsert, MeshEvent},
    shared::SharedHint,
    triangulate,
};

/// Edges of one face to connect. Two edges split the face across their
/// midpoints, three or more subdivide it radially.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConnection {
    pub face: FH,
    pub edges: Vec<Edge>,
}

impl EdgeConnection {
    pub fn new(face: FH, edges: Vec<Edge>) -> Self {
        EdgeConnection { face, edges }
    }

    pub fn is_valid(&self) -> bool {
        self.edges.len() >= 2
    }
}

/// Vertices of one face to connect. Two vertices split the face between
/// them, three or more poke it.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexConnection {
    pub face: FH,
    pub slots: Vec<VH>,
}

impl VertexConnection {
    pub fn new(face: FH, slots: Vec<VH>) -> Self {
        VertexConnection { face, slots }
    }

    pub fn is_valid(&self) -> bool {
        self.slots.len() >= 2
    }
}

/// One end of a split line.
#[derive(Debug, Clone, Copy)]
enum SplitPoint {
    /// Existing slot of the face.
    Vertex(VH),
    /// New point, usually on an edge of the face.
    Point(Vec3),
}

#[derive(Debug, Clone, Copy)]
struct SplitSelection {
    face: FH,
    a: SplitPoint,
    b: SplitPoint,
}

/// Hands out batch tags, unique within one append call.
#[derive(Default)]
struct TagSource(u32);

impl TagSource {
    fn next(&mut self) -> SharedHint {
        let tag = self.0;
        self.0 += 1;
        SharedHint::NewBatch(tag)
    }
}

/// A face of the original mesh, flattened onto its own plane.
struct FaceFrame {
    slots: Vec<VH>,
    groups: Vec<GH>,
    points: Vec<Vec3>,
    flat: Vec<Vec2>,
    normal: Vec3,
    center: Vec3,
    attr: FaceAttributes,
}

impl FaceFrame {
    fn project(&self, p: Vec3) -> Vec2 {
        math::project_to_plane(&[p], self.normal)
            .first()
            .copied()
            .unwrap_or(Vec2::ZERO)
    }

    fn hint(&self, i: usize) -> SharedHint {
        SharedHint::Existing(self.groups[i])
    }
}

/// Point set of a new face, with a registry hint per point.
#[derive(Default)]
struct Polygon {
    points: Vec<Vec3>,
    flat: Vec<Vec2>,
    hints: Vec<SharedHint>,
}

impl Polygon {
    fn seeded(point: Vec3, flat: Vec2, hint: SharedHint) -> Self {
        let mut poly = Self::default();
        poly.push(point, flat, hint);
        poly
    }

    fn push(&mut self, point: Vec3, flat: Vec2, hint: SharedHint) {
        self.points.push(point);
        self.flat.push(flat);
        self.hints.push(hint);
    }

    fn len(&self) -> usize {
        self.points.len()
    }

    /// Triangulate, winding the triangles around `normal`.
    fn into_insert(self, normal: Vec3, attr: &FaceAttributes) -> Result<FaceInsert, Error> {
        let tris = triangulate::triangulate_points(&self.flat)?;
        let flip = math::local_triangles_normal(&self.points, &tris).dot(normal) < 0.0;
        let indices = triangulate::flatten(&tris, flip)
            .iter()
            .map(VH::from)
            .collect();
        Ok(FaceInsert {
            positions: self.points,
            face: Face::with_attributes(indices, attr),
            hints: self.hints,
        })
    }
}

/// The divider a direction falls behind: the one from which the counter
/// clockwise angle to `dir` is largest.
fn quadrant_of(dividers: &[Vec2], dir: Vec2, skip: Option<usize>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (j, d) in dividers.iter().enumerate() {
        if Some(j) == skip {
            continue;
        }
        let angle = math::ccw_angle(*d, dir);
        if angle > best.map_or(0.0, |(_, a)| a) {
            best = Some((j, angle));
        }
    }
    best.map(|(j, _)| j)
}

impl EditMesh {
    fn face_frame(&self, f: FH) -> Result<FaceFrame, Error> {
        let face = self.face(f)?;
        let slots = face.distinct_indices().to_vec();
        let groups = slots
            .iter()
            .map(|v| self.shared().index_of(*v).ok_or(Error::UngroupedVertex(*v)))
            .collect::<Result<Vec<_>, _>>()?;
        let points = face.distinct_positions(self.vertices());
        let normal = face.normal(self.vertices());
        let flat = math::project_to_plane(&points, normal);
        Ok(FaceFrame {
            slots,
            groups,
            points,
            flat,
            normal,
            center: face.center(self.vertices()),
            attr: face.attributes(),
        })
    }

    fn edge_midpoint(&self, e: Edge) -> Vec3 {
        0.5 * (self.vertices()[e.x.slot()] + self.vertices()[e.y.slot()])
    }

    /// The face's own copies of `edges`, each once.
    fn edges_on_face(&self, f: FH, edges: &[Edge]) -> Result<Vec<Edge>, Error> {
        let face = self.face(f)?;
        let mut out: Vec<Edge> = Vec::with_capacity(edges.len());
        for e in edges {
            let own = face
                .edges()
                .iter()
                .copied()
                .find(|o| o.eq_shared(e, self.shared()))
                .ok_or(Error::EdgeNotFound(*e))?;
            if !out.contains(&own) {
                out.push(own);
            }
        }
        Ok(out)
    }

    /// The face's own slots coincident with `slots`, each once.
    fn slots_on_face(&self, f: FH, slots: &[VH]) -> Result<Vec<VH>, Error> {
        let face = self.face(f)?;
        let mut out: Vec<VH> = Vec::with_capacity(slots.len());
        for &v in slots {
            let own = face
                .distinct_indices()
                .iter()
                .copied()
                .find(|s| self.shared().coincident(*s, v))
                .ok_or(Error::VertexNotOnFace(v, f))?;
            if !out.contains(&own) {
                out.push(own);
            }
        }
        Ok(out)
    }

    /**
     * Split a face in two along the line through the two split points. Face
     * vertices are sorted by the side of the line they fall on, and both
     * split points go into both halves.
     */
    fn split_face(
        &self,
        sel: &SplitSelection,
        tags: &mut TagSource,
    ) -> Result<Vec<FaceInsert>, Error> {
        let frame = self.face_frame(sel.face)?;
        let locate = |sp: SplitPoint| match sp {
            SplitPoint::Vertex(v) => self.point(v),
            SplitPoint::Point(p) => Ok(p),
        };
        let (pa, pb) = (locate(sel.a)?, locate(sel.b)?);
        let (fa, fb) = (frame.project(pa), frame.project(pb));
        let is_split_vertex = |v: VH| {
            [sel.a, sel.b].iter().any(
                |sp| matches!(sp, SplitPoint::Vertex(s) if self.shared().coincident(*s, v)),
            )
        };
        let (dir, mid) = (fb - fa, 0.5 * (fa + fb));
        let (mut left, mut right) = (Polygon::default(), Polygon::default());
        for (i, &v) in frame.slots.iter().enumerate() {
            let (p, flat, hint) = (frame.points[i], frame.flat[i], frame.hint(i));
            if is_split_vertex(v) {
                left.push(p, flat, hint);
                right.push(p, flat, hint);
            } else if dir.perp_dot(flat - mid) > 0.0 {
                left.push(p, flat, hint);
            } else {
                right.push(p, flat, hint);
            }
        }
        for (sp, p, flat) in [(sel.a, pa, fa), (sel.b, pb, fb)] {
            if let SplitPoint::Point(_) = sp {
                let hint = tags.next();
                left.push(p, flat, hint);
                right.push(p, flat, hint);
            }
        }
        if left.len() < 3 || right.len() < 3 {
            log::warn!(
                "Splitting face {} leaves {} and {} points on either side",
                sel.face,
                left.len(),
                right.len()
            );
            return Err(Error::TriangulationFailed(left.len().min(right.len())));
        }
        Ok(vec![
            left.into_insert(frame.normal, &frame.attr)?,
            right.into_insert(frame.normal, &frame.attr)?,
        ])
    }

    /**
     * Divide a face into one polygon per edge, around a new vertex at the
     * face centre. Each edge gets a new vertex at its midpoint, shared by the
     * two polygons on either side of it.
     */
    fn subdivide_face(
        &self,
        f: FH,
        edges: &[Edge],
        tags: &mut TagSource,
    ) -> Result<Vec<FaceInsert>, Error> {
        let frame = self.face_frame(f)?;
        let mids: Vec<Vec3> = edges.iter().map(|e| self.edge_midpoint(*e)).collect();
        let mids_flat = math::project_to_plane(&mids, frame.normal);
        let center = frame.project(frame.center);
        let dividers: Vec<Vec2> = mids_flat
            .iter()
            .map(|m| (*m - center).normalize_or_zero())
            .collect();
        let center_hint = tags.next();
        let mut quads: Vec<Polygon> = (0..dividers.len())
            .map(|_| Polygon::seeded(frame.center, center, center_hint))
            .collect();
        for i in 0..dividers.len() {
            let hint = tags.next();
            quads[i].push(mids[i], mids_flat[i], hint);
            let q = quadrant_of(&dividers, dividers[i], Some(i))
                .ok_or(Error::QuadrantAssignmentFailed(f))?;
            quads[q].push(mids[i], mids_flat[i], hint);
        }
        for i in 0..frame.slots.len() {
            let q = quadrant_of(&dividers, frame.flat[i] - center, None)
                .ok_or(Error::QuadrantAssignmentFailed(f))?;
            quads[q].push(frame.points[i], frame.flat[i], frame.hint(i));
        }
        if quads.iter().any(|q| q.len() < 3) {
            log::error!("Face {f} is too concave to subdivide");
            return Err(Error::QuadrantAssignmentFailed(f));
        }
        quads
            .into_iter()
            .map(|q| q.into_insert(frame.normal, &frame.attr))
            .collect()
    }

    /**
     * Divide a face into one polygon per picked vertex, around a new vertex
     * at the face centre. Each picked vertex belongs to the two polygons on
     * either side of it.
     */
    fn poke_face(
        &self,
        f: FH,
        picked: &[VH],
        tags: &mut TagSource,
    ) -> Result<Vec<FaceInsert>, Error> {
        let frame = self.face_frame(f)?;
        let picked: Vec<usize> = picked
            .iter()
            .map(|v| {
                frame
                    .slots
                    .iter()
                    .position(|s| s == v)
                    .ok_or(Error::VertexNotOnFace(*v, f))
            })
            .collect::<Result<_, _>>()?;
        let center = frame.project(frame.center);
        let dividers: Vec<Vec2> = picked
            .iter()
            .map(|&k| (frame.flat[k] - center).normalize_or_zero())
            .collect();
        let center_hint = tags.next();
        let mut quads: Vec<Polygon> = (0..dividers.len())
            .map(|_| Polygon::seeded(frame.center, center, center_hint))
            .collect();
        for i in 0..frame.slots.len() {
            let (p, flat, hint) = (frame.points[i], frame.flat[i], frame.hint(i));
            let own = picked.iter().position(|&k| k == i);
            if let Some(q) = own {
                quads[q].push(p, flat, hint);
            }
            let q = quadrant_of(&dividers, flat - center, own)
                .ok_or(Error::QuadrantAssignmentFailed(f))?;
            quads[q].push(p, flat, hint);
        }
        if quads.iter().any(|q| q.len() < 3) {
            return Err(Error::QuadrantAssignmentFailed(f));
        }
        quads
            .into_iter()
            .map(|q| q.into_insert(frame.normal, &frame.attr))
            .collect()
    }

    /// Replacement for face `f` with `points` inserted into its
    /// triangulation. Points already on a vertex of the face are skipped.
    fn append_points(&self, f: FH, points: &[Vec3]) -> Result<FaceInsert, Error> {
        let frame = self.face_frame(f)?;
        let face = self.face(f)?;
        let mut tris: Vec<[u32; 3]> = Vec::with_capacity(face.num_triangles() + points.len() * 2);
        for t in face.triangles() {
            let mut local = [0u32; 3];
            for (k, v) in t.iter().enumerate() {
                local[k] = frame
                    .slots
                    .iter()
                    .position(|s| s == v)
                    .ok_or(Error::VertexOutOfBounds(*v))? as u32;
            }
            tris.push(local);
        }
        let mut fresh: Vec<Vec3> = Vec::with_capacity(points.len());
        for p in points {
            if !frame.points.contains(p) && !fresh.contains(p) {
                fresh.push(*p);
            }
        }
        if fresh.is_empty() {
            return Err(Error::InsufficientSelection {
                required: 1,
                found: 0,
            });
        }
        let first = frame.points.len() as u32;
        let mut positions = frame.points.clone();
        let mut flat = frame.flat.clone();
        let mut hints: Vec<SharedHint> = (0..frame.slots.len()).map(|i| frame.hint(i)).collect();
        flat.extend(math::project_to_plane(&fresh, frame.normal));
        hints.extend(std::iter::repeat_n(SharedHint::NewSingleton, fresh.len()));
        positions.extend(fresh);
        triangulate::insert_points(&flat, &mut tris, first..positions.len() as u32)?;
        let indices = tris.iter().flatten().map(VH::from).collect();
        Ok(FaceInsert {
            positions,
            face: Face::with_attributes(indices, &frame.attr),
            hints,
        })
    }

    /// Insert a point into a face. See [`EditMesh::append_vertices_to_face`].
    pub fn append_vertex_to_face(&mut self, f: FH, point: Vec3) -> Result<FH, Error> {
        self.append_vertices_to_face(f, &[point])
    }

    /**
     * Replace a face with one that also has vertices at `points`, each in
     * its own shared group. The points must lie on the face, either inside
     * it or on its edges.
     *
     * Returns the handle of the replacement face, which is the last face.
     */
    pub fn append_vertices_to_face(&mut self, f: FH, points: &[Vec3]) -> Result<FH, Error> {
        let insert = self.append_points(f, points)?;
        self.insert_faces(vec![insert])?;
        self.remove_faces(&[f]);
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        Ok(FH::from(self.num_faces() - 1))
    }

    /// Texture group for the pieces of a split face.
    fn split_texture_group(&self, f: FH, i: usize) -> Result<u32, Error> {
        Ok(self
            .face(f)?
            .texture_group
            .unwrap_or_else(|| self.unused_texture_group(i as u32 + 1)))
    }

    /// New faces for one edge connection, stamped with the split texture group.
    fn edge_connection_pieces(
        &self,
        f: FH,
        edges: &[Edge],
        i: usize,
        tags: &mut TagSource,
    ) -> Result<Vec<FaceInsert>, Error> {
        let mut pieces = if edges.len() == 2 {
            let sel = SplitSelection {
                face: f,
                a: SplitPoint::Point(self.edge_midpoint(edges[0])),
                b: SplitPoint::Point(self.edge_midpoint(edges[1])),
            };
            self.split_face(&sel, tags)?
        } else {
            self.subdivide_face(f, edges, tags)?
        };
        let texture_group = self.split_texture_group(f, i)?;
        for piece in pieces.iter_mut() {
            piece.face.texture_group = Some(texture_group);
        }
        Ok(pieces)
    }

    /// New faces for one vertex connection, stamped with the split texture group.
    fn vertex_connection_pieces(
        &self,
        f: FH,
        slots: &[VH],
        i: usize,
        tags: &mut TagSource,
    ) -> Result<Vec<FaceInsert>, Error> {
        let mut pieces = if slots.len() == 2 {
            let sel = SplitSelection {
                face: f,
                a: SplitPoint::Vertex(slots[0]),
                b: SplitPoint::Vertex(slots[1]),
            };
            self.split_face(&sel, tags)?
        } else {
            self.poke_face(f, slots, tags)?
        };
        let texture_group = self.split_texture_group(f, i)?;
        for piece in pieces.iter_mut() {
            piece.face.texture_group = Some(texture_group);
        }
        Ok(pieces)
    }

    /**
     * Split faces across pairs of edges, or subdivide them when three or
     * more edges are given. Connections with fewer than two edges are
     * ignored, as is any connection to a face already split by an earlier
     * one. A connection that fails is logged and left out, the rest are
     * still applied. Fails only when no connection succeeds.
     *
     * Faces sharing a split edge without being split themselves receive the
     * edge midpoint as a new vertex, so the mesh has no T-junctions. Returns
     * the new faces, not counting those re-triangulated neighbours.
     */
    pub fn connect_edges(&mut self, connections: &[EdgeConnection]) -> Result<Vec<FH>, Error> {
        if !connections.iter().any(EdgeConnection::is_valid) {
            log::warn!("No valid edge connections, each needs two edges of one face");
            return Err(Error::NoValidConnections);
        }
        let mut tags = TagSource::default();
        let mut split: Vec<FH> = Vec::new();
        let mut inserts: Vec<FaceInsert> = Vec::new();
        let mut dangling: Vec<(Edge, Vec3)> = Vec::new();
        for (i, conn) in connections.iter().filter(|c| c.is_valid()).enumerate() {
            if split.contains(&conn.face) {
                log::debug!("Face {} is already split, skipping", conn.face);
                continue;
            }
            let edges = match self.edges_on_face(conn.face, &conn.edges) {
                Ok(edges) if edges.len() > 1 => edges,
                Ok(_) => {
                    log::debug!("Face {} needs two distinct edges to split", conn.face);
                    continue;
                }
                Err(e) => {
                    log::warn!("Skipping edge connection on face {}: {e}", conn.face);
                    continue;
                }
            };
            let pieces = match self.edge_connection_pieces(conn.face, &edges, i, &mut tags) {
                Ok(pieces) => pieces,
                Err(e) => {
                    log::warn!("Unable to connect edges of face {}: {e}", conn.face);
                    continue;
                }
            };
            dangling.extend(edges.iter().map(|e| (*e, self.edge_midpoint(*e))));
            split.push(conn.face);
            inserts.extend(pieces);
        }
        if split.is_empty() {
            return Err(Error::NoValidConnections);
        }
        let mut neighbours: Vec<(FH, Vec<Vec3>)> = Vec::new();
        for (e, mid) in dangling {
            for f in self.faces_on_edge(e) {
                if split.contains(&f) {
                    continue;
                }
                match neighbours.iter_mut().find(|(n, _)| *n == f) {
                    Some((_, pts)) if !pts.contains(&mid) => pts.push(mid),
                    Some(_) => {}
                    None => neighbours.push((f, vec![mid])),
                }
            }
        }
        let num_split = inserts.len();
        let mut replaced = split;
        for (f, pts) in neighbours {
            match self.append_points(f, &pts) {
                Ok(insert) => {
                    inserts.push(insert);
                    replaced.push(f);
                }
                Err(e) => log::error!(
                    "Unable to re-triangulate face {f} with {} new vertices: {e}",
                    pts.len()
                ),
            }
        }
        self.commit_splits(inserts, num_split, replaced)
    }

    /**
     * Split faces between pairs of their vertices, or poke them when three
     * or more vertices are given. The slots may belong to other faces, as
     * long as they are coincident with vertices of the face they connect.
     * Connections that fail are logged and left out. Returns the new faces.
     */
    pub fn connect_vertices(
        &mut self,
        connections: &[VertexConnection],
    ) -> Result<Vec<FH>, Error> {
        if !connections.iter().any(VertexConnection::is_valid) {
            log::warn!("No valid vertex connections, each needs two vertices of one face");
            return Err(Error::NoValidConnections);
        }
        let mut tags = TagSource::default();
        let mut split: Vec<FH> = Vec::new();
        let mut inserts: Vec<FaceInsert> = Vec::new();
        for (i, conn) in connections.iter().filter(|c| c.is_valid()).enumerate() {
            if split.contains(&conn.face) {
                log::debug!("Face {} is already split, skipping", conn.face);
                continue;
            }
            let slots = match self.slots_on_face(conn.face, &conn.slots) {
                Ok(slots) if slots.len() > 1 => slots,
                Ok(_) => {
                    log::debug!("Face {} needs two distinct vertices to split", conn.face);
                    continue;
                }
                Err(e) => {
                    log::warn!("Skipping vertex connection on face {}: {e}", conn.face);
                    continue;
                }
            };
            let pieces = match self.vertex_connection_pieces(conn.face, &slots, i, &mut tags) {
                Ok(pieces) => pieces,
                Err(e) => {
                    log::warn!("Unable to connect vertices of face {}: {e}", conn.face);
                    continue;
                }
            };
            split.push(conn.face);
            inserts.extend(pieces);
        }
        if split.is_empty() {
            return Err(Error::NoValidConnections);
        }
        let num_split = inserts.len();
        self.commit_splits(inserts, num_split, split)
    }

    /// Subdivide every face radially through its edge midpoints.
    pub fn subdivide(&mut self) -> Result<Vec<FH>, Error> {
        let connections: Vec<EdgeConnection> = self
            .face_handles()
            .zip(self.faces())
            .map(|(f, face)| EdgeConnection::new(f, face.edges().to_vec()))
            .collect();
        self.connect_edges(&connections)
    }

    /// Append the new faces, weld their vertices and delete the faces they
    /// replace. Returns the first `num_split` new faces.
    fn commit_splits(
        &mut self,
        inserts: Vec<FaceInsert>,
        num_split: usize,
        mut replaced: Vec<FH>,
    ) -> Result<Vec<FH>, Error> {
        let added = self.insert_faces(inserts)?;
        let fresh: Vec<VH> = added
            .iter()
            .flat_map(|f| self.faces()[f.slot()].distinct_indices().iter().copied())
            .collect();
        let welded = self.weld_slots(&fresh, self.config().connect_weld_distance);
        replaced.sort();
        replaced.dedup();
        let removed = self.remove_faces(&replaced);
        self.rebuild_caches();
        log::debug!(
            "Replaced {} faces with {}, welded {} vertex pairs, removed {} vertices",
            replaced.len(),
            added.len(),
            welded,
            removed.len()
        );
        self.notify(MeshEvent::TopologyChanged);
        // Every replaced face comes before the appended ones.
        let shift = replaced.len() as u32;
        Ok(added
            .iter()
            .take(num_split)
            .map(|f| FH::from(f.index() - shift))
            .collect())
    }
}

#[cfg(test)]
mod test {
    use glam::{Vec3, vec3};

    use crate::{
        edge::Edge,
        element::{FH, VH},
        error::Error,
        macros::assert_f32_eq,
        mesh::EditMesh,
    };

    use super::{EdgeConnection, VertexConnection};

    fn assert_faces_up(mesh: &EditMesh) {
        for f in mesh.face_handles() {
            let n = mesh.face_normal(f).expect("Missing face");
            assert_f32_eq!(n.y, 1.0, 1e-5);
        }
    }

    #[test]
    fn t_append_vertex_inside_face() {
        let mut plane = EditMesh::plane(2.0, 2.0).expect("Unable to create plane");
        let f = plane
            .append_vertex_to_face(FH::from(0u32), Vec3::ZERO)
            .expect("Unable to append vertex");
        assert_eq!(f, FH::from(0u32));
        assert_eq!(plane.num_faces(), 1);
        let face = plane.face(f).expect("Missing face");
        assert_eq!(face.distinct_indices().len(), 5);
        assert_eq!(face.num_triangles(), 4);
        // The perimeter is unchanged.
        assert_eq!(face.edges().len(), 4);
        assert_eq!(plane.shared().len(), 5);
        assert_faces_up(&plane);
        plane.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_append_vertex_outside_face() {
        let mut plane = EditMesh::plane(1.0, 1.0).expect("Unable to create plane");
        assert!(matches!(
            plane.append_vertex_to_face(FH::from(0u32), vec3(3.0, 0.0, 0.0)),
            Err(Error::PointOutsideFace(_))
        ));
        assert!(
            plane
                .append_vertex_to_face(FH::from(0u32), vec3(-0.5, 0.0, 0.5))
                .is_err()
        );
        assert_eq!(plane.num_vertices(), 4);
        assert_eq!(plane.faces()[0].num_triangles(), 2);
    }

    #[test]
    fn t_connect_perimeter_edges() {
        let mut grid = EditMesh::grid(2, 1, 1.0).expect("Unable to create grid");
        // Top and bottom edges of the first quad, neither shared.
        let faces = grid
            .connect_edges(&[EdgeConnection::new(
                FH::from(0u32),
                vec![Edge::new(0u32, 1u32), Edge::new(3u32, 2u32)],
            )])
            .expect("Unable to connect");
        assert_eq!(faces, vec![FH::from(1u32), FH::from(2u32)]);
        assert_eq!(grid.num_faces(), 3);
        assert_eq!(grid.shared().len(), 8);
        for f in faces {
            let face = grid.face(f).expect("Missing face");
            assert_eq!(face.distinct_indices().len(), 4);
            assert_eq!(face.texture_group, Some(1));
        }
        assert_faces_up(&grid);
        grid.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_connect_retriangulates_neighbour() {
        let mut grid = EditMesh::grid(2, 1, 1.0).expect("Unable to create grid");
        // Left edge and the edge shared with the second quad.
        let faces = grid
            .connect_edges(&[EdgeConnection::new(
                FH::from(0u32),
                vec![Edge::new(2u32, 0u32), Edge::new(1u32, 3u32)],
            )])
            .expect("Unable to connect");
        assert_eq!(faces, vec![FH::from(0u32), FH::from(1u32)]);
        assert_eq!(grid.num_faces(), 3);
        // The neighbour got the midpoint of the shared edge.
        assert_eq!(grid.faces()[2].distinct_indices().len(), 5);
        assert_eq!(grid.shared().len(), 8);
        // Watertight: only the left boundary edge got split.
        let all: Vec<FH> = grid.face_handles().collect();
        let perimeter = grid.perimeter_edges(&all).expect("Unable to get perimeter");
        assert_eq!(perimeter.len(), 7);
        assert_faces_up(&grid);
        grid.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_connect_requires_two_edges() {
        let mut plane = EditMesh::plane(1.0, 1.0).expect("Unable to create plane");
        assert!(matches!(
            plane.connect_edges(&[EdgeConnection::new(
                FH::from(0u32),
                vec![Edge::new(0u32, 1u32)]
            )]),
            Err(Error::NoValidConnections)
        ));
        assert!(
            plane
                .connect_edges(&[EdgeConnection::new(
                    FH::from(0u32),
                    vec![Edge::new(0u32, 1u32), Edge::new(1u32, 0u32)]
                )])
                .is_err()
        );
        assert_eq!(plane.num_faces(), 1);
    }

    #[test]
    fn t_subdivide_cube() {
        let mut cube = EditMesh::unit_cube().expect("Unable to create cube");
        let faces = cube.subdivide().expect("Unable to subdivide");
        assert_eq!(faces.len(), 24);
        assert_eq!(cube.num_faces(), 24);
        // Corners, edge midpoints and face centres.
        assert_eq!(cube.shared().len(), 8 + 12 + 6);
        assert_eq!(cube.num_vertices(), 96);
        for f in cube.face_handles() {
            assert_eq!(cube.face(f).expect("Missing face").distinct_indices().len(), 4);
            let n = cube.face_normal(f).expect("Missing face");
            let c = cube.face_center(f).expect("Missing face");
            assert!(n.dot(c) > 0.0);
        }
        let all: Vec<FH> = cube.face_handles().collect();
        assert!(cube.perimeter_edges(&all).expect("Unable to get perimeter").is_empty());
        cube.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_subdivide_triangle() {
        let mut mesh = EditMesh::from_vertices_faces(
            vec![
                vec3(0.0, 0.0, 0.0),
                vec3(1.0, 0.0, 0.0),
                vec3(0.0, 0.0, -1.0),
            ],
            vec![crate::face::Face::from_u32(&[0, 1, 2])],
        )
        .expect("Unable to create mesh");
        let faces = mesh.subdivide().expect("Unable to subdivide");
        assert_eq!(faces.len(), 3);
        assert_eq!(mesh.shared().len(), 7);
        assert_faces_up(&mesh);
        mesh.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_connect_vertices_diagonal() {
        let mut plane = EditMesh::plane(1.0, 1.0).expect("Unable to create plane");
        let faces = plane
            .connect_vertices(&[VertexConnection::new(
                FH::from(0u32),
                vec![VH::from(0u32), VH::from(3u32)],
            )])
            .expect("Unable to connect");
        assert_eq!(faces.len(), 2);
        assert_eq!(plane.num_faces(), 2);
        assert_eq!(plane.shared().len(), 4);
        for f in faces {
            assert_eq!(plane.face(f).expect("Missing face").num_triangles(), 1);
        }
        assert_faces_up(&plane);
        plane.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_connect_adjacent_vertices_fails() {
        let mut plane = EditMesh::plane(1.0, 1.0).expect("Unable to create plane");
        assert!(
            plane
                .connect_vertices(&[VertexConnection::new(
                    FH::from(0u32),
                    vec![VH::from(0u32), VH::from(1u32)],
                )])
                .is_err()
        );
        assert_eq!(plane.num_faces(), 1);
        assert_eq!(plane.num_vertices(), 4);
    }

    #[test]
    fn t_poke_face() {
        let mut plane = EditMesh::plane(1.0, 1.0).expect("Unable to create plane");
        let slots: Vec<VH> = (0..4u32).map(VH::from).collect();
        let faces = plane
            .connect_vertices(&[VertexConnection::new(FH::from(0u32), slots)])
            .expect("Unable to poke");
        assert_eq!(faces.len(), 4);
        assert_eq!(plane.shared().len(), 5);
        for f in faces {
            let face = plane.face(f).expect("Missing face");
            assert_eq!(face.distinct_indices().len(), 3);
            let has_center = face
                .distinct_indices()
                .iter()
                .any(|v| plane.point(*v).expect("Missing") == Vec3::ZERO);
            assert!(has_center);
        }
        assert_faces_up(&plane);
        plane.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_connect_vertex_not_on_face() {
        let mut grid = EditMesh::grid(2, 1, 1.0).expect("Unable to create grid");
        assert!(matches!(
            grid.connect_vertices(&[VertexConnection::new(
                FH::from(0u32),
                vec![VH::from(0u32), VH::from(5u32)],
            )]),
            Err(Error::NoValidConnections)
        ));
        assert_eq!(grid.num_faces(), 2);
        assert_eq!(grid.num_vertices(), 8);
    }

    #[test]
    fn t_connect_edges_keeps_successful_items() {
        let mut grid = EditMesh::grid(2, 1, 1.0).expect("Unable to create grid");
        let faces = grid
            .connect_edges(&[
                EdgeConnection::new(
                    FH::from(0u32),
                    vec![Edge::new(0u32, 1u32), Edge::new(3u32, 2u32)],
                ),
                // The first edge belongs to the other quad.
                EdgeConnection::new(
                    FH::from(1u32),
                    vec![Edge::new(0u32, 1u32), Edge::new(4u32, 5u32)],
                ),
            ])
            .expect("Unable to connect");
        assert_eq!(faces, vec![FH::from(1u32), FH::from(2u32)]);
        assert_eq!(grid.num_faces(), 3);
        // The second quad is untouched.
        let untouched = grid.face(FH::from(0u32)).expect("Missing face");
        assert_eq!(untouched.distinct_indices().len(), 4);
        assert_eq!(untouched.num_triangles(), 2);
        assert_eq!(grid.shared().len(), 8);
        assert_faces_up(&grid);
        grid.check_topology().expect("Topology check failed");
    }

    #[test]
    fn t_connect_vertices_keeps_successful_items() {
        let mut grid = EditMesh::grid(2, 1, 1.0).expect("Unable to create grid");
        let faces = grid
            .connect_vertices(&[
                VertexConnection::new(FH::from(0u32), vec![VH::from(0u32), VH::from(3u32)]),
                VertexConnection::new(FH::from(1u32), vec![VH::from(0u32), VH::from(7u32)]),
            ])
            .expect("Unable to connect");
        assert_eq!(faces.len(), 2);
        assert_eq!(grid.num_faces(), 3);
        for f in faces {
            assert_eq!(grid.face(f).expect("Missing face").num_triangles(), 1);
        }
        assert_eq!(grid.faces()[0].num_triangles(), 2);
        assert_faces_up(&grid);
        grid.check_topology().expect("Topology check failed");
    }
}

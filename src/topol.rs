use std::collections::HashMap;

use crate::{
    edge::Edge,
    element::{FH, GH, VH},
    error::Error,
    mesh::EditMesh,
};

impl EditMesh {
    /// Faces with a perimeter edge coincident with `edge`.
    pub fn faces_on_edge(&self, edge: Edge) -> Vec<FH> {
        let shared = self.shared();
        self.faces()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.edges().iter().any(|e| e.eq_shared(&edge, shared)))
            .map(|(i, _)| FH::from(i))
            .collect()
    }

    /// Faces touching any slot coincident with `v`.
    pub fn faces_on_vertex(&self, v: VH) -> Vec<FH> {
        self.faces_on_vertices(&[v])
    }

    /// Faces touching any slot coincident with any of `slots`.
    pub fn faces_on_vertices(&self, slots: &[VH]) -> Vec<FH> {
        let groups = self.shared().groups_of(slots);
        let shared = self.shared();
        self.faces()
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                f.distinct_indices().iter().any(|v| {
                    shared.index_of(*v).is_some_and(|g| groups.contains(&g)) || slots.contains(v)
                })
            })
            .map(|(i, _)| FH::from(i))
            .collect()
    }

    /// Perimeter edges of all faces touching `slots`, one per distinct pair
    /// of shared groups.
    pub fn edges_on_vertices(&self, slots: &[VH]) -> Vec<Edge> {
        let groups = self.shared().groups_of(slots);
        let shared = self.shared();
        let mut seen: Vec<(GH, GH)> = Vec::new();
        let mut out = Vec::new();
        for face in self.faces() {
            for e in face.edges() {
                let Some(key) = e.to_groups(shared) else {
                    continue;
                };
                if (groups.contains(&key.0) || groups.contains(&key.1)) && !seen.contains(&key) {
                    seen.push(key);
                    out.push(*e);
                }
            }
        }
        out
    }

    /// First face with a perimeter edge coincident with `edge`, and that
    /// face's own copy of the edge.
    pub fn valid_face_and_edge(&self, edge: Edge) -> Option<(FH, Edge)> {
        let shared = self.shared();
        self.faces().iter().enumerate().find_map(|(i, f)| {
            f.edges()
                .iter()
                .find(|e| e.eq_shared(&edge, shared))
                .map(|e| (FH::from(i), *e))
        })
    }

    /**
     * Perimeter edges of a set of faces: face edges whose pair of shared
     * groups occurs in exactly one face of the set. Each edge is returned in
     * the winding of its face, along with that face.
     */
    pub fn perimeter_edges_with_faces(&self, faces: &[FH]) -> Result<Vec<(FH, Edge)>, Error> {
        self.validate_faces(faces)?;
        let shared = self.shared();
        let mut counts: HashMap<(GH, GH), usize> = HashMap::new();
        let mut all: Vec<(FH, Edge, (GH, GH))> = Vec::new();
        for &f in faces {
            for e in self.faces()[f.slot()].edges() {
                if let Some(key) = e.to_groups(shared) {
                    *counts.entry(key).or_default() += 1;
                    all.push((f, *e, key));
                }
            }
        }
        Ok(all
            .into_iter()
            .filter(|(_, _, key)| counts.get(key) == Some(&1))
            .map(|(f, e, _)| (f, e))
            .collect())
    }

    pub fn perimeter_edges(&self, faces: &[FH]) -> Result<Vec<Edge>, Error> {
        Ok(self
            .perimeter_edges_with_faces(faces)?
            .into_iter()
            .map(|(_, e)| e)
            .collect())
    }

    /// The edge halfway around the perimeter of `f`, starting from `edge`.
    /// Returns `None` if the perimeter is not a single loop.
    pub fn across_edge(&self, f: FH, edge: Edge) -> Option<Edge> {
        let face = self.faces().get(f.slot())?;
        let edges = face.edges();
        let start = *edges.iter().find(|e| e.eq_shared(&edge, self.shared()))?;
        let mut ring = Vec::with_capacity(edges.len());
        ring.push(start);
        while ring.len() < edges.len() {
            let prev = ring[ring.len() - 1];
            let next = *edges.iter().find(|e| e.x == prev.y)?;
            if next == start {
                // Face perimeter is made of more than one loop.
                return None;
            }
            ring.push(next);
        }
        Some(ring[ring.len() / 2])
    }

    /**
     * The edge across the face from `edge`, and the face on its other side,
     * along with that face's own copy of the edge.
     *
     * Returns `None` if the perimeter of `f` is not a single loop, or if the
     * opposite edge is not shared with exactly one other face.
     */
    pub fn opposite_edge(&self, f: FH, edge: Edge) -> Option<(FH, Edge)> {
        let local = self.across_edge(f, edge)?;
        let mut others = self.faces_on_edge(local);
        others.retain(|o| *o != f);
        if others.len() != 1 {
            return None;
        }
        let other = others[0];
        let op = *self.faces()[other.slot()]
            .edges()
            .iter()
            .find(|e| e.eq_shared(&local, self.shared()))?;
        Some((other, op))
    }

    /// Walk opposite edges starting at `face`, pushing every visited edge,
    /// until the walk comes back to `face` or reaches the boundary.
    fn walk_ring(&self, face: FH, edge: Edge, out: &mut Vec<Edge>) {
        let shared = self.shared();
        let mut push = |e: Edge| {
            if !out.iter().any(|o| o.eq_shared(&e, shared)) {
                out.push(e);
            }
        };
        push(edge);
        let (mut cur_face, mut cur_edge) = (face, edge);
        for _ in 0..=self.num_faces() {
            match self.opposite_edge(cur_face, cur_edge) {
                Some((op_face, op_edge)) => {
                    push(op_edge);
                    if op_face == face {
                        break;
                    }
                    (cur_face, cur_edge) = (op_face, op_edge);
                }
                None => {
                    // Boundary edge on the far side of the last face.
                    if let Some(local) = self.across_edge(cur_face, cur_edge) {
                        if self.faces_on_edge(local).len() == 1 {
                            push(local);
                        }
                    }
                    break;
                }
            }
        }
    }

    /**
     * Edges reached by repeatedly jumping to the opposite edge of the
     * adjacent face, in both directions from each seed edge. Returns every
     * visited edge once.
     */
    pub fn edge_ring(&self, seeds: &[Edge]) -> Vec<Edge> {
        let mut out: Vec<Edge> = Vec::new();
        for seed in seeds {
            let Some((orig_face, orig_edge)) = self.valid_face_and_edge(*seed) else {
                log::debug!("Edge {seed} is not on any face, skipping");
                continue;
            };
            self.walk_ring(orig_face, orig_edge, &mut out);
            let mut others = self.faces_on_edge(orig_edge);
            others.retain(|f| *f != orig_face);
            if let [other] = others.as_slice() {
                if let Some(e) = self.faces()[other.slot()]
                    .edges()
                    .iter()
                    .find(|e| e.eq_shared(&orig_edge, self.shared()))
                {
                    self.walk_ring(*other, *e, &mut out);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod test {
    use crate::{
        edge::Edge,
        element::{FH, VH},
        mesh::EditMesh,
    };

    #[test]
    fn t_cube_connectivity() {
        let cube = EditMesh::unit_cube().expect("Unable to create cube");
        // Edge between the front face and the right face.
        let e = Edge::new(1u32, 3u32);
        let faces = cube.faces_on_edge(e);
        assert_eq!(faces, vec![FH::from(0u32), FH::from(1u32)]);
        assert_eq!(cube.faces_on_vertex(VH::from(0u32)).len(), 3);
        assert_eq!(cube.edges_on_vertices(&[VH::from(0u32)]).len(), 3);
        let (f, own) = cube
            .valid_face_and_edge(Edge::new(6u32, 4u32))
            .expect("Edge must exist");
        assert_eq!(f, FH::from(0u32));
        assert_eq!(own, Edge::new(1u32, 3u32));
    }

    #[test]
    fn t_perimeter_of_face_set() {
        let cube = EditMesh::unit_cube().expect("Unable to create cube");
        let single = cube
            .perimeter_edges(&[FH::from(0u32)])
            .expect("Unable to get perimeter");
        assert_eq!(single.len(), 4);
        let pair = cube
            .perimeter_edges(&[FH::from(0u32), FH::from(1u32)])
            .expect("Unable to get perimeter");
        assert_eq!(pair.len(), 6);
        let all: Vec<FH> = cube.face_handles().collect();
        assert!(cube.perimeter_edges(&all).expect("Unable to get perimeter").is_empty());
        assert!(cube.perimeter_edges(&[FH::from(9u32)]).is_err());
    }

    #[test]
    fn t_opposite_edge() {
        let cube = EditMesh::unit_cube().expect("Unable to create cube");
        // Bottom edge of the front face, opposite to its top edge.
        let (f, e) = cube
            .opposite_edge(FH::from(0u32), Edge::new(0u32, 1u32))
            .expect("No opposite edge");
        assert_eq!(f, FH::from(4u32));
        assert!(e.eq_shared(&Edge::new(2u32, 3u32), cube.shared()));
        let plane = EditMesh::plane(1.0, 1.0).expect("Unable to create plane");
        assert!(
            plane
                .opposite_edge(FH::from(0u32), Edge::new(0u32, 1u32))
                .is_none()
        );
    }

    #[test]
    fn t_edge_ring_wraps_cube() {
        let cube = EditMesh::unit_cube().expect("Unable to create cube");
        let ring = cube.edge_ring(&[Edge::new(0u32, 1u32)]);
        assert_eq!(ring.len(), 4);
        let grid = EditMesh::grid(3, 1, 1.0).expect("Unable to create grid");
        // Edges parallel to z across the strip of three quads.
        let ring = grid.edge_ring(&[Edge::new(0u32, 2u32)]);
        assert_eq!(ring.len(), 4);
        // Seeding from the middle walks both ways.
        let ring = grid.edge_ring(&[Edge::new(4u32, 6u32)]);
        assert_eq!(ring.len(), 4);
    }
}

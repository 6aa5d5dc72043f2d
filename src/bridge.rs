use glam::Vec3;

use crate::{
    edge::Edge,
    element::{FH, GH, VH},
    error::Error,
    face::{Face, FaceAttributes},
    math,
    mesh::{EditMesh, FaceInsert, MeshEvent},
    shared::SharedHint,
};

/// Local triangles of a bridging quad `[ax, ay, b?, b?]`.
const BRIDGE_QUAD: [u32; 6] = [2, 1, 0, 2, 3, 1];

impl EditMesh {
    /// Bridge two edges, honouring the configured perimeter restriction.
    pub fn bridge(&mut self, a: Edge, b: Edge) -> Result<FH, Error> {
        let enforce = self.config().perimeter_edge_bridge_only;
        self.bridge_edges(a, b, enforce)
    }

    /**
     * Create a face spanning two edges. If the edges share a vertex the new
     * face is a triangle, otherwise a quad whose corners are ordered so that
     * it does not cross itself.
     *
     * Both edges must belong to a face. The material, UVs and colour come
     * from the face owning `a`, and the new face is wound consistently with
     * that face.
     */
    pub fn bridge_edges(
        &mut self,
        a: Edge,
        b: Edge,
        perimeter_only: bool,
    ) -> Result<FH, Error> {
        self.validate_slots(&[a.x, a.y, b.x, b.y])?;
        let shared = self.shared();
        if a.eq_shared(&b, shared) || !a.is_valid(shared) || !b.is_valid(shared) {
            return Err(Error::InsufficientSelection {
                required: 2,
                found: 1,
            });
        }
        let (owner, own) = self.valid_face_and_edge(a).ok_or(Error::EdgeNotFound(a))?;
        if self.valid_face_and_edge(b).is_none() {
            return Err(Error::EdgeNotFound(b));
        }
        if perimeter_only {
            for e in [a, b] {
                if self.faces_on_edge(e).len() > 1 {
                    log::warn!("Edge {e} is not on the perimeter, refusing to bridge");
                    return Err(Error::NotPerimeterEdge(e));
                }
            }
        }
        if self.faces().iter().any(|f| {
            f.edges().iter().any(|e| e.eq_shared(&a, shared))
                && f.edges().iter().any(|e| e.eq_shared(&b, shared))
        }) {
            log::warn!("A face already exists between {a} and {b}");
            return Err(Error::FaceAlreadyExists(a, b));
        }
        let src = self.face(owner)?;
        let attr = FaceAttributes {
            material: src.material,
            uv: src.uv,
            smoothing_group: 0,
            texture_group: None,
            color: src.color(),
        };
        let group = |v: VH| shared.index_of(v).ok_or(Error::UngroupedVertex(v));
        let corner = |v: VH| -> Result<(VH, GH), Error> { Ok((v, group(v)?)) };

        let (corners, local): (Vec<(VH, GH)>, Vec<u32>) =
            if a.contains_shared(b.x, shared) || a.contains_shared(b.y, shared) {
                let axbx = shared.coincident(a.x, b.x);
                let axby = shared.coincident(a.x, b.y);
                let aybx = shared.coincident(a.y, b.x);
                let corners = if axbx {
                    [a.x, a.y, b.y]
                } else if axby {
                    [a.x, a.y, b.x]
                } else if aybx {
                    [a.y, a.x, b.y]
                } else {
                    [a.y, a.x, b.x]
                };
                let local = if axbx || axby { vec![2, 1, 0] } else { vec![0, 1, 2] };
                (
                    corners.into_iter().map(corner).collect::<Result<_, _>>()?,
                    local,
                )
            } else {
                let p = |v: VH| self.vertices()[v.slot()];
                let nrm = (p(b.x) - p(a.x)).cross(p(a.y) - p(a.x));
                let flat = math::project_to_plane(&[p(a.x), p(a.y), p(b.x), p(b.y)], nrm);
                let crossing = math::segment_intersection(flat[0], flat[2], flat[1], flat[3]);
                let corners = if crossing.is_none() {
                    [a.x, a.y, b.x, b.y]
                } else {
                    [a.x, a.y, b.y, b.x]
                };
                (
                    corners.into_iter().map(corner).collect::<Result<_, _>>()?,
                    BRIDGE_QUAD.to_vec(),
                )
            };

        let mut face = Face::with_attributes(local.iter().map(VH::from).collect(), &attr);
        // The new face must run along `a` opposite to the owning face.
        let lx = corners.iter().position(|(v, _)| shared.coincident(*v, own.x));
        let ly = corners.iter().position(|(v, _)| shared.coincident(*v, own.y));
        if let (Some(lx), Some(ly)) = (lx, ly) {
            let (lx, ly) = (VH::from(lx), VH::from(ly));
            if face.edges().iter().any(|e| e.x == lx && e.y == ly) {
                face.reverse();
            }
        }
        let positions: Vec<Vec3> = corners.iter().map(|(v, _)| self.vertices()[v.slot()]).collect();
        let hints: Vec<SharedHint> = corners.iter().map(|(_, g)| SharedHint::Existing(*g)).collect();
        let added = self.insert_faces(vec![FaceInsert {
            positions,
            face,
            hints,
        }])?;
        self.rebuild_caches();
        self.notify(MeshEvent::TopologyChanged);
        added.first().copied().ok_or(Error::FaceAlreadyExists(a, b))
    }
}

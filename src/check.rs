use crate::{
    element::FH,
    error::Error,
    mesh::{EditMesh, MeshEvent},
    shared::SharedIndices,
};

fn check_faces(mesh: &EditMesh) -> Result<(), Error> {
    let nverts = mesh.num_vertices();
    for (fi, face) in mesh.faces().iter().enumerate() {
        if !face.is_valid() {
            return Err(Error::InvalidFaceIndices {
                count: face.indices().len(),
                distinct: face.distinct_indices().len(),
            });
        }
        if let Some(v) = face.indices().iter().find(|v| v.slot() >= nverts) {
            log::debug!("Face {} references {}", FH::from(fi), v);
            return Err(Error::VertexOutOfBounds(*v));
        }
        if face.colors().len() != face.indices().len() {
            return Err(Error::MismatchedArrayLengths(
                face.colors().len(),
                face.indices().len(),
            ));
        }
    }
    Ok(())
}

fn check_unique(mesh: &EditMesh) -> Result<(), Error> {
    let unique = mesh.unique_indices();
    if unique.len() != mesh.shared().len() {
        return Err(Error::StaleUniqueIndices);
    }
    for ((_, group), first) in mesh.shared().groups().zip(unique.iter()) {
        if group.first() != Some(first) {
            return Err(Error::StaleUniqueIndices);
        }
    }
    Ok(())
}

impl EditMesh {
    /**
     * Check the consistency of the mesh: every face index is in range, every
     * slot belongs to exactly one shared group, no group is empty, and the
     * unique index cache is current. Returns the first violation found.
     */
    pub fn check_topology(&self) -> Result<(), Error> {
        check_faces(self)?;
        self.shared().check_partition(self.num_vertices())?;
        check_unique(self)
    }

    /**
     * Repair the mesh if it is inconsistent. Faces that are invalid or
     * reference missing slots are dropped, and if the shared registry does
     * not partition the slots it is rebuilt from the positions. Returns true
     * if anything was repaired.
     */
    pub fn verify(&mut self) -> Result<bool, Error> {
        if self.check_topology().is_ok() {
            return Ok(false);
        }
        let nverts = self.num_vertices();
        let bad: Vec<FH> = self
            .faces()
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_valid() || f.indices().iter().any(|v| v.slot() >= nverts))
            .map(|(i, _)| FH::from(i))
            .collect();
        if !bad.is_empty() {
            log::warn!("Dropping {} broken faces", bad.len());
            self.drop_faces_keep_slots(&bad);
        }
        if let Err(e) = self.shared().check_partition(self.num_vertices()) {
            log::warn!("Rebuilding the shared index registry: {e}");
            let eps = self.config().position_epsilon;
            let shared = SharedIndices::from_positions(self.vertices(), eps);
            self.replace_shared(shared);
        }
        self.rebuild_caches();
        self.check_topology()?;
        self.notify(MeshEvent::TopologyChanged);
        Ok(true)
    }
}

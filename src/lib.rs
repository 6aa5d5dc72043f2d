/*!
A polygon mesh editing kernel for triangulated meshes, in the style of the
modelling tools found in level editors.

# Overview

+ A mesh is an array of vertex positions and a list of faces. Each face is a
  list of triangles over vertex slots, along with material, UV, smoothing and
  colour attributes.

+ Faces never share vertex slots. Adjacent faces each own a copy of every
  vertex on their common border, so each face can have its own UVs, colours
  and hard edges. A [`SharedIndices`] registry partitions the slots into
  groups of coincident vertices, and every topological query, such as finding
  the faces around an edge, goes through this registry.

+ Editing operators live directly on [`EditMesh`]:

  + Extrude faces or edges ([`EditMesh::extrude_faces`],
    [`EditMesh::extrude_edges`]).

  + Bridge two edges with a new face ([`EditMesh::bridge`]).

  + Connect edges or vertices across a face, subdivide and poke faces
    ([`EditMesh::connect_edges`], [`EditMesh::connect_vertices`],
    [`EditMesh::subdivide`]). These need the `subdiv` feature, which is on by
    default.

  + Merge, weld and split vertices, remove degenerate triangles and combine
    meshes ([`EditMesh::merge_vertices`], [`EditMesh::weld_vertices`],
    [`EditMesh::split_vertices`], [`EditMesh::remove_degenerate_triangles`],
    [`EditMesh::combine`]).

+ Every operator either succeeds or returns an [`Error`] without modifying
  the mesh. Batch connections apply the items that succeed and skip the
  ones that fail. Registered [`MeshObserver`]s are notified once at the end of every
  successful mutation.
*/

mod bridge;
mod check;
mod config;
mod edge;
mod edit;
mod element;
mod error;
mod extrude;
mod face;
mod macros;
mod math;
mod mesh;
mod primitive;
mod shared;
#[cfg(feature = "subdiv")]
mod subdiv;
mod topol;
pub mod triangulate;

pub use config::EditConfig;
pub use edge::Edge;
pub use element::{FH, GH, Handle, VH};
pub use error::Error;
pub use face::{
    Color32, Face, FaceAttributes, HARD_RANGE, MaterialId, SMOOTH_RANGE, SMOOTHING_NONE,
    UvSettings,
};
pub use mesh::{EditMesh, FaceInsert, MeshEvent, MeshObserver};
pub use primitive::{TRIANGLES_CUBE, VERTICES_CUBE};
pub use shared::{SharedHint, SharedIndices};
#[cfg(feature = "subdiv")]
pub use subdiv::{EdgeConnection, VertexConnection};

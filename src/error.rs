use thiserror::Error;

use crate::{
    edge::Edge,
    element::{FH, GH, VH},
};

#[derive(Debug, Error)]
pub enum Error {
    // Access.
    #[error("vertex {0} is out of bounds")]
    VertexOutOfBounds(VH),
    #[error("face {0} does not exist")]
    InvalidFace(FH),
    #[error("edge {0} does not belong to any face")]
    EdgeNotFound(Edge),
    #[error("mismatched array lengths {0} and {1}")]
    MismatchedArrayLengths(usize, usize),
    // Faces.
    #[error("face has {count} indices referencing {distinct} distinct vertices")]
    InvalidFaceIndices { count: usize, distinct: usize },
    #[error("face index {index} is out of bounds for {count} appended positions")]
    FaceIndexOutOfBounds { index: u32, count: usize },
    #[error("{0} points cannot form quads, expected a multiple of 4")]
    IncorrectNumberOfPoints(usize),
    // Selections.
    #[error("at least {required} elements are required, found {found}")]
    InsufficientSelection { required: usize, found: usize },
    #[error("the selection does not have any perimeter edges")]
    NoPerimeterEdges,
    #[error("edge {0} is not on the perimeter")]
    NotPerimeterEdge(Edge),
    #[error("a face already spans edges {0} and {1}")]
    FaceAlreadyExists(Edge, Edge),
    #[error("none of the connections are valid")]
    NoValidConnections,
    #[error("cannot combine an empty list of meshes")]
    NothingToCombine,
    // Geometry.
    #[error("triangulation failed for {0} points")]
    TriangulationFailed(usize),
    #[error("could not sort the points of face {0} into quadrants")]
    QuadrantAssignmentFailed(FH),
    #[error("point {0} does not lie on the face")]
    PointOutsideFace(usize),
    #[error("vertex {0} is not on face {1}")]
    VertexNotOnFace(VH, FH),
    // Shared index registry.
    #[error("vertex {0} does not belong to any shared group")]
    UngroupedVertex(VH),
    #[error("vertex {0} belongs to more than one shared group")]
    DuplicateGroupMember(VH),
    #[error("shared group {0} is empty")]
    EmptyGroup(GH),
    #[error("shared group {0} does not exist")]
    InvalidGroup(GH),
    #[error("unique index cache is out of date")]
    StaleUniqueIndices,
}

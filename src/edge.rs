use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{
    element::{GH, Handle, VH},
    shared::SharedIndices,
};

/**
 * A pair of vertex slots.
 *
 * Raw equality ignores the order of the slots. Use [`Edge::eq_shared`] to
 * compare edges by their shared groups instead.
 */
#[derive(Copy, Clone, Debug)]
pub struct Edge {
    pub x: VH,
    pub y: VH,
}

impl Edge {
    pub fn new(x: impl Into<VH>, y: impl Into<VH>) -> Self {
        Edge {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Same edge running the other way.
    pub fn flipped(self) -> Self {
        Edge {
            x: self.y,
            y: self.x,
        }
    }

    pub fn contains(&self, v: VH) -> bool {
        self.x == v || self.y == v
    }

    /// Check if either endpoint is coincident with `v`.
    pub fn contains_shared(&self, v: VH, shared: &SharedIndices) -> bool {
        shared.coincident(self.x, v) || shared.coincident(self.y, v)
    }

    /// Compare endpoints through the shared registry, in either order.
    pub fn eq_shared(&self, other: &Edge, shared: &SharedIndices) -> bool {
        (shared.coincident(self.x, other.x) && shared.coincident(self.y, other.y))
            || (shared.coincident(self.x, other.y) && shared.coincident(self.y, other.x))
    }

    /// The shared groups of the endpoints, sorted so that the result does
    /// not depend on the direction of the edge.
    pub fn to_groups(&self, shared: &SharedIndices) -> Option<(GH, GH)> {
        let a = shared.index_of(self.x)?;
        let b = shared.index_of(self.y)?;
        Some(if a <= b { (a, b) } else { (b, a) })
    }

    /// Check whether the edge runs between two distinct shared groups.
    pub fn is_valid(&self, shared: &SharedIndices) -> bool {
        !shared.coincident(self.x, self.y)
    }

    /**
     * Edges of a triangle list that are used by exactly one triangle, in the
     * direction the triangles wind them. For a consistently wound polygon
     * these form its boundary.
     */
    pub fn perimeter_of(indices: &[VH]) -> Vec<Edge> {
        let all: Vec<Edge> = indices
            .chunks_exact(3)
            .flat_map(|t| [Edge::new(t[0], t[1]), Edge::new(t[1], t[2]), Edge::new(t[2], t[0])])
            .collect();
        all.iter()
            .filter(|e| all.iter().filter(|o| *o == *e).count() % 2 == 1)
            .copied()
            .collect()
    }

    /// Flatten edges to their endpoints.
    pub fn all_slots(edges: &[Edge]) -> Vec<VH> {
        edges.iter().flat_map(|e| [e.x, e.y]).collect()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.x == other.x && self.y == other.y) || (self.x == other.y && self.y == other.x)
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (a, b) = if self.x <= self.y {
            (self.x, self.y)
        } else {
            (self.y, self.x)
        };
        a.hash(state);
        b.hash(state);
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x.index(), self.y.index())
    }
}

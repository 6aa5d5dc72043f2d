use std::fmt::{Debug, Display};

/**
 * All elements of the mesh implement this trait. They are identified by their
 * index.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex slot handle. A slot is one entry of the vertex array, several slots
 * can sit at the same position and be joined by a shared group.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Face handle. This is the position of the face in the face list.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

/**
 * Shared group handle. Identifies a group of coincident vertex slots in the
 * shared index registry.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GH {
    idx: u32,
}

impl Handle for VH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for VH {
    fn from(idx: u32) -> Self {
        VH { idx }
    }
}

impl From<&u32> for VH {
    fn from(idx: &u32) -> Self {
        VH { idx: *idx }
    }
}

impl From<usize> for VH {
    fn from(idx: usize) -> Self {
        VH { idx: idx as u32 }
    }
}

impl Handle for FH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for FH {
    fn from(idx: u32) -> Self {
        FH { idx }
    }
}

impl From<&u32> for FH {
    fn from(idx: &u32) -> Self {
        FH { idx: *idx }
    }
}

impl From<usize> for FH {
    fn from(idx: usize) -> Self {
        FH { idx: idx as u32 }
    }
}

impl Handle for GH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for GH {
    fn from(idx: u32) -> Self {
        GH { idx }
    }
}

impl From<usize> for GH {
    fn from(idx: usize) -> Self {
        GH { idx: idx as u32 }
    }
}

impl Display for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Display for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Display for GH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GH({})", self.index())
    }
}

impl Debug for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Debug for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Debug for GH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GH({})", self.index())
    }
}

impl VH {
    /// Index into a slice.
    pub(crate) fn slot(self) -> usize {
        self.idx as usize
    }

    /// Handle shifted by `offset` slots.
    pub(crate) fn offset(self, offset: u32) -> VH {
        VH {
            idx: self.idx + offset,
        }
    }
}

impl FH {
    pub(crate) fn slot(self) -> usize {
        self.idx as usize
    }
}

impl GH {
    pub(crate) fn slot(self) -> usize {
        self.idx as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn t_handle_display() {
        assert_eq!(format!("{}", VH::from(3u32)), "VH(3)");
        assert_eq!(format!("{:?}", FH::from(12u32)), "FH(12)");
        assert_eq!(format!("{}", GH::from(0usize)), "GH(0)");
    }

    #[test]
    fn t_handle_offset() {
        let v = VH::from(4u32);
        assert_eq!(v.offset(6).index(), 10);
        assert_eq!(v.slot(), 4);
    }
}

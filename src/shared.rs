use std::collections::HashMap;

use glam::Vec3;

use crate::{
    element::{GH, Handle, VH},
    error::Error,
};

/// Tells the registry which group a freshly appended vertex slot joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedHint {
    /// Join an existing group.
    Existing(GH),
    /// Start a new group containing only this slot.
    NewSingleton,
    /// Start a new group shared with every other slot carrying the same tag
    /// in the same append call.
    NewBatch(u32),
}

/**
 * Partition of the vertex slots into groups of coincident vertices.
 *
 * Each slot belongs to exactly one group, and no group is empty. Group ids are
 * dense, so removing a group shifts the ids of the groups after it. Group
 * handles are therefore only valid until the next mutation.
 */
#[derive(Debug, Clone, Default)]
pub struct SharedIndices {
    groups: Vec<Vec<VH>>,
    lookup: Vec<Option<GH>>,
}

/// Bit pattern key of a position, with negative zero folded into zero.
fn exact_key(p: Vec3) -> [u32; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

impl SharedIndices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from explicit groups. Empty groups are dropped.
    pub fn from_groups(groups: Vec<Vec<VH>>) -> Self {
        let mut out = SharedIndices {
            groups,
            lookup: Vec::new(),
        };
        out.prune();
        out
    }

    /// Each slot in its own group.
    pub fn singletons(num_slots: usize) -> Self {
        Self::from_groups((0..num_slots).map(|i| vec![VH::from(i)]).collect())
    }

    /**
     * Group slots by position. With `epsilon == None` only bitwise equal
     * positions are grouped, otherwise a slot joins the first group whose
     * first position is within `epsilon`.
     */
    pub fn from_positions(positions: &[Vec3], epsilon: Option<f32>) -> Self {
        let mut groups: Vec<Vec<VH>> = Vec::new();
        match epsilon {
            None => {
                let mut map: HashMap<[u32; 3], usize> = HashMap::with_capacity(positions.len());
                for (i, p) in positions.iter().enumerate() {
                    let gi = *map.entry(exact_key(*p)).or_insert_with(|| {
                        groups.push(Vec::new());
                        groups.len() - 1
                    });
                    groups[gi].push(VH::from(i));
                }
            }
            Some(eps) => {
                let mut reps: Vec<Vec3> = Vec::new();
                for (i, p) in positions.iter().enumerate() {
                    match reps.iter().position(|r| r.distance(*p) <= eps) {
                        Some(gi) => groups[gi].push(VH::from(i)),
                        None => {
                            reps.push(*p);
                            groups.push(vec![VH::from(i)]);
                        }
                    }
                }
            }
        }
        Self::from_groups(groups)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of slots across all groups.
    pub fn num_slots(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }

    pub fn groups(&self) -> impl Iterator<Item = (GH, &[VH])> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (GH::from(i), g.as_slice()))
    }

    pub fn group(&self, g: GH) -> Option<&[VH]> {
        self.groups.get(g.slot()).map(|g| g.as_slice())
    }

    /// The group containing `v`, if any.
    pub fn index_of(&self, v: VH) -> Option<GH> {
        self.lookup.get(v.slot()).copied().flatten()
    }

    /// Check whether two slots are in the same group.
    pub fn coincident(&self, a: VH, b: VH) -> bool {
        a == b
            || match (self.index_of(a), self.index_of(b)) {
                (Some(ga), Some(gb)) => ga == gb,
                _ => false,
            }
    }

    /// First member of every group, in group order.
    pub fn unique_indices(&self) -> Vec<VH> {
        self.groups.iter().filter_map(|g| g.first().copied()).collect()
    }

    /// Every slot that shares a group with any of `slots`, sorted and
    /// deduplicated. Slots without a group are returned as is.
    pub fn slots_sharing(&self, slots: &[VH]) -> Vec<VH> {
        let mut out = Vec::with_capacity(slots.len());
        for &v in slots {
            match self.index_of(v) {
                Some(g) => out.extend_from_slice(&self.groups[g.slot()]),
                None => out.push(v),
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Distinct groups touched by `slots`, in order of first appearance.
    pub fn groups_of(&self, slots: &[VH]) -> Vec<GH> {
        let mut out: Vec<GH> = Vec::new();
        for g in slots.iter().filter_map(|v| self.index_of(*v)) {
            if !out.contains(&g) {
                out.push(g);
            }
        }
        out
    }

    /**
     * Move the given slots into one new group, appended at the end. Returns
     * `None` if fewer than two distinct slots are given.
     */
    pub fn merge(&mut self, slots: &[VH]) -> Option<GH> {
        let mut slots = slots.to_vec();
        slots.sort();
        slots.dedup();
        if slots.len() < 2 {
            return None;
        }
        self.detach(&slots);
        self.groups.push(slots);
        self.prune();
        Some(GH::from(self.groups.len() - 1))
    }

    /**
     * Move `b` into the group of `a`. Returns the resulting group, or `None`
     * if `a` has no group.
     */
    pub fn merge_pair(&mut self, a: VH, b: VH) -> Option<GH> {
        let ga = self.index_of(a)?;
        if self.index_of(b) == Some(ga) {
            return Some(ga);
        }
        self.detach(&[b]);
        self.groups[ga.slot()].push(b);
        self.prune();
        self.index_of(a)
    }

    /**
     * Put `v` in the group `target`, or in a new singleton group if `target`
     * is `None`. The slot leaves whatever group it was in before. Returns the
     * group the slot ends up in.
     */
    pub fn add(&mut self, target: Option<GH>, v: VH) -> Result<GH, Error> {
        if let Some(g) = target {
            if g.slot() >= self.groups.len() {
                return Err(Error::InvalidGroup(g));
            }
        }
        self.detach(&[v]);
        match target {
            Some(g) => self.groups[g.slot()].push(v),
            None => self.groups.push(vec![v]),
        }
        self.prune();
        self.index_of(v).ok_or(Error::UngroupedVertex(v))
    }

    /**
     * Register the slots `first, first + 1, ...` according to `hints`. Slots
     * with the same batch tag share one new group. The hints are validated
     * before the registry is touched.
     */
    pub fn append_hinted(&mut self, first: VH, hints: &[SharedHint]) -> Result<(), Error> {
        if let Some(g) = hints.iter().find_map(|h| match h {
            SharedHint::Existing(g) if g.slot() >= self.groups.len() => Some(*g),
            _ => None,
        }) {
            return Err(Error::InvalidGroup(g));
        }
        let slots: Vec<VH> = (0..hints.len() as u32).map(|i| first.offset(i)).collect();
        self.detach(&slots);
        let mut batches: HashMap<u32, usize> = HashMap::new();
        for (v, hint) in slots.into_iter().zip(hints.iter()) {
            match hint {
                SharedHint::Existing(g) => self.groups[g.slot()].push(v),
                SharedHint::NewSingleton => self.groups.push(vec![v]),
                SharedHint::NewBatch(tag) => match batches.get(tag) {
                    Some(gi) => self.groups[*gi].push(v),
                    None => {
                        batches.insert(*tag, self.groups.len());
                        self.groups.push(vec![v]);
                    }
                },
            }
        }
        self.prune();
        Ok(())
    }

    /// Drop the given slots from their groups. Other slots keep their indices.
    pub fn remove(&mut self, slots: &[VH]) {
        self.detach(slots);
        self.prune();
    }

    /**
     * Drop the given slots and renumber the remaining ones so they stay
     * consistent with a vertex array from which `removed` was deleted. Every
     * surviving slot moves down by the number of removed slots below it.
     */
    pub fn remove_and_shift(&mut self, removed: &[VH]) {
        let mut removed = removed.to_vec();
        removed.sort();
        removed.dedup();
        self.detach(&removed);
        for group in self.groups.iter_mut() {
            for v in group.iter_mut() {
                let below = removed.partition_point(|r| r < v) as u32;
                *v = VH::from(v.index() - below);
            }
        }
        self.prune();
    }

    /// Every slot in any group touched by `slots` becomes its own singleton.
    pub fn split(&mut self, slots: &[VH]) {
        let touched = self.slots_sharing(slots);
        self.detach(&touched);
        self.groups.extend(touched.into_iter().map(|v| vec![v]));
        self.prune();
    }

    /// Copy with every slot moved up by `offset`.
    pub fn shifted(&self, offset: u32) -> Self {
        Self::from_groups(
            self.groups
                .iter()
                .map(|g| g.iter().map(|v| v.offset(offset)).collect())
                .collect(),
        )
    }

    /// Append the groups of `other` after the groups of this registry.
    pub fn extend(&mut self, other: &SharedIndices) {
        self.groups.extend(other.groups.iter().cloned());
        self.prune();
    }

    /**
     * Check that the registry partitions the slot range `0..num_slots`: every
     * slot in exactly one group, no empty groups, nothing out of range.
     */
    pub fn check_partition(&self, num_slots: usize) -> Result<(), Error> {
        let mut seen = vec![false; num_slots];
        for (g, members) in self.groups() {
            if members.is_empty() {
                return Err(Error::EmptyGroup(g));
            }
            for &v in members {
                match seen.get_mut(v.slot()) {
                    None => return Err(Error::VertexOutOfBounds(v)),
                    Some(s) if *s => return Err(Error::DuplicateGroupMember(v)),
                    Some(s) => *s = true,
                }
            }
        }
        match seen.iter().position(|s| !s) {
            Some(i) => Err(Error::UngroupedVertex(VH::from(i))),
            None => Ok(()),
        }
    }

    /// Take the slots out of their groups without pruning.
    fn detach(&mut self, slots: &[VH]) {
        for v in slots {
            if let Some(g) = self.index_of(*v) {
                self.groups[g.slot()].retain(|x| x != v);
                self.lookup[v.slot()] = None;
            }
        }
    }

    /// Remove empty groups and rebuild the slot lookup.
    fn prune(&mut self) {
        self.groups.retain(|g| !g.is_empty());
        let len = self
            .groups
            .iter()
            .flat_map(|g| g.iter())
            .map(|v| v.slot() + 1)
            .max()
            .unwrap_or(0);
        self.lookup.clear();
        self.lookup.resize(len, None);
        for (gi, group) in self.groups.iter().enumerate() {
            for v in group {
                self.lookup[v.slot()] = Some(GH::from(gi));
            }
        }
    }
}

#[cfg(test)]
mod test {
    use glam::vec3;

    use super::*;

    fn vhs(idx: &[u32]) -> Vec<VH> {
        idx.iter().map(VH::from).collect()
    }

    #[test]
    fn t_merge_prunes_empty_groups() {
        let mut shared = SharedIndices::from_groups(vec![vhs(&[0, 4]), vhs(&[1]), vhs(&[2, 3])]);
        let g = shared.merge(&vhs(&[1, 2])).expect("Unable to merge");
        assert_eq!(shared.len(), 3);
        assert_eq!(g, GH::from(2u32));
        assert_eq!(shared.group(g).expect("Missing group"), vhs(&[1, 2]).as_slice());
        assert_eq!(shared.index_of(VH::from(3u32)), Some(GH::from(1u32)));
        assert!(shared.merge(&vhs(&[1, 1])).is_none());
        shared.check_partition(5).expect("Registry is not a partition");
    }

    #[test]
    fn t_merge_pair() {
        let mut shared = SharedIndices::singletons(4);
        let g = shared
            .merge_pair(VH::from(0u32), VH::from(3u32))
            .expect("Unable to merge pair");
        assert_eq!(shared.len(), 3);
        assert!(shared.coincident(VH::from(0u32), VH::from(3u32)));
        assert_eq!(shared.index_of(VH::from(3u32)), Some(g));
    }

    #[test]
    fn t_merge_pair_then_split() {
        let mut shared = SharedIndices::singletons(3);
        let (a, b) = (VH::from(0u32), VH::from(2u32));
        shared.merge_pair(a, b).expect("Unable to merge pair");
        assert_eq!(shared.len(), 2);
        shared.split(&[a]);
        assert_eq!(shared.len(), 3);
        assert!(!shared.coincident(a, b));
        for v in vhs(&[0, 1, 2]) {
            let g = shared.index_of(v).expect("Missing group");
            assert_eq!(shared.group(g).expect("Missing group"), &[v]);
        }
        shared.check_partition(3).expect("Registry is not a partition");
    }

    #[test]
    fn t_append_hinted_batches() {
        let mut shared = SharedIndices::singletons(2);
        shared
            .append_hinted(
                VH::from(2u32),
                &[
                    SharedHint::Existing(GH::from(0u32)),
                    SharedHint::NewBatch(7),
                    SharedHint::NewSingleton,
                    SharedHint::NewBatch(7),
                ],
            )
            .expect("Unable to append");
        shared.check_partition(6).expect("Registry is not a partition");
        assert!(shared.coincident(VH::from(0u32), VH::from(2u32)));
        assert!(shared.coincident(VH::from(3u32), VH::from(5u32)));
        assert!(!shared.coincident(VH::from(3u32), VH::from(4u32)));
        assert_eq!(shared.len(), 4);
    }

    #[test]
    fn t_append_rejects_bad_group() {
        let mut shared = SharedIndices::singletons(2);
        assert!(
            shared
                .append_hinted(VH::from(2u32), &[SharedHint::Existing(GH::from(9u32))])
                .is_err()
        );
        assert_eq!(shared.num_slots(), 2);
    }

    #[test]
    fn t_remove_and_shift() {
        let mut shared = SharedIndices::from_groups(vec![vhs(&[0, 5]), vhs(&[1, 2]), vhs(&[3, 4])]);
        shared.remove_and_shift(&vhs(&[2, 1]));
        assert_eq!(shared.len(), 2);
        assert_eq!(shared.group(GH::from(0u32)).expect("Missing"), vhs(&[0, 3]).as_slice());
        assert_eq!(shared.group(GH::from(1u32)).expect("Missing"), vhs(&[1, 2]).as_slice());
        shared.check_partition(4).expect("Registry is not a partition");
    }

    #[test]
    fn t_from_positions() {
        let pos = [
            vec3(0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(-0.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.001),
        ];
        let exact = SharedIndices::from_positions(&pos, None);
        assert_eq!(exact.len(), 3);
        assert!(exact.coincident(VH::from(0u32), VH::from(2u32)));
        let loose = SharedIndices::from_positions(&pos, Some(0.01));
        assert_eq!(loose.len(), 2);
        assert!(loose.coincident(VH::from(1u32), VH::from(3u32)));
    }

    #[test]
    fn t_split_detaches_groups() {
        let mut shared = SharedIndices::from_groups(vec![vhs(&[0, 1, 2]), vhs(&[3, 4])]);
        shared.split(&vhs(&[1]));
        assert_eq!(shared.len(), 4);
        assert!(!shared.coincident(VH::from(0u32), VH::from(2u32)));
        assert!(shared.coincident(VH::from(3u32), VH::from(4u32)));
        shared.check_partition(5).expect("Registry is not a partition");
    }

    #[test]
    fn t_unique_indices() {
        let shared = SharedIndices::from_groups(vec![vhs(&[3, 0]), vec![], vhs(&[1, 2])]);
        assert_eq!(shared.unique_indices(), vhs(&[3, 1]));
        assert!(shared.check_partition(4).is_ok());
        assert!(matches!(
            shared.check_partition(5),
            Err(Error::UngroupedVertex(_))
        ));
    }
}

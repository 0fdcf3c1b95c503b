//! O(1) removable set over a dense integer universe.

/// A pool of node ids `0..n` supporting constant-time removal by id or by
/// slot, with no reallocation.
///
/// Live members occupy `ids[..len]`; removal swaps the target with the last
/// live member and shrinks `len`. `slots` maps every id to its current slot,
/// so removed ids stay addressable (they sit past `len`).
#[derive(Debug, Clone)]
pub struct SwapRemoveIndexSet {
    ids: Vec<usize>,
    slots: Vec<usize>,
    len: usize,
}

impl SwapRemoveIndexSet {
    /// A set holding every id in `0..n`.
    pub fn full(n: usize) -> Self {
        Self {
            ids: (0..n).collect(),
            slots: (0..n).collect(),
            len: n,
        }
    }

    /// Number of ids not yet removed.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `id` is still a member.
    #[inline]
    pub fn contains(&self, id: usize) -> bool {
        self.slots.get(id).is_some_and(|&slot| slot < self.len)
    }

    /// The id in the first slot, if any.
    #[inline]
    pub fn peek(&self) -> Option<usize> {
        if self.len == 0 { None } else { Some(self.ids[0]) }
    }

    /// Remove and return the id in the first slot.
    pub fn pop(&mut self) -> Option<usize> {
        let id = self.peek()?;
        self.remove_at(0);
        Some(id)
    }

    /// Remove `id`. Returns `false` if it was not a member.
    pub fn remove_by_id(&mut self, id: usize) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.remove_at(self.slots[id]).is_some()
    }

    /// Remove the member in `slot`, returning its id. Out-of-range slots
    /// (including slots of already removed ids) are ignored.
    pub fn remove_at(&mut self, slot: usize) -> Option<usize> {
        if slot >= self.len {
            return None;
        }
        self.len -= 1;
        let last = self.len;
        let id = self.ids[slot];
        let moved = self.ids[last];

        self.ids.swap(slot, last);
        self.slots[moved] = slot;
        self.slots[id] = last;
        Some(id)
    }

    /// The id in `slot`, if that slot is live.
    #[inline]
    pub fn get(&self, slot: usize) -> Option<usize> {
        if slot < self.len { Some(self.ids[slot]) } else { None }
    }

    /// Iterate over the live ids in slot order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.ids[..self.len].iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_consistent(set: &SwapRemoveIndexSet, expected: &HashSet<usize>) {
        assert_eq!(set.len(), expected.len());
        let live: Vec<usize> = set.iter().collect();
        let unique: HashSet<usize> = live.iter().copied().collect();
        assert_eq!(unique.len(), live.len(), "duplicate id in {live:?}");
        assert_eq!(&unique, expected);
        for id in expected {
            assert!(set.contains(*id));
        }
    }

    #[test]
    fn pop_drains_every_id_once() {
        let mut set = SwapRemoveIndexSet::full(5);
        let mut seen = Vec::new();
        while let Some(id) = set.pop() {
            seen.push(id);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(set.is_empty());
        assert_eq!(set.peek(), None);
    }

    #[test]
    fn remove_by_id_uses_back_mapping() {
        let mut set = SwapRemoveIndexSet::full(6);
        assert!(set.remove_by_id(2));
        assert!(!set.contains(2));
        assert!(!set.remove_by_id(2));
        // The last id was swapped into slot 2.
        assert_eq!(set.get(2), Some(5));
        assert!(set.remove_by_id(5));
        assert!(set.remove_by_id(0));
        let expected: HashSet<usize> = [1, 3, 4].into_iter().collect();
        assert_consistent(&set, &expected);
    }

    #[test]
    fn remove_at_ignores_dead_slots() {
        let mut set = SwapRemoveIndexSet::full(3);
        assert_eq!(set.remove_at(2), Some(2));
        assert_eq!(set.remove_at(2), None);
        assert_eq!(set.remove_at(7), None);
        assert!(!set.remove_by_id(9));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn mixed_removals_leave_no_gaps_or_duplicates() {
        let n = 64;
        let mut set = SwapRemoveIndexSet::full(n);
        let mut expected: HashSet<usize> = (0..n).collect();

        for step in 0..40usize {
            match step % 3 {
                0 => {
                    let id = (step * 7) % n;
                    assert_eq!(set.remove_by_id(id), expected.remove(&id));
                }
                1 => {
                    let slot = (step * 5) % (set.len() + 1);
                    if let Some(id) = set.remove_at(slot) {
                        assert!(expected.remove(&id));
                    } else {
                        assert!(slot >= set.len());
                    }
                }
                _ => {
                    if let Some(id) = set.pop() {
                        assert!(expected.remove(&id));
                    }
                }
            }
            assert_consistent(&set, &expected);
        }
    }
}

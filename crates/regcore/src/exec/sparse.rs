//! Sparse set of instruction pointers.
//!
//! Insertion, membership and clearing are all constant time, and iteration
//! follows insertion order.

use crate::program::InstPtr;

#[derive(Debug, Clone, Default)]
pub(crate) struct SparseSet {
    dense: Vec<InstPtr>,
    sparse: Vec<usize>,
}

impl SparseSet {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            sparse: vec![0; capacity],
        }
    }

    pub(crate) fn resize(&mut self, capacity: usize) {
        self.dense.clear();
        self.dense.reserve(capacity);
        self.sparse.clear();
        self.sparse.resize(capacity, 0);
    }

    pub(crate) fn capacity(&self) -> usize {
        self.sparse.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.dense.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub(crate) fn contains(&self, pc: InstPtr) -> bool {
        self.sparse
            .get(pc)
            .is_some_and(|&i| self.dense.get(i) == Some(&pc))
    }

    /// Insert `pc`, returning false if it was already present.
    pub(crate) fn insert(&mut self, pc: InstPtr) -> bool {
        if self.contains(pc) {
            return false;
        }
        self.sparse[pc] = self.dense.len();
        self.dense.push(pc);
        true
    }

    /// The `i`th inserted member.
    pub(crate) fn get(&self, i: usize) -> InstPtr {
        self.dense[i]
    }

    pub(crate) fn clear(&mut self) {
        self.dense.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_contains() {
        let mut set = SparseSet::new(8);
        assert!(set.is_empty());
        assert!(set.insert(5));
        assert!(set.insert(2));
        assert!(!set.insert(5));
        assert!(set.contains(2));
        assert!(!set.contains(3));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), 5);
        assert_eq!(set.get(1), 2);
    }

    #[test]
    fn clear_forgets_members() {
        let mut set = SparseSet::new(4);
        set.insert(1);
        set.insert(3);
        set.clear();
        assert!(!set.contains(1));
        assert!(set.insert(3));
        assert_eq!(set.get(0), 3);
    }

    #[test]
    fn resize_changes_capacity() {
        let mut set = SparseSet::new(2);
        set.insert(1);
        set.resize(10);
        assert_eq!(set.capacity(), 10);
        assert!(set.is_empty());
        assert!(set.insert(9));
    }
}

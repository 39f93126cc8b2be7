//! Thread lists and the POSIX preference order between threads.

use std::cmp::Ordering;

use super::history::History;
use super::sparse::SparseSet;
use crate::program::{InstPtr, Tag};

/// A capture slot: the offset recorded by a `Save`, if any.
pub(crate) type Slot = Option<usize>;

/// The active threads at one text position, one per instruction, each with
/// its own capture slots.
#[derive(Debug, Clone, Default)]
pub(crate) struct Threads {
    set: SparseSet,
    slots: Vec<Slot>,
    stride: usize,
}

impl Threads {
    pub(crate) fn new(len: usize, stride: usize) -> Self {
        Self {
            set: SparseSet::new(len),
            slots: vec![None; len * stride],
            stride,
        }
    }

    pub(crate) fn resize(&mut self, len: usize, stride: usize) {
        if self.set.capacity() == len && self.stride == stride {
            self.set.clear();
            return;
        }
        self.set.resize(len);
        self.slots.clear();
        self.slots.resize(len * stride, None);
        self.stride = stride;
    }

    pub(crate) fn len(&self) -> usize {
        self.set.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// The instruction of the `i`th thread, in insertion order.
    pub(crate) fn pc(&self, i: usize) -> InstPtr {
        self.set.get(i)
    }

    /// Claim `pc`, returning false if a thread already occupies it.
    pub(crate) fn insert(&mut self, pc: InstPtr) -> bool {
        self.set.insert(pc)
    }

    pub(crate) fn slots(&self, pc: InstPtr) -> &[Slot] {
        &self.slots[pc * self.stride..(pc + 1) * self.stride]
    }

    pub(crate) fn slots_mut(&mut self, pc: InstPtr) -> &mut [Slot] {
        &mut self.slots[pc * self.stride..(pc + 1) * self.stride]
    }

    pub(crate) fn clear(&mut self) {
        self.set.clear();
    }
}

/// Whether `candidate` is preferred over `incumbent` at offset `at`.
///
/// The slots named by `tags` are compared in order, whole match first. For
/// a group, one that has started beats one that has not; an earlier start
/// wins; at equal starts the further end wins, an open group extending to
/// `at`. Repetition histories are compared by [`History::compare`]. Ties
/// keep the incumbent.
pub(crate) fn preferred(
    candidate: &[Slot],
    incumbent: &[Slot],
    at: usize,
    tags: &[Tag],
    history: &History,
) -> bool {
    for tag in tags {
        let order = match *tag {
            Tag::Group(slot) => group_order(
                &candidate[slot..slot + 2],
                &incumbent[slot..slot + 2],
                at,
            ),
            Tag::Iteration(slot) => history.compare(candidate[slot], incumbent[slot]),
        };
        match order {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
    }
    false
}

fn group_order(candidate: &[Slot], incumbent: &[Slot], at: usize) -> Ordering {
    match (candidate[0], incumbent[0]) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (Some(cs), Some(is)) => is.cmp(&cs).then_with(|| {
            candidate[1]
                .unwrap_or(at)
                .cmp(&incumbent[1].unwrap_or(at))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPS: [Tag; 2] = [Tag::Group(0), Tag::Group(2)];

    fn preferred(candidate: &[Slot], incumbent: &[Slot], at: usize) -> bool {
        let tags = &GROUPS[..candidate.len() / 2];
        super::preferred(candidate, incumbent, at, tags, &History::default())
    }

    #[test]
    fn earlier_start_wins() {
        let a = [Some(0), None];
        let b = [Some(1), None];
        assert!(preferred(&a, &b, 3));
        assert!(!preferred(&b, &a, 3));
    }

    #[test]
    fn longer_end_wins_at_equal_start() {
        let a = [Some(0), Some(3), Some(0), Some(2)];
        let b = [Some(0), Some(3), Some(0), Some(1)];
        assert!(preferred(&a, &b, 3));
        assert!(!preferred(&b, &a, 3));
    }

    #[test]
    fn open_group_extends_to_position() {
        let open = [Some(0), None, Some(1), None];
        let closed = [Some(0), None, Some(1), Some(2)];
        assert!(preferred(&open, &closed, 4));
        assert!(!preferred(&open, &closed, 2));
    }

    #[test]
    fn started_beats_unstarted() {
        let started = [Some(0), None, Some(2), Some(2)];
        let unset = [Some(0), None, None, None];
        assert!(preferred(&started, &unset, 2));
        assert!(!preferred(&unset, &started, 2));
    }

    #[test]
    fn ties_keep_incumbent() {
        let a = [Some(0), Some(1)];
        assert!(!preferred(&a, &a, 1));
    }

    #[test]
    fn repetition_history_outranks_inner_groups() {
        let mut history = History::default();
        let first = history.push(4, None, 0);
        let long_first = history.push(4, Some(first), 2);
        let short_first = history.push(4, Some(first), 1);
        let tags = [Tag::Group(0), Tag::Iteration(4), Tag::Group(2)];

        let a = [Some(0), None, Some(2), Some(3), Some(long_first)];
        let b = [Some(0), None, Some(1), Some(3), Some(short_first)];
        assert!(super::preferred(&a, &b, 3, &tags, &history));
        assert!(!super::preferred(&b, &a, 3, &tags, &history));
    }

    #[test]
    fn thread_slots_are_separate() {
        let mut threads = Threads::new(4, 2);
        assert!(threads.insert(3));
        threads.slots_mut(3)[0] = Some(7);
        assert_eq!(threads.slots(3), &[Some(7), None]);
        assert_eq!(threads.slots(2), &[None, None]);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads.pc(0), 3);
        threads.clear();
        assert!(threads.is_empty());
    }
}

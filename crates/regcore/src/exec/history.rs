//! Iteration histories of repetitions that contain capture groups.
//!
//! A thread keeps one node per tracked repetition: the start of its current
//! iteration, whose ancestors are the starts of the earlier ones. Nodes are
//! shared between threads and interned, so equal histories are the same
//! node and two histories part exactly where their node chains do.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::threads::{Slot, Threads};
use crate::program::Tag;

/// Collections never run below this many nodes.
const MIN_COLLECT: usize = 4096;

#[derive(Debug, Clone, Copy)]
struct Node {
    slot: usize,
    pos: usize,
    parent: Option<usize>,
    depth: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct History {
    nodes: Vec<Node>,
    interned: HashMap<(usize, Option<usize>, usize), usize>,
    /// History slots of the current program.
    slots: Vec<usize>,
    collect_at: usize,
}

impl History {
    /// Forget every node and track the history slots named by `tags`.
    pub(crate) fn reset(&mut self, tags: &[Tag]) {
        self.nodes.clear();
        self.interned.clear();
        self.slots.clear();
        self.slots.extend(tags.iter().filter_map(|tag| match *tag {
            Tag::Iteration(slot) => Some(slot),
            Tag::Group(_) => None,
        }));
        self.collect_at = MIN_COLLECT;
    }

    /// The node for an iteration of `slot` starting at `at` after `parent`.
    pub(crate) fn push(&mut self, slot: usize, parent: Slot, at: usize) -> usize {
        let nodes = &mut self.nodes;
        *self
            .interned
            .entry((slot, parent, at))
            .or_insert_with(|| {
                let depth = parent.map_or(0, |p| nodes[p].depth) + 1;
                nodes.push(Node {
                    slot,
                    pos: at,
                    parent,
                    depth,
                });
                nodes.len() - 1
            })
    }

    /// Whether the iteration at `node` began at `at` and followed another.
    pub(crate) fn is_empty_repeat(&self, node: usize, at: usize) -> bool {
        let node = self.nodes[node];
        node.pos == at && node.parent.is_some()
    }

    #[cfg(test)]
    pub(crate) fn nodes_len(&self) -> usize {
        self.nodes.len()
    }

    fn depth(&self, node: Slot) -> usize {
        node.map_or(0, |n| self.nodes[n].depth)
    }

    fn parent(&self, node: Slot) -> Slot {
        node.and_then(|n| self.nodes[n].parent)
    }

    /// Deepest node shared by both chains.
    fn common(&self, mut a: Slot, mut b: Slot) -> Slot {
        while self.depth(a) > self.depth(b) {
            a = self.parent(a);
        }
        while self.depth(b) > self.depth(a) {
            b = self.parent(b);
        }
        while a != b {
            a = self.parent(a);
            b = self.parent(b);
        }
        a
    }

    /// Compare two histories of one repetition; `Greater` prefers `a`.
    ///
    /// At the first iteration where they part, the one that ran longer
    /// wins: a history still inside that iteration beats one that went on
    /// to another, and otherwise the later next start wins. Any iteration
    /// beats none.
    pub(crate) fn compare(&self, a: Slot, b: Slot) -> Ordering {
        match (a, b) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(x), Some(y)) if x == y => return Ordering::Equal,
            (Some(_), Some(_)) => {}
        }

        let (mut a, mut b) = (a, b);
        let (mut a_next, mut b_next) = (None, None);
        while self.depth(a) > self.depth(b) {
            a_next = a;
            a = self.parent(a);
        }
        while self.depth(b) > self.depth(a) {
            b_next = b;
            b = self.parent(b);
        }
        while a != b {
            a_next = a;
            a = self.parent(a);
            b_next = b;
            b = self.parent(b);
        }

        match (a_next, b_next) {
            (Some(x), Some(y)) => self.nodes[x].pos.cmp(&self.nodes[y].pos),
            (None, _) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
        }
    }

    /// Drop nodes no live thread reaches, and shorten each repetition's
    /// chains to the part where live threads differ.
    ///
    /// Nodes every live history shares never decide a comparison, so the
    /// deepest shared node is relinked straight to its chain's root.
    pub(crate) fn collect(&mut self, threads: &mut Threads, best: &mut [Slot]) {
        if self.nodes.len() < self.collect_at.max(MIN_COLLECT) {
            return;
        }
        let before = self.nodes.len();

        let mut shared: Vec<Option<Slot>> = vec![None; self.slots.len()];
        let mut note = |history: &Self, slots: &[Slot]| {
            for (k, &slot) in history.slots.iter().enumerate() {
                if let Some(node) = slots[slot] {
                    shared[k] = Some(match shared[k] {
                        Some(seen) => history.common(seen, Some(node)),
                        None => Some(node),
                    });
                }
            }
        };
        for i in 0..threads.len() {
            note(self, threads.slots(threads.pc(i)));
        }
        note(self, best);

        let mut keep = vec![false; self.nodes.len()];
        let mut relink: Vec<Option<usize>> = vec![None; self.nodes.len()];
        for cut in shared.iter().flatten().flatten() {
            let mut root = *cut;
            while let Some(parent) = self.nodes[root].parent {
                root = parent;
            }
            keep[*cut] = true;
            keep[root] = true;
            if root != *cut {
                relink[*cut] = Some(root);
            }
        }
        let mut mark = |slots: &[Slot]| {
            for (k, &slot) in self.slots.iter().enumerate() {
                let stop = shared[k].flatten();
                let mut node = slots[slot];
                while let Some(n) = node {
                    if node == stop || keep[n] {
                        break;
                    }
                    keep[n] = true;
                    node = self.nodes[n].parent;
                }
            }
        };
        for i in 0..threads.len() {
            mark(threads.slots(threads.pc(i)));
        }
        mark(best);

        let mut remap: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut nodes: Vec<Node> = Vec::new();
        for (old, node) in self.nodes.iter().enumerate() {
            if !keep[old] {
                continue;
            }
            let parent = relink[old].or(node.parent).and_then(|p| remap[p]);
            let depth = parent.map_or(0, |p: usize| nodes[p].depth) + 1;
            remap[old] = Some(nodes.len());
            nodes.push(Node {
                parent,
                depth,
                ..*node
            });
        }

        let rewrite = |slots: &mut [Slot], history_slots: &[usize]| {
            for &slot in history_slots {
                slots[slot] = slots[slot].and_then(|n| remap[n]);
            }
        };
        for i in 0..threads.len() {
            let pc = threads.pc(i);
            rewrite(threads.slots_mut(pc), &self.slots);
        }
        rewrite(best, &self.slots);

        self.interned = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| ((node.slot, node.parent, node.pos), index))
            .collect();
        self.nodes = nodes;
        self.collect_at = 2 * self.nodes.len();
        tracing::trace!(before, after = self.nodes.len(), "collected iteration history");
    }
}

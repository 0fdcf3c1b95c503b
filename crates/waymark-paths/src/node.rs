use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

// ---------------------------------------------------------------------------
// SearchNode
// ---------------------------------------------------------------------------

/// Per-search bookkeeping for one graph node. Lives only as long as the
/// search that created it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SearchNode {
    pub(crate) cost: f32,
    pub(crate) heuristic: f32,
    pub(crate) parent: Option<usize>,
    pub(crate) closed: bool,
}

impl SearchNode {
    #[inline]
    pub(crate) fn total(&self) -> f32 {
        self.cost + self.heuristic
    }
}

/// Which score orders the open set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Priority {
    /// `cost + heuristic` (A*).
    Total,
    /// Accumulated cost only (uniform expansion).
    Cost,
    /// Heuristic only (greedy).
    Heuristic,
}

impl Priority {
    #[inline]
    fn key(self, cost: f32, heuristic: f32) -> f32 {
        match self {
            Priority::Total => cost + heuristic,
            Priority::Cost => cost,
            Priority::Heuristic => heuristic,
        }
    }
}

// ---------------------------------------------------------------------------
// NodeRef
// ---------------------------------------------------------------------------

/// Heap entry, ordered so `BinaryHeap` (a max-heap) pops the smallest key
/// first and, among equal keys, the earliest pushed.
#[derive(Clone, Copy, Debug)]
struct NodeRef {
    index: usize,
    key: f32,
    seq: u64,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .total_cmp(&self.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeRef {}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// Open and closed sets of a best-first search.
///
/// Improving an open node pushes a fresh heap entry; superseded entries are
/// recognised on pop by their stale key and skipped.
pub(crate) struct Frontier {
    priority: Priority,
    nodes: HashMap<usize, SearchNode>,
    open: BinaryHeap<NodeRef>,
    seq: u64,
}

impl Frontier {
    pub(crate) fn new(priority: Priority) -> Self {
        Self {
            priority,
            nodes: HashMap::new(),
            open: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Open `index` as a search root.
    pub(crate) fn seed(&mut self, index: usize, cost: f32, heuristic: f32) {
        self.nodes.insert(
            index,
            SearchNode {
                cost,
                heuristic,
                parent: None,
                closed: false,
            },
        );
        self.push(index, self.priority.key(cost, heuristic));
    }

    /// Open `index`, or improve it in place if it is open with a worse key.
    /// Closed nodes are never reopened. Returns whether anything changed.
    pub(crate) fn relax(&mut self, index: usize, cost: f32, heuristic: f32, parent: usize) -> bool {
        let key = self.priority.key(cost, heuristic);
        match self.nodes.get_mut(&index) {
            Some(node) if node.closed => return false,
            Some(node) => {
                if key >= self.priority.key(node.cost, node.heuristic) {
                    return false;
                }
                node.cost = cost;
                node.heuristic = heuristic;
                node.parent = Some(parent);
            }
            None => {
                self.nodes.insert(
                    index,
                    SearchNode {
                        cost,
                        heuristic,
                        parent: Some(parent),
                        closed: false,
                    },
                );
            }
        }
        self.push(index, key);
        true
    }

    /// Close and return the open node with the smallest key.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        while let Some(entry) = self.open.pop() {
            let Some(node) = self.nodes.get_mut(&entry.index) else {
                continue;
            };
            let live_key = self.priority.key(node.cost, node.heuristic);
            if node.closed || live_key.to_bits() != entry.key.to_bits() {
                continue;
            }
            node.closed = true;
            return Some(entry.index);
        }
        None
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&SearchNode> {
        self.nodes.get(&index)
    }

    #[inline]
    pub(crate) fn is_closed(&self, index: usize) -> bool {
        self.nodes.get(&index).is_some_and(|n| n.closed)
    }

    /// Every closed node with its bookkeeping, in no particular order.
    pub(crate) fn closed(&self) -> impl Iterator<Item = (usize, &SearchNode)> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.closed)
            .map(|(&i, n)| (i, n))
    }

    /// Node indices from `from` back to its root, following parent links.
    pub(crate) fn trace(&self, from: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = Some(from);
        // Parent links form a tree; the bound only guards against misuse.
        while let Some(i) = cur {
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(i);
            cur = self.nodes.get(&i).and_then(|n| n.parent);
        }
        out
    }

    fn push(&mut self, index: usize, key: f32) {
        let seq = self.seq;
        self.seq += 1;
        self.open.push(NodeRef { index, key, seq });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_lowest_key_first_then_fifo() {
        let mut f = Frontier::new(Priority::Total);
        f.seed(0, 0.0, 5.0);
        f.seed(1, 1.0, 1.0);
        f.seed(2, 0.0, 2.0);
        assert_eq!(f.pop(), Some(1));
        assert_eq!(f.pop(), Some(2));
        assert_eq!(f.pop(), Some(0));
        assert_eq!(f.pop(), None);
    }

    #[test]
    fn improving_an_open_node_skips_the_stale_entry() {
        let mut f = Frontier::new(Priority::Total);
        f.seed(0, 0.0, 0.0);
        assert_eq!(f.pop(), Some(0));
        assert!(f.relax(1, 10.0, 0.0, 0));
        assert!(f.relax(2, 4.0, 0.0, 0));
        // Worse update is rejected, better one replaces cost and parent.
        assert!(!f.relax(1, 12.0, 0.0, 0));
        assert!(f.relax(1, 3.0, 0.0, 2));
        assert_eq!(f.get(1).unwrap().parent, Some(2));

        assert_eq!(f.pop(), Some(1));
        assert_eq!(f.pop(), Some(2));
        assert_eq!(f.pop(), None);
        assert!(!f.relax(1, 0.0, 0.0, 0), "closed nodes stay closed");
    }

    #[test]
    fn heuristic_priority_ignores_cost() {
        let mut f = Frontier::new(Priority::Heuristic);
        f.seed(0, 100.0, 0.5);
        f.seed(1, 0.0, 1.0);
        assert_eq!(f.pop(), Some(0));
        let mut c = Frontier::new(Priority::Cost);
        c.seed(0, 100.0, 0.5);
        c.seed(1, 0.0, 1.0);
        assert_eq!(c.pop(), Some(1));
    }

    #[test]
    fn trace_follows_parents_to_root() {
        let mut f = Frontier::new(Priority::Cost);
        f.seed(7, 0.0, 0.0);
        f.pop();
        f.relax(3, 1.0, 0.0, 7);
        f.pop();
        f.relax(5, 2.0, 0.0, 3);
        assert_eq!(f.trace(5), vec![5, 3, 7]);
        assert_eq!(f.closed().count(), 2);
        assert!(f.is_closed(3));
        assert!(!f.is_closed(5));
    }
}

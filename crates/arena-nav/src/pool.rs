//! Preallocated working memory for `PathFinder`.
//!
//! Nodes are addressed by index into one `Vec`; the open list and closed stack
//! hold indices only. Nothing is freed during a search, the whole pool is
//! rewound at the start of the next one.

use arena_core::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SearchNode {
    pub position: Vec3,
    pub cost: f32,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl SearchNode {
    const BLANK: Self = Self {
        position: Vec3::ZERO,
        cost: 0.0,
        prev: None,
        next: None,
    };
}

#[derive(Debug, Clone, Default)]
pub(crate) struct NodePool {
    nodes: Vec<SearchNode>,
    used: usize,
}

impl NodePool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: vec![SearchNode::BLANK; capacity],
            used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn rewind(&mut self) {
        self.used = 0;
    }

    /// Hand out the next unused node, or `None` once the pool is spent.
    pub fn alloc(&mut self, node: SearchNode) -> Option<NodeId> {
        let slot = self.nodes.get_mut(self.used)?;
        *slot = node;
        let id = NodeId(self.used as u32);
        self.used += 1;
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }
}

/// Unordered candidate list, scanned linearly.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenList {
    items: Vec<NodeId>,
}

impl OpenList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn push(&mut self, id: NodeId) {
        self.items.push(id);
    }

    pub fn find(&self, pool: &NodePool, position: Vec3) -> Option<NodeId> {
        self.items
            .iter()
            .copied()
            .find(|&id| pool.get(id).position == position)
    }

    /// Remove and return the cheapest node.
    ///
    /// Scans from the back with a strict comparison, so among equal costs the
    /// most recently inserted node wins. Removal keeps the order of the rest.
    /// Nodes costing `f32::MAX` or more (or NaN) are never taken.
    pub fn take_cheapest(&mut self, pool: &NodePool) -> Option<NodeId> {
        let mut best = None;
        let mut min_cost = f32::MAX;
        for (i, &id) in self.items.iter().enumerate().rev() {
            let cost = pool.get(id).cost;
            if cost < min_cost {
                min_cost = cost;
                best = Some(i);
            }
        }
        best.map(|i| self.items.remove(i))
    }
}

/// Fixed-capacity stack of expanded nodes.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClosedStack {
    items: Vec<NodeId>,
    capacity: usize,
}

impl ClosedStack {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `false` when the stack is already full.
    pub fn push(&mut self, id: NodeId) -> bool {
        if self.items.len() >= self.capacity {
            return false;
        }
        self.items.push(id);
        true
    }

    pub fn contains(&self, pool: &NodePool, position: Vec3) -> bool {
        self.items.iter().any(|&id| pool.get(id).position == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: f32, cost: f32) -> SearchNode {
        SearchNode {
            position: Vec3::new(x, 0.0, 0.0),
            cost,
            ..SearchNode::BLANK
        }
    }

    #[test]
    fn pool_runs_dry_then_rewinds() {
        let mut pool = NodePool::with_capacity(2);
        assert!(pool.alloc(node(0.0, 0.0)).is_some());
        assert!(pool.alloc(node(1.0, 0.0)).is_some());
        assert!(pool.alloc(node(2.0, 0.0)).is_none());
        assert_eq!(pool.used(), 2);

        pool.rewind();
        let id = pool.alloc(node(5.0, 1.0)).expect("node");
        assert_eq!(pool.get(id).position.x, 5.0);
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn cheapest_prefers_latest_on_ties() {
        let mut pool = NodePool::with_capacity(4);
        let mut open = OpenList::with_capacity(4);
        let a = pool.alloc(node(0.0, 2.0)).expect("node");
        let b = pool.alloc(node(1.0, 1.0)).expect("node");
        let c = pool.alloc(node(2.0, 1.0)).expect("node");
        let d = pool.alloc(node(3.0, 3.0)).expect("node");
        for id in [a, b, c, d] {
            open.push(id);
        }

        assert_eq!(open.take_cheapest(&pool), Some(c));
        assert_eq!(open.take_cheapest(&pool), Some(b));
        assert_eq!(open.take_cheapest(&pool), Some(a));
        assert_eq!(open.len(), 1);
        assert_eq!(open.find(&pool, Vec3::new(3.0, 0.0, 0.0)), Some(d));
    }

    #[test]
    fn saturated_costs_are_never_taken() {
        let mut pool = NodePool::with_capacity(3);
        let mut open = OpenList::with_capacity(3);
        for (x, cost) in [(0.0, f32::MAX), (1.0, f32::INFINITY), (2.0, f32::NAN)] {
            let id = pool.alloc(node(x, cost)).expect("node");
            open.push(id);
        }

        assert_eq!(open.take_cheapest(&pool), None);
        assert_eq!(open.len(), 3);
    }

    #[test]
    fn closed_stack_is_bounded() {
        let mut pool = NodePool::with_capacity(2);
        let mut closed = ClosedStack::with_capacity(1);
        let a = pool.alloc(node(0.0, 0.0)).expect("node");
        let b = pool.alloc(node(1.0, 0.0)).expect("node");
        assert!(closed.push(a));
        assert!(!closed.push(b));
        assert!(closed.contains(&pool, Vec3::ZERO));
        assert!(!closed.contains(&pool, Vec3::new(1.0, 0.0, 0.0)));
    }
}

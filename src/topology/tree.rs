//! Spanning structures for collective schedules.
//!
//! A k-ary tree topology gets its parent/children mapping from a closed
//! form shifted by the operation root, so every rank derives the same
//! tree without exchanging a single message. Any other topology gets a
//! BFS spanning tree over its neighbor graph, keeping every parent-child
//! link a direct topology edge. Fan-out (broadcast/scatter) and fan-in
//! (gather/reduce) share the identical mapping.

use crate::topology::Topology;
use crate::types::Rank;
use std::collections::{HashMap, HashSet, VecDeque};

/// Rooted spanning tree over the group, shared by both schedule directions.
#[derive(Debug, Clone)]
pub(crate) struct SpanningTree {
    root: Rank,
    /// node -> parent rank (root has no entry).
    parent: HashMap<Rank, Rank>,
    /// node -> children, in increasing rank order.
    children: HashMap<Rank, Vec<Rank>>,
}

/// Parent of logical rank `r` in a heap-numbered k-ary tree.
fn kary_parent(r: u32, arity: u32) -> u32 {
    (r - 1) / arity
}

impl SpanningTree {
    /// Derive the spanning tree for one collective call.
    ///
    /// The topology must already be validated against `world`.
    pub(crate) fn for_topology(topo: &Topology, root: Rank, world: u32, arity: u32) -> Self {
        match topo {
            Topology::Tree { arity: a } => Self::kary(root, world, *a),
            _ => Self::bfs(topo, root, world),
        }
        .or_fallback(root, world, arity)
    }

    /// A tree derived from the neighbor graph can only cover ranks the
    /// graph reaches; a plain k-ary tree over ranks is the fallback for
    /// a disconnected neighbor graph (single-rank star, for instance).
    fn or_fallback(self, root: Rank, world: u32, arity: u32) -> Self {
        if self.children.len() == world as usize {
            self
        } else {
            Self::kary(root, world, arity)
        }
    }

    /// Closed-form k-ary tree: logical rank `r = (me - root + N) mod N`,
    /// parent `(r-1)/arity`, children `arity*r + i` for i in [1, arity].
    fn kary(root: Rank, world: u32, arity: u32) -> Self {
        let mut parent = HashMap::new();
        let mut children: HashMap<Rank, Vec<Rank>> = HashMap::new();
        let physical = |l: u32| -> Rank { (l + root) % world };

        for logical in 0..world {
            let me = physical(logical);
            if logical != 0 {
                parent.insert(me, physical(kary_parent(logical, arity)));
            }
            let kids: Vec<Rank> = (1..=arity)
                .map(|i| arity as u64 * logical as u64 + i as u64)
                .take_while(|&c| c < world as u64)
                .map(|c| physical(c as u32))
                .collect();
            children.insert(me, kids);
        }

        Self {
            root,
            parent,
            children,
        }
    }

    /// BFS spanning tree from `root` over the topology's neighbor graph,
    /// children visited in increasing rank order so every rank derives
    /// the same tree.
    fn bfs(topo: &Topology, root: Rank, world: u32) -> Self {
        let mut parent = HashMap::new();
        let mut children: HashMap<Rank, Vec<Rank>> = HashMap::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        visited.insert(root);
        queue.push_back(root);
        children.insert(root, Vec::new());

        while let Some(node) = queue.pop_front() {
            let mut node_children: Vec<Rank> = topo
                .neighbors(node, world)
                .into_iter()
                .filter(|n| visited.insert(*n))
                .collect();
            node_children.sort_unstable();
            for &child in &node_children {
                parent.insert(child, node);
                children.insert(child, Vec::new());
                queue.push_back(child);
            }
            if let Some(slot) = children.get_mut(&node) {
                slot.extend(node_children);
            }
        }

        Self {
            root,
            parent,
            children,
        }
    }

    pub(crate) fn root(&self) -> Rank {
        self.root
    }

    pub(crate) fn parent_of(&self, r: Rank) -> Option<Rank> {
        self.parent.get(&r).copied()
    }

    pub(crate) fn children_of(&self, r: Rank) -> &[Rank] {
        self.children.get(&r).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ranks in depth-first preorder: each rank directly precedes its
    /// descendants. Scatter lays chunks out in this order so the range
    /// forwarded to a child is contiguous.
    pub(crate) fn dfs_order(&self) -> Vec<Rank> {
        let mut order = Vec::with_capacity(self.children.len());
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            order.push(node);
            for &child in self.children_of(node).iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}

/// Next hop from `me` toward `dest` on a k-ary tree rooted at rank 0:
/// down into the child whose subtree holds `dest`, otherwise up.
pub(crate) fn next_hop(me: Rank, dest: Rank, arity: u32) -> Rank {
    if me == dest {
        return me;
    }
    // Climb from dest toward the root; if the chain passes through me,
    // the previous link is the child to descend into.
    let mut cur = dest;
    while cur != 0 {
        let up = kary_parent(cur, arity);
        if up == me {
            return cur;
        }
        cur = up;
    }
    kary_parent(me, arity)
}

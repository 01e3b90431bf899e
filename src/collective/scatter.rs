use crate::collective::helpers::{collective_recv, collective_send, validate_call};
use crate::config::RemainderPolicy;
use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::topology::{SpanningTree, Topology};
use crate::types::{DataType, Rank};
use bytes::Bytes;
use std::collections::HashMap;

/// Element layout of a scattered buffer.
///
/// Chunks are laid out in depth-first order of the spanning tree, so the
/// ranks of any subtree own one contiguous sub-range and an internal
/// rank can carve its received segment into `[own chunk][child subtree]...`
/// without any index bookkeeping on the wire.
pub(crate) struct ChunkLayout {
    /// Elements owned by each rank, indexed by rank.
    counts: Vec<usize>,
    /// Element offset of each rank's chunk in the root buffer, indexed by rank.
    offsets: Vec<usize>,
    /// Elements in each rank's whole subtree.
    subtree_counts: HashMap<Rank, usize>,
}

impl ChunkLayout {
    pub(crate) fn new(
        tree: &SpanningTree,
        world: u32,
        total: usize,
        policy: RemainderPolicy,
    ) -> Self {
        let n = world as usize;
        let base = total / n;
        let remainder = total % n;
        let bonus_rank = match policy {
            RemainderPolicy::Root => tree.root(),
            RemainderPolicy::Last => world - 1,
        };

        let mut counts = vec![base; n];
        counts[bonus_rank as usize] += remainder;

        let order = tree.dfs_order();
        let mut offsets = vec![0usize; n];
        let mut cursor = 0;
        for &r in &order {
            offsets[r as usize] = cursor;
            cursor += counts[r as usize];
        }

        // Subtree sums: reverse depth-first order visits children before
        // their parent.
        let mut subtree_counts: HashMap<Rank, usize> = HashMap::with_capacity(n);
        for &r in order.iter().rev() {
            let kids: usize = tree
                .children_of(r)
                .iter()
                .map(|c| subtree_counts[c])
                .sum();
            subtree_counts.insert(r, counts[r as usize] + kids);
        }

        Self {
            counts,
            offsets,
            subtree_counts,
        }
    }

    pub(crate) fn count_of(&self, r: Rank) -> usize {
        self.counts[r as usize]
    }

    pub(crate) fn offset_of(&self, r: Rank) -> usize {
        self.offsets[r as usize]
    }

    pub(crate) fn subtree_count_of(&self, r: Rank) -> usize {
        self.subtree_counts[&r]
    }
}

/// Scatter `total_count` elements from `root` so every rank ends up with
/// its own chunk; returns that chunk.
///
/// The default chunk size is `total_count / N`; leftover elements extend
/// the root's chunk (or rank N-1's, per [`RemainderPolicy`]). Root sends
/// each child one contiguous sub-range sized for the child's whole
/// subtree, and every internal rank repeats the split before forwarding
/// downward. `input` is read on the root only.
pub async fn scatter(
    ctx: &GroupContext,
    topo: &Topology,
    input: Option<&[u8]>,
    total_count: usize,
    dtype: DataType,
    root: Rank,
) -> Result<Vec<u8>> {
    validate_call(ctx, topo, root)?;
    if total_count == 0 {
        return Err(MeshError::EmptyBuffer {
            operation: "scatter",
        });
    }

    let world = ctx.world_size();
    let rank = ctx.rank();
    let elem = dtype.size_in_bytes();

    if rank == root {
        let input = input.ok_or(MeshError::EmptyBuffer {
            operation: "scatter",
        })?;
        let expected = total_count * elem;
        if input.len() != expected {
            return Err(MeshError::BufferSizeMismatch {
                expected,
                actual: input.len(),
            });
        }
        if world <= 1 {
            return Ok(input.to_vec());
        }
    }

    let tree = SpanningTree::for_topology(topo, root, world, ctx.config().tree_arity);
    let layout = ChunkLayout::new(&tree, world, total_count, ctx.config().scatter_remainder);
    tracing::debug!(rank, root, total_count, topology = %topo, "scatter");

    // This rank's segment: its own chunk followed by each child's
    // subtree range, in depth-first order.
    let segment: Bytes = if rank == root {
        Bytes::copy_from_slice(input.unwrap_or(&[]))
    } else {
        let parent = tree.parent_of(rank).ok_or(MeshError::CollectiveFailed {
            operation: "scatter",
            rank,
            reason: "rank not in spanning tree".to_string(),
        })?;
        let frame = collective_recv(ctx, parent, "scatter").await?;
        let expected = layout.subtree_count_of(rank) * elem;
        if frame.payload.len() != expected {
            return Err(MeshError::BufferSizeMismatch {
                expected,
                actual: frame.payload.len(),
            });
        }
        frame.payload
    };

    let own_bytes = layout.count_of(rank) * elem;
    let own_chunk = segment.slice(..own_bytes);

    let mut cursor = own_bytes;
    for &child in tree.children_of(rank) {
        let child_count = layout.subtree_count_of(child);
        let child_bytes = child_count * elem;
        let slice = segment.slice(cursor..cursor + child_bytes);
        collective_send(ctx, child, child_count as u32, slice, "scatter")?;
        cursor += child_bytes;
    }

    Ok(own_chunk.to_vec())
}

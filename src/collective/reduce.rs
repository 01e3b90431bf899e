use crate::collective::helpers::{
    collective_recv, collective_send, validate_buffer, validate_call,
};
use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::reduce::fold_slice;
use crate::topology::{SpanningTree, Topology};
use crate::types::{DataType, Rank, ReduceOp};
use bytes::Bytes;
use futures::future::try_join_all;

/// Reduce every rank's `local` buffer to `root` with the associative
/// operator `op`.
///
/// Same fan-in schedule as gather, but each internal rank folds its
/// children's partial results into its own value before forwarding one
/// combined buffer upward; the final fold happens at root. Children are
/// folded in child-rank order so the result is deterministic. Returns
/// `Some(result)` on the root, `None` elsewhere.
pub async fn reduce(
    ctx: &GroupContext,
    topo: &Topology,
    local: &[u8],
    count: usize,
    dtype: DataType,
    op: ReduceOp,
    root: Rank,
) -> Result<Option<Vec<u8>>> {
    validate_call(ctx, topo, root)?;
    validate_buffer(local, count, dtype, "reduce")?;

    let world = ctx.world_size();
    if world <= 1 {
        return Ok(Some(local.to_vec()));
    }

    let tree = SpanningTree::for_topology(topo, root, world, ctx.config().tree_arity);
    let rank = ctx.rank();
    tracing::debug!(rank, root, count, %op, topology = %topo, "reduce");

    let mut acc = local.to_vec();

    let children = tree.children_of(rank);
    let frames = try_join_all(
        children
            .iter()
            .map(|&child| collective_recv(ctx, child, "reduce")),
    )
    .await?;

    for frame in &frames {
        if frame.payload.len() != acc.len() {
            return Err(MeshError::BufferSizeMismatch {
                expected: acc.len(),
                actual: frame.payload.len(),
            });
        }
        fold_slice(&mut acc, &frame.payload, count, dtype, op)?;
    }

    if rank == root {
        Ok(Some(acc))
    } else {
        let parent = tree.parent_of(rank).ok_or(MeshError::CollectiveFailed {
            operation: "reduce",
            rank,
            reason: "rank not in spanning tree".to_string(),
        })?;
        collective_send(ctx, parent, count as u32, Bytes::from(acc), "reduce")?;
        Ok(None)
    }
}

use crate::collective::helpers::{collective_recv, collective_send, validate_call};
use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::topology::{SpanningTree, Topology};
use crate::types::{DataType, Rank};
use bytes::Bytes;
use futures::future::try_join_all;

/// Gather every rank's chunk to `root`, inverting the scatter schedule.
///
/// Leaves send their chunk to their parent; each internal rank waits for
/// all of its children, concatenates its own chunk with the children's
/// sub-buffers in child-rank order (arrival order across children is
/// unspecified and never affects the output), and forwards the merged
/// buffer upward. Returns `Some(buffer)` on the root, in the original
/// element order produced by scatter, and `None` elsewhere.
pub async fn gather(
    ctx: &GroupContext,
    topo: &Topology,
    local: &[u8],
    dtype: DataType,
    root: Rank,
) -> Result<Option<Vec<u8>>> {
    validate_call(ctx, topo, root)?;
    let elem = dtype.size_in_bytes();
    if local.len() % elem != 0 {
        return Err(MeshError::BufferSizeMismatch {
            expected: (local.len() / elem) * elem,
            actual: local.len(),
        });
    }

    let world = ctx.world_size();
    if world <= 1 {
        return Ok(Some(local.to_vec()));
    }

    let tree = SpanningTree::for_topology(topo, root, world, ctx.config().tree_arity);
    let rank = ctx.rank();
    tracing::debug!(rank, root, topology = %topo, "gather");

    // Wait for every child; the futures run concurrently but the result
    // vector keeps child-rank order.
    let children = tree.children_of(rank);
    let frames = try_join_all(
        children
            .iter()
            .map(|&child| collective_recv(ctx, child, "gather")),
    )
    .await?;

    let mut merged = Vec::with_capacity(local.len());
    merged.extend_from_slice(local);
    for frame in &frames {
        let expected = frame.element_count as usize * elem;
        if frame.payload.len() != expected {
            return Err(MeshError::BufferSizeMismatch {
                expected,
                actual: frame.payload.len(),
            });
        }
        merged.extend_from_slice(&frame.payload);
    }

    if rank == root {
        Ok(Some(merged))
    } else {
        let parent = tree.parent_of(rank).ok_or(MeshError::CollectiveFailed {
            operation: "gather",
            rank,
            reason: "rank not in spanning tree".to_string(),
        })?;
        let count = (merged.len() / elem) as u32;
        collective_send(ctx, parent, count, Bytes::from(merged), "gather")?;
        Ok(None)
    }
}

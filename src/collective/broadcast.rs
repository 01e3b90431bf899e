use crate::collective::helpers::{collective_recv, collective_send, validate_buffer, validate_call};
use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::topology::{SpanningTree, Topology};
use crate::types::{DataType, Rank};
use bytes::Bytes;

/// Broadcast `buf` from `root` to every rank over the topology's
/// spanning tree.
///
/// Root sends to each of its children; every other rank blocks on its
/// parent, stores the value, then forwards to its own children. Exactly
/// N-1 frames are sent in total, and afterwards every rank holds an
/// identical copy.
pub async fn broadcast(
    ctx: &GroupContext,
    topo: &Topology,
    buf: &mut [u8],
    count: usize,
    dtype: DataType,
    root: Rank,
) -> Result<()> {
    validate_call(ctx, topo, root)?;
    validate_buffer(buf, count, dtype, "broadcast")?;

    let world = ctx.world_size();
    if world <= 1 {
        return Ok(());
    }

    let tree = SpanningTree::for_topology(topo, root, world, ctx.config().tree_arity);
    let rank = ctx.rank();
    tracing::debug!(rank, root, count, topology = %topo, "broadcast");

    if rank != root {
        let parent = tree.parent_of(rank).ok_or(MeshError::CollectiveFailed {
            operation: "broadcast",
            rank,
            reason: "rank not in spanning tree".to_string(),
        })?;
        let frame = collective_recv(ctx, parent, "broadcast").await?;
        if frame.payload.len() != buf.len() {
            return Err(MeshError::BufferSizeMismatch {
                expected: buf.len(),
                actual: frame.payload.len(),
            });
        }
        buf.copy_from_slice(&frame.payload);
    }

    let payload = Bytes::copy_from_slice(buf);
    for &child in tree.children_of(rank) {
        collective_send(ctx, child, count as u32, payload.clone(), "broadcast")?;
    }

    Ok(())
}

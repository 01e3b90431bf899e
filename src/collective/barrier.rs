use crate::collective::helpers::validate_call;
use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::protocol::Frame;
use crate::topology::{SpanningTree, Topology};
use crate::types::{FrameKind, Rank};
use futures::future::try_join_all;

/// Barrier: blocks until every rank has reached this point.
///
/// Two phases over the same spanning tree as the data collectives:
/// control tokens fan in from the leaves to `root`, then a release fans
/// back out. Useful for separating protocol phases of a larger task.
pub async fn barrier(ctx: &GroupContext, topo: &Topology, root: Rank) -> Result<()> {
    validate_call(ctx, topo, root)?;

    let world = ctx.world_size();
    if world <= 1 {
        return Ok(());
    }

    let tree = SpanningTree::for_topology(topo, root, world, ctx.config().tree_arity);
    let rank = ctx.rank();
    tracing::debug!(rank, root, topology = %topo, "barrier");

    let children = tree.children_of(rank);

    // Fan-in: wait for every child's token.
    try_join_all(
        children
            .iter()
            .map(|&child| control_recv(ctx, child)),
    )
    .await?;

    if rank != root {
        let parent = tree.parent_of(rank).ok_or(MeshError::CollectiveFailed {
            operation: "barrier",
            rank,
            reason: "rank not in spanning tree".to_string(),
        })?;
        control_send(ctx, parent)?;
        control_recv(ctx, parent).await?;
    }

    // Fan-out: release the subtree.
    for &child in children {
        control_send(ctx, child)?;
    }

    Ok(())
}

fn control_send(ctx: &GroupContext, dest: Rank) -> Result<()> {
    ctx.send_frame(dest, &Frame::control(ctx.rank()))
        .map_err(|e| MeshError::CollectiveFailed {
            operation: "barrier",
            rank: dest,
            reason: e.to_string(),
        })
}

async fn control_recv(ctx: &GroupContext, src: Rank) -> Result<()> {
    ctx.recv_expect(src, FrameKind::Control)
        .await
        .map_err(|e| match e {
            unexpected @ MeshError::UnexpectedFrame { .. } => unexpected,
            other => MeshError::CollectiveFailed {
                operation: "barrier",
                rank: src,
                reason: other.to_string(),
            },
        })?;
    Ok(())
}

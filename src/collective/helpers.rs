use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::protocol::Frame;
use crate::types::{DataType, FrameKind, Rank};
use bytes::Bytes;

/// Send a payload frame to a peer, wrapping failures as `CollectiveFailed`.
pub(crate) fn collective_send(
    ctx: &GroupContext,
    dest: Rank,
    element_count: u32,
    payload: Bytes,
    operation: &'static str,
) -> Result<()> {
    let frame = Frame::payload(ctx.rank(), element_count, payload);
    ctx.send_frame(dest, &frame)
        .map_err(|e| MeshError::CollectiveFailed {
            operation,
            rank: dest,
            reason: e.to_string(),
        })
}

/// Receive a payload frame from a peer, wrapping failures as `CollectiveFailed`.
pub(crate) async fn collective_recv(
    ctx: &GroupContext,
    src: Rank,
    operation: &'static str,
) -> Result<Frame> {
    ctx.recv_expect(src, FrameKind::Payload)
        .await
        .map_err(|e| match e {
            // Keep the unexpected-frame classification visible to callers.
            unexpected @ MeshError::UnexpectedFrame { .. } => unexpected,
            other => MeshError::CollectiveFailed {
                operation,
                rank: src,
                reason: other.to_string(),
            },
        })
}

/// Check a buffer against its declared element count before any frame
/// is sent.
pub(crate) fn validate_buffer(
    buf: &[u8],
    count: usize,
    dtype: DataType,
    operation: &'static str,
) -> Result<()> {
    if count == 0 {
        return Err(MeshError::EmptyBuffer { operation });
    }
    let expected = count * dtype.size_in_bytes();
    if buf.len() != expected {
        return Err(MeshError::BufferSizeMismatch {
            expected,
            actual: buf.len(),
        });
    }
    Ok(())
}

/// Validate the shared preconditions of every collective: topology
/// structure and root range. Runs before the first frame.
pub(crate) fn validate_call(
    ctx: &GroupContext,
    topo: &crate::topology::Topology,
    root: Rank,
) -> Result<()> {
    topo.validate(ctx.world_size())?;
    ctx.check_rank(root)
}

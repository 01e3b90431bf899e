//! Multi-hop point-to-point delivery along topology edges.
//!
//! Every rank of the group calls [`unicast`] with the same arguments;
//! each derives its own role (source, forwarder, destination, bystander)
//! from the deterministic route. The message carries its route trace,
//! extended by each hop. Because the channel primitive is blocking,
//! ranks outside the route still post one receive and are released by an
//! explicit control frame from the final holder once the transfer is
//! done, so nobody blocks forever on an unmatched receive. Line topology
//! is the exception: ranks outside the sender/target interval perform no
//! operation at all.

use crate::error::{MeshError, Result};
use crate::group::GroupContext;
use crate::protocol::{Frame, RoutedMessage};
use crate::topology::Topology;
use crate::types::{FrameKind, Rank};
use bytes::Bytes;

/// Whether the destination sends the payload back to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// One-way delivery.
    None,
    /// The destination returns the payload along an independently
    /// recomputed route from destination to source.
    Echo,
}

/// What this rank contributed to (and got out of) one unicast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnicastOutcome {
    /// This rank was the source; the message is on its way.
    Sent,
    /// This rank was the source and received the echoed payload; the
    /// path is the reply's recorded route.
    RoundTrip { path: Vec<Rank>, data: Vec<u8> },
    /// This rank was the destination; the path is the recorded route
    /// from the source.
    Delivered { path: Vec<Rank>, data: Vec<u8> },
    /// This rank relayed the message on some phase of the transfer.
    Forwarded,
    /// This rank was uninvolved and was released by the final holder.
    Released,
}

/// Deliver `payload` from `from` to `to` along the topology's minimal
/// path. SPMD entry point: every rank must call it with identical
/// `topo`, `from`, `to`, and `reply`. `payload` is read on the source
/// only.
pub async fn unicast(
    ctx: &GroupContext,
    topo: &Topology,
    from: Rank,
    to: Rank,
    payload: Option<&[u8]>,
    reply: Reply,
) -> Result<UnicastOutcome> {
    topo.validate(ctx.world_size())?;
    ctx.check_rank(from)?;
    ctx.check_rank(to)?;

    let world = ctx.world_size();
    let me = ctx.rank();

    // Line bystanders: ranks outside [min, max] perform no operation.
    if matches!(topo, Topology::Line) && (me < from.min(to) || me > from.max(to)) {
        return Ok(UnicastOutcome::Released);
    }

    if me == from && payload.is_none() {
        return Err(MeshError::EmptyBuffer {
            operation: "unicast",
        });
    }

    // Local delivery: no route, but distant ranks are already waiting.
    if from == to {
        if me == from {
            let data = payload.unwrap_or(&[]).to_vec();
            if !matches!(topo, Topology::Line) {
                release_bystanders(ctx, topo, &[from], &[])?;
            }
            return Ok(UnicastOutcome::Delivered {
                path: vec![from],
                data,
            });
        }
        ctx.recv_expect(from, FrameKind::Control).await?;
        return Ok(UnicastOutcome::Released);
    }

    let request_route = compute_route(topo, from, to, world)?;
    let reply_route = match reply {
        Reply::None => Vec::new(),
        Reply::Echo => compute_route(topo, to, from, world)?,
    };

    tracing::debug!(rank = me, from, to, topology = %topo, hops = request_route.len() - 1, "unicast");

    let mut involved = false;
    let mut outcome = UnicastOutcome::Released;

    // Request phase.
    if let Some(pos) = request_route.iter().position(|&r| r == me) {
        involved = true;
        if me == from {
            let msg = RoutedMessage {
                path: vec![from],
                data: Bytes::copy_from_slice(payload.unwrap_or(&[])),
            };
            send_routed(ctx, request_route[1], &msg)?;
            outcome = UnicastOutcome::Sent;
        } else {
            let mut msg = recv_routed(ctx, request_route[pos - 1]).await?;
            msg.path.push(me);
            if me == to {
                check_minimal(topo, from, to, world, msg.path.len() as u32 - 1)?;
                outcome = UnicastOutcome::Delivered {
                    path: msg.path.clone(),
                    data: msg.data.to_vec(),
                };
                if reply == Reply::Echo {
                    let echo = RoutedMessage {
                        path: vec![to],
                        data: msg.data,
                    };
                    send_routed(ctx, reply_route[1], &echo)?;
                }
            } else {
                send_routed(ctx, request_route[pos + 1], &msg)?;
                outcome = UnicastOutcome::Forwarded;
            }
        }
    }

    // Reply phase.
    if reply == Reply::Echo {
        if let Some(pos) = reply_route.iter().position(|&r| r == me) {
            involved = true;
            if me == from {
                let mut msg = recv_routed(ctx, reply_route[pos - 1]).await?;
                msg.path.push(me);
                check_minimal(topo, to, from, world, msg.path.len() as u32 - 1)?;
                outcome = UnicastOutcome::RoundTrip {
                    path: msg.path,
                    data: msg.data.to_vec(),
                };
            } else if me != to {
                let mut msg = recv_routed(ctx, reply_route[pos - 1]).await?;
                msg.path.push(me);
                send_routed(ctx, reply_route[pos + 1], &msg)?;
                outcome = UnicastOutcome::Forwarded;
            }
        }
    }

    // The final holder releases everyone who took part in no phase.
    let holder = match reply {
        Reply::None => to,
        Reply::Echo => from,
    };
    if involved {
        if me == holder && !matches!(topo, Topology::Line) {
            release_bystanders(ctx, topo, &request_route, &reply_route)?;
        }
        return Ok(outcome);
    }

    ctx.recv_expect(holder, FrameKind::Control).await?;
    Ok(UnicastOutcome::Released)
}

/// Walk the topology's next-hop function from `from` to `to`.
fn compute_route(topo: &Topology, from: Rank, to: Rank, world: u32) -> Result<Vec<Rank>> {
    let mut route = vec![from];
    let mut cur = from;
    while cur != to {
        let next = topo.next_hop(cur, to, world);
        if next == cur || route.len() >= world as usize {
            return Err(MeshError::CollectiveFailed {
                operation: "unicast",
                rank: cur,
                reason: format!("routing loop toward {to}"),
            });
        }
        route.push(next);
        cur = next;
    }
    Ok(route)
}

fn check_minimal(topo: &Topology, from: Rank, to: Rank, world: u32, hops: u32) -> Result<()> {
    if let Some(expected) = topo.minimal_hops(from, to, world) {
        if hops != expected {
            return Err(MeshError::RouteNotMinimal {
                from,
                to,
                actual: hops,
                expected,
            });
        }
    }
    Ok(())
}

fn send_routed(ctx: &GroupContext, dest: Rank, msg: &RoutedMessage) -> Result<()> {
    let frame = Frame::payload(ctx.rank(), msg.data.len() as u32, msg.encode());
    ctx.send_frame(dest, &frame)
}

async fn recv_routed(ctx: &GroupContext, src: Rank) -> Result<RoutedMessage> {
    let frame = ctx.recv_expect(src, FrameKind::Payload).await?;
    let msg = RoutedMessage::decode(frame.payload)?;
    if msg.path.last() != Some(&src) {
        return Err(MeshError::DecodeFailed(format!(
            "route trace ends at {:?}, expected {src}",
            msg.path.last()
        )));
    }
    Ok(msg)
}

/// Send a control frame to every rank on neither route.
fn release_bystanders(
    ctx: &GroupContext,
    topo: &Topology,
    request_route: &[Rank],
    reply_route: &[Rank],
) -> Result<()> {
    let me = ctx.rank();
    for r in 0..ctx.world_size() {
        if r == me || request_route.contains(&r) || reply_route.contains(&r) {
            continue;
        }
        tracing::trace!(rank = me, bystander = r, topology = %topo, "release");
        ctx.send_frame(r, &Frame::control(me))?;
    }
    Ok(())
}

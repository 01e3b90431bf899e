//! The explicit communicator context threaded through every core call.

use crate::channel::{local_fabric, PeerLink};
use crate::config::MeshConfig;
use crate::error::{MeshError, Result};
use crate::protocol::Frame;
use crate::types::{FrameKind, Rank};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One rank's view of a fixed-size group: its own rank, the group size,
/// and a channel to every peer. There is no ambient global communicator;
/// every collective and routing call takes a `&GroupContext`.
pub struct GroupContext {
    rank: Rank,
    world_size: u32,
    peers: HashMap<Rank, PeerLink>,
    config: MeshConfig,
    frames_sent: AtomicU64,
    frames_received: AtomicU64,
}

impl GroupContext {
    /// Build a full group of contexts wired to each other in this
    /// process, one per rank. Convenient for tests and SPMD-style tasks
    /// running each rank as a tokio task.
    pub fn local_group(world_size: u32) -> Result<Vec<GroupContext>> {
        Self::local_group_with_config(world_size, MeshConfig::default())
    }

    /// Same as [`local_group`](Self::local_group) with explicit config.
    pub fn local_group_with_config(
        world_size: u32,
        config: MeshConfig,
    ) -> Result<Vec<GroupContext>> {
        if world_size == 0 {
            return Err(MeshError::InvalidRank {
                rank: 0,
                world_size,
            });
        }
        if config.tree_arity < 1 {
            return Err(MeshError::InvalidArity {
                arity: config.tree_arity,
            });
        }
        Ok(local_fabric(world_size)
            .into_iter()
            .enumerate()
            .map(|(rank, peers)| GroupContext {
                rank: rank as Rank,
                world_size,
                peers,
                config: config.clone(),
                frames_sent: AtomicU64::new(0),
                frames_received: AtomicU64::new(0),
            })
            .collect())
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    /// Total frames this rank has sent since construction.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Total frames this rank has received since construction.
    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub(crate) fn check_rank(&self, rank: Rank) -> Result<()> {
        if rank >= self.world_size {
            return Err(MeshError::InvalidRank {
                rank,
                world_size: self.world_size,
            });
        }
        Ok(())
    }

    fn link(&self, peer: Rank) -> Result<&PeerLink> {
        self.check_rank(peer)?;
        self.peers.get(&peer).ok_or(MeshError::InvalidRank {
            rank: peer,
            world_size: self.world_size,
        })
    }

    /// Send one frame to `dest`. Never blocks: the underlying channel is
    /// reliable and buffered, delivery order per pair is FIFO.
    pub fn send_frame(&self, dest: Rank, frame: &Frame) -> Result<()> {
        let link = self.link(dest)?;
        tracing::trace!(
            from = self.rank,
            to = dest,
            kind = %frame.kind,
            elements = frame.element_count,
            "send frame"
        );
        link.tx
            .send(frame.encode())
            .map_err(|_| MeshError::PeerClosed { rank: dest })?;
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Receive the next frame from `src`, suspending until one arrives.
    pub async fn recv_frame(&self, src: Rank) -> Result<Frame> {
        let link = self.link(src)?;
        let raw = {
            let mut rx = link.rx.lock().await;
            rx.recv().await.ok_or(MeshError::PeerClosed { rank: src })?
        };
        let frame = Frame::decode(raw)?;
        if frame.sender != src {
            return Err(MeshError::DecodeFailed(format!(
                "frame claims sender {} on link from {src}",
                frame.sender
            )));
        }
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            from = src,
            to = self.rank,
            kind = %frame.kind,
            elements = frame.element_count,
            "recv frame"
        );
        Ok(frame)
    }

    /// Receive from `src` and require a specific frame kind. A frame of
    /// the wrong kind (a release signal where payload was expected, say)
    /// is a protocol error fatal to the run.
    pub(crate) async fn recv_expect(&self, src: Rank, kind: FrameKind) -> Result<Frame> {
        let frame = self.recv_frame(src).await?;
        if frame.kind != kind {
            return Err(MeshError::UnexpectedFrame {
                from: src,
                expected: kind.name(),
                got: frame.kind.name(),
            });
        }
        Ok(frame)
    }
}

impl std::fmt::Debug for GroupContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupContext")
            .field("rank", &self.rank)
            .field("world_size", &self.world_size)
            .finish_non_exhaustive()
    }
}

//! In-process point-to-point links.
//!
//! Each ordered pair of ranks gets its own reliable, FIFO channel.
//! Ordering is guaranteed only within a pair, never across pairs. The
//! transport carries encoded frames, so every exchange goes through the
//! wire codec.

use crate::types::Rank;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;

/// Both directions of a link between this rank and one peer.
pub(crate) struct PeerLink {
    /// me -> peer.
    pub(crate) tx: UnboundedSender<Bytes>,
    /// peer -> me.
    pub(crate) rx: Mutex<UnboundedReceiver<Bytes>>,
}

/// Build a full mesh of links for `world` ranks living in one process.
/// Index i of the returned vec holds rank i's side of every link.
pub(crate) fn local_fabric(world: u32) -> Vec<HashMap<Rank, PeerLink>> {
    let n = world as usize;
    let mut txs: Vec<HashMap<Rank, UnboundedSender<Bytes>>> =
        (0..n).map(|_| HashMap::new()).collect();
    let mut rxs: Vec<HashMap<Rank, UnboundedReceiver<Bytes>>> =
        (0..n).map(|_| HashMap::new()).collect();

    for s in 0..n {
        for d in 0..n {
            if s == d {
                continue;
            }
            let (tx, rx) = mpsc::unbounded_channel();
            txs[s].insert(d as Rank, tx);
            rxs[d].insert(s as Rank, rx);
        }
    }

    txs.into_iter()
        .zip(rxs)
        .map(|(mut tx_map, mut rx_map)| {
            let peers: Vec<Rank> = tx_map.keys().copied().collect();
            peers
                .into_iter()
                .map(|p| {
                    let tx = tx_map.remove(&p).expect("tx exists for every peer");
                    let rx = rx_map.remove(&p).expect("rx exists for every peer");
                    (
                        p,
                        PeerLink {
                            tx,
                            rx: Mutex::new(rx),
                        },
                    )
                })
                .collect()
        })
        .collect()
}

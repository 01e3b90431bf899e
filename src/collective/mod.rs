//! Collective operations as deterministic message schedules over a
//! topology-derived spanning tree.

mod barrier;
mod broadcast;
mod gather;
mod helpers;
mod reduce;
mod scatter;

pub use barrier::barrier;
pub use broadcast::broadcast;
pub use gather::gather;
pub use reduce::reduce;
pub use scatter::scatter;

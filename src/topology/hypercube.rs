//! Hypercube addressing: ranks are node addresses, edges connect ranks
//! differing in exactly one bit.

use crate::types::Rank;

/// Number of address bits for a power-of-two world size.
pub(crate) fn dim_bits(world: u32) -> u32 {
    world.trailing_zeros()
}

/// Next hop from `me` toward `dest`: flip the lowest-order bit at which
/// the two addresses differ. Returns `me` when already at the destination.
///
/// Each hop strictly decreases the Hamming distance to `dest` by one, so
/// the route never revisits a rank and its length equals `popcount(me ^ dest)`.
pub(crate) fn next_hop(me: Rank, dest: Rank) -> Rank {
    if me == dest {
        return me;
    }
    me ^ (1 << (me ^ dest).trailing_zeros())
}

/// All ranks one bit-flip away from `me`.
pub(crate) fn neighbors(me: Rank, world: u32) -> Vec<Rank> {
    (0..dim_bits(world)).map(|b| me ^ (1 << b)).collect()
}

/// Hamming distance between two addresses.
pub(crate) fn distance(a: Rank, b: Rank) -> u32 {
    (a ^ b).count_ones()
}

//! Square grid and torus addressing: rank r sits at row r / side,
//! column r % side. Torus edges wrap modulo the side; plain grid edges
//! are clipped at the boundary.

use crate::types::Rank;

/// Side length if `world` is a perfect square.
pub(crate) fn side_of(world: u32) -> Option<u32> {
    let s = world.isqrt();
    (s * s == world).then_some(s)
}

pub(crate) fn coords(r: Rank, side: u32) -> (u32, u32) {
    (r / side, r % side)
}

pub(crate) fn rank_at(row: u32, col: u32, side: u32) -> Rank {
    row * side + col
}

/// The up/down/left/right neighborhood of `me`. Wrapped modulo the side
/// for a torus, boundary neighbors omitted for a plain grid.
pub(crate) fn neighbors(me: Rank, side: u32, wrap: bool) -> Vec<Rank> {
    let (row, col) = coords(me, side);
    let mut out = Vec::with_capacity(4);

    if wrap {
        if side > 1 {
            out.push(rank_at((row + side - 1) % side, col, side));
            out.push(rank_at((row + 1) % side, col, side));
            out.push(rank_at(row, (col + side - 1) % side, side));
            out.push(rank_at(row, (col + 1) % side, side));
        }
    } else {
        if row > 0 {
            out.push(rank_at(row - 1, col, side));
        }
        if row + 1 < side {
            out.push(rank_at(row + 1, col, side));
        }
        if col > 0 {
            out.push(rank_at(row, col - 1, side));
        }
        if col + 1 < side {
            out.push(rank_at(row, col + 1, side));
        }
    }

    out.sort_unstable();
    out.dedup();
    out
}

/// One axis step from `from` toward `to`, taking the shorter way around
/// when wrapping is allowed. Ties go in the increasing direction.
fn step_toward(from: u32, to: u32, side: u32, wrap: bool) -> u32 {
    if from == to {
        return from;
    }
    if !wrap {
        return if from < to { from + 1 } else { from - 1 };
    }
    let forward = (to + side - from) % side;
    let backward = (from + side - to) % side;
    if forward <= backward {
        (from + 1) % side
    } else {
        (from + side - 1) % side
    }
}

/// Next hop from `me` toward `dest`: fix the row first, then the column.
pub(crate) fn next_hop(me: Rank, dest: Rank, side: u32, wrap: bool) -> Rank {
    if me == dest {
        return me;
    }
    let (mr, mc) = coords(me, side);
    let (dr, dc) = coords(dest, side);
    if mr != dr {
        rank_at(step_toward(mr, dr, side, wrap), mc, side)
    } else {
        rank_at(mr, step_toward(mc, dc, side, wrap), side)
    }
}

fn axis_distance(a: u32, b: u32, side: u32, wrap: bool) -> u32 {
    let linear = a.abs_diff(b);
    if wrap { linear.min(side - linear) } else { linear }
}

/// Manhattan distance, with wraparound on a torus.
pub(crate) fn distance(a: Rank, b: Rank, side: u32, wrap: bool) -> u32 {
    let (ar, ac) = coords(a, side);
    let (br, bc) = coords(b, side);
    axis_distance(ar, br, side, wrap) + axis_distance(ac, bc, side, wrap)
}

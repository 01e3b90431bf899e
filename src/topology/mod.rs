//! Virtual adjacency structures and next-hop selection.
//!
//! A topology defines which ranks may exchange directly in one hop. It
//! schedules collectives (through a spanning tree) and routes unicasts
//! (through repeated next-hop queries). All functions here are pure:
//! no messages are sent.

mod grid;
mod hypercube;
mod tree;

pub(crate) use tree::SpanningTree;

use crate::error::{MeshError, Result};
use crate::types::Rank;

/// Hub rank of the star topology.
pub const STAR_HUB: Rank = 0;

/// Supported virtual topologies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// k-ary tree over rank order, rooted at rank 0 for unicast routing.
    Tree { arity: u32 },
    /// Ranks are node addresses; edges flip one address bit. World size
    /// must be a power of two.
    Hypercube,
    /// Square grid, row-major ranks, edges clipped at the boundary.
    /// World size must be a perfect square.
    Grid,
    /// Square grid with wraparound edges. World size must be a perfect
    /// square.
    Torus,
    /// Cycle 0 - 1 - ... - N-1 - 0.
    Ring,
    /// Path 0 - 1 - ... - N-1.
    Line,
    /// Rank 0 is the hub; every other rank connects only to the hub.
    Star,
}

impl Topology {
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Tree { .. } => "tree",
            Topology::Hypercube => "hypercube",
            Topology::Grid => "grid",
            Topology::Torus => "torus",
            Topology::Ring => "ring",
            Topology::Line => "line",
            Topology::Star => "star",
        }
    }

    /// Check the structural preconditions against a group size. Called
    /// before any message is sent; a violation is a configuration error,
    /// never discovered mid-protocol.
    pub fn validate(&self, world: u32) -> Result<()> {
        if world == 0 {
            return Err(MeshError::UnsupportedWorldSize {
                topology: self.name(),
                world_size: world,
                constraint: "group must have at least one rank",
            });
        }
        match self {
            Topology::Tree { arity } => {
                if *arity < 1 {
                    return Err(MeshError::InvalidArity { arity: *arity });
                }
            }
            Topology::Hypercube => {
                if !world.is_power_of_two() {
                    return Err(MeshError::UnsupportedWorldSize {
                        topology: self.name(),
                        world_size: world,
                        constraint: "world size must be a power of two",
                    });
                }
            }
            Topology::Grid | Topology::Torus => {
                if grid::side_of(world).is_none() {
                    return Err(MeshError::UnsupportedWorldSize {
                        topology: self.name(),
                        world_size: world,
                        constraint: "world size must be a perfect square",
                    });
                }
            }
            Topology::Ring | Topology::Line | Topology::Star => {}
        }
        Ok(())
    }

    /// Direct neighbors of `me`, in increasing rank order.
    ///
    /// Assumes `validate(world)` has passed and `me < world`.
    pub fn neighbors(&self, me: Rank, world: u32) -> Vec<Rank> {
        let mut out = match self {
            Topology::Tree { arity } => {
                let tree = SpanningTree::for_topology(self, 0, world, *arity);
                let mut v: Vec<Rank> = tree.parent_of(me).into_iter().collect();
                v.extend_from_slice(tree.children_of(me));
                v
            }
            Topology::Hypercube => hypercube::neighbors(me, world),
            Topology::Grid => {
                let side = grid::side_of(world).unwrap_or(0);
                grid::neighbors(me, side, false)
            }
            Topology::Torus => {
                let side = grid::side_of(world).unwrap_or(0);
                grid::neighbors(me, side, true)
            }
            Topology::Ring => {
                if world <= 1 {
                    Vec::new()
                } else if world == 2 {
                    vec![(me + 1) % 2]
                } else {
                    vec![(me + world - 1) % world, (me + 1) % world]
                }
            }
            Topology::Line => {
                let mut v = Vec::new();
                if me > 0 {
                    v.push(me - 1);
                }
                if me + 1 < world {
                    v.push(me + 1);
                }
                v
            }
            Topology::Star => {
                if me == STAR_HUB {
                    (1..world).collect()
                } else {
                    vec![STAR_HUB]
                }
            }
        };
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Next hop from `me` toward `dest` along topology edges. Returns
    /// `me` when `me == dest`.
    ///
    /// Assumes `validate(world)` has passed and both ranks are in range.
    pub fn next_hop(&self, me: Rank, dest: Rank, world: u32) -> Rank {
        if me == dest {
            return me;
        }
        match self {
            Topology::Tree { arity } => tree::next_hop(me, dest, *arity),
            Topology::Hypercube => hypercube::next_hop(me, dest),
            Topology::Grid => {
                let side = grid::side_of(world).unwrap_or(1);
                grid::next_hop(me, dest, side, false)
            }
            Topology::Torus => {
                let side = grid::side_of(world).unwrap_or(1);
                grid::next_hop(me, dest, side, true)
            }
            Topology::Ring => {
                let forward = (dest + world - me) % world;
                let backward = (me + world - dest) % world;
                if forward <= backward {
                    (me + 1) % world
                } else {
                    (me + world - 1) % world
                }
            }
            Topology::Line => {
                if me < dest {
                    me + 1
                } else {
                    me - 1
                }
            }
            Topology::Star => {
                if me == STAR_HUB {
                    dest
                } else {
                    STAR_HUB
                }
            }
        }
    }

    /// Theoretical minimal hop count between two ranks, where the
    /// topology defines one: Hamming distance for the hypercube,
    /// Manhattan distance (with wrap) for grid and torus. Routed
    /// deliveries are checked against this on arrival.
    pub fn minimal_hops(&self, from: Rank, to: Rank, world: u32) -> Option<u32> {
        match self {
            Topology::Hypercube => Some(hypercube::distance(from, to)),
            Topology::Grid => {
                let side = grid::side_of(world)?;
                Some(grid::distance(from, to, side, false))
            }
            Topology::Torus => {
                let side = grid::side_of(world)?;
                Some(grid::distance(from, to, side, true))
            }
            _ => None,
        }
    }

    /// Parse a topology from a string.
    ///
    /// Formats: "tree:3", "hypercube", "grid", "torus", "ring", "line", "star".
    pub fn parse(s: &str) -> Option<Topology> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "hypercube" => Some(Topology::Hypercube),
            "grid" => Some(Topology::Grid),
            "torus" => Some(Topology::Torus),
            "ring" => Some(Topology::Ring),
            "line" => Some(Topology::Line),
            "star" => Some(Topology::Star),
            _ => s
                .strip_prefix("tree:")
                .and_then(|rest| rest.parse::<u32>().ok())
                .filter(|&a| a >= 1)
                .map(|arity| Topology::Tree { arity }),
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Topology::Tree { arity } => write!(f, "tree:{arity}"),
            other => f.write_str(other.name()),
        }
    }
}

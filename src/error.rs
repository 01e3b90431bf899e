use crate::types::Rank;

pub type Result<T> = std::result::Result<T, MeshError>;

/// Coarse classification of failures, matching where in a run they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A topology structural precondition is violated. Detected before any
    /// frame is sent.
    Configuration,
    /// Out-of-range ranks or malformed buffers. Detected before any frame
    /// is sent.
    Validation,
    /// An unexpected or malformed frame arrived mid-run. Fatal to the run;
    /// output buffers are undefined.
    Protocol,
}

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("{topology} topology does not support world size {world_size}: {constraint}")]
    UnsupportedWorldSize {
        topology: &'static str,
        world_size: u32,
        constraint: &'static str,
    },

    #[error("tree arity must be at least 1, got {arity}")]
    InvalidArity { arity: u32 },

    #[error("invalid rank {rank}: world size is {world_size}")]
    InvalidRank { rank: Rank, world_size: u32 },

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("empty buffer passed to {operation}")]
    EmptyBuffer { operation: &'static str },

    #[error("unexpected {got} frame from rank {from}: expected {expected}")]
    UnexpectedFrame {
        from: Rank,
        expected: &'static str,
        got: &'static str,
    },

    #[error("channel to rank {rank} closed")]
    PeerClosed { rank: Rank },

    #[error("frame decode failed: {0}")]
    DecodeFailed(String),

    #[error("{operation} failed at rank {rank}: {reason}")]
    CollectiveFailed {
        operation: &'static str,
        rank: Rank,
        reason: String,
    },

    #[error("route from {from} to {to} took {actual} hops, expected {expected}")]
    RouteNotMinimal {
        from: Rank,
        to: Rank,
        actual: u32,
        expected: u32,
    },
}

impl MeshError {
    /// Classify this error per the failure model: configuration and
    /// validation errors precede any message traffic, protocol errors
    /// abort a run in flight.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::UnsupportedWorldSize { .. } | MeshError::InvalidArity { .. } => {
                ErrorKind::Configuration
            }
            MeshError::InvalidRank { .. }
            | MeshError::BufferSizeMismatch { .. }
            | MeshError::EmptyBuffer { .. } => ErrorKind::Validation,
            MeshError::UnexpectedFrame { .. }
            | MeshError::PeerClosed { .. }
            | MeshError::DecodeFailed(_)
            | MeshError::CollectiveFailed { .. }
            | MeshError::RouteNotMinimal { .. } => ErrorKind::Protocol,
        }
    }
}

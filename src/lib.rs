mod channel;
pub mod collective;
pub mod config;
pub mod error;
pub mod group;
pub mod harness;
pub mod protocol;
mod reduce;
pub mod topology;
pub mod types;
pub mod unicast;

pub use config::{MeshConfig, RemainderPolicy};
pub use error::{ErrorKind, MeshError, Result};
pub use group::GroupContext;
pub use protocol::{Frame, RoutedMessage};
pub use topology::Topology;
pub use types::{DataType, FrameKind, Rank, ReduceOp};
pub use unicast::{unicast, Reply, UnicastOutcome};

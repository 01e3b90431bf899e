//! Runtime-configurable parameters for meshcomm.
//!
//! All values have sensible defaults. Override via environment variables
//! (prefixed `MESHCOMM_`) or by constructing a custom `MeshConfig`.

/// Where scatter puts leftover elements when the input length is not
/// divisible by the group size.
///
/// Observed implementations disagree on this, so it is a policy choice
/// rather than a fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// Leftover elements extend the root's own chunk.
    #[default]
    Root,
    /// Leftover elements extend the chunk of rank N-1.
    Last,
}

/// Tuning parameters shared by all collective and routing calls on a group.
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Arity of the spanning tree used when the topology is `Tree`.
    pub tree_arity: u32,

    /// Placement of leftover elements in scatter.
    pub scatter_remainder: RemainderPolicy,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            tree_arity: 2,
            scatter_remainder: RemainderPolicy::Root,
        }
    }
}

impl MeshConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `MESHCOMM_TREE_ARITY`
    /// - `MESHCOMM_SCATTER_REMAINDER` ("root" or "last")
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("MESHCOMM_TREE_ARITY") {
            if let Ok(a) = v.parse::<u32>() {
                if a >= 1 {
                    cfg.tree_arity = a;
                }
            }
        }
        if let Ok(v) = std::env::var("MESHCOMM_SCATTER_REMAINDER") {
            match v.trim().to_lowercase().as_str() {
                "root" => cfg.scatter_remainder = RemainderPolicy::Root,
                "last" => cfg.scatter_remainder = RemainderPolicy::Last,
                _ => {}
            }
        }

        cfg
    }
}

//! Boundary adapter for task harnesses.
//!
//! Numeric tasks invoke the core layer from inside their run phase and
//! expect a plain success flag; no error crosses the boundary.

use crate::error::Result;
use std::future::Future;

/// Run one protocol step and collapse its outcome to a boolean.
///
/// Errors are logged with their classification and swallowed; a failed
/// run is atomic from the caller's point of view — output buffers are
/// undefined and the whole operation must be re-invoked, not resumed.
pub async fn run_step<F, Fut, T>(operation: &'static str, f: F) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(operation, kind = ?e.kind(), error = %e, "protocol step failed");
            false
        }
    }
}

use meshcomm::{GroupContext, MeshConfig};
use std::future::Future;
use std::sync::Arc;

/// Run one closure per rank as its own tokio task, SPMD style, and
/// collect each rank's return value in rank order.
pub async fn run_group<F, Fut, T>(world_size: u32, f: F) -> Vec<T>
where
    F: Fn(GroupContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    run_group_with_config(world_size, MeshConfig::default(), f).await
}

/// Same as [`run_group`] with an explicit config shared by all ranks.
pub async fn run_group_with_config<F, Fut, T>(world_size: u32, config: MeshConfig, f: F) -> Vec<T>
where
    F: Fn(GroupContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let ctxs = GroupContext::local_group_with_config(world_size, config).unwrap();
    let f = Arc::new(f);

    let mut handles = Vec::new();
    for ctx in ctxs {
        let f = Arc::clone(&f);
        handles.push(tokio::spawn(async move { f(ctx).await }));
    }

    let mut results = Vec::with_capacity(world_size as usize);
    for h in handles {
        results.push(h.await.unwrap());
    }
    results
}

/// Encode a slice of i32 values little-endian, the way the wire sees it.
pub fn i32_bytes(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode a little-endian byte buffer back into i32 values.
pub fn i32_values(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

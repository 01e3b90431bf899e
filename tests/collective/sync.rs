use super::helpers::run_group;
use meshcomm::collective::barrier;
use meshcomm::Topology;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_barrier_waits_for_every_rank() {
    let arrived = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&arrived);

    let results = run_group(5, move |ctx| {
        let arrived = Arc::clone(&arrived);
        async move {
            // Stagger the arrival so early ranks genuinely wait.
            tokio::time::sleep(std::time::Duration::from_millis(ctx.rank() as u64 * 10)).await;
            arrived.fetch_add(1, Ordering::SeqCst);
            barrier(&ctx, &Topology::Tree { arity: 2 }, 0).await.unwrap();
            arrived.load(Ordering::SeqCst)
        }
    })
    .await;

    // Every rank crossed the barrier after all five had arrived.
    for count in results {
        assert_eq!(count, 5);
    }
    assert_eq!(seen.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn test_barrier_over_ring_nonzero_root() {
    let results = run_group(6, |ctx| async move {
        barrier(&ctx, &Topology::Ring, 3).await
    })
    .await;
    for r in results {
        assert!(r.is_ok());
    }
}

#[tokio::test]
async fn test_barrier_reusable_across_phases() {
    let results = run_group(4, |ctx| async move {
        for _ in 0..3 {
            barrier(&ctx, &Topology::Hypercube, 0).await.unwrap();
        }
        ctx.frames_sent()
    })
    .await;
    // Each round: non-roots send one token up, internal ranks forward
    // releases down. The count is stable across rounds.
    let total: u64 = results.iter().sum();
    assert_eq!(total, 3 * 2 * 3); // 3 rounds, N-1 tokens each way
}

#[tokio::test]
async fn test_barrier_single_rank_no_frames() {
    let results = run_group(1, |ctx| async move {
        barrier(&ctx, &Topology::Line, 0).await.unwrap();
        ctx.frames_sent()
    })
    .await;
    assert_eq!(results[0], 0);
}

use super::helpers::{i32_bytes, run_group};
use meshcomm::collective::broadcast;
use meshcomm::{DataType, Topology};

#[tokio::test]
async fn test_broadcast_binary_tree_all_roots() {
    for world in [1u32, 2, 3, 4, 8] {
        for root in 0..world {
            let expected = i32_bytes(&[7, -3, 42, 1000 + root as i32]);
            let want = expected.clone();
            let results = run_group(world, move |ctx| {
                let expected = expected.clone();
                async move {
                    let mut buf = if ctx.rank() == root {
                        expected.clone()
                    } else {
                        vec![0u8; expected.len()]
                    };
                    broadcast(&ctx, &Topology::Tree { arity: 2 }, &mut buf, 4, DataType::I32, root)
                        .await
                        .unwrap();
                    buf
                }
            })
            .await;
            for (rank, buf) in results.iter().enumerate() {
                assert_eq!(buf, &want, "world {world} root {root} rank {rank}");
            }
        }
    }
}

#[tokio::test]
async fn test_broadcast_ternary_tree() {
    let results = run_group(7, |ctx| async move {
        let mut buf = if ctx.rank() == 2 {
            i32_bytes(&[11, 22])
        } else {
            vec![0u8; 8]
        };
        broadcast(&ctx, &Topology::Tree { arity: 3 }, &mut buf, 2, DataType::I32, 2)
            .await
            .unwrap();
        buf
    })
    .await;
    for buf in &results {
        assert_eq!(buf, &i32_bytes(&[11, 22]));
    }
}

#[tokio::test]
async fn test_broadcast_hypercube_sends_world_minus_one_frames() {
    // 4 ranks, root 0: the spanning tree is 0 -> {1, 2}, 1 -> {3}, so
    // exactly three payload frames cross the fabric.
    let results = run_group(4, |ctx| async move {
        let mut buf = if ctx.rank() == 0 {
            i32_bytes(&[5, 6, 7])
        } else {
            vec![0u8; 12]
        };
        broadcast(&ctx, &Topology::Hypercube, &mut buf, 3, DataType::I32, 0)
            .await
            .unwrap();
        (buf, ctx.frames_sent())
    })
    .await;

    let total_sent: u64 = results.iter().map(|(_, sent)| sent).sum();
    assert_eq!(total_sent, 3);
    for (buf, _) in &results {
        assert_eq!(buf, &i32_bytes(&[5, 6, 7]));
    }
}

#[tokio::test]
async fn test_broadcast_hypercube_16_nonzero_root() {
    let results = run_group(16, |ctx| async move {
        let mut buf = if ctx.rank() == 9 { vec![0xAB; 8] } else { vec![0u8; 8] };
        broadcast(&ctx, &Topology::Hypercube, &mut buf, 1, DataType::F64, 9)
            .await
            .unwrap();
        buf
    })
    .await;
    for buf in &results {
        assert_eq!(buf, &vec![0xAB; 8]);
    }
}

#[tokio::test]
async fn test_broadcast_ring_and_line() {
    for topo in [Topology::Ring, Topology::Line] {
        let results = run_group(5, move |ctx| async move {
            let mut buf = if ctx.rank() == 1 { vec![1, 2, 3, 4] } else { vec![0u8; 4] };
            broadcast(&ctx, &topo, &mut buf, 4, DataType::U8, 1)
                .await
                .unwrap();
            buf
        })
        .await;
        for buf in &results {
            assert_eq!(buf, &vec![1, 2, 3, 4]);
        }
    }
}

#[tokio::test]
async fn test_broadcast_grid_and_torus() {
    for topo in [Topology::Grid, Topology::Torus] {
        let results = run_group(9, move |ctx| async move {
            let mut buf = if ctx.rank() == 4 {
                i32_bytes(&[-1, -2, -3])
            } else {
                vec![0u8; 12]
            };
            broadcast(&ctx, &topo, &mut buf, 3, DataType::I32, 4)
                .await
                .unwrap();
            buf
        })
        .await;
        for buf in &results {
            assert_eq!(buf, &i32_bytes(&[-1, -2, -3]));
        }
    }
}

#[tokio::test]
async fn test_broadcast_star() {
    // Non-hub root: the hub still relays to every leaf.
    let results = run_group(6, |ctx| async move {
        let mut buf = if ctx.rank() == 3 { vec![9u8; 2] } else { vec![0u8; 2] };
        broadcast(&ctx, &Topology::Star, &mut buf, 2, DataType::U8, 3)
            .await
            .unwrap();
        buf
    })
    .await;
    for buf in &results {
        assert_eq!(buf, &vec![9u8, 9]);
    }
}

#[tokio::test]
async fn test_broadcast_single_rank_is_local() {
    let results = run_group(1, |ctx| async move {
        let mut buf = i32_bytes(&[13]);
        broadcast(&ctx, &Topology::Ring, &mut buf, 1, DataType::I32, 0)
            .await
            .unwrap();
        (buf, ctx.frames_sent())
    })
    .await;
    assert_eq!(results[0].0, i32_bytes(&[13]));
    assert_eq!(results[0].1, 0);
}

use super::helpers::{i32_bytes, i32_values, run_group};
use meshcomm::collective::reduce;
use meshcomm::{DataType, ReduceOp, Topology};

#[tokio::test]
async fn test_reduce_sum_i32_binary_tree() {
    // Ranks contribute 1..=5; the root ends up with 15 in every slot.
    let results = run_group(5, |ctx| async move {
        let v = ctx.rank() as i32 + 1;
        let local = i32_bytes(&[v, v * 10]);
        reduce(&ctx, &Topology::Tree { arity: 2 }, &local, 2, DataType::I32, ReduceOp::Sum, 0)
            .await
            .unwrap()
    })
    .await;

    assert_eq!(results[0].as_deref().map(i32_values), Some(vec![15, 150]));
    for out in &results[1..] {
        assert!(out.is_none());
    }
}

#[tokio::test]
async fn test_reduce_sum_ternary_tree_nonzero_root() {
    let results = run_group(7, |ctx| async move {
        let local = i32_bytes(&[ctx.rank() as i32]);
        reduce(&ctx, &Topology::Tree { arity: 3 }, &local, 1, DataType::I32, ReduceOp::Sum, 4)
            .await
            .unwrap()
    })
    .await;
    assert_eq!(results[4].as_deref().map(i32_values), Some(vec![21]));
}

#[tokio::test]
async fn test_reduce_min_max() {
    let inputs = [7i32, -3, 12, 0];
    for (op, want) in [(ReduceOp::Min, -3i32), (ReduceOp::Max, 12)] {
        let results = run_group(4, move |ctx| async move {
            let local = i32_bytes(&[inputs[ctx.rank() as usize]]);
            reduce(&ctx, &Topology::Hypercube, &local, 1, DataType::I32, op, 0)
                .await
                .unwrap()
        })
        .await;
        assert_eq!(results[0].as_deref().map(i32_values), Some(vec![want]));
    }
}

#[tokio::test]
async fn test_reduce_sum_f64() {
    let results = run_group(4, |ctx| async move {
        let local = ((ctx.rank() + 1) as f64 * 0.5).to_le_bytes().to_vec();
        reduce(&ctx, &Topology::Ring, &local, 1, DataType::F64, ReduceOp::Sum, 0)
            .await
            .unwrap()
    })
    .await;

    let bytes = results[0].as_deref().unwrap().try_into().unwrap();
    let sum = f64::from_le_bytes(bytes);
    assert!((sum - 5.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_reduce_sum_u8_wraps() {
    // Wrapping addition: 200 + 200 = 144 mod 256.
    let results = run_group(2, |ctx| async move {
        let local = [200u8];
        reduce(&ctx, &Topology::Line, &local, 1, DataType::U8, ReduceOp::Sum, 0)
            .await
            .unwrap()
    })
    .await;
    assert_eq!(results[0].as_deref(), Some(&[144u8][..]));
}

#[tokio::test]
async fn test_reduce_grid_and_torus() {
    for topo in [Topology::Grid, Topology::Torus] {
        let results = run_group(9, move |ctx| async move {
            let local = i32_bytes(&[1]);
            reduce(&ctx, &topo, &local, 1, DataType::I32, ReduceOp::Sum, 8)
                .await
                .unwrap()
        })
        .await;
        assert_eq!(results[8].as_deref().map(i32_values), Some(vec![9]), "{topo}");
    }
}

#[tokio::test]
async fn test_reduce_single_rank() {
    let results = run_group(1, |ctx| async move {
        let local = i32_bytes(&[42]);
        reduce(&ctx, &Topology::Star, &local, 1, DataType::I32, ReduceOp::Sum, 0)
            .await
            .unwrap()
    })
    .await;
    assert_eq!(results[0].as_deref().map(i32_values), Some(vec![42]));
}

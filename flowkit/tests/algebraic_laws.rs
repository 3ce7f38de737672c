// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Algebraic laws the operator set is expected to satisfy (§8).

use flowkit::Flow;
use flowkit_exec::{concat, from_iterable, run_collect};

fn ints(xs: &[i32]) -> Flow<i32> {
    from_iterable(xs.to_vec())
}

#[tokio::test]
async fn map_identity_is_identity() {
    let xs = [1, 2, 3, 4];
    let seen = run_collect(ints(&xs).map(|v| v)).await.unwrap();
    assert_eq!(seen, xs.to_vec());
}

#[tokio::test]
async fn map_composes() {
    let xs = [1, 2, 3];
    let a = run_collect(ints(&xs).map(|v| v + 1).map(|v| v * 2))
        .await
        .unwrap();
    let b = run_collect(ints(&xs).map(|v| (v + 1) * 2)).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn filter_composes_as_conjunction() {
    let xs: Vec<i32> = (0..20).collect();
    let a = run_collect(
        ints(&xs)
            .filter(|v| v % 2 == 0)
            .filter(|v| v % 3 == 0),
    )
    .await
    .unwrap();
    let b = run_collect(ints(&xs).filter(|v| v % 2 == 0 && v % 3 == 0))
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn nested_take_keeps_the_smaller_bound() {
    let xs: Vec<i32> = (0..20).collect();
    let a = run_collect(ints(&xs).take(7).take(3)).await.unwrap();
    let b = run_collect(ints(&xs).take(3)).await.unwrap();
    assert_eq!(a, b);

    let a = run_collect(ints(&xs).take(3).take(7)).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn nested_drop_sums_its_counts() {
    let xs: Vec<i32> = (0..20).collect();
    let a = run_collect(ints(&xs).drop(3).drop(4)).await.unwrap();
    let b = run_collect(ints(&xs).drop(7)).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn concat_with_empty_is_identity() {
    let xs = vec![1, 2, 3];
    let empty: Flow<i32> = from_iterable(Vec::<i32>::new());
    let a = run_collect(ints(&xs).concat(empty)).await.unwrap();
    assert_eq!(a, xs);

    let empty: Flow<i32> = from_iterable(Vec::<i32>::new());
    let b = run_collect(empty.concat(ints(&xs))).await.unwrap();
    assert_eq!(b, xs);
}

#[tokio::test]
async fn concat_list_matches_pairwise_concat() {
    let parts = vec![ints(&[1, 2]), ints(&[3]), ints(&[4, 5])];
    let seen = run_collect(concat(parts)).await.unwrap();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn map_concat_of_singletons_is_identity() {
    let xs = vec![1, 2, 3];
    let seen = run_collect(ints(&xs).map_concat(|v| vec![v])).await.unwrap();
    assert_eq!(seen, xs);
}

#[tokio::test]
async fn grouped_then_flattened_reconstructs_the_input() {
    let xs: Vec<i32> = (1..=10).collect();
    let seen = run_collect(
        ints(&xs)
            .grouped(3)
            .unwrap()
            .map_concat(|batch: Vec<i32>| batch),
    )
    .await
    .unwrap();
    assert_eq!(seen, xs);
}

#[tokio::test]
async fn map_par_preserves_order_regardless_of_parallelism() {
    let xs: Vec<i32> = (0..16).collect();
    for k in [1usize, 2, 5, 16] {
        let seen = run_collect(ints(&xs).map_par(k, |v| async move { Ok(v + 1) }).unwrap())
            .await
            .unwrap();
        assert_eq!(seen, xs.iter().map(|v| v + 1).collect::<Vec<_>>());
    }
}

#[tokio::test]
async fn map_par_unordered_matches_map_as_a_multiset() {
    use std::collections::HashMap;

    fn histogram(values: &[i32]) -> HashMap<i32, usize> {
        let mut counts = HashMap::new();
        for v in values {
            *counts.entry(*v).or_insert(0) += 1;
        }
        counts
    }

    let xs: Vec<i32> = (0..16).collect();
    let expected = run_collect(ints(&xs).map(|v| v * 3)).await.unwrap();
    let actual = run_collect(
        ints(&xs)
            .map_par_unordered(4, |v| async move { Ok(v * 3) })
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(histogram(&actual), histogram(&expected));
}

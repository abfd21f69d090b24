//! Randomised pipeline properties over seeded inputs.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqllike_tests::prelude::*;
use sqllike_tests::drain;

const SEED: u64 = 0x5eed;

/// Rows `{id, key, score}` with ids in input order and few distinct keys.
fn random_rows(rng: &mut StdRng, n: usize) -> Vec<Row> {
    (0..n)
        .map(|id| {
            Row::record([
                ("id", Value::Int(id as i64)),
                ("key", Value::Int(rng.gen_range(0..5))),
                ("score", Value::Int(rng.gen_range(-100..100))),
            ])
        })
        .collect()
}

fn stream(rows: Vec<Row>) -> RowStream {
    RowStream::infer(rows, StreamOptions::default()).unwrap()
}

fn ints(values: Vec<Value>) -> Vec<i64> {
    values.iter().map(|v| v.as_int().unwrap()).collect()
}

#[test]
fn test_project_keeps_row_count() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..20 {
        let n = rng.gen_range(1..60);
        let source = stream(random_rows(&mut rng, n));
        let score = source.column("score").unwrap();
        let first = source
            .project(&[], &[("double", score.mul(2).unwrap())])
            .unwrap();
        let double = first.column("double").unwrap();
        let second = first
            .project(&[], &[("back", double.floor_div(2).unwrap())])
            .unwrap();
        let output = drain(second).unwrap();
        assert_eq!(output.rows.len(), n);
    }
}

#[test]
fn test_filter_keeps_exactly_matching_rows() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..20 {
        let n = rng.gen_range(1..60);
        let rows = random_rows(&mut rng, n);
        let threshold = rng.gen_range(-100..100);
        let expected: Vec<i64> = rows
            .iter()
            .filter(|r| r.get("score").and_then(Value::as_int).unwrap() > threshold)
            .map(|r| r.get("id").and_then(Value::as_int).unwrap())
            .collect();

        let source = stream(rows);
        let score = source.column("score").unwrap();
        let output = drain(source.filter(&score.gt(threshold).unwrap()).unwrap()).unwrap();
        assert_eq!(ints(output.column("id").unwrap()), expected);
    }
}

#[test]
fn test_sort_is_stable_both_ways() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for ascending in [true, false] {
        for _ in 0..10 {
            let n = rng.gen_range(1..80);
            let rows = random_rows(&mut rng, n);
            let mut expected: Vec<(i64, i64)> = rows
                .iter()
                .map(|r| {
                    (
                        r.get("key").and_then(Value::as_int).unwrap(),
                        r.get("id").and_then(Value::as_int).unwrap(),
                    )
                })
                .collect();
            // sort_by is stable, so equal keys keep id order.
            if ascending {
                expected.sort_by(|a, b| a.0.cmp(&b.0));
            } else {
                expected.sort_by(|a, b| b.0.cmp(&a.0));
            }

            let source = stream(rows);
            let key = source.column("key").unwrap();
            let output = drain(source.sort(&[key], ascending).unwrap()).unwrap();
            let ids = ints(output.column("id").unwrap());
            assert_eq!(ids, expected.iter().map(|(_, id)| *id).collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_group_counts_partition_input() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..20 {
        let n = rng.gen_range(1..80);
        let rows = random_rows(&mut rng, n);
        let mut expected: HashMap<i64, i64> = HashMap::new();
        for r in &rows {
            *expected
                .entry(r.get("key").and_then(Value::as_int).unwrap())
                .or_default() += 1;
        }

        let source = stream(rows);
        let key = source.column("key").unwrap();
        let id = source.column("id").unwrap();
        let output = drain(source.group(&[key], &[("n", id.len().unwrap())]).unwrap()).unwrap();

        let keys = ints(output.column("key").unwrap());
        let counts = ints(output.column("n").unwrap());
        assert_eq!(keys.len(), expected.len());
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        for (k, n) in keys.iter().zip(&counts) {
            assert_eq!(expected.get(k), Some(n));
        }
    }
}

#[test]
fn test_union_concatenates() {
    let mut rng = StdRng::seed_from_u64(SEED);
    for _ in 0..10 {
        let (n, m) = (rng.gen_range(1..20), rng.gen_range(1..20));
        let left = random_rows(&mut rng, n);
        let right = random_rows(&mut rng, m);
        let expected: Vec<Vec<Value>> = left.iter().chain(&right).map(Row::values).collect();

        let output = drain(stream(left).union(stream(right), false).unwrap()).unwrap();
        assert_eq!(output.rows, expected);
    }
}

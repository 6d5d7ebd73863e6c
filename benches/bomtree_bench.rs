// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Benchmarks for tree mutation and cost rollup

use bomtree::cost;
use bomtree::id::SequentialIdGenerator;
use bomtree::tree;
use bomtree::types::{BomItem, ItemOperation, ItemPayload};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// A forest of `roots` assemblies, each `depth` levels deep with `fanout`
/// children per node
fn forest(roots: usize, depth: u32, fanout: usize) -> Vec<BomItem> {
    let ids = SequentialIdGenerator::new();
    let mut forest = Vec::new();
    let mut frontier = Vec::new();

    let part = ItemPayload {
        quantity: Some(2.0),
        unit_price: Some(10.0),
        ..Default::default()
    };
    for _ in 0..roots {
        let op = ItemOperation::Add {
            parent_id: None,
            payload: part.clone(),
        };
        if let Some(id) = tree::apply_mut(&mut forest, &op, &ids) {
            frontier.push(id);
        }
    }
    for _ in 1..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for _ in 0..fanout {
                let op = ItemOperation::Add {
                    parent_id: Some(parent.clone()),
                    payload: part.clone(),
                };
                if let Some(id) = tree::apply_mut(&mut forest, &op, &ids) {
                    next.push(id);
                }
            }
        }
        frontier = next;
    }
    forest
}

fn bench_rollup(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_cost");
    for depth in [2, 4, 6] {
        let items = forest(4, depth, 3);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &items, |b, items| {
            b.iter(|| cost::tree_cost(black_box(items)));
        });
    }
    group.finish();
}

fn bench_operations(c: &mut Criterion) {
    let items = forest(4, 5, 3);
    let last = tree::walk(&items).last().map(|item| item.id.clone()).unwrap_or_default();
    let ids = SequentialIdGenerator::starting_at(1_000_000);

    c.bench_function("edit_deepest_pure", |b| {
        let op = ItemOperation::Edit {
            id: last.clone(),
            patch: ItemPayload {
                unit_price: Some(12.0),
                ..Default::default()
            },
        };
        b.iter(|| tree::apply(black_box(&items), &op, &ids));
    });

    c.bench_function("toggle_deepest_in_place", |b| {
        let op = ItemOperation::ToggleExpand { id: last.clone() };
        let mut owned = items.clone();
        b.iter(|| tree::apply_mut(black_box(&mut owned), &op, &ids));
    });

    c.bench_function("missing_target", |b| {
        let op = ItemOperation::Delete {
            id: "item-missing".into(),
        };
        b.iter(|| tree::apply(black_box(&items), &op, &ids));
    });
}

criterion_group!(benches, bench_rollup, bench_operations);
criterion_main!(benches);

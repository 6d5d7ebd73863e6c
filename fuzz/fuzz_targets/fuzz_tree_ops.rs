// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use arbitrary::Arbitrary;
use bomtree::cost;
use bomtree::id::SequentialIdGenerator;
use bomtree::index::StructureIndex;
use bomtree::tree;
use bomtree::types::{BomItem, ItemOperation, ItemPayload};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    AddRoot { quantity: u16, unit_price: u16 },
    AddChild { parent: u8, quantity: u16, unit_price: u16 },
    Edit { target: u8, quantity: Option<u16>, unit_price: Option<u16> },
    Delete { target: u8 },
    Toggle { target: u8 },
}

fn pick(forest: &[BomItem], i: u8) -> String {
    let ids: Vec<_> = tree::walk(forest).map(|item| item.id.clone()).collect();
    if ids.is_empty() {
        return "item-missing".into();
    }
    ids[usize::from(i) % ids.len()].clone()
}

fn payload(quantity: Option<u16>, unit_price: Option<u16>) -> ItemPayload {
    ItemPayload {
        quantity: quantity.map(f64::from),
        unit_price: unit_price.map(f64::from),
        ..Default::default()
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let ids = SequentialIdGenerator::new();
    let mut forest = Vec::new();

    for op in ops.iter().take(256) {
        let op = match op {
            Op::AddRoot { quantity, unit_price } => ItemOperation::Add {
                parent_id: None,
                payload: payload(Some(*quantity), Some(*unit_price)),
            },
            Op::AddChild { parent, quantity, unit_price } => ItemOperation::Add {
                parent_id: Some(pick(&forest, *parent)),
                payload: payload(Some(*quantity), Some(*unit_price)),
            },
            Op::Edit { target, quantity, unit_price } => ItemOperation::Edit {
                id: pick(&forest, *target),
                patch: payload(*quantity, *unit_price),
            },
            Op::Delete { target } => ItemOperation::Delete { id: pick(&forest, *target) },
            Op::Toggle { target } => ItemOperation::ToggleExpand { id: pick(&forest, *target) },
        };

        let outcome = tree::apply(&forest, &op, &ids);
        if !outcome.applied() {
            assert_eq!(outcome.forest, forest);
        }
        forest = outcome.forest;

        for item in tree::walk(&forest) {
            assert_eq!(item.total_price, cost::item_price(item.quantity, item.unit_price));
        }
        assert!(StructureIndex::build(&forest).level_violations(&forest).is_empty());
    }
});

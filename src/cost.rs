// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Price derivation and cost rollup

use crate::tree;
use crate::types::{BomItem, PartType};
use std::collections::BTreeMap;

/// Price of one line: `quantity * unit_price`
#[must_use]
pub fn item_price(quantity: f64, unit_price: f64) -> f64 {
    quantity * unit_price
}

/// Sum of `total_price` over every node in `nodes` and all their descendants
///
/// This is the only way a document's `total_cost` is produced.
#[must_use]
pub fn tree_cost(nodes: &[BomItem]) -> f64 {
    tree::walk(nodes).map(|item| item.total_price).sum()
}

/// Cost of one item together with everything beneath it
#[must_use]
pub fn subtree_cost(item: &BomItem) -> f64 {
    item.total_price + tree_cost(&item.children)
}

/// Rollup bucketed by part type
///
/// Part types with no items are absent from the map.
#[must_use]
pub fn cost_by_part_type(nodes: &[BomItem]) -> BTreeMap<PartType, f64> {
    let mut totals = BTreeMap::new();
    for item in tree::walk(nodes) {
        *totals.entry(item.part_type).or_insert(0.0) += item.total_price;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, quantity: f64, unit_price: f64, part_type: PartType) -> BomItem {
        BomItem {
            id: id.into(),
            parent_id: None,
            part_code: id.to_uppercase(),
            part_name: String::new(),
            specification: String::new(),
            part_type,
            unit: "EA".into(),
            quantity,
            unit_price,
            total_price: item_price(quantity, unit_price),
            manufacturer: String::new(),
            model: String::new(),
            supplier: String::new(),
            lead_time: 0.0,
            min_stock: 0.0,
            current_stock: 0.0,
            remarks: String::new(),
            level: 1,
            is_expanded: false,
            children: vec![],
        }
    }

    #[test]
    fn test_item_price() {
        assert_eq!(item_price(2.0, 15000.0), 30000.0);
        assert_eq!(item_price(0.0, 99.0), 0.0);
        assert_eq!(item_price(2.5, 4.0), 10.0);
    }

    #[test]
    fn test_tree_cost_empty() {
        assert_eq!(tree_cost(&[]), 0.0);
    }

    #[test]
    fn test_tree_cost_counts_every_depth() {
        let mut root = leaf("a", 2.0, 100.0, PartType::Standard);
        let mut child = leaf("b", 3.0, 10.0, PartType::Spare);
        child.level = 2;
        let mut grandchild = leaf("c", 1.0, 5.0, PartType::Consumable);
        grandchild.level = 3;
        child.children.push(grandchild);
        root.children.push(child);
        let other = leaf("d", 1.0, 1.0, PartType::Standard);

        assert_eq!(subtree_cost(&root.children[0]), 35.0);
        assert_eq!(tree_cost(&[root, other]), 200.0 + 30.0 + 5.0 + 1.0);
    }

    #[test]
    fn test_cost_by_part_type() {
        let mut root = leaf("a", 1.0, 100.0, PartType::Standard);
        root.children.push(leaf("b", 2.0, 10.0, PartType::Spare));
        root.children.push(leaf("c", 1.0, 7.0, PartType::Spare));

        let totals = cost_by_part_type(&[root]);

        assert_eq!(totals.get(&PartType::Standard), Some(&100.0));
        assert_eq!(totals.get(&PartType::Spare), Some(&27.0));
        assert!(!totals.contains_key(&PartType::Consumable));
    }
}

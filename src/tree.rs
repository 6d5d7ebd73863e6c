// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Recursive mutation and traversal of BOM item forests
//!
//! Every operation is a single pre-order depth-first walk. The first node
//! whose ID matches the operation's target is affected and the walk stops
//! matching; duplicate IDs further along in traversal order are left alone.
//! A missing target leaves the forest exactly as it was.

use crate::cost;
use crate::id::{IdGenerator, ITEM_PREFIX};
use crate::types::{BomItem, ItemOperation, ItemPayload, DEFAULT_UNIT};

/// Result of applying an operation to a forest
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOutcome {
    /// The forest after the operation
    pub forest: Vec<BomItem>,
    /// ID of the new item (add) or the target item (edit, delete, toggle);
    /// `None` if no node matched
    pub affected: Option<String>,
}

impl TreeOutcome {
    /// Whether a node was matched and changed
    #[must_use]
    pub fn applied(&self) -> bool {
        self.affected.is_some()
    }
}

/// Apply `op` to `forest`, producing a new forest
///
/// The input is never modified; callers holding it keep the old tree.
#[must_use]
pub fn apply(forest: &[BomItem], op: &ItemOperation, ids: &dyn IdGenerator) -> TreeOutcome {
    let mut forest = forest.to_vec();
    let affected = apply_mut(&mut forest, op, ids);
    TreeOutcome { forest, affected }
}

/// Apply `op` to a forest the caller exclusively owns
///
/// Returns the affected item ID, or `None` if nothing matched (in which case
/// `forest` is untouched).
pub fn apply_mut(
    forest: &mut Vec<BomItem>,
    op: &ItemOperation,
    ids: &dyn IdGenerator,
) -> Option<String> {
    if let ItemOperation::Add {
        parent_id: None,
        payload,
    } = op
    {
        let item = new_item(ids.next_id(ITEM_PREFIX), None, 1, payload);
        let id = item.id.clone();
        forest.push(item);
        return Some(id);
    }

    let target = op.target()?;
    apply_at(forest, target, op, ids)
}

fn apply_at(
    nodes: &mut Vec<BomItem>,
    target: &str,
    op: &ItemOperation,
    ids: &dyn IdGenerator,
) -> Option<String> {
    for i in 0..nodes.len() {
        if nodes[i].id == target {
            let affected = match op {
                ItemOperation::Add { payload, .. } => {
                    let parent = &mut nodes[i];
                    let child = new_item(
                        ids.next_id(ITEM_PREFIX),
                        Some(parent.id.clone()),
                        parent.level + 1,
                        payload,
                    );
                    let id = child.id.clone();
                    parent.children.push(child);
                    id
                }
                ItemOperation::Edit { patch, .. } => {
                    merge(&mut nodes[i], patch);
                    target.to_string()
                }
                ItemOperation::Delete { .. } => {
                    // Children go with the node
                    nodes.remove(i);
                    target.to_string()
                }
                ItemOperation::ToggleExpand { .. } => {
                    nodes[i].is_expanded = !nodes[i].is_expanded;
                    target.to_string()
                }
            };
            return Some(affected);
        }

        if let Some(affected) = apply_at(&mut nodes[i].children, target, op, ids) {
            return Some(affected);
        }
    }
    None
}

/// Build a new item from a payload, filling defaults for unset fields
fn new_item(id: String, parent_id: Option<String>, level: u32, payload: &ItemPayload) -> BomItem {
    let quantity = payload.quantity.unwrap_or(1.0);
    let unit_price = payload.unit_price.unwrap_or(0.0);
    BomItem {
        id,
        parent_id,
        part_code: payload.part_code.clone().unwrap_or_default(),
        part_name: payload.part_name.clone().unwrap_or_default(),
        specification: payload.specification.clone().unwrap_or_default(),
        part_type: payload.part_type.unwrap_or_default(),
        unit: payload
            .unit
            .clone()
            .unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        quantity,
        unit_price,
        total_price: cost::item_price(quantity, unit_price),
        manufacturer: payload.manufacturer.clone().unwrap_or_default(),
        model: payload.model.clone().unwrap_or_default(),
        supplier: payload.supplier.clone().unwrap_or_default(),
        lead_time: payload.lead_time.unwrap_or(0.0),
        min_stock: payload.min_stock.unwrap_or(0.0),
        current_stock: payload.current_stock.unwrap_or(0.0),
        remarks: payload.remarks.clone().unwrap_or_default(),
        level,
        is_expanded: true,
        children: Vec::new(),
    }
}

/// Merge supplied fields into an item and re-derive its price
///
/// `id`, `parent_id`, `level` and `children` are not reachable from a patch.
fn merge(item: &mut BomItem, patch: &ItemPayload) {
    fn set(field: &mut String, value: Option<&String>) {
        if let Some(v) = value {
            field.clone_from(v);
        }
    }

    set(&mut item.part_code, patch.part_code.as_ref());
    set(&mut item.part_name, patch.part_name.as_ref());
    set(&mut item.specification, patch.specification.as_ref());
    set(&mut item.unit, patch.unit.as_ref());
    set(&mut item.manufacturer, patch.manufacturer.as_ref());
    set(&mut item.model, patch.model.as_ref());
    set(&mut item.supplier, patch.supplier.as_ref());
    set(&mut item.remarks, patch.remarks.as_ref());

    if let Some(part_type) = patch.part_type {
        item.part_type = part_type;
    }
    if let Some(quantity) = patch.quantity {
        item.quantity = quantity;
    }
    if let Some(unit_price) = patch.unit_price {
        item.unit_price = unit_price;
    }
    if let Some(lead_time) = patch.lead_time {
        item.lead_time = lead_time;
    }
    if let Some(min_stock) = patch.min_stock {
        item.min_stock = min_stock;
    }
    if let Some(current_stock) = patch.current_stock {
        item.current_stock = current_stock;
    }

    item.total_price = cost::item_price(item.quantity, item.unit_price);
}

/// Re-derive `level` and `parent_id` from each node's position
pub fn relink(nodes: &mut [BomItem], parent_id: Option<&str>, level: u32) {
    for item in nodes {
        item.parent_id = parent_id.map(String::from);
        item.level = level;
        let id = item.id.clone();
        relink(&mut item.children, Some(&id), level + 1);
    }
}

/// Re-derive `total_price` on every node
pub fn recompute_prices(nodes: &mut [BomItem]) {
    for item in nodes {
        item.total_price = cost::item_price(item.quantity, item.unit_price);
        recompute_prices(&mut item.children);
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// Pre-order iterator over every node of a forest
pub struct Walk<'a> {
    stack: Vec<std::slice::Iter<'a, BomItem>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a BomItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            if let Some(item) = top.next() {
                self.stack.push(item.children.iter());
                return Some(item);
            }
            self.stack.pop();
        }
    }
}

/// Walk `nodes` and all descendants, parents before children
#[must_use]
pub fn walk(nodes: &[BomItem]) -> Walk<'_> {
    Walk {
        stack: vec![nodes.iter()],
    }
}

/// Find the first node with `id` in traversal order
#[must_use]
pub fn find_item<'a>(nodes: &'a [BomItem], id: &str) -> Option<&'a BomItem> {
    walk(nodes).find(|item| item.id == id)
}

/// Items whose stock on hand is below their minimum
#[must_use]
pub fn low_stock(nodes: &[BomItem]) -> Vec<&BomItem> {
    walk(nodes).filter(|item| item.is_below_min_stock()).collect()
}

/// Number of nodes in the forest
#[must_use]
pub fn count(nodes: &[BomItem]) -> usize {
    walk(nodes).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;

    fn payload(code: &str, quantity: f64, unit_price: f64) -> ItemPayload {
        ItemPayload {
            part_code: Some(code.into()),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
            ..Default::default()
        }
    }

    fn add(parent: Option<&str>, code: &str, quantity: f64, unit_price: f64) -> ItemOperation {
        ItemOperation::Add {
            parent_id: parent.map(String::from),
            payload: payload(code, quantity, unit_price),
        }
    }

    /// root(item-1) -> child(item-2) -> grandchild(item-3), plus sibling root(item-4)
    fn sample(ids: &SequentialIdGenerator) -> Vec<BomItem> {
        let mut forest = Vec::new();
        apply_mut(&mut forest, &add(None, "ROOT", 1.0, 100.0), ids);
        apply_mut(&mut forest, &add(Some("item-1"), "CHILD", 2.0, 10.0), ids);
        apply_mut(&mut forest, &add(Some("item-2"), "GRAND", 4.0, 1.0), ids);
        apply_mut(&mut forest, &add(None, "OTHER", 1.0, 5.0), ids);
        forest
    }

    #[test]
    fn test_add_top_level_defaults() {
        let ids = SequentialIdGenerator::new();
        let outcome = apply(
            &[],
            &ItemOperation::Add {
                parent_id: None,
                payload: ItemPayload::default(),
            },
            &ids,
        );

        assert_eq!(outcome.affected.as_deref(), Some("item-1"));
        let item = &outcome.forest[0];
        assert_eq!(item.level, 1);
        assert_eq!(item.parent_id, None);
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.total_price, 0.0);
        assert_eq!(item.unit, "EA");
        assert_eq!(item.part_type, crate::types::PartType::Standard);
        assert!(item.children.is_empty());
    }

    #[test]
    fn test_add_child_sets_level_and_parent() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);

        let grand = find_item(&forest, "item-3").unwrap();
        assert_eq!(grand.level, 3);
        assert_eq!(grand.parent_id.as_deref(), Some("item-2"));
        assert_eq!(grand.total_price, 4.0);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_add_appends_after_existing_children() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let outcome = apply(&forest, &add(Some("item-1"), "SECOND", 1.0, 1.0), &ids);

        let root = &outcome.forest[0];
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].part_code, "SECOND");
        assert_eq!(root.children[0], forest[0].children[0]);
    }

    #[test]
    fn test_add_missing_parent_is_noop() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let outcome = apply(&forest, &add(Some("nonexistent-id"), "X", 1.0, 1.0), &ids);

        assert!(!outcome.applied());
        assert_eq!(outcome.forest, forest);
    }

    #[test]
    fn test_edit_recomputes_price_from_merged_values() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let op = ItemOperation::Edit {
            id: "item-2".into(),
            patch: ItemPayload {
                unit_price: Some(20.0),
                supplier: Some("ACME".into()),
                ..Default::default()
            },
        };

        let outcome = apply(&forest, &op, &ids);
        let child = find_item(&outcome.forest, "item-2").unwrap();

        assert_eq!(child.quantity, 2.0);
        assert_eq!(child.unit_price, 20.0);
        assert_eq!(child.total_price, 40.0);
        assert_eq!(child.supplier, "ACME");
        assert_eq!(child.part_code, "CHILD");
        assert_eq!(child.level, 2);
        assert_eq!(child.children.len(), 1);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let outcome = apply(&forest, &ItemOperation::Delete { id: "item-2".into() }, &ids);

        assert_eq!(outcome.affected.as_deref(), Some("item-2"));
        assert!(find_item(&outcome.forest, "item-2").is_none());
        assert!(find_item(&outcome.forest, "item-3").is_none());
        assert!(outcome.forest[0].children.is_empty());
        assert_eq!(count(&outcome.forest), 2);
    }

    #[test]
    fn test_delete_top_level() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let outcome = apply(&forest, &ItemOperation::Delete { id: "item-1".into() }, &ids);

        assert_eq!(outcome.forest.len(), 1);
        assert_eq!(outcome.forest[0].id, "item-4");
    }

    #[test]
    fn test_toggle_flips_only_expanded() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let op = ItemOperation::ToggleExpand { id: "item-3".into() };

        let once = apply(&forest, &op, &ids);
        let before = find_item(&forest, "item-3").unwrap();
        let after = find_item(&once.forest, "item-3").unwrap();
        assert_eq!(after.is_expanded, !before.is_expanded);
        assert_eq!(
            BomItem {
                is_expanded: before.is_expanded,
                ..after.clone()
            },
            *before
        );

        let twice = apply(&once.forest, &op, &ids);
        assert_eq!(twice.forest, forest);
    }

    #[test]
    fn test_missing_target_is_noop_for_every_operation() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let ops = [
            ItemOperation::Edit {
                id: "missing".into(),
                patch: payload("X", 9.0, 9.0),
            },
            ItemOperation::Delete {
                id: "missing".into(),
            },
            ItemOperation::ToggleExpand {
                id: "missing".into(),
            },
        ];

        for op in &ops {
            let outcome = apply(&forest, op, &ids);
            assert_eq!(outcome.forest, forest, "{} should be a no-op", op.kind());
            assert_eq!(outcome.affected, None);
        }
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let snapshot = forest.clone();

        let _ = apply(&forest, &ItemOperation::Delete { id: "item-1".into() }, &ids);
        let _ = apply(&forest, &add(Some("item-3"), "DEEP", 1.0, 1.0), &ids);

        assert_eq!(forest, snapshot);
    }

    #[test]
    fn test_duplicate_ids_first_match_wins() {
        let ids = SequentialIdGenerator::new();
        let mut forest = sample(&ids);
        // Corrupt the tree: the sibling root reuses the grandchild's id
        forest[1].id = "item-3".into();

        let outcome = apply(
            &forest,
            &ItemOperation::Edit {
                id: "item-3".into(),
                patch: ItemPayload {
                    remarks: Some("hit".into()),
                    ..Default::default()
                },
            },
            &ids,
        );

        assert_eq!(outcome.forest[0].children[0].children[0].remarks, "hit");
        assert_eq!(outcome.forest[1].remarks, "");
    }

    #[test]
    fn test_walk_is_preorder() {
        let ids = SequentialIdGenerator::new();
        let forest = sample(&ids);
        let order: Vec<_> = walk(&forest).map(|i| i.id.as_str()).collect();
        assert_eq!(order, ["item-1", "item-2", "item-3", "item-4"]);
    }

    #[test]
    fn test_low_stock() {
        let ids = SequentialIdGenerator::new();
        let mut forest = sample(&ids);
        apply_mut(
            &mut forest,
            &ItemOperation::Edit {
                id: "item-3".into(),
                patch: ItemPayload {
                    min_stock: Some(5.0),
                    current_stock: Some(2.0),
                    ..Default::default()
                },
            },
            &ids,
        );

        let low: Vec<_> = low_stock(&forest).iter().map(|i| i.id.clone()).collect();
        assert_eq!(low, ["item-3"]);
    }

    #[test]
    fn test_recompute_prices() {
        let ids = SequentialIdGenerator::new();
        let mut forest = sample(&ids);
        forest[0].children[0].total_price = 999.0;

        recompute_prices(&mut forest);

        assert_eq!(forest[0].children[0].total_price, 20.0);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Arena index over a document's item tree
//!
//! Items live nested in the document; this index flattens them into a node
//! table keyed by ID with parent -> child edges, for lookups that would
//! otherwise need a full walk per query.

use crate::tree;
use crate::types::{BomDocument, BomItem};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Parent/child structure of one document
pub struct StructureIndex {
    /// Item IDs as nodes, parent -> child edges
    graph: DiGraph<String, ()>,
    /// Map from item ID to node index
    node_indices: HashMap<String, NodeIndex>,
}

impl StructureIndex {
    /// Index a forest
    ///
    /// If an ID occurs twice, the first occurrence in traversal order is
    /// indexed and the later one is skipped along with its subtree.
    #[must_use]
    pub fn build(items: &[BomItem]) -> Self {
        let mut index = Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
        };
        index.insert(items, None);
        index
    }

    fn insert(&mut self, items: &[BomItem], parent: Option<NodeIndex>) {
        for item in items {
            if self.node_indices.contains_key(&item.id) {
                continue;
            }
            let idx = self.graph.add_node(item.id.clone());
            self.node_indices.insert(item.id.clone(), idx);
            if let Some(parent) = parent {
                self.graph.add_edge(parent, idx, ());
            }
            self.insert(&item.children, Some(idx));
        }
    }

    /// Number of indexed items
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether no items are indexed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Whether an item with `id` exists
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Parent of `id`, `None` for top-level or unknown items
    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&str> {
        let idx = *self.node_indices.get(id)?;
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
            .map(|p| self.graph[p].as_str())
    }

    /// IDs from the top-level ancestor down to `id` itself
    ///
    /// Empty if `id` is not indexed.
    #[must_use]
    pub fn path(&self, id: &str) -> Vec<&str> {
        let Some(&start) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut path = vec![self.graph[start].as_str()];
        let mut current = start;
        while let Some(parent) = self
            .graph
            .neighbors_directed(current, Direction::Incoming)
            .next()
        {
            path.push(self.graph[parent].as_str());
            current = parent;
        }
        path.reverse();
        path
    }

    /// `id` and every descendant, in no particular order
    #[must_use]
    pub fn subtree(&self, id: &str) -> Vec<&str> {
        let Some(&start) = self.node_indices.get(id) else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(nx) = dfs.next(&self.graph) {
            ids.push(self.graph[nx].as_str());
        }
        ids
    }

    /// Length of the longest root-to-leaf path (0 for an empty tree)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.node_indices
            .keys()
            .map(|id| self.path(id).len())
            .max()
            .unwrap_or(0)
    }

    /// Items whose stored `level` disagrees with their position in the tree
    #[must_use]
    pub fn level_violations<'a>(&self, items: &'a [BomItem]) -> Vec<&'a str> {
        tree::walk(items)
            .filter(|item| {
                let depth = self.path(&item.id).len();
                usize::try_from(item.level).map_or(true, |level| level != depth)
            })
            .map(|item| item.id.as_str())
            .collect()
    }

    /// Export the document's tree to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self, document: &BomDocument) -> String {
        let mut dot = String::from("digraph bom {\n");
        dot.push_str("  rankdir=LR;\n");
        dot.push_str("  node [shape=box, style=rounded];\n\n");

        let _ = writeln!(
            dot,
            "  \"{}\" [label=\"{}\\n{}\", shape=folder];",
            escape(&document.id),
            escape(&document.equipment_code),
            escape(&document.version)
        );

        let mut seen = std::collections::HashSet::new();
        for item in tree::walk(&document.items) {
            if !seen.insert(item.id.as_str()) {
                continue;
            }
            let _ = writeln!(
                dot,
                "  \"{}\" [label=\"{}\\n{} x {}\"];",
                escape(&item.id),
                escape(&item.part_code),
                item.quantity,
                item.unit_price
            );
        }

        dot.push('\n');

        for item in &document.items {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\";",
                escape(&document.id),
                escape(&item.id)
            );
        }
        for edge in self.graph.edge_references() {
            let _ = writeln!(
                dot,
                "  \"{}\" -> \"{}\";",
                escape(&self.graph[edge.source()]),
                escape(&self.graph[edge.target()])
            );
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use crate::types::{ItemOperation, ItemPayload};

    fn forest() -> Vec<BomItem> {
        let ids = SequentialIdGenerator::new();
        let mut items = Vec::new();
        let add = |parent: Option<&str>| ItemOperation::Add {
            parent_id: parent.map(String::from),
            payload: ItemPayload::default(),
        };
        tree::apply_mut(&mut items, &add(None), &ids); // item-1
        tree::apply_mut(&mut items, &add(Some("item-1")), &ids); // item-2
        tree::apply_mut(&mut items, &add(Some("item-2")), &ids); // item-3
        tree::apply_mut(&mut items, &add(Some("item-1")), &ids); // item-4
        tree::apply_mut(&mut items, &add(None), &ids); // item-5
        items
    }

    #[test]
    fn test_parent_and_path() {
        let items = forest();
        let index = StructureIndex::build(&items);

        assert_eq!(index.len(), 5);
        assert_eq!(index.parent("item-3"), Some("item-2"));
        assert_eq!(index.parent("item-1"), None);
        assert_eq!(index.path("item-3"), ["item-1", "item-2", "item-3"]);
        assert!(index.path("missing").is_empty());
    }

    #[test]
    fn test_subtree_and_depth() {
        let items = forest();
        let index = StructureIndex::build(&items);

        let mut subtree = index.subtree("item-1");
        subtree.sort_unstable();
        assert_eq!(subtree, ["item-1", "item-2", "item-3", "item-4"]);
        assert_eq!(index.depth(), 3);
        assert_eq!(StructureIndex::build(&[]).depth(), 0);
    }

    #[test]
    fn test_level_violations() {
        let mut items = forest();
        assert!(StructureIndex::build(&items).level_violations(&items).is_empty());

        items[0].children[0].level = 7;
        let index = StructureIndex::build(&items);
        assert_eq!(index.level_violations(&items), ["item-2"]);
    }

    #[test]
    fn test_dot_escapes_quotes_everywhere() {
        let mut items = forest();
        items[0].id = "item\"1".into();
        items[0].children[0].parent_id = Some("item\"1".into());
        let document = BomDocument {
            id: "bom\"1".into(),
            equipment_id: "eq".into(),
            equipment_code: "PMP \"A\"".into(),
            equipment_name: String::new(),
            version: "v1\\beta".into(),
            status: crate::types::BomStatus::Draft,
            items,
            total_cost: 0.0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let dot = StructureIndex::build(&document.items).to_dot(&document);

        assert!(dot.contains(r#""bom\"1" [label="PMP \"A\"\nv1\\beta", shape=folder];"#));
        assert!(dot.contains(r#""bom\"1" -> "item\"1";"#));
        assert!(dot.contains(r#""item\"1" -> "item-2";"#));
        // Every quote inside a line is either a delimiter or escaped
        for line in dot.lines() {
            let unescaped = line.replace("\\\\", "").replace("\\\"", "");
            assert_eq!(unescaped.matches('"').count() % 2, 0, "{line}");
        }
    }

    #[test]
    fn test_duplicate_ids_index_first_occurrence() {
        let mut items = forest();
        items[1].id = "item-2".into();

        let index = StructureIndex::build(&items);

        assert_eq!(index.len(), 4);
        assert_eq!(index.parent("item-2"), Some("item-1"));
    }
}

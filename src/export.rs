// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Document export: flat tabular rows, CSV, JSON and Graphviz DOT

use crate::index::StructureIndex;
use crate::tree;
use crate::types::{BomDocument, PartType};
use anyhow::{Context, Result};
use serde::Serialize;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Depth-first flattened rows with a level column
    Csv,
    /// The full document as JSON
    Json,
    /// Graphviz DOT format
    Dot,
}

impl ExportFormat {
    /// Parse format from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "dot" | "graphviz" => Some(Self::Dot),
            _ => None,
        }
    }

    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Dot => "dot",
        }
    }
}

/// One item as a table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    /// Depth in the tree
    pub level: u32,
    /// Item ID
    pub id: String,
    /// Parent item ID
    pub parent_id: Option<String>,
    /// Part code
    pub part_code: String,
    /// Part name
    pub part_name: String,
    /// Part classification
    pub part_type: PartType,
    /// Unit of measure
    pub unit: String,
    /// Quantity
    pub quantity: f64,
    /// Unit price
    pub unit_price: f64,
    /// Line total
    pub total_price: f64,
    /// Supplier
    pub supplier: String,
    /// Lead time in days
    pub lead_time: f64,
    /// Minimum stock
    pub min_stock: f64,
    /// Stock on hand
    pub current_stock: f64,
}

/// Flatten the document depth-first, parents before their children
#[must_use]
pub fn flatten(document: &BomDocument) -> Vec<FlatRow> {
    tree::walk(&document.items)
        .map(|item| FlatRow {
            level: item.level,
            id: item.id.clone(),
            parent_id: item.parent_id.clone(),
            part_code: item.part_code.clone(),
            part_name: item.part_name.clone(),
            part_type: item.part_type,
            unit: item.unit.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            supplier: item.supplier.clone(),
            lead_time: item.lead_time,
            min_stock: item.min_stock,
            current_stock: item.current_stock,
        })
        .collect()
}

/// Write the flattened rows as CSV with a header line
pub fn to_csv(document: &BomDocument) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in flatten(document) {
        writer
            .serialize(&row)
            .with_context(|| format!("Failed to write row for {}", row.id))?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Export to JSON
pub fn to_json(document: &BomDocument) -> Result<String> {
    serde_json::to_string_pretty(document).context("Failed to serialize document to JSON")
}

/// Render a document in the requested format
pub fn render(document: &BomDocument, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => to_csv(document),
        ExportFormat::Json => to_json(document),
        ExportFormat::Dot => Ok(StructureIndex::build(&document.items).to_dot(document)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use crate::store::BomDocumentStore;
    use crate::types::{EquipmentRef, ItemOperation, ItemPayload};

    fn document() -> BomDocument {
        let mut store = BomDocumentStore::new().with_id_generator(SequentialIdGenerator::new());
        let doc_id = store
            .create_document(&EquipmentRef {
                id: "eq-1".into(),
                code: "CMP-01".into(),
                name: "Compressor".into(),
            })
            .id
            .clone();
        let add = |parent: Option<&str>, code: &str| ItemOperation::Add {
            parent_id: parent.map(String::from),
            payload: ItemPayload {
                part_code: Some(code.into()),
                ..Default::default()
            },
        };
        store.apply_item_operation(&doc_id, &add(None, "MOTOR")).unwrap();
        store.apply_item_operation(&doc_id, &add(Some("item-2"), "BEARING")).unwrap();
        store.apply_item_operation(&doc_id, &add(None, "VALVE")).unwrap();
        store.read_tree(&doc_id).unwrap().clone()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("CSV"), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::parse("graphviz"), Some(ExportFormat::Dot));
        assert_eq!(ExportFormat::parse("xlsx"), None);
        assert_eq!(ExportFormat::Json.extension(), "json");
    }

    #[test]
    fn test_flatten_depth_first_with_levels() {
        let rows = flatten(&document());
        let summary: Vec<_> = rows.iter().map(|r| (r.level, r.part_code.as_str())).collect();
        assert_eq!(summary, [(1, "MOTOR"), (2, "BEARING"), (1, "VALVE")]);
        assert_eq!(rows[1].parent_id.as_deref(), Some("item-2"));
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let csv = to_csv(&document()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("level,id,parent_id,part_code"));
        assert!(lines[2].starts_with("2,item-3,item-2,BEARING"));
    }

    #[test]
    fn test_dot_contains_document_and_edges() {
        let dot = render(&document(), ExportFormat::Dot).unwrap();
        assert!(dot.contains("digraph bom"));
        assert!(dot.contains("\"bom-1\" -> \"item-2\""));
        assert!(dot.contains("\"item-2\" -> \"item-3\""));
        assert!(dot.contains("BEARING"));
    }
}

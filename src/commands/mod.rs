// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod completions;
pub mod config;
pub mod doc;
pub mod export;
pub mod item;

use crate::store::BomDocumentStore;
use crate::types::{BomDocument, BomItem};
use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::PathBuf;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory holding the document store
    pub data_dir: PathBuf,
    /// Fail operations on missing items
    pub strict_targets: bool,
    /// Print JSON instead of text
    pub json: bool,
    /// Colored output
    pub color: bool,
}

impl Context {
    /// Load the document store from the data directory
    pub fn load_store(&self) -> Result<BomDocumentStore> {
        let store = BomDocumentStore::load(&self.data_dir)
            .with_context(|| format!("Failed to load store from {}", self.data_dir.display()))?;
        Ok(store.with_strict_targets(self.strict_targets))
    }

    /// Save the document store to the data directory
    pub fn save_store(&self, store: &BomDocumentStore) -> Result<()> {
        store
            .save(&self.data_dir)
            .with_context(|| format!("Failed to save store to {}", self.data_dir.display()))
    }

    /// Print a value as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
        println!("{json}");
        Ok(())
    }

    fn paint_code(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

/// Resolve a document ID or equipment code, falling back to the selection
pub fn resolve_document_id(store: &BomDocumentStore, id_or_code: Option<&str>) -> Result<String> {
    let Some(id_or_code) = id_or_code else {
        return store.selected_id().map(String::from).ok_or_else(|| {
            anyhow::anyhow!("No document selected. Use 'bomtree doc select <id>' or pass --doc")
        });
    };

    if store.documents().iter().any(|d| d.id == id_or_code) {
        return Ok(id_or_code.to_string());
    }

    let matches: Vec<_> = store
        .documents()
        .iter()
        .filter(|d| d.equipment_code == id_or_code)
        .collect();

    match matches.len() {
        0 => anyhow::bail!("No document found matching: {}", id_or_code),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple documents for equipment '{}':", id_or_code);
            for d in &matches {
                eprintln!("  {} {} ({})", d.id, d.version, d.status.label());
            }
            anyhow::bail!("Ambiguous equipment code. Use the document ID.");
        }
    }
}

/// Print a document's item tree, hiding the children of collapsed items
pub fn print_tree(ctx: &Context, document: &BomDocument) {
    println!(
        "{} {} {} [{}]",
        ctx.paint_code(&document.equipment_code),
        document.equipment_name,
        document.version,
        document.status.label()
    );
    if document.items.is_empty() {
        println!("  (no items)");
    }
    print_items(ctx, &document.items, 1);
    println!("Total cost: {}", document.total_cost);
}

pub(crate) fn print_items(ctx: &Context, items: &[BomItem], depth: usize) {
    for item in items {
        let marker = match (item.is_leaf(), item.is_expanded) {
            (true, _) => "-",
            (false, true) => "v",
            (false, false) => ">",
        };
        let hidden = if !item.is_leaf() && !item.is_expanded {
            format!(" (+{} hidden)", item.children.len())
        } else {
            String::new()
        };
        println!(
            "{}{} {} {}  {} {} x {} = {}{}  {}",
            "  ".repeat(depth),
            marker,
            ctx.paint_code(&item.part_code),
            item.part_name,
            item.quantity,
            item.unit,
            item.unit_price,
            item.total_price,
            hidden,
            ctx.paint_dim(&item.id)
        );
        if item.is_expanded {
            print_items(ctx, &item.children, depth + 1);
        }
    }
}

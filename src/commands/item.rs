// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Item commands - add, edit, delete and expand/collapse BOM items

use super::{print_items, resolve_document_id, Context};
use crate::cost;
use crate::index::StructureIndex;
use crate::store::BomDocumentStore;
use crate::tree;
use crate::types::{ItemOperation, ItemPayload, PartType};
use anyhow::{anyhow, Result};

/// Item fields settable from the command line
#[derive(Debug, Default, clap::Args)]
pub struct ItemFields {
    /// Part code
    #[arg(long)]
    pub part_code: Option<String>,
    /// Part name
    #[arg(long)]
    pub part_name: Option<String>,
    /// Specification
    #[arg(long)]
    pub spec: Option<String>,
    /// Part type: consumable, replacement, spare, standard
    #[arg(long)]
    pub part_type: Option<String>,
    /// Unit of measure
    #[arg(long)]
    pub unit: Option<String>,
    /// Quantity
    #[arg(long)]
    pub quantity: Option<f64>,
    /// Unit price
    #[arg(long)]
    pub unit_price: Option<f64>,
    /// Manufacturer
    #[arg(long)]
    pub manufacturer: Option<String>,
    /// Manufacturer model
    #[arg(long)]
    pub model: Option<String>,
    /// Supplier
    #[arg(long)]
    pub supplier: Option<String>,
    /// Lead time in days
    #[arg(long)]
    pub lead_time: Option<f64>,
    /// Minimum stock
    #[arg(long)]
    pub min_stock: Option<f64>,
    /// Stock on hand
    #[arg(long)]
    pub current_stock: Option<f64>,
    /// Remarks
    #[arg(long)]
    pub remarks: Option<String>,
}

impl ItemFields {
    /// Convert to an engine payload
    pub fn into_payload(self) -> Result<ItemPayload> {
        let part_type = self
            .part_type
            .as_deref()
            .map(|s| {
                PartType::parse(s).ok_or_else(|| {
                    anyhow!(
                        "Unknown part type: {}. Valid: consumable, replacement, spare, standard",
                        s
                    )
                })
            })
            .transpose()?;

        Ok(ItemPayload {
            part_code: self.part_code,
            part_name: self.part_name,
            specification: self.spec,
            part_type,
            unit: self.unit,
            quantity: self.quantity,
            unit_price: self.unit_price,
            manufacturer: self.manufacturer,
            model: self.model,
            supplier: self.supplier,
            lead_time: self.lead_time,
            min_stock: self.min_stock,
            current_stock: self.current_stock,
            remarks: self.remarks,
        })
    }
}

/// Run item command
pub fn run(
    ctx: &Context,
    action: &str,
    target: Option<String>,
    doc: Option<String>,
    parent: Option<String>,
    fields: ItemFields,
) -> Result<()> {
    let mut store = ctx.load_store()?;
    let doc_id = resolve_document_id(&store, doc.as_deref())?;

    let op = match action {
        "add" | "new" => ItemOperation::Add {
            parent_id: parent,
            payload: fields.into_payload()?,
        },
        "edit" | "set" => ItemOperation::Edit {
            id: target.ok_or_else(|| anyhow!("Item ID is required"))?,
            patch: fields.into_payload()?,
        },
        "delete" | "rm" => ItemOperation::Delete {
            id: target.ok_or_else(|| anyhow!("Item ID is required"))?,
        },
        "toggle" | "expand" | "collapse" => ItemOperation::ToggleExpand {
            id: target.ok_or_else(|| anyhow!("Item ID is required"))?,
        },
        "show" => {
            let id = target.ok_or_else(|| anyhow!("Item ID is required"))?;
            return show(ctx, &store, &doc_id, &id);
        }
        other => {
            anyhow::bail!(
                "Unknown action: {}. Valid: add, edit, delete, toggle, show",
                other
            );
        }
    };

    let applied = store.apply_item_operation(&doc_id, &op)?;
    let document = applied.document.clone();
    let Some(affected) = applied.affected else {
        let message = format!(
            "No item matched {}; document unchanged",
            op.target().unwrap_or_default()
        );
        if ctx.json {
            eprintln!("{message}");
            return ctx.print_json(&document);
        }
        println!("{message}");
        return Ok(());
    };
    ctx.save_store(&store)?;

    if ctx.json {
        return ctx.print_json(&document);
    }

    match op {
        ItemOperation::Add { .. } => println!("Added item: {}", affected),
        ItemOperation::Edit { .. } => println!("Updated item: {}", affected),
        ItemOperation::Delete { .. } => println!("Deleted item: {} (with its sub-parts)", affected),
        ItemOperation::ToggleExpand { .. } => {
            let expanded = tree::find_item(&document.items, &affected).map(|i| i.is_expanded);
            let state = if expanded == Some(true) { "expanded" } else { "collapsed" };
            println!("Item {} {}", affected, state);
        }
    }
    println!("Document total: {}", document.total_cost);

    Ok(())
}

fn show(ctx: &Context, store: &BomDocumentStore, doc_id: &str, id: &str) -> Result<()> {
    let document = store.read_tree(doc_id)?;
    let item = tree::find_item(&document.items, id)
        .ok_or_else(|| anyhow!("Item not found in {}: {}", doc_id, id))?;

    if ctx.json {
        return ctx.print_json(item);
    }

    let index = StructureIndex::build(&document.items);
    let path: Vec<_> = index
        .path(id)
        .into_iter()
        .filter_map(|step| tree::find_item(&document.items, step))
        .map(|step| step.part_code.as_str())
        .collect();

    println!("Item: {} {}", item.part_code, item.part_name);
    println!("  id: {}", item.id);
    println!("  path: {}", path.join(" / "));
    println!("  level: {}", item.level);
    println!("  type: {}", item.part_type.label());
    println!(
        "  price: {} {} x {} = {}",
        item.quantity, item.unit, item.unit_price, item.total_price
    );
    println!("  subtree cost: {}", cost::subtree_cost(item));
    if !item.specification.is_empty() {
        println!("  specification: {}", item.specification);
    }
    if !item.manufacturer.is_empty() || !item.model.is_empty() {
        println!("  manufacturer: {} {}", item.manufacturer, item.model);
    }
    if !item.supplier.is_empty() {
        println!("  supplier: {} (lead time {} days)", item.supplier, item.lead_time);
    }
    println!(
        "  stock: {} on hand, {} minimum{}",
        item.current_stock,
        item.min_stock,
        if item.is_below_min_stock() { " (below minimum)" } else { "" }
    );
    if !item.remarks.is_empty() {
        println!("  remarks: {}", item.remarks);
    }
    if !item.children.is_empty() {
        println!("  sub-parts ({}):", item.children.len());
        print_items(ctx, &item.children, 2);
    }

    Ok(())
}

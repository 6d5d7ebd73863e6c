// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Document commands - create, select, inspect and retire BOM documents

use super::{print_tree, resolve_document_id, Context};
use crate::cost;
use crate::index::StructureIndex;
use crate::tree;
use crate::types::{BomStatus, EquipmentRef, HeaderPatch};
use anyhow::{anyhow, Result};
use serde_json::json;

/// Arguments for document commands
#[derive(Debug, Default, clap::Args)]
pub struct DocArgs {
    /// Equipment identifier
    #[arg(long)]
    pub equipment_id: Option<String>,
    /// Equipment code
    #[arg(long)]
    pub code: Option<String>,
    /// Equipment name
    #[arg(long)]
    pub name: Option<String>,
    /// Version label
    #[arg(long = "doc-version", id = "doc_version")]
    pub version: Option<String>,
    /// Status: draft, approved, active, obsolete
    #[arg(long)]
    pub status: Option<String>,
}

/// Run document command
pub fn run(ctx: &Context, action: &str, id: Option<String>, args: DocArgs) -> Result<()> {
    let mut store = ctx.load_store()?;

    match action {
        "create" | "new" => {
            let code = args
                .code
                .ok_or_else(|| anyhow!("Equipment code is required (--code)"))?;
            let equipment = EquipmentRef {
                id: args.equipment_id.unwrap_or_else(|| code.clone()),
                name: args.name.unwrap_or_default(),
                code,
            };

            let doc_id = store.create_document(&equipment).id.clone();
            if args.version.is_some() {
                store.update_header(
                    &doc_id,
                    &HeaderPatch {
                        version: args.version,
                        status: None,
                    },
                )?;
            }
            ctx.save_store(&store)?;

            let document = store.read_tree(&doc_id)?;
            if ctx.json {
                ctx.print_json(document)?;
            } else {
                println!("Created document: {}", document.id);
                println!("  equipment: {} {}", document.equipment_code, document.equipment_name);
                println!("  version: {}", document.version);
            }
        }

        "list" | "ls" => {
            if ctx.json {
                return ctx.print_json(&store.documents());
            }
            if store.is_empty() {
                println!("No documents. Use 'bomtree doc create --code <equipment>' to create one.");
                return Ok(());
            }

            println!("Documents ({}):", store.len());
            for document in store.documents() {
                let marker = if store.selected_id() == Some(document.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}  {} {} [{}]  {} items, total {}",
                    marker,
                    document.id,
                    document.equipment_code,
                    document.version,
                    document.status.label(),
                    tree::count(&document.items),
                    document.total_cost
                );
            }
        }

        "select" | "use" => {
            let target = id.ok_or_else(|| anyhow!("Document ID is required"))?;
            let doc_id = resolve_document_id(&store, Some(&target))?;
            store.select_document(&doc_id)?;
            ctx.save_store(&store)?;
            println!("Selected document: {}", doc_id);
        }

        "show" => {
            let doc_id = resolve_document_id(&store, id.as_deref())?;
            let document = store.read_tree(&doc_id)?;
            let index = StructureIndex::build(&document.items);
            let by_type = cost::cost_by_part_type(&document.items);
            let low_stock: Vec<_> = tree::low_stock(&document.items)
                .into_iter()
                .map(|item| item.id.as_str())
                .collect();

            if ctx.json {
                let by_type: serde_json::Map<_, _> = by_type
                    .iter()
                    .map(|(part_type, total)| (part_type.label().to_string(), json!(total)))
                    .collect();
                return ctx.print_json(&json!({
                    "document": document,
                    "item_count": index.len(),
                    "depth": index.depth(),
                    "cost_by_part_type": by_type,
                    "low_stock": low_stock,
                }));
            }

            println!("Document: {}", document.id);
            print_tree(ctx, document);
            println!("Items: {} (depth {})", index.len(), index.depth());
            for (part_type, total) in &by_type {
                println!("  {}: {}", part_type.label(), total);
            }
            if !low_stock.is_empty() {
                println!("Below minimum stock: {}", low_stock.join(", "));
            }
        }

        "status" | "update" => {
            let doc_id = resolve_document_id(&store, id.as_deref())?;
            let status = args
                .status
                .as_deref()
                .map(|s| {
                    BomStatus::parse(s).ok_or_else(|| {
                        anyhow!("Unknown status: {}. Valid: draft, approved, active, obsolete", s)
                    })
                })
                .transpose()?;
            if status.is_none() && args.version.is_none() {
                anyhow::bail!("Nothing to update. Pass --status and/or --doc-version");
            }

            let document = store.update_header(
                &doc_id,
                &HeaderPatch {
                    version: args.version,
                    status,
                },
            )?;
            println!(
                "Updated {}: {} [{}]",
                document.id,
                document.version,
                document.status.label()
            );
            ctx.save_store(&store)?;
        }

        "delete" | "rm" => {
            let target = id.ok_or_else(|| anyhow!("Document ID is required"))?;
            let doc_id = resolve_document_id(&store, Some(&target))?;
            let removed = store.delete_document(&doc_id)?;
            ctx.save_store(&store)?;
            println!(
                "Deleted document: {} ({} items)",
                removed.id,
                tree::count(&removed.items)
            );
        }

        other => {
            anyhow::bail!(
                "Unknown action: {}. Valid: create, list, select, show, status, delete",
                other
            );
        }
    }

    Ok(())
}

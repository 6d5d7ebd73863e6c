// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - writes a BOM document as CSV, JSON or DOT

use super::{resolve_document_id, Context};
use crate::export::{self, ExportFormat};
use anyhow::{Context as _, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Run the export command
pub fn run(ctx: &Context, format: &str, output: Option<PathBuf>, doc: Option<String>) -> Result<()> {
    let export_format = ExportFormat::parse(format)
        .ok_or_else(|| anyhow::anyhow!("Unknown export format: {}. Supported: csv, json, dot", format))?;

    let store = ctx.load_store()?;
    let doc_id = resolve_document_id(&store, doc.as_deref())?;
    let document = store.read_tree(&doc_id)?;
    info!(document = %doc_id, format = export_format.extension(), "exporting");

    if document.items.is_empty() {
        eprintln!("Warning: {} has no items.", document.id);
    }

    let content = export::render(document, export_format)?;

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}

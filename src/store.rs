// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Document store: holds BOM documents, tracks the selected one, and keeps
//! every derived value consistent after each operation

use crate::cost;
use crate::error::BomError;
use crate::id::{IdGenerator, TimestampIdGenerator, DOCUMENT_PREFIX};
use crate::tree;
use crate::types::{
    BomDocument, BomItem, BomStatus, EquipmentRef, HeaderPatch, ItemOperation, ItemPayload,
    DEFAULT_VERSION,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// File name of the persisted store inside the data directory
pub const STORE_FILE: &str = "boms.json";

/// On-disk layout of the store
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    selected: Option<String>,
    #[serde(default)]
    documents: Vec<BomDocument>,
}

/// Reject negative or non-finite numeric fields before any mutation
pub fn validate_payload(payload: &ItemPayload) -> Result<(), BomError> {
    let fields = [
        ("quantity", payload.quantity),
        ("unit_price", payload.unit_price),
        ("lead_time", payload.lead_time),
        ("min_stock", payload.min_stock),
        ("current_stock", payload.current_stock),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            check_amount(field, value)?;
        }
    }
    Ok(())
}

fn check_amount(field: &'static str, value: f64) -> Result<(), BomError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BomError::Validation { field, value })
    }
}

/// Check every numeric field of a loaded tree, derived prices included
pub fn validate_items(items: &[BomItem]) -> Result<(), BomError> {
    for item in tree::walk(items) {
        check_amount("quantity", item.quantity)?;
        check_amount("unit_price", item.unit_price)?;
        check_amount("lead_time", item.lead_time)?;
        check_amount("min_stock", item.min_stock)?;
        check_amount("current_stock", item.current_stock)?;
        check_amount("total_price", item.total_price)?;
    }
    check_amount("total_cost", cost::tree_cost(items))
}

impl BomDocument {
    /// An empty draft document for `equipment`
    #[must_use]
    pub fn new(id: String, equipment: &EquipmentRef, now: DateTime<Utc>) -> Self {
        Self {
            id,
            equipment_id: equipment.id.clone(),
            equipment_code: equipment.code.clone(),
            equipment_name: equipment.name.clone(),
            version: DEFAULT_VERSION.to_string(),
            status: BomStatus::Draft,
            items: Vec::new(),
            total_cost: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Run one item operation against this document's tree
    ///
    /// Returns the affected item ID. A missing target is a no-op that yields
    /// `Ok(None)`, or `NodeNotFound` when `strict` is set.
    /// A change whose line total or document total would not be finite is
    /// rejected with `Validation` and the tree is left as it was.
    pub fn apply(
        &mut self,
        op: &ItemOperation,
        ids: &dyn IdGenerator,
        strict: bool,
    ) -> Result<Option<String>, BomError> {
        if let Some(payload) = op.payload() {
            validate_payload(payload)?;
        }

        // Staged so a price that overflows never reaches the stored tree
        let outcome = tree::apply(&self.items, op, ids);
        match outcome.affected {
            Some(affected) => {
                if let Some(item) = tree::find_item(&outcome.forest, &affected) {
                    check_amount("total_price", item.total_price)?;
                }
                let total_cost = cost::tree_cost(&outcome.forest);
                check_amount("total_cost", total_cost)?;

                self.items = outcome.forest;
                self.total_cost = total_cost;
                self.updated_at = Utc::now();
                debug!(
                    document = %self.id,
                    op = op.kind(),
                    item = %affected,
                    total_cost = self.total_cost,
                    "applied item operation"
                );
                Ok(Some(affected))
            }
            None => {
                let target = op.target().unwrap_or_default();
                warn!(document = %self.id, op = op.kind(), item = target, "no item matched");
                if strict {
                    Err(BomError::node_not_found(target))
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Change header fields
    pub fn update_header(&mut self, patch: &HeaderPatch) {
        if let Some(version) = &patch.version {
            self.version.clone_from(version);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }

    /// Re-derive levels, parent links, every item price and the document total
    pub fn refresh_totals(&mut self) {
        tree::relink(&mut self.items, None, 1);
        tree::recompute_prices(&mut self.items);
        self.total_cost = cost::tree_cost(&self.items);
    }
}

/// A document after an item operation
#[derive(Debug)]
pub struct Applied<'a> {
    /// The refreshed document
    pub document: &'a BomDocument,
    /// ID of the added or targeted item; `None` when nothing matched
    pub affected: Option<String>,
}

/// Collection of BOM documents with a current selection
pub struct BomDocumentStore {
    documents: Vec<BomDocument>,
    selected: Option<String>,
    ids: Box<dyn IdGenerator>,
    strict_targets: bool,
}

impl std::fmt::Debug for BomDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BomDocumentStore")
            .field("documents", &self.documents)
            .field("selected", &self.selected)
            .field("strict_targets", &self.strict_targets)
            .finish_non_exhaustive()
    }
}

impl Default for BomDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BomDocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            selected: None,
            ids: Box::new(TimestampIdGenerator),
            strict_targets: false,
        }
    }

    /// Build a store around existing documents, re-deriving their structure
    /// and totals
    #[must_use]
    pub fn from_documents(documents: Vec<BomDocument>) -> Self {
        let mut store = Self::new();
        store.documents = documents;
        for document in &mut store.documents {
            document.refresh_totals();
        }
        store
    }

    /// Use `ids` for new document and item identifiers
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Report operations on missing items as `NodeNotFound` instead of
    /// ignoring them
    #[must_use]
    pub fn with_strict_targets(mut self, strict: bool) -> Self {
        self.strict_targets = strict;
        self
    }

    /// Load the store from `dir`, or start empty if no store file exists
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(STORE_FILE);
        if !path.exists() {
            debug!("No store file at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: StoreFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let mut store = Self::from_documents(file.documents);
        for document in &store.documents {
            validate_items(&document.items).with_context(|| {
                format!("Invalid document {} in {}", document.id, path.display())
            })?;
        }
        store.selected = file
            .selected
            .filter(|id| store.documents.iter().any(|d| &d.id == id));

        info!("Loaded {} documents from {}", store.len(), path.display());
        Ok(store)
    }

    /// Save the store to `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;

        let path = dir.join(STORE_FILE);
        let json = self.to_json()?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Saved {} documents to {}", self.len(), path.display());
        Ok(())
    }

    /// Serialize the whole store
    pub fn to_json(&self) -> Result<String> {
        let file = StoreFile {
            selected: self.selected.clone(),
            documents: self.documents.clone(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize store")
    }

    // =========================================================================
    // Facade
    // =========================================================================

    /// Create an empty draft document for `equipment` and select it
    pub fn create_document(&mut self, equipment: &EquipmentRef) -> &BomDocument {
        let id = self.ids.next_id(DOCUMENT_PREFIX);
        let document = BomDocument::new(id.clone(), equipment, Utc::now());
        info!(document = %id, equipment = %equipment.code, "created document");

        self.documents.push(document);
        self.selected = Some(id);
        let last = self.documents.len() - 1;
        &self.documents[last]
    }

    /// Make `id` the current document
    ///
    /// An unknown ID is reported and the selection is left as it was.
    pub fn select_document(&mut self, id: &str) -> Result<&BomDocument, BomError> {
        let index = self.position(id)?;
        self.selected = Some(id.to_string());
        Ok(&self.documents[index])
    }

    /// Run an item operation on a document and re-derive its cost
    pub fn apply_item_operation(
        &mut self,
        document_id: &str,
        op: &ItemOperation,
    ) -> Result<Applied<'_>, BomError> {
        let index = self.position(document_id)?;
        let document = &mut self.documents[index];
        let affected = document.apply(op, self.ids.as_ref(), self.strict_targets)?;
        Ok(Applied {
            document: &self.documents[index],
            affected,
        })
    }

    /// Read a document
    pub fn read_tree(&self, document_id: &str) -> Result<&BomDocument, BomError> {
        self.position(document_id).map(|index| &self.documents[index])
    }

    // =========================================================================
    // Document list
    // =========================================================================

    /// Change a document's version label or status
    pub fn update_header(
        &mut self,
        document_id: &str,
        patch: &HeaderPatch,
    ) -> Result<&BomDocument, BomError> {
        let index = self.position(document_id)?;
        self.documents[index].update_header(patch);
        Ok(&self.documents[index])
    }

    /// Remove a document, clearing the selection if it pointed there
    pub fn delete_document(&mut self, document_id: &str) -> Result<BomDocument, BomError> {
        let index = self.position(document_id)?;
        let removed = self.documents.remove(index);
        if self.selected.as_deref() == Some(document_id) {
            self.selected = None;
        }
        info!(document = %document_id, "deleted document");
        Ok(removed)
    }

    /// The currently selected document
    #[must_use]
    pub fn selected(&self) -> Option<&BomDocument> {
        let id = self.selected.as_deref()?;
        self.documents.iter().find(|d| d.id == id)
    }

    /// ID of the currently selected document
    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// All documents in creation order
    #[must_use]
    pub fn documents(&self) -> &[BomDocument] {
        &self.documents
    }

    /// Number of documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no documents
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn position(&self, id: &str) -> Result<usize, BomError> {
        self.documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| BomError::document_not_found(id))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! bomtree library - equipment bill-of-materials tree engine
//!
//! This crate provides the BOM document model, the recursive tree mutator
//! (add, edit, delete, expand toggling), cost rollup, and a document store
//! that keeps every derived value consistent after each operation.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod cost;
pub mod error;
pub mod export;
pub mod id;
pub mod index;
pub mod shared;
pub mod store;
pub mod tree;

/// Core data types for BOM documents and their item trees
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    /// Default unit of measure for new items
    pub const DEFAULT_UNIT: &str = "EA";

    /// Default version label for new documents
    pub const DEFAULT_VERSION: &str = "v1.0";

    // =========================================================================
    // Enumerations
    // =========================================================================

    /// Lifecycle status of a BOM document
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum BomStatus {
        /// Being edited, not yet reviewed
        #[default]
        Draft,
        /// Reviewed and signed off
        Approved,
        /// In use for maintenance and procurement
        Active,
        /// Superseded, kept for history
        Obsolete,
    }

    impl BomStatus {
        /// Lowercase label used in CLI output and arguments
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Draft => "draft",
                Self::Approved => "approved",
                Self::Active => "active",
                Self::Obsolete => "obsolete",
            }
        }

        /// Parse a status label
        #[must_use]
        pub fn parse(s: &str) -> Option<Self> {
            match s.to_lowercase().as_str() {
                "draft" => Some(Self::Draft),
                "approved" => Some(Self::Approved),
                "active" => Some(Self::Active),
                "obsolete" => Some(Self::Obsolete),
                _ => None,
            }
        }
    }

    /// Classification of a part in the BOM
    #[derive(
        Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(rename_all = "lowercase")]
    pub enum PartType {
        /// Used up during operation (filters, lubricants)
        Consumable,
        /// Swapped out on a maintenance schedule
        Replacement,
        /// Held in stock against failures
        Spare,
        /// Ordinary catalog part
        #[default]
        Standard,
    }

    impl PartType {
        /// Lowercase label used in CLI output and exports
        #[must_use]
        pub fn label(&self) -> &'static str {
            match self {
                Self::Consumable => "consumable",
                Self::Replacement => "replacement",
                Self::Spare => "spare",
                Self::Standard => "standard",
            }
        }

        /// Parse a part type label
        #[must_use]
        pub fn parse(s: &str) -> Option<Self> {
            match s.to_lowercase().as_str() {
                "consumable" => Some(Self::Consumable),
                "replacement" => Some(Self::Replacement),
                "spare" => Some(Self::Spare),
                "standard" => Some(Self::Standard),
                _ => None,
            }
        }
    }

    // =========================================================================
    // Equipment reference
    // =========================================================================

    /// Denormalized reference to the equipment a BOM describes
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EquipmentRef {
        /// Equipment identifier in the equipment registry
        pub id: String,
        /// Equipment code
        pub code: String,
        /// Display name
        pub name: String,
    }

    // =========================================================================
    // BOM Item (tree node)
    // =========================================================================

    /// One part in the BOM tree
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct BomItem {
        /// Unique identifier within the document
        pub id: String,
        /// Parent item ID (`None` for top-level items)
        #[serde(default)]
        pub parent_id: Option<String>,
        /// Part code
        #[serde(default)]
        pub part_code: String,
        /// Part name
        #[serde(default)]
        pub part_name: String,
        /// Specification text
        #[serde(default)]
        pub specification: String,
        /// Part classification
        #[serde(default)]
        pub part_type: PartType,
        /// Unit of measure
        #[serde(default = "default_unit")]
        pub unit: String,
        /// Quantity per assembly
        pub quantity: f64,
        /// Price of one unit
        pub unit_price: f64,
        /// Derived: `quantity * unit_price`
        #[serde(default)]
        pub total_price: f64,
        /// Manufacturer
        #[serde(default)]
        pub manufacturer: String,
        /// Manufacturer model
        #[serde(default)]
        pub model: String,
        /// Supplier
        #[serde(default)]
        pub supplier: String,
        /// Procurement lead time in days
        #[serde(default)]
        pub lead_time: f64,
        /// Minimum stock to hold
        #[serde(default)]
        pub min_stock: f64,
        /// Stock on hand
        #[serde(default)]
        pub current_stock: f64,
        /// Free-form remarks
        #[serde(default)]
        pub remarks: String,
        /// Depth in the tree (1 for top-level)
        pub level: u32,
        /// Whether the node is expanded in tree views
        #[serde(default = "default_expanded")]
        pub is_expanded: bool,
        /// Sub-parts, exclusively owned by this item
        #[serde(default)]
        pub children: Vec<BomItem>,
    }

    fn default_unit() -> String {
        DEFAULT_UNIT.to_string()
    }

    fn default_expanded() -> bool {
        true
    }

    impl BomItem {
        /// Whether this item has no sub-parts
        #[must_use]
        pub fn is_leaf(&self) -> bool {
            self.children.is_empty()
        }

        /// Whether stock on hand is below the configured minimum
        #[must_use]
        pub fn is_below_min_stock(&self) -> bool {
            self.current_stock < self.min_stock
        }
    }

    // =========================================================================
    // BOM Document
    // =========================================================================

    /// A bill of materials for one piece of equipment
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct BomDocument {
        /// Unique identifier
        pub id: String,
        /// Equipment identifier
        pub equipment_id: String,
        /// Equipment code
        pub equipment_code: String,
        /// Equipment name
        pub equipment_name: String,
        /// Version label
        pub version: String,
        /// Lifecycle status
        pub status: BomStatus,
        /// Top-level items, in insertion order
        #[serde(default)]
        pub items: Vec<BomItem>,
        /// Derived: sum of `total_price` over every item at every depth
        #[serde(default)]
        pub total_cost: f64,
        /// When the document was created
        pub created_at: DateTime<Utc>,
        /// When the document was last changed
        pub updated_at: DateTime<Utc>,
    }

    impl BomDocument {
        /// The equipment this document describes
        #[must_use]
        pub fn equipment(&self) -> EquipmentRef {
            EquipmentRef {
                id: self.equipment_id.clone(),
                code: self.equipment_code.clone(),
                name: self.equipment_name.clone(),
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Partial item fields, used both to create an item and to patch one
    ///
    /// Unset fields take defaults on add and are left alone on edit.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct ItemPayload {
        /// Part code
        pub part_code: Option<String>,
        /// Part name
        pub part_name: Option<String>,
        /// Specification text
        pub specification: Option<String>,
        /// Part classification
        pub part_type: Option<PartType>,
        /// Unit of measure
        pub unit: Option<String>,
        /// Quantity per assembly
        pub quantity: Option<f64>,
        /// Price of one unit
        pub unit_price: Option<f64>,
        /// Manufacturer
        pub manufacturer: Option<String>,
        /// Manufacturer model
        pub model: Option<String>,
        /// Supplier
        pub supplier: Option<String>,
        /// Lead time in days
        pub lead_time: Option<f64>,
        /// Minimum stock
        pub min_stock: Option<f64>,
        /// Stock on hand
        pub current_stock: Option<f64>,
        /// Remarks
        pub remarks: Option<String>,
    }

    /// A mutation of a document's item tree
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "op", rename_all = "snake_case")]
    pub enum ItemOperation {
        /// Append a new item under `parent_id`, or at the top level
        Add {
            /// Parent item ID (`None` for a top-level item)
            parent_id: Option<String>,
            /// Fields for the new item
            payload: ItemPayload,
        },
        /// Merge fields into an existing item
        Edit {
            /// Target item ID
            id: String,
            /// Fields to change
            patch: ItemPayload,
        },
        /// Remove an item together with its subtree
        Delete {
            /// Target item ID
            id: String,
        },
        /// Flip the expanded flag of an item
        ToggleExpand {
            /// Target item ID
            id: String,
        },
    }

    impl ItemOperation {
        /// Short name of the operation, for logs and messages
        #[must_use]
        pub fn kind(&self) -> &'static str {
            match self {
                Self::Add { .. } => "add",
                Self::Edit { .. } => "edit",
                Self::Delete { .. } => "delete",
                Self::ToggleExpand { .. } => "toggle_expand",
            }
        }

        /// The item ID the operation is matched against
        #[must_use]
        pub fn target(&self) -> Option<&str> {
            match self {
                Self::Add { parent_id, .. } => parent_id.as_deref(),
                Self::Edit { id, .. } | Self::Delete { id } | Self::ToggleExpand { id } => {
                    Some(id)
                }
            }
        }

        /// The payload carried by add and edit
        #[must_use]
        pub fn payload(&self) -> Option<&ItemPayload> {
            match self {
                Self::Add { payload, .. } => Some(payload),
                Self::Edit { patch, .. } => Some(patch),
                Self::Delete { .. } | Self::ToggleExpand { .. } => None,
            }
        }
    }

    /// Header fields of a document that callers may change
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct HeaderPatch {
        /// New version label
        pub version: Option<String>,
        /// New status
        pub status: Option<BomStatus>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::BomError;
    pub use crate::store::BomDocumentStore;
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Engine error types

use thiserror::Error;

/// Errors reported by the document store and its facade
#[derive(Error, Debug)]
pub enum BomError {
    /// No document with this ID is held by the store
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// The requested document ID
        id: String,
    },

    /// The target (or parent) item of an operation does not exist
    #[error("item not found: {id}")]
    NodeNotFound {
        /// The requested item ID
        id: String,
    },

    /// A numeric field was negative or not finite
    #[error("invalid {field}: {value} (must be a finite, non-negative number)")]
    Validation {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f64,
    },
}

impl BomError {
    /// Shorthand for [`BomError::DocumentNotFound`]
    pub fn document_not_found(id: impl Into<String>) -> Self {
        Self::DocumentNotFound { id: id.into() }
    }

    /// Shorthand for [`BomError::NodeNotFound`]
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }
}

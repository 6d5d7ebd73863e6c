// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Document store for multi-client embedding
//!
//! Each document sits behind its own mutex. The map lock is only held to
//! look a document up, insert or remove it, so writes to one document are
//! serialized while different documents are edited in parallel.

use crate::error::BomError;
use crate::id::{IdGenerator, TimestampIdGenerator, DOCUMENT_PREFIX};
use crate::store::BomDocumentStore;
use crate::types::{BomDocument, EquipmentRef, ItemOperation};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

type DocumentHandle = Arc<Mutex<BomDocument>>;

/// Async document store with one lock per document
pub struct SharedDocumentStore {
    documents: RwLock<HashMap<String, DocumentHandle>>,
    ids: Arc<dyn IdGenerator>,
    strict_targets: bool,
}

impl Default for SharedDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedDocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            ids: Arc::new(TimestampIdGenerator),
            strict_targets: false,
        }
    }

    /// Use `ids` for new document and item identifiers
    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    /// Report operations on missing items as `NodeNotFound`
    #[must_use]
    pub fn with_strict_targets(mut self, strict: bool) -> Self {
        self.strict_targets = strict;
        self
    }

    /// Take over the documents of a synchronous store
    pub async fn import(&self, store: BomDocumentStore) {
        let mut documents = self.documents.write().await;
        for document in store.documents() {
            documents.insert(
                document.id.clone(),
                Arc::new(Mutex::new(document.clone())),
            );
        }
    }

    /// Create an empty draft document
    pub async fn create_document(&self, equipment: &EquipmentRef) -> BomDocument {
        let id = self.ids.next_id(DOCUMENT_PREFIX);
        let document = BomDocument::new(id.clone(), equipment, Utc::now());
        info!(document = %id, equipment = %equipment.code, "created document");

        self.documents
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(document.clone())));
        document
    }

    /// Run an item operation, holding only this document's lock
    pub async fn apply_item_operation(
        &self,
        document_id: &str,
        op: &ItemOperation,
    ) -> Result<BomDocument, BomError> {
        let handle = self.handle(document_id).await?;
        let mut document = handle.lock().await;
        document.apply(op, self.ids.as_ref(), self.strict_targets)?;
        Ok(document.clone())
    }

    /// Read a copy of a document
    pub async fn read_tree(&self, document_id: &str) -> Result<BomDocument, BomError> {
        let handle = self.handle(document_id).await?;
        let document = handle.lock().await;
        Ok(document.clone())
    }

    /// Remove a document
    pub async fn remove_document(&self, document_id: &str) -> Result<BomDocument, BomError> {
        let handle = self
            .documents
            .write()
            .await
            .remove(document_id)
            .ok_or_else(|| BomError::document_not_found(document_id))?;
        let document = handle.lock().await;
        Ok(document.clone())
    }

    /// Copy every document into a synchronous store, ordered by creation time
    pub async fn snapshot(&self) -> BomDocumentStore {
        let handles: Vec<DocumentHandle> = self.documents.read().await.values().cloned().collect();
        let mut documents = Vec::with_capacity(handles.len());
        for handle in handles {
            documents.push(handle.lock().await.clone());
        }
        documents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        BomDocumentStore::from_documents(documents)
    }

    async fn handle(&self, document_id: &str) -> Result<DocumentHandle, BomError> {
        self.documents
            .read()
            .await
            .get(document_id)
            .cloned()
            .ok_or_else(|| BomError::document_not_found(document_id))
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use bomtree::cost;
use bomtree::index::StructureIndex;
use bomtree::store::BomDocumentStore;
use bomtree::types::BomDocument;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(documents) = serde_json::from_slice::<Vec<BomDocument>>(data) else {
        return;
    };

    // Loading re-derives every total, whatever the input claimed
    let store = BomDocumentStore::from_documents(documents);
    for document in store.documents() {
        let expected = cost::tree_cost(&document.items);
        if expected.is_finite() {
            assert_eq!(document.total_cost, expected);
        }
        let _ = StructureIndex::build(&document.items).to_dot(document);
    }
    let _ = store.to_json();
});

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Identifier generation for documents and items

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Prefix for document IDs
pub const DOCUMENT_PREFIX: &str = "bom";

/// Prefix for item IDs
pub const ITEM_PREFIX: &str = "item";

/// Source of fresh identifiers
pub trait IdGenerator: Send + Sync {
    /// Produce a new identifier starting with `prefix`
    fn next_id(&self, prefix: &str) -> String;
}

/// `<prefix>-<unix millis>-<8 hex chars>` identifiers
///
/// Unique within one process with overwhelming probability; nothing is
/// persisted between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampIdGenerator;

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let random = Uuid::new_v4().simple().to_string();
        format!("{prefix}-{millis}-{}", &random[..8])
    }
}

/// `<prefix>-<n>` identifiers from a counter shared by all prefixes
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Start counting at 1
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Start counting at `first`
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{n}")
    }
}

/// Generate a timestamped identifier with the default generator
#[must_use]
pub fn new_id(prefix: &str) -> String {
    TimestampIdGenerator.next_id(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_timestamp_ids_carry_prefix() {
        let id = new_id(ITEM_PREFIX);
        assert!(id.starts_with("item-"));
        assert_eq!(id.split('-').count(), 3);
    }

    #[test]
    fn test_timestamp_ids_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| new_id(ITEM_PREFIX)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id(DOCUMENT_PREFIX), "bom-1");
        assert_eq!(ids.next_id(ITEM_PREFIX), "item-2");
        assert_eq!(ids.next_id(ITEM_PREFIX), "item-3");
    }
}

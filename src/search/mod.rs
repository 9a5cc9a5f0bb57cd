use anyhow::Result;
use async_trait::async_trait;

use crate::models::RoomSearchDoc;

pub mod memory_engine;
pub mod null_engine;
pub mod opensearch_engine;

pub use memory_engine::MemoryIndex;
pub use null_engine::NullIndex;
pub use opensearch_engine::OpenSearchIndex;

/// One page of ranked identifiers plus the exact hit count across all pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub ids: Vec<String>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BulkReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Contract for the secondary full-text index. The store is authoritative;
/// everything behind this trait is a derived view that must converge under
/// repeated or out-of-order writes, so upsert and delete are idempotent
/// functions of current state, not deltas.
#[async_trait]
pub trait TextIndex: Send + Sync {
    /// Creates the index with its field mapping if absent; no-op otherwise.
    async fn ensure_schema(&self) -> Result<()>;

    /// Inserts or fully replaces the document at `doc.id`.
    async fn upsert(&self, doc: &RoomSearchDoc) -> Result<()>;

    /// Removes the document; an already-absent id is success.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Weighted multi-field match (title x5, search_combined x3, description
    /// x1, best-fields, auto fuzziness). `page` is 1-indexed.
    async fn search(&self, query: &str, page: u32, page_size: u32) -> Result<SearchPage>;

    /// Loads many documents in one request. Documents are independent: a
    /// failed entry never aborts the rest.
    async fn bulk_upsert(&self, docs: &[RoomSearchDoc]) -> Result<BulkReport>;
}

use anyhow::{bail, Result};
use async_trait::async_trait;

use super::{BulkReport, SearchPage, TextIndex};
use crate::models::RoomSearchDoc;

/// Degraded-mode index used when no search backend is configured or the
/// startup retries ran out. Writes are accepted no-ops (the store stays
/// authoritative and a later reindex heals the gap); reads fail loudly so the
/// caller sees "search unavailable" instead of silently empty results.
pub struct NullIndex;

#[async_trait]
impl TextIndex for NullIndex {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, _doc: &RoomSearchDoc) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn search(&self, _query: &str, _page: u32, _page_size: u32) -> Result<SearchPage> {
        bail!("no search backend configured")
    }

    async fn bulk_upsert(&self, _docs: &[RoomSearchDoc]) -> Result<BulkReport> {
        Ok(BulkReport::default())
    }
}

use std::sync::Arc;

use anyhow::Result;

use crate::config::AppConfig;
use crate::models::{Room, RoomSearchDoc};
use crate::search::{BulkReport, NullIndex, OpenSearchIndex, TextIndex};
use crate::store::RoomStore;

/// Projects a listing into its search document. Pure and deterministic; the
/// `search_combined` blob is scored as a single weighted field by the index,
/// and its concatenation order (title, district, province, ward, address
/// detail) is part of the contract.
pub fn project(room: &Room) -> RoomSearchDoc {
    let search_combined = format!(
        "{} {} {} {} {}",
        room.title, room.district, room.province, room.ward, room.address_detail
    );
    RoomSearchDoc {
        id: room.hex_id(),
        title: room.title.clone(),
        description: room.description.clone(),
        province: room.province.clone(),
        district: room.district.clone(),
        ward: room.ward.clone(),
        search_combined,
    }
}

/// Propagates a committed create/update to the index. The store write already
/// succeeded and is authoritative, so a failing index write is logged and
/// swallowed; the bootstrap reindexer heals any drift.
pub async fn push_upsert(index: &dyn TextIndex, room: &Room) {
    let doc = project(room);
    if let Err(e) = index.upsert(&doc).await {
        warn!("index upsert for room {} failed: {e:#}", doc.id);
    }
}

/// Propagates a committed delete to the index. Same failure policy as
/// `push_upsert`.
pub async fn push_delete(index: &dyn TextIndex, id: &str) {
    if let Err(e) = index.delete(id).await {
        warn!("index delete for room {id} failed: {e:#}");
    }
}

/// Full resync: walks every listing (including non-available ones, so the
/// index mirrors the store) and bulk-loads the projections. Idempotent; each
/// call fully overwrites matching documents.
pub async fn reindex_all(store: &dyn RoomStore, index: &dyn TextIndex) -> Result<BulkReport> {
    let rooms = store.all_rooms().await?;
    let docs: Vec<RoomSearchDoc> = rooms.iter().map(project).collect();
    index.bulk_upsert(&docs).await
}

async fn try_bootstrap(engine: &OpenSearchIndex, store: &dyn RoomStore) -> Result<BulkReport> {
    engine.ping().await?;
    engine.ensure_schema().await?;
    reindex_all(store, engine).await
}

/// Connects to the configured search backend with bounded exponential backoff
/// (the index service may start later than the application), then creates the
/// schema and runs the initial full reindex. On exhaustion the service comes
/// up in degraded mode: keyword search errors, relational filtering still
/// works.
pub async fn bootstrap_index(cfg: &AppConfig, store: &dyn RoomStore) -> Arc<dyn TextIndex> {
    let Some(ref url) = cfg.search_url else {
        info!("SEARCH_URL not set, keyword search disabled");
        return Arc::new(NullIndex);
    };

    let engine = match OpenSearchIndex::new(url, &cfg.search_index) {
        Ok(e) => e,
        Err(e) => {
            error!("invalid search backend url {url}: {e:#}");
            return Arc::new(NullIndex);
        }
    };

    let mut delay = cfg.search_retry_base;
    for attempt in 1..=cfg.search_max_retries {
        match try_bootstrap(&engine, store).await {
            Ok(report) => {
                info!(
                    "search index ready after attempt {attempt}: {} indexed, {} failed",
                    report.succeeded, report.failed
                );
                return Arc::new(engine);
            }
            Err(e) => {
                warn!(
                    "search bootstrap attempt {attempt}/{} failed: {e:#}",
                    cfg.search_max_retries
                );
                if attempt < cfg.search_max_retries {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    error!(
        "search backend unreachable after {} attempts, running without keyword search",
        cfg.search_max_retries
    );
    Arc::new(NullIndex)
}

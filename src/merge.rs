use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use thiserror::Error;

use crate::models::{RoomSummary, User};
use crate::search::TextIndex;
use crate::store::{RoomStore, UserStore};

#[derive(Debug, Error)]
pub enum KeywordSearchError {
    /// The index is the only source of ranking; there is no fallback to an
    /// unranked store scan.
    #[error("search index unavailable: {0}")]
    IndexUnavailable(#[source] anyhow::Error),
    #[error("listing store error: {0}")]
    Store(#[source] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct RankedRooms {
    pub rooms: Vec<RoomSummary>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

fn total_pages(total: u64, limit: u32) -> u64 {
    if total > 0 {
        total.div_ceil(limit as u64)
    } else {
        0
    }
}

/// Ranked keyword search: the index supplies the order and the exact total,
/// the store supplies the rows. The store has no concept of the ranking, so
/// fetched rows are re-ordered to match the index's id sequence; ids the store
/// no longer has (stale index entries, unavailable rooms) are silently
/// skipped without shrinking `total`.
pub async fn search_by_keyword(
    index: &dyn TextIndex,
    rooms: &dyn RoomStore,
    users: &dyn UserStore,
    keyword: &str,
    page: u32,
    limit: u32,
) -> Result<RankedRooms, KeywordSearchError> {
    let hits = index
        .search(keyword, page, limit)
        .await
        .map_err(KeywordSearchError::IndexUnavailable)?;

    // Nothing matched: skip the store round-trip entirely.
    if hits.ids.is_empty() {
        return Ok(RankedRooms {
            rooms: vec![],
            total: 0,
            page,
            limit,
            total_pages: 0,
        });
    }

    let oids: Vec<ObjectId> = hits
        .ids
        .iter()
        .filter_map(|id| ObjectId::parse_str(id).ok())
        .collect();

    let fetched = rooms
        .find_by_ids_available(&oids)
        .await
        .map_err(KeywordSearchError::Store)?;

    let by_id: HashMap<String, _> = fetched
        .into_iter()
        .map(|room| (room.hex_id(), room))
        .collect();

    let mut owners: HashMap<ObjectId, Option<User>> = HashMap::new();
    let mut out = Vec::new();
    for id in &hits.ids {
        let Some(room) = by_id.get(id) else {
            continue; // index is ahead of (or behind) the store; tolerated
        };
        let owner = match owners.get(&room.landlord_id) {
            Some(cached) => cached.clone(),
            None => {
                // missing owner resolves to null contact fields
                let found = match users.find_by_id(&room.landlord_id).await {
                    Ok(user) => user,
                    Err(e) => {
                        warn!(
                            "owner lookup for {} failed: {e:#}",
                            room.landlord_id.to_hex()
                        );
                        None
                    }
                };
                owners.insert(room.landlord_id, found.clone());
                found
            }
        };
        out.push(room.summary(owner.as_ref()));
    }

    Ok(RankedRooms {
        rooms: out,
        total: hits.total,
        page,
        limit,
        total_pages: total_pages(hits.total, limit),
    })
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use mongodb::bson::DateTime;

    use super::*;
    use crate::models::Room;
    use crate::search::SearchPage;
    use crate::store::MemoryStore;

    /// Index stub returning a canned page, so the merge step is exercised in
    /// isolation from any scoring behavior.
    struct FixedIndex {
        page: SearchPage,
    }

    #[async_trait]
    impl TextIndex for FixedIndex {
        async fn ensure_schema(&self) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _: &crate::models::RoomSearchDoc) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn search(&self, _: &str, _: u32, _: u32) -> Result<SearchPage> {
            Ok(self.page.clone())
        }
        async fn bulk_upsert(
            &self,
            _: &[crate::models::RoomSearchDoc],
        ) -> Result<crate::search::BulkReport> {
            Ok(crate::search::BulkReport::default())
        }
    }

    struct DownIndex;

    #[async_trait]
    impl TextIndex for DownIndex {
        async fn ensure_schema(&self) -> Result<()> {
            Ok(())
        }
        async fn upsert(&self, _: &crate::models::RoomSearchDoc) -> Result<()> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> Result<()> {
            Ok(())
        }
        async fn search(&self, _: &str, _: u32, _: u32) -> Result<SearchPage> {
            anyhow::bail!("connection refused")
        }
        async fn bulk_upsert(
            &self,
            _: &[crate::models::RoomSearchDoc],
        ) -> Result<crate::search::BulkReport> {
            Ok(crate::search::BulkReport::default())
        }
    }

    /// Store that refuses batched fetches; any id lookup fails the test
    /// through the `Store` error arm.
    struct NoFetchStore;

    #[async_trait]
    impl RoomStore for NoFetchStore {
        async fn insert(&self, _: &Room) -> Result<ObjectId> {
            anyhow::bail!("not used")
        }
        async fn get(&self, _: &ObjectId) -> Result<Option<Room>> {
            Ok(None)
        }
        async fn update(
            &self,
            _: &ObjectId,
            _: &crate::store::RoomPatch,
        ) -> Result<Option<Room>> {
            Ok(None)
        }
        async fn delete(&self, _: &ObjectId) -> Result<bool> {
            Ok(false)
        }
        async fn find_filtered(
            &self,
            _: &crate::store::RoomFilter,
            _: u64,
            _: i64,
        ) -> Result<(Vec<Room>, u64)> {
            Ok((vec![], 0))
        }
        async fn find_by_ids_available(&self, _: &[ObjectId]) -> Result<Vec<Room>> {
            anyhow::bail!("store fetch issued for an empty search page")
        }
        async fn find_by_landlord(&self, _: &ObjectId) -> Result<Vec<Room>> {
            Ok(vec![])
        }
        async fn all_rooms(&self) -> Result<Vec<Room>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl UserStore for NoFetchStore {
        async fn find_by_id(&self, _: &ObjectId) -> Result<Option<User>> {
            Ok(None)
        }
        async fn find_by_token(&self, _: &str) -> Result<Option<User>> {
            Ok(None)
        }
    }

    struct FailingUsers;

    #[async_trait]
    impl UserStore for FailingUsers {
        async fn find_by_id(&self, _: &ObjectId) -> Result<Option<User>> {
            anyhow::bail!("user store down")
        }
        async fn find_by_token(&self, _: &str) -> Result<Option<User>> {
            anyhow::bail!("user store down")
        }
    }

    fn room(id: ObjectId, landlord: ObjectId, title: &str) -> Room {
        Room {
            id: Some(id),
            landlord_id: landlord,
            title: title.into(),
            description: None,
            province: "Ha Noi".into(),
            district: "Cau Giay".into(),
            ward: "Dich Vong".into(),
            address_detail: "ngo 100".into(),
            area: 20.0,
            price: 2_000_000.0,
            room_status: "available".into(),
            images: vec![],
            created_at: DateTime::now(),
        }
    }

    #[rocket::async_test]
    async fn preserves_index_rank_order() {
        let store = MemoryStore::new();
        let landlord = ObjectId::new();
        let (id1, id2, id3) = (ObjectId::new(), ObjectId::new(), ObjectId::new());
        for id in [id1, id2, id3] {
            store.insert(&room(id, landlord, "phong")).await.unwrap();
        }

        let index = FixedIndex {
            page: SearchPage {
                ids: vec![id3.to_hex(), id1.to_hex(), id2.to_hex()],
                total: 3,
            },
        };

        let res = search_by_keyword(&index, &store, &store, "phong", 1, 20)
            .await
            .unwrap();
        let got: Vec<String> = res.rooms.iter().map(|r| r.id.clone()).collect();
        assert_eq!(got, vec![id3.to_hex(), id1.to_hex(), id2.to_hex()]);
        assert_eq!(res.total, 3);
        assert_eq!(res.total_pages, 1);
    }

    #[rocket::async_test]
    async fn stale_index_ids_are_skipped_without_shrinking_total() {
        let store = MemoryStore::new();
        let landlord = ObjectId::new();
        let live = ObjectId::new();
        store.insert(&room(live, landlord, "phong")).await.unwrap();

        let ghost = ObjectId::new(); // referenced by the index, absent in the store
        let index = FixedIndex {
            page: SearchPage {
                ids: vec![ghost.to_hex(), live.to_hex()],
                total: 2,
            },
        };

        let res = search_by_keyword(&index, &store, &store, "phong", 1, 20)
            .await
            .unwrap();
        assert_eq!(res.rooms.len(), 1);
        assert_eq!(res.rooms[0].id, live.to_hex());
        assert_eq!(res.total, 2); // total still comes from the index
    }

    #[rocket::async_test]
    async fn unavailable_rooms_are_skipped() {
        let store = MemoryStore::new();
        let landlord = ObjectId::new();
        let id = ObjectId::new();
        let mut r = room(id, landlord, "phong");
        r.room_status = "rented".into();
        store.insert(&r).await.unwrap();

        let index = FixedIndex {
            page: SearchPage {
                ids: vec![id.to_hex()],
                total: 1,
            },
        };

        let res = search_by_keyword(&index, &store, &store, "phong", 1, 20)
            .await
            .unwrap();
        assert!(res.rooms.is_empty());
        assert_eq!(res.total, 1);
    }

    #[rocket::async_test]
    async fn empty_hits_short_circuit_without_store_fetch() {
        let index = FixedIndex {
            page: SearchPage {
                ids: vec![],
                total: 0,
            },
        };

        // NoFetchStore errors on any batched fetch, so an Ok here proves the
        // store round-trip was skipped entirely
        let res = search_by_keyword(&index, &NoFetchStore, &NoFetchStore, "khong co", 1, 20)
            .await
            .unwrap();
        assert!(res.rooms.is_empty());
        assert_eq!(res.total, 0);
        assert_eq!(res.total_pages, 0);
    }

    #[rocket::async_test]
    async fn failing_owner_lookup_defaults_to_null_contact() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        store.insert(&room(id, ObjectId::new(), "phong")).await.unwrap();

        let index = FixedIndex {
            page: SearchPage {
                ids: vec![id.to_hex()],
                total: 1,
            },
        };

        // user-store failure must not fail the request
        let res = search_by_keyword(&index, &store, &FailingUsers, "phong", 1, 20)
            .await
            .unwrap();
        assert_eq!(res.rooms.len(), 1);
        assert!(res.rooms[0].landlord_email.is_none());
        assert!(res.rooms[0].landlord_phone.is_none());
    }

    #[rocket::async_test]
    async fn total_pages_rounds_up() {
        let store = MemoryStore::new();
        let landlord = ObjectId::new();
        let id = ObjectId::new();
        store.insert(&room(id, landlord, "phong")).await.unwrap();

        // page 2 of 3 hits at one per page
        let index = FixedIndex {
            page: SearchPage {
                ids: vec![id.to_hex()],
                total: 3,
            },
        };

        let res = search_by_keyword(&index, &store, &store, "phong", 2, 1)
            .await
            .unwrap();
        assert_eq!(res.page, 2);
        assert_eq!(res.total_pages, 3);
    }

    #[rocket::async_test]
    async fn missing_owner_yields_null_contact() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        // landlord never registered in the user store
        store.insert(&room(id, ObjectId::new(), "phong")).await.unwrap();

        let index = FixedIndex {
            page: SearchPage {
                ids: vec![id.to_hex()],
                total: 1,
            },
        };

        let res = search_by_keyword(&index, &store, &store, "phong", 1, 20)
            .await
            .unwrap();
        assert_eq!(res.rooms.len(), 1);
        assert!(res.rooms[0].landlord_email.is_none());
        assert!(res.rooms[0].landlord_phone.is_none());
    }

    #[rocket::async_test]
    async fn index_failure_is_surfaced_not_degraded() {
        let store = MemoryStore::new();
        let err = search_by_keyword(&DownIndex, &store, &store, "phong", 1, 20)
            .await
            .unwrap_err();
        assert!(matches!(err, KeywordSearchError::IndexUnavailable(_)));
    }
}

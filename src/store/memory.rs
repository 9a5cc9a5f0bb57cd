use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::{RoomFilter, RoomPatch, RoomStore, UserStore};
use crate::models::{Room, User, STATUS_AVAILABLE};

/// HashMap-backed store used by the test suites and for running the service
/// without a database at hand. Same contract as `MongoStore`.
#[derive(Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<ObjectId, Room>>,
    users: RwLock<HashMap<ObjectId, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        if let Some(id) = user.id {
            self.users.write().unwrap().insert(id, user);
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(room: &Room, f: &RoomFilter) -> bool {
    if room.room_status != STATUS_AVAILABLE {
        return false;
    }
    if let Some(ref p) = f.province {
        if !contains_ci(&room.province, p) {
            return false;
        }
    }
    if let Some(ref p) = f.district {
        if !contains_ci(&room.district, p) {
            return false;
        }
    }
    if let Some(ref p) = f.ward {
        if !contains_ci(&room.ward, p) {
            return false;
        }
    }
    if f.price_min.is_some_and(|v| room.price < v) {
        return false;
    }
    if f.price_max.is_some_and(|v| room.price > v) {
        return false;
    }
    if f.area_min.is_some_and(|v| room.area < v) {
        return false;
    }
    if f.area_max.is_some_and(|v| room.area > v) {
        return false;
    }
    true
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn insert(&self, room: &Room) -> Result<ObjectId> {
        let id = room.id.unwrap_or_else(ObjectId::new);
        let mut stored = room.clone();
        stored.id = Some(id);
        self.rooms.write().unwrap().insert(id, stored);
        Ok(id)
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<Room>> {
        Ok(self.rooms.read().unwrap().get(id).cloned())
    }

    async fn update(&self, id: &ObjectId, patch: &RoomPatch) -> Result<Option<Room>> {
        let mut rooms = self.rooms.write().unwrap();
        let Some(room) = rooms.get_mut(id) else {
            return Ok(None);
        };
        if let Some(ref v) = patch.title {
            room.title = v.clone();
        }
        if let Some(ref v) = patch.description {
            room.description = Some(v.clone());
        }
        if let Some(ref v) = patch.province {
            room.province = v.clone();
        }
        if let Some(ref v) = patch.district {
            room.district = v.clone();
        }
        if let Some(ref v) = patch.ward {
            room.ward = v.clone();
        }
        if let Some(ref v) = patch.address_detail {
            room.address_detail = v.clone();
        }
        if let Some(v) = patch.area {
            room.area = v;
        }
        if let Some(v) = patch.price {
            room.price = v;
        }
        if let Some(ref v) = patch.room_status {
            room.room_status = v.clone();
        }
        if let Some(ref v) = patch.images {
            room.images = v.clone();
        }
        Ok(Some(room.clone()))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        Ok(self.rooms.write().unwrap().remove(id).is_some())
    }

    async fn find_filtered(
        &self,
        filter: &RoomFilter,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Room>, u64)> {
        let mut hits: Vec<Room> = self
            .rooms
            .read()
            .unwrap()
            .values()
            .filter(|r| matches(r, filter))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = hits.len() as u64;
        let page = hits
            .into_iter()
            .skip(offset as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_by_ids_available(&self, ids: &[ObjectId]) -> Result<Vec<Room>> {
        // Deliberately map-iteration order: callers get no ordering guarantee,
        // same as a `$in` fetch.
        let rooms = self.rooms.read().unwrap();
        Ok(rooms
            .values()
            .filter(|r| r.id.is_some_and(|id| ids.contains(&id)))
            .filter(|r| r.room_status == STATUS_AVAILABLE)
            .cloned()
            .collect())
    }

    async fn find_by_landlord(&self, landlord_id: &ObjectId) -> Result<Vec<Room>> {
        let mut hits: Vec<Room> = self
            .rooms
            .read()
            .unwrap()
            .values()
            .filter(|r| r.landlord_id == *landlord_id)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits)
    }

    async fn all_rooms(&self) -> Result<Vec<Room>> {
        Ok(self.rooms.read().unwrap().values().cloned().collect())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users.read().unwrap().get(id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .unwrap()
            .values()
            .find(|u| u.api_token.as_deref() == Some(token))
            .cloned())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Room, User};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Predicate filter for the relational listing scan. Location fields match as
/// case-insensitive substrings; ranges are inclusive.
#[derive(Debug, Default, Clone)]
pub struct RoomFilter {
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub area_min: Option<f64>,
    pub area_max: Option<f64>,
}

/// Whitelisted partial update; `None` leaves the field untouched.
#[derive(Debug, Default, Clone)]
pub struct RoomPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub address_detail: Option<String>,
    pub area: Option<f64>,
    pub price: Option<f64>,
    pub room_status: Option<String>,
    pub images: Option<Vec<String>>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.province.is_none()
            && self.district.is_none()
            && self.ward.is_none()
            && self.address_detail.is_none()
            && self.area.is_none()
            && self.price.is_none()
            && self.room_status.is_none()
            && self.images.is_none()
    }
}

/// The authoritative listing store. Capability object handed to every
/// component at construction; the text index is only ever a derived view of it.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn insert(&self, room: &Room) -> Result<ObjectId>;

    async fn get(&self, id: &ObjectId) -> Result<Option<Room>>;

    /// Applies the patch and returns the post-update row, or `None` if absent.
    async fn update(&self, id: &ObjectId, patch: &RoomPatch) -> Result<Option<Room>>;

    /// Returns whether a row was actually removed.
    async fn delete(&self, id: &ObjectId) -> Result<bool>;

    /// Available rooms matching the filter, `created_at` descending, with
    /// offset/limit pushed into the query. Also returns the exact filtered
    /// total across all pages.
    async fn find_filtered(
        &self,
        filter: &RoomFilter,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Room>, u64)>;

    /// Single batched fetch of available rooms by id; row order is unspecified.
    async fn find_by_ids_available(&self, ids: &[ObjectId]) -> Result<Vec<Room>>;

    async fn find_by_landlord(&self, landlord_id: &ObjectId) -> Result<Vec<Room>>;

    /// Unfiltered walk for the bootstrap reindexer (includes non-available rooms).
    async fn all_rooms(&self) -> Result<Vec<Room>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>>;
    async fn find_by_token(&self, token: &str) -> Result<Option<User>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_emptiness_tracks_every_field() {
        assert!(RoomPatch::default().is_empty());

        let patch = RoomPatch {
            title: Some("moi".into()),
            ..Default::default()
        };
        assert!(!patch.is_empty());

        let patch = RoomPatch {
            images: Some(vec![]),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}

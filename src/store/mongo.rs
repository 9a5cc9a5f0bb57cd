use anyhow::Result;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection, Database, IndexModel,
};

use super::{RoomFilter, RoomPatch, RoomStore, UserStore};
use crate::models::{Room, User, STATUS_AVAILABLE};

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn rooms(&self) -> Collection<Room> {
        self.db.collection::<Room>("rooms")
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>("users")
    }

    /// Idempotent secondary indexes, created at startup.
    pub async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        let rooms = self.db.collection::<Document>("rooms");

        // newest-first listing pages
        let created_idx = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .build();
        let _ = rooms.create_index(created_idx).await?;

        // landlord's own rooms
        let landlord_idx = IndexModel::builder()
            .keys(doc! { "landlord_id": 1 })
            .build();
        let _ = rooms.create_index(landlord_idx).await?;

        // availability filter hits every public query
        let status_idx = IndexModel::builder()
            .keys(doc! { "room_status": 1 })
            .build();
        let _ = rooms.create_index(status_idx).await?;

        let users = self.db.collection::<Document>("users");
        let token_idx = IndexModel::builder()
            .keys(doc! { "api_token": 1 })
            .build();
        let _ = users.create_index(token_idx).await?;

        Ok(())
    }
}

fn filter_doc(f: &RoomFilter) -> Document {
    let mut d = doc! { "room_status": STATUS_AVAILABLE };

    if let Some(ref p) = f.province {
        d.insert("province", doc! { "$regex": p.as_str(), "$options": "i" });
    }
    if let Some(ref p) = f.district {
        d.insert("district", doc! { "$regex": p.as_str(), "$options": "i" });
    }
    if let Some(ref p) = f.ward {
        d.insert("ward", doc! { "$regex": p.as_str(), "$options": "i" });
    }

    let mut price = Document::new();
    if let Some(v) = f.price_min {
        price.insert("$gte", v);
    }
    if let Some(v) = f.price_max {
        price.insert("$lte", v);
    }
    if !price.is_empty() {
        d.insert("price", price);
    }

    let mut area = Document::new();
    if let Some(v) = f.area_min {
        area.insert("$gte", v);
    }
    if let Some(v) = f.area_max {
        area.insert("$lte", v);
    }
    if !area.is_empty() {
        d.insert("area", area);
    }

    d
}

fn set_doc(p: &RoomPatch) -> Document {
    let mut set = Document::new();
    if let Some(ref v) = p.title {
        set.insert("title", v.as_str());
    }
    if let Some(ref v) = p.description {
        set.insert("description", v.as_str());
    }
    if let Some(ref v) = p.province {
        set.insert("province", v.as_str());
    }
    if let Some(ref v) = p.district {
        set.insert("district", v.as_str());
    }
    if let Some(ref v) = p.ward {
        set.insert("ward", v.as_str());
    }
    if let Some(ref v) = p.address_detail {
        set.insert("address_detail", v.as_str());
    }
    if let Some(v) = p.area {
        set.insert("area", v);
    }
    if let Some(v) = p.price {
        set.insert("price", v);
    }
    if let Some(ref v) = p.room_status {
        set.insert("room_status", v.as_str());
    }
    if let Some(ref v) = p.images {
        set.insert("images", v.clone());
    }
    set
}

#[async_trait]
impl RoomStore for MongoStore {
    async fn insert(&self, room: &Room) -> Result<ObjectId> {
        let res = self.rooms().insert_one(room).await?;
        res.inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow::anyhow!("inserted id is not an ObjectId"))
    }

    async fn get(&self, id: &ObjectId) -> Result<Option<Room>> {
        Ok(self.rooms().find_one(doc! { "_id": id }).await?)
    }

    async fn update(&self, id: &ObjectId, patch: &RoomPatch) -> Result<Option<Room>> {
        // an empty $set is rejected by the server
        if patch.is_empty() {
            return self.get(id).await;
        }
        let set = set_doc(patch);
        let updated = self
            .rooms()
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let res = self.rooms().delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }

    async fn find_filtered(
        &self,
        filter: &RoomFilter,
        offset: u64,
        limit: i64,
    ) -> Result<(Vec<Room>, u64)> {
        let d = filter_doc(filter);
        let total = self.rooms().count_documents(d.clone()).await?;
        let rooms: Vec<Room> = self
            .rooms()
            .find(d)
            .sort(doc! { "created_at": -1 })
            .skip(offset)
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok((rooms, total))
    }

    async fn find_by_ids_available(&self, ids: &[ObjectId]) -> Result<Vec<Room>> {
        let rooms: Vec<Room> = self
            .rooms()
            .find(doc! { "_id": { "$in": ids.to_vec() }, "room_status": STATUS_AVAILABLE })
            .await?
            .try_collect()
            .await?;
        Ok(rooms)
    }

    async fn find_by_landlord(&self, landlord_id: &ObjectId) -> Result<Vec<Room>> {
        let rooms: Vec<Room> = self
            .rooms()
            .find(doc! { "landlord_id": landlord_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(rooms)
    }

    async fn all_rooms(&self) -> Result<Vec<Room>> {
        let rooms: Vec<Room> = self.rooms().find(doc! {}).await?.try_collect().await?;
        Ok(rooms)
    }
}

#[async_trait]
impl UserStore for MongoStore {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        Ok(self.users().find_one(doc! { "api_token": token }).await?)
    }
}

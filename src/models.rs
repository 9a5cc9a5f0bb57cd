use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

pub const ROLE_LANDLORD: &str = "landlord";
pub const ROLE_TENANT: &str = "tenant";

pub const STATUS_AVAILABLE: &str = "available";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub phone: Option<String>,
    pub role: String, // "landlord" | "tenant"
    /// Opaque credential issued by the auth system; we only look it up.
    pub api_token: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Room {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub landlord_id: ObjectId,
    pub title: String,
    pub description: Option<String>,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub address_detail: String,
    pub area: f64,
    pub price: f64,
    pub room_status: String, // "available" | anything else hides it from search
    pub images: Vec<String>,
    pub created_at: DateTime,
}

/// Denormalized projection stored in the text index. `id` is the hex of the
/// room's ObjectId and doubles as the join key back to the store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RoomSearchDoc {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub search_combined: String,
}

/* ===== Response views ===== */

#[derive(Debug, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub title: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub area: f64,
    pub price: f64,
    pub images: Vec<String>,
    pub created_at: String,
    pub landlord_email: Option<String>,
    pub landlord_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddressView {
    pub province: String,
    pub district: String,
    pub ward: String,
    pub address_detail: String,
    pub full_address: String,
}

#[derive(Debug, Serialize)]
pub struct LandlordView {
    pub id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RoomDetail {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub address: AddressView,
    pub area: f64,
    pub price: f64,
    pub room_status: String,
    pub images: Vec<String>,
    pub created_at: String,
    pub landlord: LandlordView,
}

impl Room {
    pub fn hex_id(&self) -> String {
        self.id.map(|oid| oid.to_hex()).unwrap_or_default()
    }

    fn created_at_str(&self) -> String {
        self.created_at.try_to_rfc3339_string().unwrap_or_default()
    }

    pub fn summary(&self, landlord: Option<&User>) -> RoomSummary {
        RoomSummary {
            id: self.hex_id(),
            title: self.title.clone(),
            province: self.province.clone(),
            district: self.district.clone(),
            ward: self.ward.clone(),
            area: self.area,
            price: self.price,
            images: self.images.clone(),
            created_at: self.created_at_str(),
            landlord_email: landlord.map(|u| u.email.clone()),
            landlord_phone: landlord.and_then(|u| u.phone.clone()),
        }
    }

    pub fn detail(&self, landlord: Option<&User>) -> RoomDetail {
        let full_address = format!(
            "{}, {}, {}, {}",
            self.address_detail, self.ward, self.district, self.province
        );
        RoomDetail {
            id: self.hex_id(),
            title: self.title.clone(),
            description: self.description.clone(),
            address: AddressView {
                province: self.province.clone(),
                district: self.district.clone(),
                ward: self.ward.clone(),
                address_detail: self.address_detail.clone(),
                full_address,
            },
            area: self.area,
            price: self.price,
            room_status: self.room_status.clone(),
            images: self.images.clone(),
            created_at: self.created_at_str(),
            landlord: LandlordView {
                id: landlord.and_then(|u| u.id.map(|oid| oid.to_hex())),
                email: landlord.map(|u| u.email.clone()),
                phone: landlord.and_then(|u| u.phone.clone()),
                role: landlord.map(|u| u.role.clone()),
            },
        }
    }
}

use mongodb::bson::{oid::ObjectId, DateTime};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde_json::{json, Value};

use crate::auth::AuthedUser;
use crate::db::AppState;
use crate::errors::ApiError;
use crate::models::{Room, ROLE_LANDLORD, STATUS_AVAILABLE};
use crate::store::RoomPatch;
use crate::sync;

const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "province",
    "district",
    "ward",
    "address_detail",
    "area",
    "price",
];

fn str_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Numbers may arrive as JSON numbers or numeric strings; both are accepted,
/// anything else is a 400.
fn num_field(body: &Value, key: &str) -> Result<Option<f64>, ApiError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("{key} must be a number"))),
    }
}

fn check_area(area: f64) -> Result<(), ApiError> {
    if area <= 0.0 || area > 1000.0 {
        return Err(ApiError::BadRequest(
            "area must be > 0 and <= 1000".into(),
        ));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), ApiError> {
    if price <= 0.0 {
        return Err(ApiError::BadRequest("price must be > 0".into()));
    }
    Ok(())
}

fn require_landlord(user: &AuthedUser, action: &str) -> Result<(), ApiError> {
    if user.0.role != ROLE_LANDLORD {
        return Err(ApiError::Forbidden(format!(
            "only landlords can {action}"
        )));
    }
    Ok(())
}

fn room_json(room: &Room) -> Value {
    json!({
        "id": room.hex_id(),
        "title": room.title,
        "description": room.description,
        "province": room.province,
        "district": room.district,
        "ward": room.ward,
        "address_detail": room.address_detail,
        "area": room.area,
        "price": room.price,
        "room_status": room.room_status,
        "images": room.images,
        "created_at": room.created_at.try_to_rfc3339_string().unwrap_or_default(),
    })
}

// POST /rooms
#[post("/", data = "<body>")]
pub async fn create(
    user: AuthedUser,
    state: &State<AppState>,
    body: Json<Value>,
) -> Result<status::Created<Json<Value>>, ApiError> {
    require_landlord(&user, "post rooms")?;
    let body = body.into_inner();

    for field in REQUIRED_FIELDS {
        if body.get(field).is_none_or(Value::is_null) {
            return Err(ApiError::BadRequest(format!(
                "missing required field: {field}"
            )));
        }
    }

    let area = num_field(&body, "area")?
        .ok_or_else(|| ApiError::BadRequest("area must be a number".into()))?;
    let price = num_field(&body, "price")?
        .ok_or_else(|| ApiError::BadRequest("price must be a number".into()))?;
    check_area(area)?;
    check_price(price)?;

    let images = body
        .get("images")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let room = Room {
        id: None,
        landlord_id: user.0.id.ok_or(ApiError::Unauthorized)?,
        title: str_field(&body, "title").unwrap_or_default(),
        description: str_field(&body, "description"),
        province: str_field(&body, "province").unwrap_or_default(),
        district: str_field(&body, "district").unwrap_or_default(),
        ward: str_field(&body, "ward").unwrap_or_default(),
        address_detail: str_field(&body, "address_detail").unwrap_or_default(),
        area,
        price,
        room_status: str_field(&body, "room_status").unwrap_or_else(|| STATUS_AVAILABLE.into()),
        images,
        created_at: DateTime::now(),
    };

    let id = state.rooms.insert(&room).await?;
    let mut stored = room;
    stored.id = Some(id);

    // store commit first, index second; index failure never fails the request
    sync::push_upsert(state.index.as_ref(), &stored).await;

    let location = format!("/rooms/{}", id.to_hex());
    Ok(status::Created::new(location).body(Json(json!({
        "message": "room created",
        "room": room_json(&stored),
    }))))
}

// GET /rooms/my-rooms
#[get("/my-rooms")]
pub async fn my_rooms(
    user: AuthedUser,
    state: &State<AppState>,
) -> Result<Json<Value>, ApiError> {
    require_landlord(&user, "list their rooms")?;
    let landlord_id = user.0.id.ok_or(ApiError::Unauthorized)?;

    let rooms = state.rooms.find_by_landlord(&landlord_id).await?;
    let out: Vec<Value> = rooms.iter().map(room_json).collect();
    Ok(Json(json!(out)))
}

// GET /rooms/<id>
#[get("/<id>")]
pub async fn get_room(
    user: AuthedUser,
    state: &State<AppState>,
    id: &str,
) -> Result<Json<Value>, ApiError> {
    let oid =
        ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("room not found".into()))?;
    let room = state
        .rooms
        .get(&oid)
        .await?
        .ok_or_else(|| ApiError::NotFound("room not found".into()))?;

    if Some(room.landlord_id) != user.0.id {
        return Err(ApiError::Forbidden("no access to this room".into()));
    }

    Ok(Json(room_json(&room)))
}

// PUT /rooms/<id>
#[put("/<id>", data = "<body>")]
pub async fn update(
    user: AuthedUser,
    state: &State<AppState>,
    id: &str,
    body: Json<Value>,
) -> Result<Json<Value>, ApiError> {
    require_landlord(&user, "update rooms")?;
    let oid =
        ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("room not found".into()))?;
    let body = body.into_inner();

    let room = state
        .rooms
        .get(&oid)
        .await?
        .ok_or_else(|| ApiError::NotFound("room not found".into()))?;
    if Some(room.landlord_id) != user.0.id {
        return Err(ApiError::Forbidden("no access to this room".into()));
    }

    let area = num_field(&body, "area")?;
    if let Some(a) = area {
        check_area(a)?;
    }
    let price = num_field(&body, "price")?;
    if let Some(p) = price {
        check_price(p)?;
    }

    let patch = RoomPatch {
        title: str_field(&body, "title"),
        description: str_field(&body, "description"),
        province: str_field(&body, "province"),
        district: str_field(&body, "district"),
        ward: str_field(&body, "ward"),
        address_detail: str_field(&body, "address_detail"),
        area,
        price,
        room_status: str_field(&body, "room_status"),
        images: body.get("images").and_then(Value::as_array).map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        }),
    };

    let updated = state
        .rooms
        .update(&oid, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("room not found".into()))?;

    sync::push_upsert(state.index.as_ref(), &updated).await;

    Ok(Json(json!({
        "message": "room updated",
        "room": room_json(&updated),
    })))
}

// DELETE /rooms/<id>
#[delete("/<id>")]
pub async fn delete(
    user: AuthedUser,
    state: &State<AppState>,
    id: &str,
) -> Result<Json<Value>, ApiError> {
    require_landlord(&user, "delete rooms")?;
    let oid =
        ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("room not found".into()))?;

    let room = state
        .rooms
        .get(&oid)
        .await?
        .ok_or_else(|| ApiError::NotFound("room not found".into()))?;
    if Some(room.landlord_id) != user.0.id {
        return Err(ApiError::Forbidden("no access to this room".into()));
    }

    state.rooms.delete(&oid).await?;
    sync::push_delete(state.index.as_ref(), id).await;

    Ok(Json(json!({ "message": "room deleted" })))
}

pub fn routes() -> Vec<Route> {
    routes![create, my_rooms, get_room, update, delete]
}

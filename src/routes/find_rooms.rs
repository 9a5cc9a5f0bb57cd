use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use rocket::serde::json::Json;
use rocket::{Route, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::AppState;
use crate::errors::ApiError;
use crate::merge::{self, KeywordSearchError};
use crate::models::{Room, RoomSummary, User};
use crate::store::{RoomFilter, UserStore};

#[derive(Debug, Deserialize, Default)]
pub struct LocationBody {
    pub province: Option<Value>,
    pub district: Option<Value>,
    pub ward: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RangeBody {
    pub min: Option<Value>,
    pub max: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct FiltersBody {
    pub price: Option<RangeBody>,
    pub area: Option<RangeBody>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchBody {
    pub location: Option<LocationBody>,
    pub filters: Option<FiltersBody>,
}

fn text(v: &Option<Value>) -> Option<String> {
    v.as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Range bounds arrive as numbers or numeric strings from the UI; anything
/// else is ignored, same as the original behavior.
fn number(v: &Option<Value>) -> Option<f64> {
    let v = v.as_ref()?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn to_filter(body: &SearchBody) -> RoomFilter {
    let loc = body.location.as_ref();
    let price = body.filters.as_ref().and_then(|f| f.price.as_ref());
    let area = body.filters.as_ref().and_then(|f| f.area.as_ref());

    RoomFilter {
        province: loc.and_then(|l| text(&l.province)),
        district: loc.and_then(|l| text(&l.district)),
        ward: loc.and_then(|l| text(&l.ward)),
        price_min: price.and_then(|r| number(&r.min)),
        price_max: price.and_then(|r| number(&r.max)),
        area_min: area.and_then(|r| number(&r.min)),
        area_max: area.and_then(|r| number(&r.max)),
    }
}

fn check_limit(limit: Option<u32>) -> Result<u32, ApiError> {
    let limit = limit.unwrap_or(20);
    if !(1..=100).contains(&limit) {
        return Err(ApiError::BadRequest(
            "limit must be between 1 and 100".into(),
        ));
    }
    Ok(limit)
}

fn check_page(page: u32) -> Result<u32, ApiError> {
    if page < 1 {
        return Err(ApiError::BadRequest("page must be >= 1".into()));
    }
    Ok(page)
}

/// Resolves landlord contact for a page of rooms, one lookup per distinct
/// owner. Missing owners resolve to null contact fields.
async fn summaries_with_owners(users: &dyn UserStore, rooms: &[Room]) -> Vec<RoomSummary> {
    let mut owners: HashMap<ObjectId, Option<User>> = HashMap::new();
    let mut out = Vec::with_capacity(rooms.len());
    for room in rooms {
        let owner = match owners.get(&room.landlord_id) {
            Some(cached) => cached.clone(),
            None => {
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
    out
}

async fn run_filtered(
    state: &AppState,
    body: SearchBody,
    page: u32,
    limit: u32,
) -> Result<Json<Value>, ApiError> {
    let filter = to_filter(&body);
    let offset = (page as u64 - 1) * limit as u64;

    let (rooms, total) = state
        .rooms
        .find_filtered(&filter, offset, limit as i64)
        .await?;
    let summaries = summaries_with_owners(state.users.as_ref(), &rooms).await;

    let total_pages = if total > 0 {
        total.div_ceil(limit as u64)
    } else {
        0
    };

    Ok(Json(json!({
        "success": true,
        "total": total,
        "page": page,
        "limit": limit,
        "total_pages": total_pages,
        "rooms": summaries,
    })))
}

// POST /find-rooms/search — filtered search, first page only
#[post("/search?<limit>", data = "<body>")]
pub async fn search(
    state: &State<AppState>,
    limit: Option<u32>,
    body: Json<SearchBody>,
) -> Result<Json<Value>, ApiError> {
    let limit = check_limit(limit)?;
    run_filtered(state, body.into_inner(), 1, limit).await
}

// POST /find-rooms/search/page/<page_num> — same filters, arbitrary page
#[post("/search/page/<page_num>?<limit>", data = "<body>")]
pub async fn search_page(
    state: &State<AppState>,
    page_num: u32,
    limit: Option<u32>,
    body: Json<SearchBody>,
) -> Result<Json<Value>, ApiError> {
    let page = check_page(page_num)?;
    let limit = check_limit(limit)?;
    run_filtered(state, body.into_inner(), page, limit).await
}

// GET /find-rooms/search-keyword?keyword=&page=&limit=
#[get("/search-keyword?<keyword>&<page>&<limit>")]
pub async fn search_keyword(
    state: &State<AppState>,
    keyword: &str,
    page: Option<u32>,
    limit: Option<u32>,
) -> Result<Json<Value>, ApiError> {
    if keyword.trim().is_empty() {
        return Err(ApiError::BadRequest("keyword must not be empty".into()));
    }
    let page = check_page(page.unwrap_or(1))?;
    let limit = check_limit(limit)?;

    let ranked = merge::search_by_keyword(
        state.index.as_ref(),
        state.rooms.as_ref(),
        state.users.as_ref(),
        keyword,
        page,
        limit,
    )
    .await
    .map_err(|e| match e {
        KeywordSearchError::IndexUnavailable(err) => {
            error!("keyword search failed: {err:#}");
            ApiError::SearchUnavailable
        }
        KeywordSearchError::Store(err) => ApiError::from(err),
    })?;

    Ok(Json(json!({
        "success": true,
        "keyword": keyword,
        "total": ranked.total,
        "page": ranked.page,
        "limit": ranked.limit,
        "total_pages": ranked.total_pages,
        "rooms": ranked.rooms,
    })))
}

// GET /find-rooms/<id> — public detail view
#[get("/<id>")]
pub async fn room_detail(state: &State<AppState>, id: &str) -> Result<Json<Value>, ApiError> {
    let oid =
        ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("room not found".into()))?;
    let room = state
        .rooms
        .get(&oid)
        .await?
        .ok_or_else(|| ApiError::NotFound("room not found".into()))?;

    let landlord = match state.users.find_by_id(&room.landlord_id).await {
        Ok(user) => user,
        Err(e) => {
            warn!(
                "owner lookup for {} failed: {e:#}",
                room.landlord_id.to_hex()
            );
            None
        }
    };

    Ok(Json(json!({
        "success": true,
        "room": room.detail(landlord.as_ref()),
    })))
}

pub fn routes() -> Vec<Route> {
    routes![search, search_page, search_keyword, room_detail]
}

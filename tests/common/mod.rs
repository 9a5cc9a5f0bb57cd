#![allow(dead_code)] // each test crate uses its own subset

use std::sync::Arc;

use mongodb::bson::{oid::ObjectId, DateTime};
use rocket::http::{ContentType, Header};
use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::Value;

use timtro::models::{Room, User, ROLE_LANDLORD, ROLE_TENANT, STATUS_AVAILABLE};
use timtro::search::MemoryIndex;
use timtro::store::MemoryStore;
use timtro::AppState;

pub struct TestApp {
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub index: Arc<MemoryIndex>,
}

/// Full application over in-memory capabilities; no Mongo or OpenSearch
/// needed.
pub async fn spawn() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let index = Arc::new(MemoryIndex::new());
    let state = AppState::new(store.clone(), store.clone(), index.clone());
    let client = Client::tracked(timtro::build_rocket(state))
        .await
        .expect("valid rocket instance");
    TestApp {
        client,
        store,
        index,
    }
}

pub fn user(role: &str, token: &str) -> User {
    User {
        id: Some(ObjectId::new()),
        email: format!("{token}@example.com"),
        phone: Some("0900000000".into()),
        role: role.into(),
        api_token: Some(token.into()),
        created_at: DateTime::now(),
    }
}

pub fn landlord(token: &str) -> User {
    user(ROLE_LANDLORD, token)
}

pub fn tenant(token: &str) -> User {
    user(ROLE_TENANT, token)
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {token}"))
}

pub fn room(landlord_id: ObjectId, title: &str, created_ms: i64) -> Room {
    Room {
        id: Some(ObjectId::new()),
        landlord_id,
        title: title.into(),
        description: None,
        province: "Ha Noi".into(),
        district: "Cau Giay".into(),
        ward: "Dich Vong".into(),
        address_detail: "ngo 100".into(),
        area: 20.0,
        price: 2_000_000.0,
        room_status: STATUS_AVAILABLE.into(),
        images: vec![],
        created_at: DateTime::from_millis(created_ms),
    }
}

pub async fn json_body(res: LocalResponse<'_>) -> Value {
    res.into_json::<Value>().await.expect("json body")
}

pub async fn post_json<'a>(
    client: &'a Client,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> LocalResponse<'a> {
    let mut req = client
        .post(uri.to_string())
        .header(ContentType::JSON)
        .body(body.to_string());
    if let Some(t) = token {
        req = req.header(bearer(t));
    }
    req.dispatch().await
}

pub async fn put_json<'a>(
    client: &'a Client,
    uri: &str,
    token: &str,
    body: &Value,
) -> LocalResponse<'a> {
    client
        .put(uri.to_string())
        .header(ContentType::JSON)
        .header(bearer(token))
        .body(body.to_string())
        .dispatch()
        .await
}

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::Request;
use serde_json::{json, Value};

pub mod filters;
pub mod find_rooms;
pub mod rooms;
pub mod users;

/// Uniform JSON bodies for errors produced outside the handlers (guards,
/// missing routes, bad payloads).
#[catch(default)]
pub fn default_catcher(status: Status, _req: &Request<'_>) -> Json<Value> {
    Json(json!({
        "success": false,
        "detail": status.reason_lossy(),
    }))
}

pub fn catchers() -> Vec<rocket::Catcher> {
    catchers![default_catcher]
}

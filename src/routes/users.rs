use rocket::serde::json::Json;
use rocket::Route;
use serde_json::{json, Value};

use crate::auth::AuthedUser;

// GET /users/me
#[get("/me")]
pub async fn me(user: AuthedUser) -> Json<Value> {
    Json(json!({
        "id": user.0.id.map(|oid| oid.to_hex()),
        "email": user.0.email,
        "role": user.0.role,
    }))
}

pub fn routes() -> Vec<Route> {
    routes![me]
}

#[macro_use]
extern crate rocket;
#[macro_use]
extern crate log;

use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod merge;
pub mod models;
pub mod routes;
pub mod search;
pub mod store;
pub mod sync;

pub use db::AppState;

#[get("/health")]
fn health() -> &'static str {
    "ok"
}

// Open CORS for development.
fn cors() -> rocket_cors::Cors {
    let allowed_origins = AllowedOrigins::all();

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Patch,
            Method::Options,
        ]
        .into_iter()
        .map(From::from)
        .collect(),
        allowed_headers: AllowedHeaders::some(&["Content-Type", "Accept", "Authorization"]),
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()
    .expect("error building CORS")
}

/// Assembles the Rocket instance over an already-wired state, so tests can
/// hand in in-memory capabilities and production hands in Mongo + OpenSearch.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    rocket::build()
        .manage(state)
        .attach(cors())
        .register("/", routes::catchers())
        .mount("/", routes![health])
        .mount("/rooms", routes::rooms::routes())
        .mount("/find-rooms", routes::find_rooms::routes())
        .mount("/users", routes::users::routes())
        .mount("/filters", routes::filters::routes())
}

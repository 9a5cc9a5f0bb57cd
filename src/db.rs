use std::sync::Arc;

use mongodb::{options::ClientOptions, Client};

use crate::config::AppConfig;
use crate::search::TextIndex;
use crate::store::{MongoStore, RoomStore, UserStore};
use crate::sync;

/// Capabilities handed to every route at construction. Nothing here is
/// ambient: swapping any of the three (as the tests do with in-memory
/// implementations) changes behavior without touching the handlers.
pub struct AppState {
    pub rooms: Arc<dyn RoomStore>,
    pub users: Arc<dyn UserStore>,
    pub index: Arc<dyn TextIndex>,
}

impl AppState {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        users: Arc<dyn UserStore>,
        index: Arc<dyn TextIndex>,
    ) -> Self {
        Self {
            rooms,
            users,
            index,
        }
    }
}

/// Production wiring: Mongo-backed stores, then the search bootstrap (bounded
/// retries, degrades to no keyword search if the index never comes up).
pub async fn init_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let mut opts = ClientOptions::parse(&cfg.mongo_uri).await?;
    opts.app_name = Some("timtro".into());

    let client = Client::with_options(opts)?;
    let db = client.database(&cfg.db_name);

    let store = Arc::new(MongoStore::new(db));
    if let Err(e) = store.ensure_indexes().await {
        warn!("failed to create mongo indexes: {e}");
    }

    let index = sync::bootstrap_index(cfg, store.as_ref()).await;

    Ok(AppState {
        rooms: store.clone(),
        users: store,
        index,
    })
}

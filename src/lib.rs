pub mod config;
pub mod logging;
pub mod quiz;
pub mod response;
pub mod routes;
pub mod state;

use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::StoreBackend;
use crate::quiz::store::{MemoryRecordStore, RecordStore, SqliteRecordStore, StoreError};
use crate::state::AppState;

pub async fn open_store(backend: &StoreBackend) -> Result<RecordStore, StoreError> {
    match backend {
        StoreBackend::Memory => Ok(RecordStore::Memory(MemoryRecordStore::new())),
        StoreBackend::Sqlite(target) => Ok(RecordStore::Sqlite(
            SqliteRecordStore::connect(target).await?,
        )),
    }
}

/// `route_prefix` adds a second mount of the quiz routes, e.g. `/rl`.
pub fn build_app(state: AppState, route_prefix: Option<&str>) -> axum::Router {
    routes::router(state, route_prefix)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

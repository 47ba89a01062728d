mod health;
mod quiz;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState, route_prefix: Option<&str>) -> Router {
    let mut app = Router::new()
        .nest("/health", health::router())
        .merge(quiz::router());

    if let Some(prefix) = route_prefix {
        app = app.nest(prefix, quiz::router());
    }

    app.fallback(fallback_handler).with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Route not found").into_response()
}

use axum::{middleware, routing::{get, post, put}, Router};

use crate::handlers::rack;
use crate::middleware::auth::{require_auth, require_elevated};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/racks", get(rack::list_racks))
        .route("/racks/{id}", get(rack::get_rack));

    let write = Router::new()
        .route("/racks", post(rack::create_rack))
        .route("/racks/{id}", put(rack::update_rack).delete(rack::delete_rack))
        .route_layer(middleware::from_fn(require_elevated));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

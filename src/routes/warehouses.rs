use axum::{middleware, routing::{get, post, put}, Router};

use crate::handlers::warehouse;
use crate::middleware::auth::{require_auth, require_elevated};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/warehouses", get(warehouse::list_warehouses))
        .route("/warehouses/{id}", get(warehouse::get_warehouse));

    let write = Router::new()
        .route("/warehouses", post(warehouse::create_warehouse))
        .route("/warehouses/{id}", put(warehouse::update_warehouse).delete(warehouse::delete_warehouse))
        .route_layer(middleware::from_fn(require_elevated));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

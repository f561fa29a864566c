use axum::{middleware, routing::{get, post, put}, Router};

use crate::handlers::item;
use crate::middleware::auth::{require_auth, require_elevated};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/items", get(item::list_items))
        .route("/items/low-stock", get(item::list_low_stock_items))
        .route("/items/{id}", get(item::get_item));

    let write = Router::new()
        .route("/items", post(item::create_item))
        .route("/items/{id}", put(item::update_item).delete(item::delete_item))
        .route_layer(middleware::from_fn(require_elevated));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

use axum::{middleware, routing::{get, post, put}, Router};

use crate::handlers::category;
use crate::middleware::auth::{require_auth, require_elevated};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/categories", get(category::list_categories))
        .route("/categories/{id}", get(category::get_category));

    let write = Router::new()
        .route("/categories", post(category::create_category))
        .route("/categories/{id}", put(category::update_category).delete(category::delete_category))
        .route_layer(middleware::from_fn(require_elevated));

    read.merge(write)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

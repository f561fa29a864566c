use axum::{middleware, routing::get, Router};

use crate::handlers::report::get_summary;
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/reports/summary", get(get_summary))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

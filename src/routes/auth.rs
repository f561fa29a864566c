use axum::{middleware, routing::{get, post}, Router};

use crate::handlers::auth::{get_me, login, logout};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let open = Router::new().route("/login", post(login));

    let protected = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_me))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    open.merge(protected)
}

use axum::{middleware, routing::{get, put}, Router};

use crate::handlers::sale;
use crate::middleware::auth::{require_auth, require_elevated};
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    // Any signed-in user can record and view sales
    let staff = Router::new()
        .route("/sales", get(sale::list_sales).post(sale::create_sale))
        .route("/sales/{id}", get(sale::get_sale));

    // Rewriting or voiding a sale moves stock back, so it needs an admin
    let elevated = Router::new()
        .route("/sales/{id}", put(sale::update_sale).delete(sale::delete_sale))
        .route_layer(middleware::from_fn(require_elevated));

    staff
        .merge(elevated)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

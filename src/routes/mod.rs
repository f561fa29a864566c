pub mod auth;
pub mod categories;
pub mod items;
pub mod racks;
pub mod reports;
pub mod sales;
pub mod users;
pub mod warehouses;

use axum::Router;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::routes(state.clone()))
        .merge(sales::routes(state.clone()))
        .merge(items::routes(state.clone()))
        .merge(categories::routes(state.clone()))
        .merge(warehouses::routes(state.clone()))
        .merge(racks::routes(state.clone()))
        .merge(users::routes(state.clone()))
        .merge(reports::routes(state))
}

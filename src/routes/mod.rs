use axum::{Router, routing::get};

use crate::state::AppState;

pub mod categories;
pub mod doc;
pub mod health;
pub mod pages;
pub mod params;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .route("/summary", get(products::inventory_summary))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(pages::router())
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
}

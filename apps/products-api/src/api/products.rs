//! Products API routes

use axum::Router;
use domain_products::{PgProductRepository, ProductService, handlers};

use crate::state::{AppState, Storage};

/// Create products router over the configured backend
pub fn router(state: &AppState) -> Router {
    match &state.storage {
        Storage::Memory(repository) => handlers::router(ProductService::new(repository.clone())),
        Storage::Postgres(db) => {
            handlers::router(ProductService::new(PgProductRepository::new(db.clone())))
        }
    }
}

//! Root banner and readiness endpoints

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;
use serde_json::{Value, json};

use crate::state::{AppState, Storage};

async fn root() -> Json<Value> {
    Json(json!({ "message": "Application is running" }))
}

/// 503 while any storage check fails
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = match &state.storage {
        Storage::Memory(_) => {
            let memory: HealthCheckFuture<'_> = Box::pin(async { Ok::<(), String>(()) });
            vec![("storage", memory)]
        }
        Storage::Postgres(db) => {
            let database: HealthCheckFuture<'_> =
                Box::pin(async move { check_health(db).await.map_err(|e| e.to_string()) });
            vec![("database", database)]
        }
    };

    run_health_checks(checks).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/ready", get(ready))
        .with_state(state)
}

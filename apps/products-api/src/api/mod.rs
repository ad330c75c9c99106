//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::{create_router, health_router};
use tower_http::cors::CorsLayer;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Routes nested under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// The complete application: API, docs, health, readiness and root banner.
pub fn app(state: &AppState, cors: CorsLayer) -> Router {
    let root = health_router(state.config.app).merge(health::router(state.clone()));
    create_router::<ApiDoc>(routes(state), root, cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment, StorageBackend, StorageConfig};
    use crate::state::Storage;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use domain_products::InMemoryProductRepository;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = AppState {
            config: Config {
                app: app_info!(),
                environment: Environment::Development,
                server: ServerConfig::default(),
                storage: StorageConfig {
                    backend: StorageBackend::Memory,
                    run_migrations: false,
                    postgres: None,
                },
                cors_allowed_origin: None,
            },
            storage: Storage::Memory(InMemoryProductRepository::new()),
        };
        app(&state, CorsLayer::new())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (status, body) = send(&test_app(), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Application is running"}));
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = test_app();

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["name"], "products_api");

        let (status, body) = send(&app, "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn test_root_routes_carry_security_headers() {
        let app = test_app();

        for uri in ["/", "/health", "/ready", "/api/products"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
            assert_eq!(response.headers()["x-frame-options"], "DENY", "GET {uri}");
        }
    }

    #[tokio::test]
    async fn test_catalog_scenario() {
        let app = test_app();

        let (status, phone) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({"name": "Phone", "price": 50000.0, "in_stock": true})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(phone["id"], 1);

        let (status, headphone) = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({"name": "Headphone", "price": 12000.0})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headphone["id"], 2);

        let (_, listed) = send(
            &app,
            "GET",
            "/api/products?in_stock=true&min_price=20000",
            None,
        )
        .await;
        assert_eq!(listed, json!([phone]));

        let (status, _) = send(&app, "DELETE", "/api/products/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, "GET", "/api/products/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = send(&app, "GET", "/api/products", None).await;
        assert_eq!(listed, json!([headphone]));
    }

    #[tokio::test]
    async fn test_openapi_documents_product_paths() {
        let (status, body) = send(&test_app(), "GET", "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/products/{id}"]["patch"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = send(&test_app(), "GET", "/api/orders", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }
}

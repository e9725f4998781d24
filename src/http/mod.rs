//! HTTP surface
//!
//! ```text
//! POST   /distributor                      {"distributor": "D1"}
//! GET    /distributor
//! DELETE /distributor/{distributor}
//! GET    /permission/check?distributor=D1&region=KA-IN
//! POST   /permission/allow                 {"distributor": "D1", "region": "IN"}
//! POST   /permission/disallow              {"distributor": "D1", "region": "KA-IN"}
//! POST   /permission/contract              contract text
//! GET    /permission/{distributor}?type=text|json
//! GET    /regions/countries
//! GET    /regions/provinces/{country}
//! GET    /regions/cities/{country}/{province}
//! ```

mod handlers;
mod rate_limit;
mod response;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

use crate::service::DistributionService;

pub use rate_limit::{global_limiter, GlobalLimiter};
pub use response::ApiResponse;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<DistributionService>,
}

/// Build the application router
///
/// Every route shares one limiter of `per_minute` requests per minute.
pub fn router(service: Arc<DistributionService>, per_minute: u32) -> Router {
    let state = AppState { service };
    let limiter = global_limiter(per_minute);

    Router::new()
        .route(
            "/distributor",
            post(handlers::add_distributor).get(handlers::list_distributors),
        )
        .route("/distributor/{distributor}", delete(handlers::remove_distributor))
        .route("/permission/check", get(handlers::check_permission))
        .route("/permission/allow", post(handlers::allow_region))
        .route("/permission/disallow", post(handlers::disallow_region))
        .route("/permission/contract", post(handlers::apply_contract))
        .route("/permission/{distributor}", get(handlers::get_permissions))
        .route("/regions/countries", get(handlers::list_countries))
        .route("/regions/provinces/{country}", get(handlers::list_provinces))
        .route(
            "/regions/cities/{country}/{province}",
            get(handlers::list_cities),
        )
        .layer(middleware::from_fn_with_state(limiter, rate_limit::rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::sample_catalog;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        app_with_limit(1000)
    }

    fn app_with_limit(limit: u32) -> Router {
        let service = Arc::new(DistributionService::new(Arc::new(sample_catalog())));
        router(service, limit)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
        (status, value)
    }

    async fn fetch(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri, None).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        send(app, Method::POST, uri, Some(body)).await
    }

    async fn post_text(app: &Router, uri: &str, text: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(text.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_distributor_routes() {
        let app = app();

        let (status, body) = post_json(&app, "/distributor", json!({"distributor": "D1"})).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"status": true, "resp_code": "CREATED"}));

        let (status, body) = post_json(&app, "/distributor", json!({"distributor": "D1"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], "DISTRIBUTOR_EXISTS");
        assert_eq!(body["status"], false);

        let (status, body) = fetch(&app, "/distributor").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"distributors": ["D1"]}));

        let (status, _) = send(&app, Method::DELETE, "/distributor/D1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::DELETE, "/distributor/D1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["resp_code"], "DISTRIBUTOR_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_request_bodies() {
        let app = app();
        let (status, body) = post_json(&app, "/distributor", json!({"name": "D1"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], "BINDING_ERROR");

        let (status, _) = post_json(&app, "/distributor", json!({"distributor": "  "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = fetch(&app, "/permission/check?distributor=D1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], "BINDING_ERROR");
    }

    #[tokio::test]
    async fn test_allow_and_check() {
        let app = app();
        post_json(&app, "/distributor", json!({"distributor": "D1"})).await;

        let grant = json!({"distributor": "D1", "region": "IN"});
        let (status, _) = post_json(&app, "/permission/allow", grant).await;
        assert_eq!(status, StatusCode::OK);
        let exception = json!({"distributor": "D1", "region": "KA-IN"});
        let (status, _) = post_json(&app, "/permission/disallow", exception).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = fetch(&app, "/permission/check?distributor=D1&region=IN").await;
        assert_eq!(body["resp_code"], "PARTIALLY_ALLOWED");
        let (_, body) = fetch(&app, "/permission/check?distributor=D1&region=MDU-TN-IN").await;
        assert_eq!(body["resp_code"], "FULLY_ALLOWED");
        let (_, body) = fetch(&app, "/permission/check?distributor=D1&region=BLR-KA-IN").await;
        assert_eq!(body["resp_code"], "FULLY_DENIED");

        let (status, body) = fetch(&app, "/permission/check?distributor=D1&region=XX").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["resp_code"], "REGION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_contract_and_permissions() {
        let app = app();
        let (status, body) = post_text(
            &app,
            "/permission/contract",
            "Permissions for D1\nINCLUDE: IN\nEXCLUDE: KA-IN",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resp_code"], "SUCCESS");

        let (status, body) = post_text(
            &app,
            "/permission/contract",
            "Permissions for D2 < D1\nINCLUDE: IN\nINCLUDE: US",
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (status, body) = fetch(&app, "/permission/D2?type=json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!({"distributor": "D2", "included": ["IN"], "excluded": ["KA-IN"]})
        );

        let (status, body) = fetch(&app, "/permission/D2").await;
        assert_eq!(status, StatusCode::OK);
        let expected = "Permissions for D2\nINCLUDE: IN\nEXCLUDE: KA-IN";
        assert_eq!(body, Value::String(expected.into()));

        let (status, body) = post_text(
            &app,
            "/permission/contract",
            "Permissions for D3 < D9\nINCLUDE: IN",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["resp_code"], "PARENT_DISTRIBUTOR_NOT_FOUND");

        let (status, body) = post_text(
            &app,
            "/permission/contract",
            "Permissions for D3\nINCLUDE: XX",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["resp_code"], "REGION_NOT_FOUND");

        let (status, body) = post_text(
            &app,
            "/permission/contract",
            "Permissions for D3\nEXCLUDE: KA-IN",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["resp_code"], "INVALID_CONTRACT");
    }

    #[tokio::test]
    async fn test_region_routes() {
        let app = app();
        let (status, body) = fetch(&app, "/regions/countries").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["countries"].as_array().unwrap().len(), 3);

        let (_, body) = fetch(&app, "/regions/provinces/US").await;
        assert_eq!(body["data"]["provinces"][0]["code"], "CA");

        let (_, body) = fetch(&app, "/regions/cities/IN/TN").await;
        assert_eq!(body["data"]["cities"][0]["code"], "CENAI");

        let (status, _) = fetch(&app, "/regions/cities/IN/XX").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let app = app_with_limit(2);
        for _ in 0..2 {
            let (status, _) = fetch(&app, "/distributor").await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = fetch(&app, "/distributor").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["resp_code"], "RATE_LIMITED");
    }
}

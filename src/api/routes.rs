use axum::{routing::get, Router};
use std::sync::Arc;

use crate::api::handlers::{self, BrokerState};
use crate::store::InstanceStore;

pub fn create_router<S: InstanceStore + 'static>() -> Router<Arc<BrokerState<S>>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::get_metrics::<S>))
        // Open Service Broker API v2
        .route("/v2/catalog", get(handlers::get_catalog::<S>))
        .route(
            "/v2/service_instances/:instance_id",
            get(handlers::fetch_instance::<S>)
                .put(handlers::provision_instance::<S>)
                .patch(handlers::update_instance::<S>)
                .delete(handlers::deprovision_instance::<S>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::InstanceService;
    use crate::metrics::CountingMetrics;
    use crate::model::{Catalog, Plan, Service};
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let catalog = Catalog::new(vec![Service {
            id: "db".to_string(),
            name: "Database".to_string(),
            description: None,
            bindable: false,
            plan_updateable: false,
            plans: vec![Plan {
                id: "small".to_string(),
                name: "Small".to_string(),
                description: None,
                free: true,
            }],
        }])
        .unwrap();
        let metrics = Arc::new(CountingMetrics::new());
        let state = Arc::new(BrokerState {
            instances: InstanceService::new(Arc::new(catalog), Arc::new(MemoryStore::new()), metrics.clone()),
            metrics,
        });
        create_router::<MemoryStore>().with_state(state)
    }

    fn request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Broker-API-Version", "2.17")
            .header("content-type", "application/json");
        match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_status_codes() {
        let app = app();
        let provision = r#"{"service_id": "db", "plan_id": "small", "parameters": {}}"#;

        let response = app
            .clone()
            .oneshot(request("PUT", "/v2/service_instances/i1", Some(provision)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(request("PUT", "/v2/service_instances/i1", Some(provision)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request(
                "PATCH",
                "/v2/service_instances/i1",
                Some(r#"{"service_id": "db", "plan_id": "large"}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(request(
                "DELETE",
                "/v2/service_instances/i1?service_id=db&plan_id=small",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request(
                "DELETE",
                "/v2/service_instances/i1?service_id=db&plan_id=small",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GONE);

        let response = app
            .oneshot(request("GET", "/v2/service_instances/i1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_malformed_requests_are_bad_request() {
        let app = app();

        // Missing plan_id in the provision body
        let response = app
            .clone()
            .oneshot(request("PUT", "/v2/service_instances/i1", Some(r#"{"service_id": "db"}"#)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"], "BadRequest");
        assert!(body["description"].as_str().unwrap().contains("plan_id"));

        // Body that is not JSON at all
        let response = app
            .clone()
            .oneshot(request("PATCH", "/v2/service_instances/i1", Some("not json")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_body(response).await["error"], "BadRequest");

        // Deprovision without service_id/plan_id query parameters
        let response = app
            .oneshot(request("DELETE", "/v2/service_instances/i1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = error_body(response).await;
        assert_eq!(body["error"], "BadRequest");
        assert!(body["description"].as_str().unwrap().contains("service_id"));
    }

    #[tokio::test]
    async fn test_missing_version_header() {
        let response = app()
            .oneshot(Request::builder().uri("/v2/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);

        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

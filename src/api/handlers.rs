use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::api_version::BrokerApiVersion;
use crate::error::BrokerError;
use crate::logic::InstanceService;
use crate::metrics::{CountingMetrics, MetricsSnapshot};
use crate::model::{
    DeprovisionRequest, Id, ProvisionOutcome, ProvisionRequest, Service, ServiceInstanceView,
    UpdateRequest,
};
use crate::store::InstanceStore;

pub struct BrokerState<S: InstanceStore> {
    pub instances: InstanceService<S>,
    pub metrics: Arc<CountingMetrics>,
}

pub type AppState<S> = Arc<BrokerState<S>>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub services: Vec<Service>,
}

pub async fn get_catalog<S: InstanceStore>(
    State(state): State<AppState<S>>,
    _version: BrokerApiVersion,
) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        services: state.instances.catalog().services().to_vec(),
    })
}

pub async fn get_metrics<S: InstanceStore>(State(state): State<AppState<S>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

pub async fn fetch_instance<S: InstanceStore>(
    State(state): State<AppState<S>>,
    _version: BrokerApiVersion,
    Path(instance_id): Path<Id>,
) -> Result<Json<ServiceInstanceView>, BrokerError> {
    let view = state.instances.fetch(&instance_id).await?;
    Ok(Json(view))
}

/// 201 for a new instance, 200 when an identical instance already exists
pub async fn provision_instance<S: InstanceStore>(
    State(state): State<AppState<S>>,
    _version: BrokerApiVersion,
    Path(instance_id): Path<Id>,
    request: Result<RequestJson<ProvisionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), BrokerError> {
    let RequestJson(request) = request?;
    let outcome = state
        .instances
        .provision(&instance_id, &request.service_id, &request.plan_id, &request.parameters)
        .await?;

    let status = match outcome {
        ProvisionOutcome::Created => StatusCode::CREATED,
        ProvisionOutcome::AlreadyExistsUnchanged => StatusCode::OK,
    };
    Ok((status, Json(json!({}))))
}

pub async fn update_instance<S: InstanceStore>(
    State(state): State<AppState<S>>,
    _version: BrokerApiVersion,
    Path(instance_id): Path<Id>,
    request: Result<RequestJson<UpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, BrokerError> {
    let RequestJson(request) = request?;
    state
        .instances
        .update(
            &instance_id,
            &request.service_id,
            request.plan_id.as_ref(),
            request.parameters.as_ref(),
        )
        .await?;
    Ok(Json(json!({})))
}

pub async fn deprovision_instance<S: InstanceStore>(
    State(state): State<AppState<S>>,
    _version: BrokerApiVersion,
    Path(instance_id): Path<Id>,
    request: Result<Query<DeprovisionRequest>, QueryRejection>,
) -> Result<Json<Value>, BrokerError> {
    let Query(request) = request?;
    state
        .instances
        .deprovision(&instance_id, &request.service_id, &request.plan_id)
        .await?;
    Ok(Json(json!({})))
}

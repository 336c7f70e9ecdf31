//! Chain Endpoints
//!
//! The index-based reorder API a backend exposes, backed by the same planning
//! code the clients use.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/parents/:parent_id/chain` - Ordered children plus diagnostics
//! - `POST /api/parents/:parent_id/entities?index=` - Create (tail or index)
//! - `DELETE /api/parents/:parent_id/entities/:entity_id` - Delete and relink
//! - `POST /api/parents/:parent_id/entities/:entity_id/move` - `{"direction": "up"}`
//! - `POST /api/parents/:parent_id/entities/:entity_id/reorder` - `{"targetIndex": 2}`
//! - `POST /api/parents/:parent_id/repair` - Rewrite stored links

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;

use crate::api::HttpError;
use crate::db::ChainStore;
use crate::operations::{ChainDiagnostics, MoveDirection, ReorderPlan};
use crate::services::ChainService;

type SharedService<S> = Arc<ChainService<S>>;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

/// Ordered children and what reconstruction had to repair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainView<E> {
    pub entities: Vec<E>,
    pub diagnostics: ChainDiagnostics,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuery {
    /// Target position; appended at the tail when absent
    pub index: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub target_index: usize,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_chain<S>(
    State(service): State<SharedService<S>>,
    Path(parent_id): Path<String>,
) -> Result<Json<ChainView<S::Entity>>, HttpError>
where
    S: ChainStore + 'static,
    S::Entity: Serialize,
{
    let order = service.inspect(&parent_id).await?;
    Ok(Json(ChainView {
        entities: order.entities,
        diagnostics: order.diagnostics,
    }))
}

/// ```bash
/// curl -X POST "http://localhost:3002/api/parents/course-1/entities?index=0" \
///   -H "Content-Type: application/json" \
///   -d '{"id": "m9", "courseId": "course-1", "title": "Warm-up",
///        "createdAt": "2025-01-01T00:00:00Z", "updatedAt": "2025-01-01T00:00:00Z"}'
/// ```
async fn create_entity<S>(
    State(service): State<SharedService<S>>,
    Path(parent_id): Path<String>,
    Query(query): Query<CreateQuery>,
    Json(entity): Json<S::Entity>,
) -> Result<Json<Vec<S::Entity>>, HttpError>
where
    S: ChainStore + 'static,
    S::Entity: Serialize + DeserializeOwned,
{
    let ordered = match query.index {
        Some(index) => service.insert_at(&parent_id, entity, index).await?,
        None => service.append(&parent_id, entity).await?,
    };
    Ok(Json(ordered))
}

async fn delete_entity<S>(
    State(service): State<SharedService<S>>,
    Path((parent_id, entity_id)): Path<(String, String)>,
) -> Result<Json<Vec<S::Entity>>, HttpError>
where
    S: ChainStore + 'static,
    S::Entity: Serialize,
{
    Ok(Json(service.delete(&parent_id, &entity_id).await?))
}

async fn move_entity<S>(
    State(service): State<SharedService<S>>,
    Path((parent_id, entity_id)): Path<(String, String)>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<Vec<S::Entity>>, HttpError>
where
    S: ChainStore + 'static,
    S::Entity: Serialize,
{
    let ordered = service
        .move_adjacent(&parent_id, &entity_id, request.direction)
        .await?;
    Ok(Json(ordered))
}

async fn reorder_entity<S>(
    State(service): State<SharedService<S>>,
    Path((parent_id, entity_id)): Path<(String, String)>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Vec<S::Entity>>, HttpError>
where
    S: ChainStore + 'static,
    S::Entity: Serialize,
{
    let ordered = service
        .move_to_index(&parent_id, &entity_id, request.target_index)
        .await?;
    Ok(Json(ordered))
}

async fn repair_chain<S>(
    State(service): State<SharedService<S>>,
    Path(parent_id): Path<String>,
) -> Result<Json<ReorderPlan>, HttpError>
where
    S: ChainStore + 'static,
{
    Ok(Json(service.repair(&parent_id).await?))
}

/// Chain routes bound to `service`
pub fn routes<S>(service: SharedService<S>) -> Router
where
    S: ChainStore + 'static,
    S::Entity: Serialize + DeserializeOwned,
{
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/parents/:parent_id/chain", get(get_chain::<S>))
        .route("/api/parents/:parent_id/entities", post(create_entity::<S>))
        .route(
            "/api/parents/:parent_id/entities/:entity_id",
            delete(delete_entity::<S>),
        )
        .route(
            "/api/parents/:parent_id/entities/:entity_id/move",
            post(move_entity::<S>),
        )
        .route(
            "/api/parents/:parent_id/entities/:entity_id/reorder",
            post(reorder_entity::<S>),
        )
        .route("/api/parents/:parent_id/repair", post(repair_chain::<S>))
        .with_state(service)
}

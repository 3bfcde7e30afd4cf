use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{entities::medicine, parse_canonical_id},
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        medicine_service::{MedicinePatch, NewMedicineInput},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineQuery {
    pub pharmacy_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub pharmacy_id: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<medicine::Model> for MedicineResponse {
    fn from(model: medicine::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
            pharmacy_id: model.pharmacy_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route("/medicines/{id}", put(update_medicine).delete(delete_medicine))
        .with_state(state)
}

fn medicine_id(raw: &str) -> Result<Uuid, AppError> {
    parse_canonical_id(raw).map_err(|_| AppError::not_found("Medicine not found"))
}

async fn list_medicines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MedicineQuery>,
) -> ApiResult<Vec<MedicineResponse>> {
    let pharmacy_id = query
        .pharmacy_id
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_canonical_id(raw).map_err(|_| AppError::validation("Invalid pharmacyId")))
        .transpose()?;

    let medicines = ServiceContext::from_state(state.as_ref())
        .medicine()
        .list(pharmacy_id)
        .await?;
    JsonApiResponse::ok(medicines.into_iter().map(Into::into).collect())
}

async fn create_medicine(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewMedicineInput>,
) -> ApiResult<MedicineResponse> {
    let medicine = ServiceContext::from_state(state.as_ref())
        .medicine()
        .create(body)
        .await?;
    JsonApiResponse::created("Medicine created", medicine.into())
}

async fn update_medicine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<MedicinePatch>,
) -> ApiResult<MedicineResponse> {
    let medicine = ServiceContext::from_state(state.as_ref())
        .medicine()
        .update(medicine_id(&id)?, patch)
        .await?;
    JsonApiResponse::ok(medicine.into())
}

async fn delete_medicine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    ServiceContext::from_state(state.as_ref())
        .medicine()
        .delete(medicine_id(&id)?)
        .await?;
    JsonApiResponse::ok(Deleted { success: true })
}

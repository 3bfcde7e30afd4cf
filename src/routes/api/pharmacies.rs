use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::PharmacyManagers,
    db::{entities::pharmacy, parse_canonical_id},
    error::AppError,
    middleware::{AuthRoleGuard, Identity},
    response::{ApiResult, JsonApiResponse},
    services::{
        ServiceContext,
        pharmacy_service::{NewPharmacyInput, PharmacyPatch},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyQuery {
    pub medicine_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyResponse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_verified: bool,
    pub open_hours: Option<serde_json::Value>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl From<pharmacy::Model> for PharmacyResponse {
    fn from(model: pharmacy::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            address: model.address,
            latitude: model.latitude,
            longitude: model.longitude,
            phone: model.phone,
            email: model.email,
            is_verified: model.is_verified,
            open_hours: model.open_hours,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/pharmacies", get(list_pharmacies).post(create_pharmacy))
        .route("/pharmacies/{id}", get(get_pharmacy).put(update_pharmacy))
        .with_state(state)
}

// Unparsable ids cannot name a stored pharmacy.
fn pharmacy_id(raw: &str) -> Result<Uuid, AppError> {
    parse_canonical_id(raw).map_err(|_| AppError::not_found("Pharmacy not found"))
}

async fn list_pharmacies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PharmacyQuery>,
) -> ApiResult<Vec<PharmacyResponse>> {
    let service = ServiceContext::from_state(state.as_ref()).pharmacy();
    let pharmacies = match query.medicine_name {
        Some(fragment) => service.find_by_medicine_name(&fragment).await?,
        None => service.list_all().await?,
    };

    JsonApiResponse::ok(pharmacies.into_iter().map(Into::into).collect())
}

async fn get_pharmacy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<PharmacyResponse> {
    let pharmacy = ServiceContext::from_state(state.as_ref())
        .pharmacy()
        .get(pharmacy_id(&id)?)
        .await?;
    JsonApiResponse::ok(pharmacy.into())
}

async fn create_pharmacy(
    State(state): State<Arc<AppState>>,
    guard: AuthRoleGuard<PharmacyManagers>,
    Json(body): Json<NewPharmacyInput>,
) -> ApiResult<PharmacyResponse> {
    let pharmacy = ServiceContext::from_state(state.as_ref())
        .pharmacy()
        .create(body)
        .await?;
    tracing::debug!(user_id = %guard.identity.user_id, pharmacy_id = %pharmacy.id, "pharmacy created via api");
    JsonApiResponse::created("Pharmacy created", pharmacy.into())
}

async fn update_pharmacy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    identity: Identity,
    Json(patch): Json<PharmacyPatch>,
) -> ApiResult<PharmacyResponse> {
    let pharmacy = ServiceContext::from_state(state.as_ref())
        .pharmacy()
        .update_pharmacy(Some(&identity), pharmacy_id(&id)?, patch)
        .await?;
    JsonApiResponse::ok(pharmacy.into())
}

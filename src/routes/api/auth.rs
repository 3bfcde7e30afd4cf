use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::entities::user,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, auth_service::Registration},
    state::AppState,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub pharmacy_name: Option<String>,
    pub pharmacy_address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub pharmacy_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub avatar_url: Option<String>,
    pub pharmacy_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .with_state(state)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<RegisterResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let registered = services
        .auth(&state.credentials)
        .register(body.into())
        .await?;

    JsonApiResponse::created(
        "User registered successfully",
        RegisterResponse {
            user_id: registered.user_id,
            email: registered.email,
            pharmacy_id: registered.pharmacy_id,
        },
    )
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let outcome = services
        .auth(&state.credentials)
        .login(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;

    JsonApiResponse::with_message(
        StatusCode::OK,
        "Login successful",
        LoginResponse {
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token,
            user: outcome.user.into(),
        },
    )
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<RefreshResponse> {
    let services = ServiceContext::from_state(state.as_ref());
    let access_token = services
        .auth(&state.credentials)
        .refresh(body.refresh_token.as_deref().unwrap_or_default())?;

    JsonApiResponse::with_message(StatusCode::OK, "Token refreshed", RefreshResponse { access_token })
}

impl From<RegisterRequest> for Registration {
    fn from(body: RegisterRequest) -> Self {
        Self {
            email: body.email.unwrap_or_default(),
            password: body.password.unwrap_or_default(),
            full_name: body.full_name,
            role: body.role,
            pharmacy_name: body.pharmacy_name,
            pharmacy_address: body.pharmacy_address,
            phone: body.phone,
        }
    }
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            avatar_url: user.avatar_url,
            pharmacy_id: user.pharmacy_id,
        }
    }
}

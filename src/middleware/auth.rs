use std::collections::BTreeSet;

use axum::http::{HeaderMap, header};
use uuid::Uuid;

use crate::{
    auth::{Role, TokenPayload},
    error::AppError,
    services::ServiceContext,
    state::AppState,
};

const BEARER_PREFIX: &str = "Bearer ";

/// The caller behind a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub roles: BTreeSet<String>,
}

impl Identity {
    pub fn has_any_role(&self, allowed: &[Role]) -> bool {
        self.roles.iter().any(|held| {
            allowed
                .iter()
                .any(|role| held.trim().eq_ignore_ascii_case(role.as_str()))
        })
    }
}

impl From<TokenPayload> for Identity {
    fn from(payload: TokenPayload) -> Self {
        Self {
            user_id: payload.user_id,
            email: payload.email,
            roles: payload.roles,
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("No token provided"))
}

/// Verifies the bearer token and confirms its user still exists.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let token = bearer_token(headers)?;
    let payload = state.credentials.verify_access_token(token)?;

    let user = ServiceContext::from_state(state)
        .user()
        .find_by_id(&payload.user_id)
        .await?;
    if user.is_none() {
        tracing::debug!(user_id = %payload.user_id, "token subject no longer exists");
        return Err(AppError::unauthorized("Invalid token"));
    }

    Ok(payload.into())
}

pub fn authorize<'a>(identity: Option<&'a Identity>, allowed: &[Role]) -> Result<&'a Identity, AppError> {
    let identity = identity.ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    if !identity.has_any_role(allowed) {
        tracing::debug!(
            user_id = %identity.user_id,
            roles = ?identity.roles,
            "insufficient permissions"
        );
        return Err(AppError::forbidden("Insufficient permissions"));
    }

    Ok(identity)
}

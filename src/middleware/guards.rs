use std::{marker::PhantomData, sync::Arc};

use axum::{extract::FromRequestParts, http::request::Parts};

use super::auth::{Identity, authenticate, authorize};
use crate::{auth::RequiredRoles, error::AppError, state::AppState};

// Resolved once per request, then cached in extensions.
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(identity);
        }

        let identity = authenticate(state.as_ref(), &parts.headers).await?;
        parts.extensions.insert(identity.clone());
        Ok(identity)
    }
}

pub struct AuthRoleGuard<R: RequiredRoles> {
    pub identity: Identity,
    _marker: PhantomData<R>,
}

impl<R> FromRequestParts<Arc<AppState>> for AuthRoleGuard<R>
where
    R: RequiredRoles,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        authorize(Some(&identity), R::allowed())?;

        Ok(Self {
            identity,
            _marker: PhantomData,
        })
    }
}

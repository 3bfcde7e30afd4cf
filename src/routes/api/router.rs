use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, medicines, pharmacies};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(auth::router(state.clone()))
        .merge(pharmacies::router(state.clone()))
        .merge(medicines::router(state))
}

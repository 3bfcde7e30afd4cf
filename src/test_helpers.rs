use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    auth::TokenPayload,
    config::{AppConfig, AuthConfig, DatabaseConfig},
    db::entities::{medicine, pharmacy, user},
    routes::app,
    state::AppState,
};

pub const TEST_ACCESS_SECRET: &str = "test-access-secret";
pub const TEST_REFRESH_SECRET: &str = "test-refresh-secret";

pub fn ts() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
        .fixed_offset()
}

pub fn user_model(id: Uuid, email: &str, role: &str, pharmacy_id: Option<Uuid>) -> user::Model {
    user::Model {
        id,
        email: email.to_string(),
        password_hash: "hash".to_string(),
        full_name: None,
        role: role.to_string(),
        avatar_url: None,
        pharmacy_id,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn pharmacy_model(id: Uuid, name: &str) -> pharmacy::Model {
    pharmacy::Model {
        id,
        name: name.to_string(),
        address: "1 Main St".to_string(),
        latitude: 0.0,
        longitude: 0.0,
        phone: None,
        email: None,
        is_verified: false,
        open_hours: None,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn medicine_model(id: Uuid, name: &str, pharmacy_id: Option<Uuid>) -> medicine::Model {
    medicine::Model {
        id,
        name: name.to_string(),
        quantity: 10,
        pharmacy_id,
        created_at: ts(),
        updated_at: ts(),
    }
}

/// Config with fixed secrets and the cheapest hash cost.
pub fn test_config() -> AppConfig {
    AppConfig {
        database: Some(DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_idle: 0,
        }),
        auth: AuthConfig {
            access_token_secret: Some(TEST_ACCESS_SECRET.to_string()),
            refresh_token_secret: Some(TEST_REFRESH_SECRET.to_string()),
            password_hash_cost: 1,
            ..AuthConfig::default()
        },
        ..AppConfig::default()
    }
}

pub fn test_state(db: DatabaseConnection) -> Arc<AppState> {
    AppState::new(test_config(), db)
}

/// Full application stack over `db`, layers included.
pub fn test_app(db: DatabaseConnection) -> Router {
    app(test_state(db))
}

pub fn access_token_for(user_id: Uuid, email: &str, role: &str) -> String {
    let state = test_state(sea_orm::MockDatabase::new(sea_orm::DatabaseBackend::Postgres).into_connection());
    state
        .credentials
        .generate_access_token(&TokenPayload::new(user_id, email, [role.to_string()]))
        .expect("sign access token")
}

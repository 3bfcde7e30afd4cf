use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::CredentialService, config::AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub credentials: CredentialService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Arc<Self> {
        let credentials = CredentialService::from_config(&config.auth);
        Arc::new(Self {
            config,
            db,
            credentials,
        })
    }
}

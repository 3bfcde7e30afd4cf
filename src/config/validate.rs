use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.max_body_bytes == 0 {
        errors.push("general.max_body_bytes must be > 0".to_string());
    }

    match cfg.database.as_ref() {
        None => errors.push("database.url must be set".to_string()),
        Some(database) => {
            if database.url.trim().is_empty() {
                errors.push("database.url must not be empty".to_string());
            }

            if database.min_idle > database.max_connections {
                errors.push(format!(
                    "database.min_idle ({}) must be <= database.max_connections ({})",
                    database.min_idle, database.max_connections
                ));
            }
        }
    }

    let auth = &cfg.auth;
    let access = auth.access_token_secret.as_deref().map(str::trim);
    let refresh = auth.refresh_token_secret.as_deref().map(str::trim);

    if access.is_none_or(str::is_empty) {
        errors.push("auth.access_token_secret must be set".to_string());
    }

    if refresh.is_none_or(str::is_empty) {
        errors.push("auth.refresh_token_secret must be set".to_string());
    }

    if access.is_some_and(|secret| !secret.is_empty()) && access == refresh {
        errors.push("auth.refresh_token_secret must differ from auth.access_token_secret".to_string());
    }

    if auth.access_token_ttl.is_zero() {
        errors.push("auth.access_token_ttl must be > 0".to_string());
    }

    if auth.refresh_token_ttl <= auth.access_token_ttl {
        errors.push("auth.refresh_token_ttl must be longer than auth.access_token_ttl".to_string());
    }

    if auth.password_hash_cost == 0 {
        errors.push("auth.password_hash_cost must be > 0".to_string());
    }

    match (auth.admin_email.as_deref(), auth.admin_password.as_deref()) {
        (Some(_), None) | (None, Some(_)) => errors.push(
            "auth.admin_email and auth.admin_password must be set together".to_string(),
        ),
        (Some(email), Some(password)) => {
            if email.trim().is_empty() {
                errors.push("auth.admin_email must not be empty".to_string());
            }
            if password.len() < 8 {
                errors.push("auth.admin_password must be at least 8 characters".to_string());
            }
        }
        (None, None) => {}
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}

use uuid::Uuid;

use crate::{
    auth::{CredentialService, Role, TokenPayload},
    config::AuthConfig,
    db::dao::{DaoBase, DaoLayerError, NewUser, PharmacyDao, pharmacy_dao::NewPharmacy},
    db::entities::user,
    error::AppError,
    services::user_service::{UserService, normalize_email},
};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub pharmacy_name: Option<String>,
    pub pharmacy_address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub email: String,
    pub pharmacy_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: user::Model,
}

struct PharmacyDetails {
    name: String,
    address: String,
}

pub struct AuthService<'a> {
    credentials: &'a CredentialService,
    users: UserService,
    pharmacy_dao: PharmacyDao,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl<'a> AuthService<'a> {
    pub fn new(credentials: &'a CredentialService, users: UserService, pharmacy_dao: PharmacyDao) -> Self {
        Self {
            credentials,
            users,
            pharmacy_dao,
        }
    }

    /// Pharmacists get their pharmacy created first; if the user insert then
    /// fails the pharmacy is deleted again.
    pub async fn register(&self, registration: Registration) -> Result<RegisteredUser, AppError> {
        let email = normalize_email(&registration.email);
        if email.is_empty() || registration.password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let role = match registration.role.as_deref().map(str::trim) {
            None | Some("") => Role::User,
            Some(raw) => match raw.parse::<Role>() {
                Ok(role @ (Role::User | Role::Pharmacist)) => role,
                _ => return Err(AppError::validation("Role must be either user or pharmacist")),
            },
        };

        let pharmacy = if role == Role::Pharmacist {
            match (
                non_blank(registration.pharmacy_name.as_deref()),
                non_blank(registration.pharmacy_address.as_deref()),
            ) {
                (Some(name), Some(address)) => Some(PharmacyDetails { name, address }),
                _ => {
                    return Err(AppError::validation(
                        "Pharmacy name and address are required for pharmacist registration",
                    ));
                }
            }
        } else {
            None
        };

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let password_hash = self.credentials.hash_password(&registration.password).await?;

        let pharmacy_id = match pharmacy {
            Some(details) => {
                let phone = non_blank(registration.phone.as_deref()).unwrap_or_else(|| email.clone());
                let created = self
                    .pharmacy_dao
                    .create_pharmacy(NewPharmacy {
                        name: details.name,
                        address: details.address,
                        latitude: 0.0,
                        longitude: 0.0,
                        phone: Some(phone),
                        email: Some(email.clone()),
                        open_hours: None,
                    })
                    .await?;
                tracing::info!(pharmacy_id = %created.id, "pharmacy created for registration");
                Some(created.id)
            }
            None => None,
        };

        let created = self
            .users
            .create_user(NewUser {
                email: email.clone(),
                password_hash,
                role: role.as_str().to_string(),
                full_name: non_blank(registration.full_name.as_deref()),
                pharmacy_id,
            })
            .await;

        let user = match created {
            Ok(user) => user,
            Err(err) => {
                if let Some(orphan) = pharmacy_id {
                    self.remove_orphan_pharmacy(orphan).await;
                }
                return Err(match err {
                    AppError::Conflict(_) => AppError::conflict("User already exists"),
                    other => other,
                });
            }
        };

        tracing::info!(user_id = %user.id, role = %role, "user registered");
        Ok(RegisteredUser {
            user_id: user.id,
            email: user.email,
            pharmacy_id: user.pharmacy_id,
        })
    }

    async fn remove_orphan_pharmacy(&self, pharmacy_id: Uuid) {
        match self.pharmacy_dao.delete(pharmacy_id).await {
            Ok(_) => tracing::warn!(%pharmacy_id, "user insert failed; pharmacy rolled back"),
            Err(DaoLayerError::NotFound { .. }) => {}
            Err(err) => tracing::error!(
                %pharmacy_id,
                error = %err,
                "failed to remove pharmacy after user insert failure"
            ),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("Email and password are required"));
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("login for unknown email");
            return Err(AppError::unauthorized("Invalid credentials"));
        };

        if !self.credentials.compare_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let payload = TokenPayload::new(user.id, user.email.clone(), [user.role.clone()]);
        let access_token = self.credentials.generate_access_token(&payload)?;
        let refresh_token = self.credentials.generate_refresh_token(&payload)?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome {
            access_token,
            refresh_token,
            user,
        })
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(AppError::validation("Refresh token is required"));
        }

        let payload = self
            .credentials
            .verify_refresh_token(refresh_token)
            .map_err(|err| match err {
                AppError::Unauthorized(_) => AppError::unauthorized("Invalid refresh token"),
                other => other,
            })?;

        self.credentials.generate_access_token(&payload)
    }

    /// Creates the configured admin account unless it already exists.
    pub async fn seed_admin(&self, cfg: &AuthConfig) -> anyhow::Result<()> {
        let (Some(email), Some(password)) = (cfg.admin_email.as_deref(), cfg.admin_password.as_deref())
        else {
            return Ok(());
        };

        let email = normalize_email(email);
        if let Some(existing) = self.users.find_by_email(&email).await? {
            tracing::info!(user_id = %existing.id, "admin user already present");
            return Ok(());
        }

        let password_hash = self.credentials.hash_password(password).await?;
        let user = self
            .users
            .create_user(NewUser {
                email,
                password_hash,
                role: Role::Admin.as_str().to_string(),
                full_name: None,
                pharmacy_id: None,
            })
            .await?;
        tracing::info!(user_id = %user.id, "seeded admin user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::Registration;
    use crate::{
        auth::CredentialService,
        db::entities::user,
        error::AppError,
        services::ServiceContext,
        test_helpers::{pharmacy_model, test_config, user_model},
    };

    fn credentials() -> CredentialService {
        CredentialService::from_config(&test_config().auth)
    }

    fn pharmacist(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "password123".to_string(),
            role: Some("Pharmacist".to_string()),
            pharmacy_name: Some("Central".to_string()),
            pharmacy_address: Some("1 Main St".to_string()),
            ..Registration::default()
        }
    }

    #[tokio::test]
    async fn register_rejects_missing_fields_without_touching_store() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let credentials = credentials();
        let service = ServiceContext::new(&db).auth(&credentials);

        let err = service
            .register(Registration {
                email: "  ".to_string(),
                password: "password123".to_string(),
                ..Registration::default()
            })
            .await
            .expect_err("email missing");
        assert_eq!(err.message(), "Email and password are required");

        let mut missing_address = pharmacist("p@example.com");
        missing_address.pharmacy_address = Some("   ".to_string());
        let err = service
            .register(missing_address)
            .await
            .expect_err("address missing");
        assert!(matches!(err, AppError::Validation(_)));

        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn register_rejects_short_password_without_touching_store() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let credentials = credentials();

        let err = ServiceContext::new(&db)
            .auth(&credentials)
            .register(Registration {
                email: "a@example.com".to_string(),
                password: "short".to_string(),
                ..Registration::default()
            })
            .await
            .expect_err("password too short");
        assert_eq!(err.message(), "Password must be at least 8 characters");
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn register_refuses_admin_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let credentials = credentials();

        let err = ServiceContext::new(&db)
            .auth(&credentials)
            .register(Registration {
                email: "a@example.com".to_string(),
                password: "password123".to_string(),
                role: Some("admin".to_string()),
                ..Registration::default()
            })
            .await
            .expect_err("admin is not self-service");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn register_detects_existing_email_case_insensitively() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(Uuid::new_v4(), "a@x.com", "user", None)]])
            .into_connection();
        let credentials = credentials();

        let err = ServiceContext::new(&db)
            .auth(&credentials)
            .register(Registration {
                email: "A@X.com".to_string(),
                password: "password123".to_string(),
                ..Registration::default()
            })
            .await
            .expect_err("duplicate");
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.message(), "User already exists");
    }

    #[tokio::test]
    async fn register_pharmacist_links_new_pharmacy() {
        let pharmacy_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[pharmacy_model(pharmacy_id, "Central")]])
            .append_query_results([[user_model(
                user_id,
                "p@example.com",
                "pharmacist",
                Some(pharmacy_id),
            )]])
            .into_connection();
        let credentials = credentials();

        let registered = ServiceContext::new(&db)
            .auth(&credentials)
            .register(pharmacist("P@Example.com"))
            .await
            .expect("register");
        assert_eq!(registered.user_id, user_id);
        assert_eq!(registered.pharmacy_id, Some(pharmacy_id));
    }

    #[tokio::test]
    async fn register_removes_pharmacy_when_user_insert_fails() {
        let pharmacy_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .append_query_results([[pharmacy_model(pharmacy_id, "Central")]])
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let credentials = credentials();

        let err = ServiceContext::new(&db)
            .auth(&credentials)
            .register(pharmacist("p@example.com"))
            .await
            .expect_err("user insert fails");
        assert!(matches!(err, AppError::Internal { .. }));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM"), "log: {log}");
    }

    #[tokio::test]
    async fn login_issues_tokens_for_valid_password() {
        let credentials = credentials();
        let hash = credentials.hash_password("password123").await.expect("hash");
        let mut stored = user_model(Uuid::new_v4(), "a@example.com", "pharmacist", None);
        stored.password_hash = hash;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .into_connection();

        let outcome = ServiceContext::new(&db)
            .auth(&credentials)
            .login("A@example.com", "password123")
            .await
            .expect("login");

        let payload = credentials
            .verify_access_token(&outcome.access_token)
            .expect("access token");
        assert_eq!(payload.user_id, stored.id);
        assert!(payload.roles.contains("pharmacist"));
        assert!(credentials.verify_refresh_token(&outcome.refresh_token).is_ok());
    }

    #[tokio::test]
    async fn login_hides_which_credential_was_wrong() {
        let credentials = credentials();
        let hash = credentials.hash_password("password123").await.expect("hash");
        let mut stored = user_model(Uuid::new_v4(), "a@example.com", "user", None);
        stored.password_hash = hash;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored]])
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = ServiceContext::new(&db).auth(&credentials);

        let wrong_password = service
            .login("a@example.com", "nope-nope")
            .await
            .expect_err("wrong password");
        let unknown_email = service
            .login("b@example.com", "password123")
            .await
            .expect_err("unknown email");

        assert_eq!(wrong_password.message(), "Invalid credentials");
        assert_eq!(unknown_email.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn refresh_exchanges_refresh_token_only() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let credentials = credentials();
        let service = ServiceContext::new(&db).auth(&credentials);
        let payload = crate::auth::TokenPayload::new(Uuid::new_v4(), "a@example.com", ["user".to_string()]);

        let refresh = credentials.generate_refresh_token(&payload).expect("refresh");
        let access = service.refresh(&refresh).expect("exchange");
        assert_eq!(credentials.verify_access_token(&access).expect("verify"), payload);

        let err = service.refresh(&access).expect_err("access token is not a refresh token");
        assert_eq!(err.message(), "Invalid refresh token");

        let err = service.refresh("  ").expect_err("missing");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn seed_admin_skips_existing_account() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(Uuid::new_v4(), "admin@example.com", "admin", None)]])
            .into_connection();
        let credentials = credentials();
        let mut cfg = test_config().auth;
        cfg.admin_email = Some("Admin@example.com".to_string());
        cfg.admin_password = Some("adminpassword".to_string());

        ServiceContext::new(&db)
            .auth(&credentials)
            .seed_admin(&cfg)
            .await
            .expect("seed");

        assert_eq!(db.into_transaction_log().len(), 1);
    }
}

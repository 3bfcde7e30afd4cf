use super::{
    TokenKind, TokenPayload,
    jwt::TokenService,
    password::PasswordHasher,
};
use crate::{config::AuthConfig, error::AppError};

/// Password hashing plus token issue/verify, built once from config and shared
/// through `AppState`.
#[derive(Clone)]
pub struct CredentialService {
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl CredentialService {
    pub fn new(hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self { hasher, tokens }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(
            PasswordHasher::new(cfg.password_hash_cost),
            TokenService::new(
                cfg.access_token_secret.as_deref(),
                cfg.access_token_ttl,
                cfg.refresh_token_secret.as_deref(),
                cfg.refresh_token_ttl,
            ),
        )
    }

    pub fn password_hash_cost(&self) -> u32 {
        self.hasher.cost()
    }

    pub async fn hash_password(&self, plain: &str) -> Result<String, AppError> {
        self.hasher.hash(plain).await
    }

    pub async fn compare_password(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        self.hasher.verify(plain, hash).await
    }

    pub fn generate_access_token(&self, payload: &TokenPayload) -> Result<String, AppError> {
        Ok(self.tokens.issue(TokenKind::Access, payload)?)
    }

    pub fn generate_refresh_token(&self, payload: &TokenPayload) -> Result<String, AppError> {
        Ok(self.tokens.issue(TokenKind::Refresh, payload)?)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<TokenPayload, AppError> {
        Ok(self.tokens.verify(TokenKind::Access, token)?)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<TokenPayload, AppError> {
        Ok(self.tokens.verify(TokenKind::Refresh, token)?)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::CredentialService;
    use crate::{auth::TokenPayload, config::AuthConfig, error::AppError};

    fn config() -> AuthConfig {
        AuthConfig {
            access_token_secret: Some("access".to_string()),
            refresh_token_secret: Some("refresh".to_string()),
            password_hash_cost: 1,
            ..AuthConfig::default()
        }
    }

    #[tokio::test]
    async fn compares_hashed_passwords() {
        let credentials = CredentialService::from_config(&config());
        let hash = credentials.hash_password("s3cret-pass").await.expect("hash");

        assert!(credentials.compare_password("s3cret-pass", &hash).await.expect("compare"));
        assert!(!credentials.compare_password("other-pass", &hash).await.expect("compare"));
    }

    #[test]
    fn issues_distinct_access_and_refresh_tokens() {
        let credentials = CredentialService::from_config(&config());
        let payload = TokenPayload::new(Uuid::new_v4(), "a@example.com", ["user".to_string()]);

        let access = credentials.generate_access_token(&payload).expect("access");
        let refresh = credentials.generate_refresh_token(&payload).expect("refresh");

        assert_eq!(credentials.verify_access_token(&access).expect("verify"), payload);
        assert_eq!(credentials.verify_refresh_token(&refresh).expect("verify"), payload);
        assert!(matches!(
            credentials.verify_refresh_token(&access),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn unset_refresh_secret_fails_at_use() {
        let mut cfg = config();
        cfg.refresh_token_secret = None;
        let credentials = CredentialService::from_config(&cfg);
        let payload = TokenPayload::new(Uuid::new_v4(), "a@example.com", ["user".to_string()]);

        let err = credentials
            .generate_refresh_token(&payload)
            .expect_err("refresh secret unset");
        assert_eq!(err.code(), "CONFIGURATION_ERROR");
    }
}

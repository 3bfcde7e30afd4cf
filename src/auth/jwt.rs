use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{Claims, TokenKind, TokenPayload};
use crate::error::AppError;

#[derive(Clone)]
pub struct JwtKeys {
    pub enc: EncodingKey,
    pub dec: DecodingKey,
}

impl JwtKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            enc: EncodingKey::from_secret(secret),
            dec: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("{0:?} token secret is not configured")]
    MissingSecret(TokenKind),
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Invalid(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret(_) => AppError::configuration(err.to_string()),
            TokenError::Encode(_) => AppError::internal_with("Token generation failed", err),
            TokenError::Invalid(_) => AppError::unauthorized("Invalid or expired token"),
        }
    }
}

pub fn now_unix() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or_default()
}

#[derive(Clone)]
struct TokenSigner {
    keys: JwtKeys,
    ttl: Duration,
}

/// Signs and checks HS256 tokens, one secret per token kind.
#[derive(Clone)]
pub struct TokenService {
    access: Option<TokenSigner>,
    refresh: Option<TokenSigner>,
}

impl TokenService {
    pub fn new(
        access_secret: Option<&str>,
        access_ttl: Duration,
        refresh_secret: Option<&str>,
        refresh_ttl: Duration,
    ) -> Self {
        let signer = |secret: Option<&str>, ttl| {
            secret
                .filter(|secret| !secret.trim().is_empty())
                .map(|secret| TokenSigner {
                    keys: JwtKeys::from_secret(secret.as_bytes()),
                    ttl,
                })
        };

        Self {
            access: signer(access_secret, access_ttl),
            refresh: signer(refresh_secret, refresh_ttl),
        }
    }

    fn signer(&self, kind: TokenKind) -> Result<&TokenSigner, TokenError> {
        let signer = match kind {
            TokenKind::Access => self.access.as_ref(),
            TokenKind::Refresh => self.refresh.as_ref(),
        };
        signer.ok_or(TokenError::MissingSecret(kind))
    }

    pub fn issue(&self, kind: TokenKind, payload: &TokenPayload) -> Result<String, TokenError> {
        let signer = self.signer(kind)?;
        let iat = now_unix();
        let claims = Claims {
            user_id: payload.user_id,
            email: payload.email.clone(),
            roles: payload.roles.clone(),
            token_use: kind,
            iat,
            exp: iat.saturating_add(signer.ttl.as_secs()),
        };
        encode_claims(&signer.keys, &claims)
    }

    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<TokenPayload, TokenError> {
        let signer = self.signer(kind)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &signer.keys.dec, &validation)
            .map_err(|err| TokenError::Invalid(err.to_string()))?;

        if data.claims.token_use != kind {
            return Err(TokenError::Invalid(format!(
                "expected {kind:?} token, got {:?}",
                data.claims.token_use
            )));
        }

        Ok(data.claims.into())
    }
}

pub fn encode_claims(keys: &JwtKeys, claims: &Claims) -> Result<String, TokenError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());

    encode(&header, claims, &keys.enc).map_err(TokenError::Encode)
}

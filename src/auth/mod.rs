pub mod credentials;
pub mod jwt;
pub mod password;
mod types;

pub use credentials::CredentialService;
pub use types::{Claims, PharmacyManagers, RequiredRoles, Role, TokenKind, TokenPayload, UnknownRole};

mod auth;
mod guards;
mod json_error;
mod panic;

pub use auth::{Identity, authenticate, authorize, bearer_token};
pub use guards::AuthRoleGuard;
pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;

pub mod auth_service;
pub mod context;
pub mod medicine_service;
pub mod pharmacy_service;
pub mod user_service;

pub use context::ServiceContext;

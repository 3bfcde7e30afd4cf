pub mod auth;
pub mod medicines;
pub mod pharmacies;
mod router;

pub use router::router;

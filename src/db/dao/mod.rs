pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod medicine_dao;
pub mod pharmacy_dao;
pub mod user_dao;

pub use base::{ColumnFilter, DaoBase, FilterOp, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, HasIdColumn, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use medicine_dao::MedicineDao;
pub use pharmacy_dao::PharmacyDao;
pub use user_dao::{NewUser, UserDao};

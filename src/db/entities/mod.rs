#[allow(unused_imports)]
pub mod prelude {
    pub use super::medicine::Entity as Medicine;
    pub use super::pharmacy::Entity as Pharmacy;
    pub use super::user::Entity as User;
}

pub mod medicine;
pub mod pharmacy;
pub mod user;

use sea_orm::DatabaseConnection;

use super::{DaoBase, MedicineDao, PharmacyDao, UserDao};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn pharmacy(&self) -> PharmacyDao {
        DaoBase::new(&self.db)
    }

    pub fn medicine(&self) -> MedicineDao {
        DaoBase::new(&self.db)
    }
}

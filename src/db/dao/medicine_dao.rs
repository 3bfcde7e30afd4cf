use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use super::{ColumnFilter, DaoBase, DaoResult, FilterOp};
use crate::db::entities::{medicine, prelude::Medicine};

#[derive(Clone)]
pub struct MedicineDao {
    db: DatabaseConnection,
}

impl DaoBase for MedicineDao {
    type Entity = Medicine;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl MedicineDao {
    pub async fn create_medicine(
        &self,
        name: String,
        quantity: i32,
        pharmacy_id: Option<Uuid>,
    ) -> DaoResult<medicine::Model> {
        let model = medicine::ActiveModel {
            name: Set(name),
            quantity: Set(quantity),
            pharmacy_id: Set(pharmacy_id),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list(&self, pharmacy_id: Option<Uuid>) -> DaoResult<Vec<medicine::Model>> {
        let filters: Vec<_> = pharmacy_id
            .map(|id| ColumnFilter::new(medicine::Column::PharmacyId, FilterOp::Eq(id.into())))
            .into_iter()
            .collect();
        self.find_all(&filters).await
    }

    /// Stocked medicines whose name contains `fragment`, ignoring case.
    pub async fn find_stocked_by_name(&self, fragment: &str) -> DaoResult<Vec<medicine::Model>> {
        self.find_all(&[
            ColumnFilter::new(
                medicine::Column::Name,
                FilterOp::ContainsIgnoreCase(fragment.to_string()),
            ),
            ColumnFilter::new(medicine::Column::PharmacyId, FilterOp::NotNull),
        ])
        .await
    }
}

use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, MedicineDao, PharmacyDao},
    db::entities::medicine,
    error::AppError,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicineInput {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub pharmacy_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicinePatch {
    pub name: Option<String>,
    pub quantity: Option<i32>,
}

fn medicine_not_found(err: DaoLayerError) -> AppError {
    match err {
        DaoLayerError::NotFound { .. } => AppError::not_found("Medicine not found"),
        other => other.into(),
    }
}

fn check_quantity(quantity: i32) -> Result<i32, AppError> {
    if quantity < 0 {
        return Err(AppError::validation("Quantity must not be negative"));
    }
    Ok(quantity)
}

#[derive(Clone)]
pub struct MedicineService {
    medicine_dao: MedicineDao,
    pharmacy_dao: PharmacyDao,
}

impl MedicineService {
    pub fn new(medicine_dao: MedicineDao, pharmacy_dao: PharmacyDao) -> Self {
        Self {
            medicine_dao,
            pharmacy_dao,
        }
    }

    pub async fn list(&self, pharmacy_id: Option<Uuid>) -> Result<Vec<medicine::Model>, AppError> {
        Ok(self.medicine_dao.list(pharmacy_id).await?)
    }

    pub async fn create(&self, input: NewMedicineInput) -> Result<medicine::Model, AppError> {
        let name = input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::validation("Medicine name is required"))?
            .to_string();
        let quantity = check_quantity(input.quantity.unwrap_or_default())?;

        if let Some(pharmacy_id) = input.pharmacy_id {
            if self.pharmacy_dao.find_optional(pharmacy_id).await?.is_none() {
                return Err(AppError::not_found("Pharmacy not found"));
            }
        }

        let created = self
            .medicine_dao
            .create_medicine(name, quantity, input.pharmacy_id)
            .await?;
        tracing::info!(medicine_id = %created.id, pharmacy_id = ?created.pharmacy_id, "medicine created");
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, patch: MedicinePatch) -> Result<medicine::Model, AppError> {
        let name = match patch.name {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::validation("Medicine name is required"));
            }
            Some(name) => Some(name.trim().to_string()),
            None => None,
        };
        let quantity = patch.quantity.map(check_quantity).transpose()?;

        self.medicine_dao
            .update(id, move |active| {
                if let Some(name) = name {
                    active.name = Set(name);
                }
                if let Some(quantity) = quantity {
                    active.quantity = Set(quantity);
                }
            })
            .await
            .map_err(medicine_not_found)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.medicine_dao
            .delete(id)
            .await
            .map_err(medicine_not_found)?;
        tracing::info!(medicine_id = %id, "medicine deleted");
        Ok(())
    }
}

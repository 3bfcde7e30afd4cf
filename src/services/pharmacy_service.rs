use std::collections::{BTreeMap, HashSet};

use sea_orm::Set;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, MedicineDao, PharmacyDao, pharmacy_dao::NewPharmacy},
    db::entities::{medicine, pharmacy},
    db::{canonical_id, parse_canonical_id},
    error::AppError,
    middleware::Identity,
    services::user_service::UserService,
};

/// Opening times for one weekday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

pub type WeeklyHours = BTreeMap<String, OpenHours>;

/// Distinguishes an explicit `null` (`Some(None)`) from an omitted field (`None`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPharmacyInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub open_hours: Option<WeeklyHours>,
}

/// Partial update: omitted fields stay untouched. `isVerified` is not
/// owner-editable and is ignored if sent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub open_hours: Option<Option<WeeklyHours>>,
}

struct PharmacyChanges {
    name: Option<String>,
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    phone: Option<Option<String>>,
    email: Option<Option<String>>,
    open_hours: Option<Option<serde_json::Value>>,
}

impl PharmacyChanges {
    fn apply(self, active: &mut pharmacy::ActiveModel) {
        if let Some(name) = self.name {
            active.name = Set(name);
        }
        if let Some(address) = self.address {
            active.address = Set(address);
        }
        if let Some(latitude) = self.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = self.longitude {
            active.longitude = Set(longitude);
        }
        if let Some(phone) = self.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = self.email {
            active.email = Set(email);
        }
        if let Some(open_hours) = self.open_hours {
            active.open_hours = Set(open_hours);
        }
    }
}

fn required_text(field: &str, value: String) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("Pharmacy {field} must not be blank")));
    }
    Ok(trimmed.to_string())
}

fn check_latitude(latitude: f64) -> Result<f64, AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::validation("Latitude must be between -90 and 90"));
    }
    Ok(latitude)
}

fn check_longitude(longitude: f64) -> Result<f64, AppError> {
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::validation("Longitude must be between -180 and 180"));
    }
    Ok(longitude)
}

fn hours_to_json(hours: WeeklyHours) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(hours).map_err(|err| AppError::internal_with("Invalid opening hours", err))
}

impl PharmacyPatch {
    fn into_changes(self) -> Result<PharmacyChanges, AppError> {
        Ok(PharmacyChanges {
            name: self.name.map(|name| required_text("name", name)).transpose()?,
            address: self
                .address
                .map(|address| required_text("address", address))
                .transpose()?,
            latitude: self.latitude.map(check_latitude).transpose()?,
            longitude: self.longitude.map(check_longitude).transpose()?,
            phone: self.phone,
            email: self.email,
            open_hours: self
                .open_hours
                .map(|hours| hours.map(hours_to_json).transpose())
                .transpose()?,
        })
    }
}

/// Distinct pharmacy ids referenced by `medicines`, in first-seen order,
/// compared by canonical string form.
pub fn unique_pharmacy_ids(medicines: &[medicine::Model]) -> Result<Vec<Uuid>, AppError> {
    let mut seen = HashSet::new();
    let canonical: Vec<String> = medicines
        .iter()
        .filter_map(|medicine| medicine.pharmacy_id.as_ref())
        .map(canonical_id)
        .filter(|id| seen.insert(id.clone()))
        .collect();

    canonical
        .iter()
        .map(|raw| {
            parse_canonical_id(raw)
                .map_err(|err| AppError::internal_with("Invalid pharmacy identifier", err))
        })
        .collect()
}

#[derive(Clone)]
pub struct PharmacyService {
    pharmacy_dao: PharmacyDao,
    medicine_dao: MedicineDao,
    users: UserService,
}

impl PharmacyService {
    pub fn new(pharmacy_dao: PharmacyDao, medicine_dao: MedicineDao, users: UserService) -> Self {
        Self {
            pharmacy_dao,
            medicine_dao,
            users,
        }
    }

    pub async fn list_all(&self) -> Result<Vec<pharmacy::Model>, AppError> {
        Ok(self.pharmacy_dao.list_all().await?)
    }

    /// Pharmacies stocking a medicine whose name contains `fragment`, each at
    /// most once. A blank fragment lists every pharmacy.
    pub async fn find_by_medicine_name(&self, fragment: &str) -> Result<Vec<pharmacy::Model>, AppError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return self.list_all().await;
        }

        let medicines = self.medicine_dao.find_stocked_by_name(fragment).await?;
        let pharmacy_ids = unique_pharmacy_ids(&medicines)?;
        tracing::debug!(
            fragment,
            medicines = medicines.len(),
            pharmacies = pharmacy_ids.len(),
            "medicine search resolved"
        );

        Ok(self.pharmacy_dao.find_by_ids(&pharmacy_ids).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<pharmacy::Model, AppError> {
        self.pharmacy_dao
            .find_optional(id)
            .await?
            .ok_or_else(|| AppError::not_found("Pharmacy not found"))
    }

    pub async fn create(&self, input: NewPharmacyInput) -> Result<pharmacy::Model, AppError> {
        let (Some(name), Some(address), Some(latitude), Some(longitude)) =
            (input.name, input.address, input.latitude, input.longitude)
        else {
            return Err(AppError::validation(
                "Name, address, and coordinates are required",
            ));
        };

        let created = self
            .pharmacy_dao
            .create_pharmacy(NewPharmacy {
                name: required_text("name", name)?,
                address: required_text("address", address)?,
                latitude: check_latitude(latitude)?,
                longitude: check_longitude(longitude)?,
                phone: input.phone,
                email: input.email,
                open_hours: input.open_hours.map(hours_to_json).transpose()?,
            })
            .await?;
        tracing::info!(pharmacy_id = %created.id, "pharmacy created");
        Ok(created)
    }

    /// Only the user whose `pharmacy_id` is `pharmacy_id` may update it.
    pub async fn update_pharmacy(
        &self,
        actor: Option<&Identity>,
        pharmacy_id: Uuid,
        patch: PharmacyPatch,
    ) -> Result<pharmacy::Model, AppError> {
        let actor = actor.ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let user = self
            .users
            .find_by_id(&actor.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        let pharmacy = self.get(pharmacy_id).await?;

        let owns = user
            .pharmacy_id
            .is_some_and(|owned| canonical_id(&owned) == canonical_id(&pharmacy.id));
        if !owns {
            tracing::debug!(
                user_id = %user.id,
                %pharmacy_id,
                "pharmacy update by non-owner"
            );
            return Err(AppError::forbidden("You can only update your own pharmacy"));
        }

        let changes = patch.into_changes()?;
        let updated = self
            .pharmacy_dao
            .update_model(pharmacy, move |active| changes.apply(active))
            .await?;
        tracing::info!(%pharmacy_id, user_id = %user.id, "pharmacy updated");
        Ok(updated)
    }
}

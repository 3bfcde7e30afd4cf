use sea_orm::DatabaseConnection;

use crate::{
    auth::CredentialService,
    db::dao::DaoContext,
    services::{
        auth_service::AuthService, medicine_service::MedicineService,
        pharmacy_service::PharmacyService, user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn pharmacy(&self) -> PharmacyService {
        PharmacyService::new(self.daos.pharmacy(), self.daos.medicine(), self.user())
    }

    pub fn medicine(&self) -> MedicineService {
        MedicineService::new(self.daos.medicine(), self.daos.pharmacy())
    }

    pub fn auth<'a>(&self, credentials: &'a CredentialService) -> AuthService<'a> {
        AuthService::new(credentials, self.user(), self.daos.pharmacy())
    }
}

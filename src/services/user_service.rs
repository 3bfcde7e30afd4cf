use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, NewUser, UserDao},
    db::entities::user,
    error::AppError,
};

#[derive(Clone)]
pub struct UserService {
    user_dao: UserDao,
}

impl UserService {
    pub fn new(user_dao: UserDao) -> Self {
        Self { user_dao }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_optional(*id).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(&normalize_email(email)).await?)
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<user::Model, AppError> {
        Ok(self.user_dao.create_user(new_user).await?)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use super::normalize_email;
    use crate::{db::entities::user, services::ServiceContext, test_helpers::user_model};

    #[test]
    fn emails_are_trimmed_and_case_folded() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_missing_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let found = ServiceContext::new(&db)
            .user()
            .find_by_id(&Uuid::new_v4())
            .await
            .expect("lookup");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_by_email_folds_case() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[user_model(id, "alice@example.com", "user", None)]])
            .into_connection();

        let found = ServiceContext::new(&db)
            .user()
            .find_by_email("ALICE@example.com")
            .await
            .expect("lookup");
        assert_eq!(found.map(|user| user.id), Some(id));
    }
}

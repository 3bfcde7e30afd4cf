use sea_orm::{DatabaseConnection, Set, Value};
use uuid::Uuid;

use super::{ColumnFilter, DaoBase, DaoResult, FilterOp};
use crate::db::entities::{pharmacy, prelude::Pharmacy};

#[derive(Clone)]
pub struct PharmacyDao {
    db: DatabaseConnection,
}

impl DaoBase for PharmacyDao {
    type Entity = Pharmacy;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewPharmacy {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub open_hours: Option<serde_json::Value>,
}

impl PharmacyDao {
    pub async fn create_pharmacy(&self, new_pharmacy: NewPharmacy) -> DaoResult<pharmacy::Model> {
        let model = pharmacy::ActiveModel {
            name: Set(new_pharmacy.name),
            address: Set(new_pharmacy.address),
            latitude: Set(new_pharmacy.latitude),
            longitude: Set(new_pharmacy.longitude),
            phone: Set(new_pharmacy.phone),
            email: Set(new_pharmacy.email),
            is_verified: Set(false),
            open_hours: Set(new_pharmacy.open_hours),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list_all(&self) -> DaoResult<Vec<pharmacy::Model>> {
        self.find_all(&[]).await
    }

    /// An empty id set short-circuits without a query.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> DaoResult<Vec<pharmacy::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let values = ids.iter().copied().map(Value::from).collect();
        self.find_all(&[ColumnFilter::new(
            pharmacy::Column::Id,
            FilterOp::In(values),
        )])
        .await
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use super::{NewPharmacy, PharmacyDao};
    use crate::db::dao::{DaoBase, DaoLayerError};
    use crate::db::entities::pharmacy;
    use crate::test_helpers::pharmacy_model;

    #[tokio::test]
    async fn find_by_ids_skips_the_store_for_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let dao = PharmacyDao::new(&db);

        let found = dao.find_by_ids(&[]).await.expect("no query needed");
        assert!(found.is_empty());
        assert!(db.into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn find_by_ids_returns_matching_rows() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pharmacy_model(first, "Central"), pharmacy_model(second, "North")]])
            .into_connection();
        let dao = PharmacyDao::new(&db);

        let found = dao
            .find_by_ids(&[first, second])
            .await
            .expect("query should succeed");
        let ids: Vec<Uuid> = found.into_iter().map(|pharmacy| pharmacy.id).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn create_pharmacy_starts_unverified() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[pharmacy_model(id, "Central")]])
            .into_connection();
        let dao = PharmacyDao::new(&db);

        let created = dao
            .create_pharmacy(NewPharmacy {
                name: "Central".to_string(),
                address: "1 Main St".to_string(),
                ..NewPharmacy::default()
            })
            .await
            .expect("insert should succeed");
        assert_eq!(created.id, id);
        assert!(!created.is_verified);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let missing = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = PharmacyDao::new(&db);

        let err = dao.delete(missing).await.expect_err("nothing to delete");
        assert!(matches!(err, DaoLayerError::NotFound { id, .. } if id == missing));
    }

    #[tokio::test]
    async fn list_all_reads_every_row_in_one_ordered_query() {
        let rows: Vec<pharmacy::Model> = (0..=PharmacyDao::MAX_PAGE_SIZE)
            .map(|i| pharmacy_model(Uuid::new_v4(), &format!("P{i}")))
            .collect();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([rows])
            .into_connection();
        let dao = PharmacyDao::new(&db);

        let all = dao.list_all().await.expect("query should succeed");
        assert_eq!(all.len() as u64, PharmacyDao::MAX_PAGE_SIZE + 1);

        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
        let sql = format!("{:?}", log[0]);
        assert!(sql.contains("ORDER BY"), "sql: {sql}");
        assert!(sql.contains("\\\"id\\\" ASC"), "sql: {sql}");
        assert!(!sql.contains("LIMIT"), "sql: {sql}");
        assert!(!sql.contains("OFFSET"), "sql: {sql}");
    }
}

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use medtrack_server::{
    routes::API_PREFIX,
    test_helpers::{access_token_for, medicine_model, pharmacy_model, test_app, user_model},
};

fn api_path(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn json_request(method: &str, uri: &str, token: Option<&str>, payload: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let res = test_app(db).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let req = Request::builder()
        .uri(api_path("/nope"))
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn search_deduplicates_pharmacies() {
    let central = Uuid::new_v4();
    let north = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![
            medicine_model(Uuid::new_v4(), "Paracetamol", Some(central)),
            medicine_model(Uuid::new_v4(), "paracetamol forte", Some(central)),
            medicine_model(Uuid::new_v4(), "PARACETAMOL", Some(north)),
        ]])
        .append_query_results([vec![
            pharmacy_model(central, "Central"),
            pharmacy_model(north, "North"),
        ]])
        .into_connection();
    let req = Request::builder()
        .uri(api_path("/pharmacies?medicineName=para"))
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::OK);
    let pharmacies = json["data"].as_array().unwrap();
    assert_eq!(pharmacies.len(), 2);
    assert_eq!(pharmacies[0]["isVerified"], false);
}

#[tokio::test]
async fn malformed_pharmacy_id_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let req = Request::builder()
        .uri(api_path("/pharmacies/not-a-uuid"))
        .body(Body::empty())
        .unwrap();

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["message"], "Pharmacy not found");
}

#[tokio::test]
async fn create_pharmacy_without_token_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let req = json_request("POST", &api_path("/pharmacies"), None, json!({"name": "Central"}));

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["message"], "No token provided");
}

#[tokio::test]
async fn create_pharmacy_as_plain_user_is_forbidden() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(user_id, "u@example.com", "user", None)]])
        .into_connection();
    let token = access_token_for(user_id, "u@example.com", "user");
    let req = json_request(
        "POST",
        &api_path("/pharmacies"),
        Some(&token),
        json!({"name": "Central", "address": "1 Main St", "latitude": 1.0, "longitude": 2.0}),
    );

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["message"], "Insufficient permissions");
}

#[tokio::test]
async fn create_pharmacy_as_pharmacist_succeeds() {
    let user_id = Uuid::new_v4();
    let pharmacy_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[user_model(user_id, "p@example.com", "pharmacist", None)]])
        .append_query_results([[pharmacy_model(pharmacy_id, "Central")]])
        .into_connection();
    let token = access_token_for(user_id, "p@example.com", "pharmacist");
    let req = json_request(
        "POST",
        &api_path("/pharmacies"),
        Some(&token),
        json!({"name": "Central", "address": "1 Main St", "latitude": 1.0, "longitude": 2.0}),
    );

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["id"], pharmacy_id.to_string());
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let user_id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<medtrack_server::db::entities::user::Model>::new()])
        .into_connection();
    let token = access_token_for(user_id, "gone@example.com", "pharmacist");
    let req = json_request(
        "PUT",
        &api_path(&format!("/pharmacies/{}", Uuid::new_v4())),
        Some(&token),
        json!({"name": "Renamed"}),
    );

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["message"], "Invalid token");
}

#[tokio::test]
async fn update_other_pharmacy_is_forbidden() {
    let user_id = Uuid::new_v4();
    let owned = Uuid::new_v4();
    let target = Uuid::new_v4();
    let owner = user_model(user_id, "p@example.com", "pharmacist", Some(owned));
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[owner.clone()]])
        .append_query_results([[owner]])
        .append_query_results([[pharmacy_model(target, "Other")]])
        .into_connection();
    let token = access_token_for(user_id, "p@example.com", "pharmacist");
    let req = json_request(
        "PUT",
        &api_path(&format!("/pharmacies/{target}")),
        Some(&token),
        json!({"name": "Mine now"}),
    );

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["message"], "You can only update your own pharmacy");
}

#[tokio::test]
async fn owner_updates_own_pharmacy() {
    let user_id = Uuid::new_v4();
    let owned = Uuid::new_v4();
    let owner = user_model(user_id, "p@example.com", "pharmacist", Some(owned));
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[owner.clone()]])
        .append_query_results([[owner]])
        .append_query_results([[pharmacy_model(owned, "Central")]])
        .append_query_results([[pharmacy_model(owned, "Renamed")]])
        .into_connection();
    let token = access_token_for(user_id, "p@example.com", "pharmacist");
    let req = json_request(
        "PUT",
        &api_path(&format!("/pharmacies/{owned}")),
        Some(&token),
        json!({"name": "Renamed"}),
    );

    let (status, json) = send(test_app(db), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Renamed");
}

use std::{env, sync::Arc};

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use student_registry::{
    api,
    metrics::RequestMetrics,
    store::{MongoStudentStore, StoreError, StudentStore},
    students::{NewStudent, decode_id},
};
use tower::ServiceExt;

const TEST_DB: &str = "college";
const TEST_COLLECTION: &str = "students_it";

async fn connect() -> MongoStudentStore {
    let url = env::var("MONGODB_URL").unwrap_or_else(|_| "mongodb://localhost:27017/".into());
    let store = MongoStudentStore::connect(&url, TEST_DB, TEST_COLLECTION)
        .await
        .expect("MongoDB client");
    store.ping().await.expect("MongoDB should answer ping");
    store
}

#[tokio::test]
#[ignore = "Requires live MongoDB"]
async fn live_insert_then_find() {
    let store = connect().await;
    let student = NewStudent {
        name: "Jane Doe".into(),
        email: "jdoe@example.com".into(),
        course: "Experiments, Science, and Fashion in Nanophotonics".into(),
        gpa: 3.0,
    };

    let id = store.insert(&student).await.expect("insert");
    let stored = store.find_by_id(id).await.expect("read back");

    assert_eq!(stored.id, id);
    assert_eq!(stored.name, student.name);
    assert_eq!(stored.gpa, student.gpa);
}

#[tokio::test]
#[ignore = "Requires live MongoDB"]
async fn live_unknown_id_is_not_found() {
    let store = connect().await;
    let id = decode_id("000000000000000000000000").expect("valid id");

    let error = store.find_by_id(id).await.unwrap_err();
    assert!(matches!(error, StoreError::NotFound(_)));
}

#[tokio::test]
#[ignore = "Requires live MongoDB"]
async fn live_create_student_endpoint() {
    let store = Arc::new(connect().await);
    let app = api::create_router(store, Arc::new(RequestMetrics::new()));
    let payload = json!({
        "name": "Jane Doe",
        "email": "jdoe@example.com",
        "course": "Nanophotonics",
        "gpa": 3.0
    });

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/student")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["name"], "Jane Doe");
    assert!(decode_id(body["id"].as_str().expect("id")).is_ok());
}

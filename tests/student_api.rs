use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use regex::Regex;
use serde_json::{Value, json};
use student_registry::{
    api,
    metrics::RequestMetrics,
    store::{MemoryStudentStore, StudentStore},
    students::decode_id,
};
use tower::ServiceExt;

struct TestHarness {
    app: Router,
    store: Arc<MemoryStudentStore>,
    metrics: Arc<RequestMetrics>,
}

impl TestHarness {
    fn new() -> Self {
        let store = Arc::new(MemoryStudentStore::new());
        let metrics = Arc::new(RequestMetrics::new());
        let app = api::create_router(store.clone(), metrics.clone());
        Self {
            app,
            store,
            metrics,
        }
    }

    async fn post_student(&self, payload: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/student")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request");
        self.call(request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        self.call(request).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }
}

fn student(course: &str, gpa: f64) -> Value {
    json!({
        "name": "Jane Doe",
        "email": "jdoe@example.com",
        "course": course,
        "gpa": gpa
    })
}

#[tokio::test]
async fn create_student_round_trips_through_the_store() {
    let harness = TestHarness::new();
    let id_pattern = Regex::new(r"^[0-9a-f]{24}$").unwrap();

    let (status, body) = harness
        .post_student(student("Nanophotonics", 3.0))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["gpa"], json!(3.0));
    assert_eq!(body["course"], "Nanophotonics");
    let id = body["id"].as_str().expect("id string");
    assert!(id_pattern.is_match(id), "unexpected id format: {id}");

    let stored = harness
        .store
        .find_by_id(decode_id(id).expect("valid id"))
        .await
        .expect("document persisted");
    assert_eq!(stored.name, "Jane Doe");
    assert_eq!(stored.email, "jdoe@example.com");
}

#[tokio::test]
async fn invalid_students_are_never_persisted() {
    let harness = TestHarness::new();
    let invalid = [
        student("X", 4.5),
        json!({ "email": "jdoe@example.com", "course": "X", "gpa": 3.0 }),
        json!({ "name": "Jane Doe", "course": "X", "gpa": 3.0 }),
        json!({ "name": "Jane Doe", "email": "jdoe@example.com", "gpa": 3.0 }),
        json!({ "name": "Jane Doe", "email": "jdoe.example.com", "course": "X", "gpa": 3.0 }),
    ];

    for payload in invalid {
        let (status, body) = harness.post_student(payload.clone()).await;
        assert_eq!(
            status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "payload accepted: {payload}"
        );
        assert!(body["detail"].as_array().is_some_and(|d| !d.is_empty()));
    }

    assert!(harness.store.is_empty().await);
    assert_eq!(harness.metrics.snapshot().student_create_requests, 5);
}

#[tokio::test]
async fn fixed_endpoints_ignore_call_order() {
    let harness = TestHarness::new();

    for _ in 0..2 {
        assert_eq!(
            harness.get("/").await,
            (StatusCode::OK, json!({ "msg": "Hello World" }))
        );
        assert_eq!(
            harness.get("/health").await,
            (StatusCode::OK, json!({ "health": "ok" }))
        );
    }
    harness.post_student(student("Optics", 2.0)).await;

    let snapshot = harness.metrics.snapshot();
    assert_eq!(snapshot.main_requests, 2);
    assert_eq!(snapshot.healthcheck_requests, 2);
    assert_eq!(snapshot.student_create_requests, 1);
    assert_eq!(snapshot.requests, 5);
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let harness = Arc::new(TestHarness::new());

    let tasks: Vec<_> = (0..16)
        .map(|index| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move {
                harness
                    .post_student(student(&format!("Course {index}"), 3.5))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        let (status, body) = task.await.expect("task");
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["id"].as_str().expect("id").to_string());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 16);
    assert_eq!(harness.store.len().await, 16);
    assert_eq!(harness.metrics.snapshot().student_create_requests, 16);
}

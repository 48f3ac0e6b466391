use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use customer_api::{app, model::Customer, AppState, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

const BODY_LIMIT: usize = 64 * 1024;

fn customer(id: &str, grade: i32) -> Customer {
    Customer {
        id: id.to_string(),
        name: format!("name {id}"),
        grade,
        city: "Bangalore".to_string(),
        phone: "BBBBBBB".to_string(),
    }
}

fn router(store: &MemoryStore) -> Router {
    app(AppState::new(store.clone()), BODY_LIMIT)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not json")
    };
    (status, value)
}

#[tokio::test]
async fn create_read_patch_delete_round_trip() {
    let store = MemoryStore::new();
    let app = router(&store);

    let (status, body) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"id": "C00001", "name": "A", "grade": 3, "city": "X", "phone": "555"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"affected_rows": 1, "id": "C00001"}));

    let (status, body) = send(&app, "GET", "/customers/C00001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": "C00001", "name": "A", "grade": 3, "city": "X", "phone": "555"}])
    );

    let (status, body) = send(&app, "PATCH", "/customers/C00001", Some(json!({"grade": 5}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"affected_rows": 1}));

    let (_, body) = send(&app, "GET", "/customers/C00001", None).await;
    assert_eq!(
        body,
        json!([{"id": "C00001", "name": "A", "grade": 5, "city": "X", "phone": "555"}])
    );

    let (status, body) = send(&app, "DELETE", "/customers/C00001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"affected_rows": 1}));

    let (status, body) = send(&app, "GET", "/customers/C00001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn create_twice_rejects_the_second() {
    let store = MemoryStore::new();
    let app = router(&store);
    let body = json!({"id": "C00002", "name": "A", "grade": 1, "city": "X", "phone": "555"});

    let (status, _) = send(&app, "POST", "/customers", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let other = json!({"id": "C00002", "name": "B", "grade": 2, "city": "Y", "phone": "666"});
    let (status, body) = send(&app, "POST", "/customers", Some(other)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "conflict");
    assert!(body["error"]["message"].as_str().unwrap().contains("already exists"));

    assert_eq!(store.customer_count().await, 1);
    assert_eq!(store.customer("C00002").await.unwrap().name, "A");
    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn create_rejects_incomplete_bodies_without_touching_the_store() {
    let store = MemoryStore::new();
    let app = router(&store);
    let bodies = [
        json!({"name": "A", "grade": 3, "city": "X", "phone": "555"}),
        json!({"id": "C00001", "grade": 3, "city": "X", "phone": "555"}),
        json!({"id": "C00001", "name": "", "grade": 3, "city": "X", "phone": "555"}),
        json!({"id": "C00001", "name": "A", "city": "X", "phone": "555"}),
        json!({"id": "C00001", "name": "A", "grade": 3, "phone": "555"}),
        json!({"id": "C00001", "name": "A", "grade": 3, "city": "X"}),
        json!({"id": "C0001", "name": "A", "grade": 3, "city": "X", "phone": "555"}),
        json!({"id": "C00001", "name": "A", "grade": "3", "city": "X", "phone": "555"}),
        json!({"id": "C00001", "name": "A", "grade": 3.5, "city": "X", "phone": "555"}),
        json!([1, 2, 3]),
    ];
    for body in bodies {
        let (status, resp) = send(&app, "POST", "/customers", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(resp["error"]["code"].is_string());
    }
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn create_accepts_grade_outside_filter_range() {
    let store = MemoryStore::new();
    let app = router(&store);
    let (status, _) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({"id": "C00009", "name": "A", "grade": 0, "city": "X", "phone": "555"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.customer("C00009").await.unwrap().grade, 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let store = MemoryStore::new();
    let app = router(&store);
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customers")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not-json"))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customers")
                .body(Body::from(r#"{"id":"C00001"}"#))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn id_length_is_checked_before_any_store_call() {
    let store = MemoryStore::with_rows(vec![customer("C00001", 3)], vec![], vec![]);
    let app = router(&store);
    let patch = Some(json!({"name": "B"}));
    let full = Some(json!({"name": "B", "grade": 2, "city": "Y", "phone": "1"}));

    for id in ["C0001", "C000001", "X"] {
        let uri = format!("/customers/{id}");
        assert_eq!(send(&app, "GET", &uri, None).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(send(&app, "DELETE", &uri, None).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(send(&app, "PATCH", &uri, patch.clone()).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(send(&app, "PUT", &uri, full.clone()).await.0, StatusCode::BAD_REQUEST);
    }
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn unknown_code_reads_as_empty_array() {
    let store = MemoryStore::new();
    let app = router(&store);
    let (status, body) = send(&app, "GET", "/customers/ZZZZZZ", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn grade_filter_validates_and_filters() {
    let store = MemoryStore::with_rows(
        vec![customer("C00001", 2), customer("C00002", 3), customer("C00003", 2)],
        vec![],
        vec![],
    );
    let app = router(&store);

    for bad in ["0", "6", "-1", "abc", "2.5"] {
        let (status, body) = send(&app, "GET", &format!("/customers/grade/{bad}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
        assert_eq!(body["error"]["code"], "validation_error");
    }
    assert_eq!(store.acquisitions(), 0);

    let (status, body) = send(&app, "GET", "/customers/grade/2", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["C00001", "C00003"]);

    let (_, body) = send(&app, "GET", "/customers/grade/5", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_customers_returns_all_rows_in_code_order() {
    let store = MemoryStore::with_rows(vec![customer("C00002", 1), customer("C00001", 4)], vec![], vec![]);
    let app = router(&store);
    let (status, body) = send(&app, "GET", "/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["id"], "C00001");
    assert_eq!(body[1]["grade"], 1);
}

#[tokio::test]
async fn delete_is_not_idempotent() {
    let store = MemoryStore::with_rows(vec![customer("C00001", 3)], vec![], vec![]);
    let app = router(&store);

    let (status, body) = send(&app, "DELETE", "/customers/C00002", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("does not exist"));

    let (status, _) = send(&app, "DELETE", "/customers/C00001", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", "/customers/C00001", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(store.open_sessions(), 0);
}

#[tokio::test]
async fn replace_requires_every_field_and_valid_grade() {
    let store = MemoryStore::with_rows(vec![customer("C00001", 3)], vec![], vec![]);
    let app = router(&store);
    let before = store.customer("C00001").await.unwrap();

    let bodies = [
        json!({"grade": 2, "city": "Y", "phone": "1"}),
        json!({"name": "B", "city": "Y", "phone": "1"}),
        json!({"name": "B", "grade": 2, "phone": "1"}),
        json!({"name": "B", "grade": 2, "city": "Y"}),
        json!({"name": "B", "grade": 0, "city": "Y", "phone": "1"}),
        json!({"name": "B", "grade": 6, "city": "Y", "phone": "1"}),
    ];
    for body in bodies {
        let (status, _) = send(&app, "PUT", "/customers/C00001", Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert_eq!(store.customer("C00001").await.unwrap(), before);
    assert_eq!(store.acquisitions(), 0);

    let (status, body) = send(
        &app,
        "PUT",
        "/customers/C00001",
        Some(json!({"name": "B", "grade": 2, "city": "Y", "phone": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"affected_rows": 1}));
    let after = store.customer("C00001").await.unwrap();
    assert_eq!(
        after,
        Customer {
            id: "C00001".into(),
            name: "B".into(),
            grade: 2,
            city: "Y".into(),
            phone: "1".into(),
        }
    );
}

#[tokio::test]
async fn replace_of_missing_customer_is_a_bad_request() {
    let store = MemoryStore::new();
    let app = router(&store);
    let (status, body) = send(
        &app,
        "PUT",
        "/customers/C00001",
        Some(json!({"name": "B", "grade": 2, "city": "Y", "phone": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(store.customer_count().await, 0);
}

#[tokio::test]
async fn empty_patch_is_rejected_whether_or_not_the_customer_exists() {
    let store = MemoryStore::with_rows(vec![customer("C00001", 3)], vec![], vec![]);
    let app = router(&store);

    for id in ["C00001", "C00002"] {
        let (status, body) = send(&app, "PATCH", &format!("/customers/{id}"), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("no fields to update"));

        let (status, _) = send(&app, "PATCH", &format!("/customers/{id}"), Some(json!({"name": null}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(store.acquisitions(), 0);
    assert_eq!(store.customer("C00001").await.unwrap(), customer("C00001", 3));
}

#[tokio::test]
async fn patch_touches_only_supplied_fields() {
    let store = MemoryStore::with_rows(vec![customer("C00001", 3)], vec![], vec![]);
    let app = router(&store);

    let (status, _) = send(
        &app,
        "PATCH",
        "/customers/C00001",
        Some(json!({"city": "Chennai", "phone": "999"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let after = store.customer("C00001").await.unwrap();
    assert_eq!(after.city, "Chennai");
    assert_eq!(after.phone, "999");
    assert_eq!(after.name, "name C00001");
    assert_eq!(after.grade, 3);

    let (status, body) = send(&app, "PATCH", "/customers/C00404", Some(json!({"grade": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn store_failure_is_a_server_error_and_releases_the_session() {
    let store = MemoryStore::with_rows(vec![customer("C00001", 3)], vec![], vec![]);
    let app = router(&store);
    store.set_failing(true);

    let (status, body) = send(&app, "GET", "/customers", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "database_error");

    let (status, _) = send(&app, "PATCH", "/customers/C00001", Some(json!({"grade": 1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(&app, "GET", "/agents", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(store.acquisitions(), 3);
    assert_eq!(store.open_sessions(), 0);

    store.set_failing(false);
    assert_eq!(store.customer("C00001").await.unwrap().grade, 3);
}

#[tokio::test]
async fn agents_and_orders_are_listed_as_opaque_rows() {
    let agents = vec![json!({"agent_code": "A001", "agent_name": "Ramasundar", "commission": 0.15})];
    let orders = vec![
        json!({"ord_num": 200100, "ord_amount": 1000.0, "cust_code": "C00001"}),
        json!({"ord_num": 200101, "ord_amount": 3000.0, "cust_code": "C00002"}),
    ];
    let store = MemoryStore::with_rows(vec![], agents.clone(), orders.clone());
    let app = router(&store);

    let (status, body) = send(&app, "GET", "/agents", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(agents));

    let (status, body) = send(&app, "GET", "/orders", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(orders));
}

#[tokio::test]
async fn json_responses_declare_content_type() {
    let store = MemoryStore::new();
    let app = router(&store);
    for uri in ["/customers", "/customers/C00001", "/customers/C01", "/agents"] {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("failed to build request"))
            .await
            .expect("request failed");
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).map(|v| v.to_str().unwrap()),
            Some("application/json"),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn ready_reports_store_reachability() {
    let store = MemoryStore::new();
    let app = router(&store);

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "database": "ok"}));

    store.set_failing(true);
    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"status": "degraded", "database": "unavailable"}));
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn health_and_version_answer_without_the_store() {
    let store = MemoryStore::new();
    store.set_failing(true);
    let app = router(&store);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());

    let (status, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "customer-api");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn oversized_body_without_length_header_is_payload_too_large() {
    let store = MemoryStore::new();
    let app = router(&store);
    let body = json!({
        "id": "C00001",
        "name": "x".repeat(BODY_LIMIT + 1),
        "grade": 3,
        "city": "X",
        "phone": "555"
    });

    let req = Request::builder()
        .method("POST")
        .uri("/customers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request");
    assert!(req.headers().get(header::CONTENT_LENGTH).is_none());
    let resp = app.oneshot(req).await.expect("request failed");

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.acquisitions(), 0);
}

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use petstore_core::db::open_db_in_memory;
use petstore_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

fn app() -> Router {
    let conn = open_db_in_memory().unwrap();
    build_router(&ServerConfig::default(), AppState::new(conn)).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    reply(app, request).await
}

async fn reply(app: &Router, request: Request<Body>) -> Reply {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|pet| pet["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn rex_scenario_end_to_end() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Rex", "species": "Dog", "price": 150.0})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let pet = created.json();
    let id = pet["id"].as_i64().unwrap();
    assert!(id >= 1);
    assert_eq!(pet["name"], "Rex");
    assert_eq!(pet["price"], 150.0);

    let fetched = send(&app, Method::GET, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), pet);

    let by_keyword = send(&app, Method::GET, "/martin/pets/search/rex", None).await;
    assert_eq!(by_keyword.status, StatusCode::OK);
    assert_eq!(ids(&by_keyword.json()), vec![id]);

    let by_price = send(&app, Method::GET, "/martin/pets/search/price/100", None).await;
    assert_eq!(by_price.status, StatusCode::OK);
    assert!(!ids(&by_price.json()).contains(&id));

    let deleted = send(&app, Method::DELETE, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.text(), format!("Pet with id {{{id}}} deleted."));

    let gone = send(&app, Method::GET, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert!(gone.body.is_empty());
}

#[tokio::test]
async fn create_ignores_client_supplied_id() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"id": 999, "name": "Tom"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_ne!(created.json()["id"], 999);
    assert_eq!(created.json()["price"], 0.0);
}

#[tokio::test]
async fn bulk_create_returns_records_in_order() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/martin/pets/bulk",
        Some(json!([
            {"name": "One", "price": 1.0},
            {"name": "Two", "price": 2.0},
            {"name": "Three", "price": 3.0}
        ])),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let pets = created.json();
    let names: Vec<_> = pets
        .as_array()
        .unwrap()
        .iter()
        .map(|pet| pet["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["One", "Two", "Three"]);

    let pet_ids = ids(&pets);
    assert!(pet_ids.windows(2).all(|pair| pair[0] < pair[1]));

    let listed = send(&app, Method::GET, "/martin/pets", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(ids(&listed.json()), pet_ids);
}

#[tokio::test]
async fn malformed_bulk_body_stores_nothing() {
    let app = app();

    let rejected = send(
        &app,
        Method::POST,
        "/martin/pets/bulk",
        Some(json!([{"name": "Fine"}, {"name": "Broken", "price": "cheap"}])),
    )
    .await;
    assert!(rejected.status.is_client_error());

    let listed = send(&app, Method::GET, "/martin/pets", None).await;
    assert_eq!(listed.json(), json!([]));
}

#[tokio::test]
async fn list_starts_empty() {
    let app = app();

    let listed = send(&app, Method::GET, "/martin/pets", None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.json(), json!([]));
}

#[tokio::test]
async fn update_forces_path_id_and_replaces_all_fields() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Rex", "species": "Dog", "breed": "Lab", "price": 150.0})),
    )
    .await
    .json();
    let id = created["id"].as_i64().unwrap();

    let updated = send(
        &app,
        Method::PUT,
        &format!("/martin/pets/{id}"),
        Some(json!({"id": id + 100, "name": "Rexy", "price": 175.5})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    let body = updated.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Rexy");
    assert!(body["species"].is_null());
    assert!(body["breed"].is_null());

    let fetched = send(&app, Method::GET, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(fetched.json(), body);
}

#[tokio::test]
async fn update_and_delete_missing_id_return_structured_404() {
    let app = app();

    let updated = send(
        &app,
        Method::PUT,
        "/martin/pets/41",
        Some(json!({"name": "Nobody"})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::NOT_FOUND);
    assert_eq!(updated.json(), json!({"error": "Pet not found"}));
    assert_eq!(
        updated.headers[header::CONTENT_TYPE],
        "application/json"
    );

    let deleted = send(&app, Method::DELETE, "/martin/pets/41", None).await;
    assert_eq!(deleted.status, StatusCode::NOT_FOUND);
    assert_eq!(deleted.json(), json!({"error": "Pet not found"}));

    // Update on a missing id must not create the record.
    let listed = send(&app, Method::GET, "/martin/pets", None).await;
    assert_eq!(listed.json(), json!([]));
}

#[tokio::test]
async fn second_delete_returns_404() {
    let app = app();

    let id = send(&app, Method::POST, "/martin/pets", Some(json!({"name": "Once"})))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let first = send(&app, Method::DELETE, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(first.status, StatusCode::OK);
    let second = send(&app, Method::DELETE, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn price_search_is_inclusive_and_rejects_bad_numbers() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/martin/pets/bulk",
        Some(json!([{"name": "Cheap", "price": 50.0}, {"name": "Exact", "price": 100.0}])),
    )
    .await;

    let hits = send(&app, Method::GET, "/martin/pets/search/price/100", None).await;
    assert_eq!(hits.json().as_array().unwrap().len(), 2);

    let decimal = send(&app, Method::GET, "/martin/pets/search/price/99.5", None).await;
    assert_eq!(decimal.json().as_array().unwrap().len(), 1);

    let not_a_number = send(&app, Method::GET, "/martin/pets/search/price/cheap", None).await;
    assert_eq!(not_a_number.status, StatusCode::BAD_REQUEST);
    assert!(not_a_number.json()["error"].is_string());

    let non_finite = send(&app, Method::GET, "/martin/pets/search/price/NaN", None).await;
    assert_eq!(non_finite.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn infinite_price_ceiling_is_rejected() {
    let app = app();
    send(&app, Method::POST, "/martin/pets", Some(json!({"name": "Any", "price": 1.0}))).await;

    for ceiling in ["Infinity", "inf", "-inf"] {
        let response = send(
            &app,
            Method::GET,
            &format!("/martin/pets/search/price/{ceiling}"),
            None,
        )
        .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "ceiling {ceiling}");
        assert!(response.json()["error"].is_string());
    }
}

#[tokio::test]
async fn form_style_prices_are_accepted_on_every_write() {
    let app = app();

    let created = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Rex", "price": "150"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.json()["price"], 150.0);
    let id = created.json()["id"].as_i64().unwrap();

    let blank = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Blank", "price": ""})),
    )
    .await;
    assert_eq!(blank.status, StatusCode::CREATED);
    assert_eq!(blank.json()["price"], 0.0);

    let null = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Null", "price": null})),
    )
    .await;
    assert_eq!(null.status, StatusCode::CREATED);
    assert_eq!(null.json()["price"], 0.0);

    let bulk = send(
        &app,
        Method::POST,
        "/martin/pets/bulk",
        Some(json!([{"name": "A", "price": "12.5"}, {"name": "B", "price": 7}])),
    )
    .await;
    assert_eq!(bulk.status, StatusCode::CREATED);
    assert_eq!(bulk.json()[0]["price"], 12.5);
    assert_eq!(bulk.json()[1]["price"], 7.0);

    let updated = send(
        &app,
        Method::PUT,
        &format!("/martin/pets/{id}"),
        Some(json!({"name": "Rex", "price": "175.5"})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["price"], 175.5);

    let cheap = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Cheap", "price": "cheap"})),
    )
    .await;
    assert!(cheap.status.is_client_error());
    assert!(cheap.json()["error"].is_string());

    let nan = send(
        &app,
        Method::POST,
        "/martin/pets",
        Some(json!({"name": "Nan", "price": "NaN"})),
    )
    .await;
    assert_eq!(nan.status, StatusCode::BAD_REQUEST);

    let listed = send(&app, Method::GET, "/martin/pets", None).await;
    assert_eq!(listed.json().as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn keyword_search_is_case_insensitive_across_fields() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/martin/pets/bulk",
        Some(json!([
            {"name": "Rex", "species": "Dog", "description": "Good boy"},
            {"name": "Kitty", "species": "Cat", "breed": "Persian"}
        ])),
    )
    .await;

    let dogs = send(&app, Method::GET, "/martin/pets/search/DOG", None).await;
    assert_eq!(dogs.json().as_array().unwrap().len(), 1);
    assert_eq!(dogs.json()[0]["name"], "Rex");

    let persian = send(&app, Method::GET, "/martin/pets/search/pers", None).await;
    assert_eq!(persian.json()[0]["name"], "Kitty");

    let spaced = send(&app, Method::GET, "/martin/pets/search/good%20boy", None).await;
    assert_eq!(spaced.json()[0]["name"], "Rex");

    let none = send(&app, Method::GET, "/martin/pets/search/parrot", None).await;
    assert_eq!(none.status, StatusCode::OK);
    assert_eq!(none.json(), json!([]));
}

#[tokio::test]
async fn malformed_input_is_a_client_error() {
    let app = app();

    let bad_id = send(&app, Method::GET, "/martin/pets/abc", None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/martin/pets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let bad_body = reply(&app, request).await;
    assert!(bad_body.status.is_client_error());
    assert!(bad_body.json()["error"].is_string());

    let wrong_type = send(
        &app,
        Method::PUT,
        "/martin/pets/1",
        Some(json!({"price": "free"})),
    )
    .await;
    assert!(wrong_type.status.is_client_error());
}

#[tokio::test]
async fn health_reports_version() {
    let app = app();

    let health = send(&app, Method::GET, "/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["status"], "ok");
    assert!(health.json()["version"].is_string());
}

#[tokio::test]
async fn cors_allows_only_the_configured_origin() {
    let app = app();

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/martin/pets")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let allowed = reply(&app, preflight).await;
    assert_eq!(
        allowed.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );

    let foreign = Request::builder()
        .method(Method::GET)
        .uri("/martin/pets")
        .header(header::ORIGIN, "http://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let denied = reply(&app, foreign).await;
    assert!(denied
        .headers
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn records_persist_across_app_instances_on_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pets.db");

    let first = build_router(
        &ServerConfig::default(),
        AppState::new(petstore_core::db::open_db(&path).unwrap()),
    )
    .unwrap();
    let id = send(&first, Method::POST, "/martin/pets", Some(json!({"name": "Keeper"})))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();
    drop(first);

    let second = build_router(
        &ServerConfig::default(),
        AppState::new(petstore_core::db::open_db(&path).unwrap()),
    )
    .unwrap();
    let fetched = send(&second, Method::GET, &format!("/martin/pets/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["name"], "Keeper");
}

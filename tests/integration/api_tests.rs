//! API integration tests

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use equipment_registry::{
    api::create_router,
    config::AppConfig,
    models::{CreateEquipmentType, EquipmentType, UserClaims},
    repository::Repository,
    services::Services,
    AppState,
};

const MASK: &str = "XXAAAAAXAA";

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    fn with_config(config: AppConfig) -> Self {
        let services = Services::new(Repository::in_memory(), config.auth.clone());
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    fn token(&self, is_admin: bool) -> String {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: if is_admin { "admin" } else { "test_user" }.to_string(),
            user_id: 1,
            is_admin,
            exp: now + 3600,
            iat: now,
        }
        .create_token(&self.state.config.auth.jwt_secret)
        .expect("Failed to create token")
    }

    async fn equipment_type(&self, name: &str, mask: &str) -> EquipmentType {
        self.state
            .services
            .equipment_types
            .create(&CreateEquipmentType {
                name: name.to_string(),
                serial_number_mask: mask.to_string(),
            })
            .await
            .expect("Failed to create equipment type")
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/api/v1{}", uri));
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Failed to parse response")
        };
        (status, body)
    }

    async fn create(&self, token: &str, type_id: i32, notation: &str, serials: &[&str]) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/equipment",
            Some(token),
            Some(json!({
                "serial_number": serials,
                "type": type_id,
                "notation": notation
            })),
        )
        .await
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_unauthorized_access() {
    let app = TestApp::new();
    let (status, _) = app.send(Method::GET, "/equipment", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/equipment-type", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_equipment_positive() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;

    let (status, body) = app.create(&token, t.id, "test", &["A8BDQEF2GF"]).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = body.as_array().expect("Expected a list of created equipment");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0]["serial_numbers"], json!(["A8BDQEF2GF"]));
    assert_eq!(created[0]["type"]["serial_number_mask"], MASK);
}

#[tokio::test]
async fn test_create_equipment_negative() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;

    let (status, body) = app.create(&token, t.id, "test", &[""]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"][""],
        "Serial number '' does not match the mask 'XXAAAAAXAA'."
    );

    let (_, list) = app.send(Method::GET, "/equipment", Some(&token), None).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_create_duplicate_rejected() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;
    let (status, _) = app.create(&token, t.id, "test", &["A2BCDEF2GF"]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .create(&token, t.id, "other", &["B2BCDEF2GF", "A2BCDEF2GF"])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"]["A2BCDEF2GF"], "Serial number 'A2BCDEF2GF' already exists.");
    assert!(body["errors"].get("B2BCDEF2GF").is_none());

    let (_, list) = app.send(Method::GET, "/equipment", Some(&token), None).await;
    assert_eq!(list["total"], 1);
}

#[tokio::test]
async fn test_create_with_unknown_type() {
    let app = TestApp::new();
    let token = app.token(false);
    let (status, _) = app.create(&token, 42, "test", &["A2BCDEF2GF"]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grouped_read() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;

    let (_, first) = app.create(&token, t.id, "test", &["A2BCDEF2GF"]).await;
    let (_, second) = app.create(&token, t.id, "test", &["A3BCDEF2GF"]).await;
    app.create(&token, t.id, "test2", &["A4BCDEF2GF"]).await;

    for created in [&first, &second] {
        let id = created[0]["id"].as_i64().expect("No equipment ID");
        let (status, body) = app
            .send(Method::GET, &format!("/equipment/{}", id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        let serials = body["serial_numbers"].as_array().expect("No serial_numbers");
        assert_eq!(serials.len(), 2);
        assert!(serials.contains(&json!("A2BCDEF2GF")));
        assert!(serials.contains(&json!("A3BCDEF2GF")));
    }
}

#[tokio::test]
async fn test_list_equipment_with_search() {
    let app = TestApp::new();
    let token = app.token(false);
    let laptops = app.equipment_type("Laptop", MASK).await;
    let phones = app.equipment_type("Phone", "NNNN").await;
    app.create(&token, laptops.id, "test", &["A2BCDEF2GF", "A3BCDEF2GF"]).await;
    app.create(&token, phones.id, "test", &["1234"]).await;

    let (status, body) = app.send(Method::GET, "/equipment", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 1);
    assert_eq!(body["per_page"], 20);

    let (_, body) = app
        .send(Method::GET, "/equipment?search=laptop", Some(&token), None)
        .await;
    assert_eq!(body["total"], 2);

    let (_, body) = app
        .send(Method::GET, "/equipment?search=123", Some(&token), None)
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["type"]["name"], "Phone");

    let (_, body) = app
        .send(Method::GET, "/equipment?page=2&per_page=2", Some(&token), None)
        .await;
    assert_eq!(body["items"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_update_equipment_positive() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;
    let (_, created) = app.create(&token, t.id, "test_test", &["D3BCDEF2GF"]).await;
    let id = created[0]["id"].as_i64().expect("No equipment ID");

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/equipment/{}", id),
            Some(&token),
            Some(json!({
                "serial_number": ["A2BCDEF9GP"],
                "type": t.id,
                "notation": "updated notation"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["serial_numbers"], json!(["A2BCDEF9GP"]));
    assert_eq!(body["notation"], "updated notation");

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/equipment/{}", id),
            Some(&token),
            Some(json!({ "serial_number": ["bad"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["bad"].is_string());
}

#[tokio::test]
async fn test_delete_equipment_positive() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;
    let (_, created) = app.create(&token, t.id, "test", &["D3BCDEF2GF"]).await;
    let uri = format!("/equipment/{}", created[0]["id"]);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_equipment_type_list() {
    let app = TestApp::new();
    let token = app.token(false);
    app.equipment_type("Type 1", "SNM1").await;
    app.equipment_type("Type 2", "SNM2").await;

    let (status, body) = app.send(Method::GET, "/equipment-type", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let (_, body) = app
        .send(Method::GET, "/equipment-type?search=snm1", Some(&token), None)
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["name"], "Type 1");
}

#[tokio::test]
async fn test_equipment_type_administration() {
    let app = TestApp::new();
    let user = app.token(false);
    let admin = app.token(true);
    let payload = json!({ "name": "Router", "serial_number_mask": "NNZN" });

    let (status, _) = app
        .send(Method::POST, "/equipment-type", Some(&user), Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .send(Method::POST, "/equipment-type", Some(&admin), Some(payload))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let type_id = created["id"].as_i64().expect("No type ID") as i32;

    let (status, _) = app.create(&user, type_id, "rack", &["12-3", "12@4"]).await;
    assert_eq!(status, StatusCode::CREATED);

    // deleting the type removes its equipment
    let (status, _) = app
        .send(Method::DELETE, &format!("/equipment-type/{}", type_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = app.send(Method::GET, "/equipment", Some(&user), None).await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_login_with_bootstrapped_admin() {
    let mut config = AppConfig::default();
    config.auth.admin_login = Some("admin".to_string());
    config.auth.admin_password = Some("s3cret".to_string());
    let app = TestApp::with_config(config);
    app.state
        .services
        .auth
        .ensure_admin()
        .await
        .expect("Failed to create admin");

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "login": "admin", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "login": "admin", "password": "s3cret" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("No token").to_string();

    let (status, me) = app.send(Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["sub"], "admin");
    assert_eq!(me["is_admin"], true);
}

#[tokio::test]
async fn test_huge_page_returns_empty_page() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;
    app.create(&token, t.id, "test", &["A2BCDEF2GF"]).await;

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/equipment?page={}", i64::MAX),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"], json!([]));

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/equipment-type?page={}&per_page=100", i64::MAX),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_whitespace_notation_rejected() {
    let app = TestApp::new();
    let token = app.token(false);
    let t = app.equipment_type("Type1", MASK).await;

    let (status, body) = app.create(&token, t.id, "   ", &["A8BDQEF2GF"]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, body) = app.create(&token, t.id, " shelf ", &["A8BDQEF2GF"]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body[0]["notation"], "shelf");
}

#[tokio::test]
async fn test_malformed_body_uses_error_shape() {
    let app = TestApp::new();
    let token = app.token(false);

    let (status, body) = app
        .send(
            Method::POST,
            "/equipment",
            Some(&token),
            Some(json!({ "type": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);
    assert_eq!(body["error"], "BadValue");
    assert!(body["message"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/equipment")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("Failed to build request");
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body: Value = serde_json::from_slice(&bytes).expect("Expected a JSON error body");
    assert_eq!(body["error"], "BadValue");
}

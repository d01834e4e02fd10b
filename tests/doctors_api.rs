use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use clinic_doctors::{
    auth::issue_token,
    db::MemoryDoctorStore,
    models::Role,
    startup::build_router,
    AppConfig, AppState, DoctorStore, MetricsState, StoreBackend,
};

const SECRET: &str = "doctors_api_test_secret";

struct TestApp {
    router: Router,
    store: Arc<dyn DoctorStore>,
}

impl TestApp {
    fn new() -> Self {
        let store: Arc<dyn DoctorStore> = Arc::new(MemoryDoctorStore::new());
        let config = AppConfig {
            store: StoreBackend::Memory,
            jwt_secret: SECRET.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            bcrypt_cost: 4,
        };
        let state = Arc::new(AppState {
            store: store.clone(),
            config,
            metrics: Arc::new(MetricsState::detached()),
        });

        TestApp {
            router: build_router(state),
            store,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        role: Option<Role>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(role) = role {
            let token = issue_token(Uuid::new_v4(), role, SECRET, chrono::Duration::minutes(5)).unwrap();
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    async fn create(&self, role: Role, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/api/doctors", Some(role), Some(body)).await
    }

    /// Create as Admin and return the new doctor id
    async fn create_doctor(&self, body: Value) -> Uuid {
        let (status, created) = self.create(Role::Admin, body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", created);
        created["id"].as_str().unwrap().parse().unwrap()
    }

    async fn list(&self) -> Vec<Value> {
        let (status, body) = self.send(Method::GET, "/api/doctors", Some(Role::Admin), None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }

    async fn search(&self, query: &str) -> Vec<Value> {
        let uri = format!("/api/doctors/search?{}", query);
        let (status, body) = self.send(Method::GET, &uri, Some(Role::Doctor), None).await;
        assert_eq!(status, StatusCode::OK);
        body.as_array().unwrap().clone()
    }
}

fn ids(doctors: &[Value]) -> Vec<Uuid> {
    doctors
        .iter()
        .map(|d| d["id"].as_str().unwrap().parse().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_forbidden_for_non_managers_persists_nothing() {
    let app = TestApp::new();

    for role in [Role::Doctor, Role::Staff, Role::Patient] {
        let (status, body) = app.create(role, json!({ "userName": "dr1", "skills": ["derm"] })).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body["error"].as_str().unwrap().contains("not allowed"));
    }

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn test_create_persists_linked_user_with_doctor_role() {
    let app = TestApp::new();

    let (status, body) = app
        .create(
            Role::Manager,
            json!({
                "userName": "dr1",
                "password": "s3cret",
                "email": "dr1@clinic.test",
                "fullName": "Dr One",
                "phone": "555-0100"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let doctors = app.list().await;
    assert_eq!(doctors.len(), 1);

    let doctor = app.store.find_doctor(id).await.unwrap().unwrap();
    assert!(doctor.doctor.certificates.is_empty());
    assert!(doctor.doctor.experiences.is_empty());
    assert!(doctor.doctor.work_schedule.days.is_empty());
    assert_eq!(doctor.doctor.work_schedule.hours.start, "");

    let user = app.store.find_user(doctor.doctor.user_id).await.unwrap().unwrap();
    assert_eq!(user.role_name, Role::Doctor);
    assert!(!user.is_anonymous);
    let hash = user.password_hash.unwrap();
    assert_ne!(hash, "s3cret");
    assert!(bcrypt::verify("s3cret", &hash).unwrap());

    // Joined user fields, never the password
    assert_eq!(doctors[0]["user"]["fullName"], "Dr One");
    assert_eq!(doctors[0]["user"]["roleName"], "Doctor");
    assert!(doctors[0]["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_create_validation_and_conflicts() {
    let app = TestApp::new();

    let (status, _) = app.create(Role::Admin, json!({ "userName": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.create(Role::Admin, json!({ "skills": ["derm"] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "userName is required");

    let (status, _) = app
        .create(
            Role::Admin,
            json!({
                "userName": "dr1",
                "workSchedule": { "days": ["Monday"], "hours": { "start": "17:00", "end": "09:00" } }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_doctor(json!({ "userName": "dr1" })).await;
    let (status, _) = app.create(Role::Admin, json!({ "userName": "dr1" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(app.list().await.len(), 1);
}

#[tokio::test]
async fn test_requests_without_valid_token_are_rejected() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/api/doctors", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/api/doctors", None, Some(json!({ "userName": "dr1" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = issue_token(Uuid::new_v4(), Role::Admin, "other_secret", chrono::Duration::minutes(5)).unwrap();
    let request = Request::builder()
        .uri("/api/doctors")
        .header(header::AUTHORIZATION, format!("Bearer {}", forged))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(app.list().await.is_empty());
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let app = TestApp::new();
    let token = issue_token(Uuid::new_v4(), Role::Staff, SECRET, chrono::Duration::minutes(5)).unwrap();

    let request = Request::builder()
        .uri("/api/doctors")
        .header(header::COOKIE, format!("session={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_missing_doctor_is_not_found() {
    let app = TestApp::new();

    let uri = format!("/api/doctors/{}", Uuid::new_v4());
    let (status, body) = app.send(Method::GET, &uri, Some(Role::Admin), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("id").is_none());
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let (status, _) = app
        .send(Method::GET, "/api/doctors/not-a-uuid", Some(Role::Admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_with_empty_skills_keeps_existing() {
    let app = TestApp::new();
    let id = app
        .create_doctor(json!({ "userName": "dr1", "skills": ["derm"], "certificates": ["MD"] }))
        .await;
    let uri = format!("/api/doctors/{}", id);

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(Role::Manager),
            Some(json!({ "skills": [], "experiences": ["10 years at City Clinic"] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills"], json!(["derm"]));
    assert_eq!(body["certificates"], json!(["MD"]));
    assert_eq!(body["experiences"], json!(["10 years at City Clinic"]));
}

#[tokio::test]
async fn test_update_replaces_schedule_and_user_fields() {
    let app = TestApp::new();
    let id = app.create_doctor(json!({ "userName": "dr1", "email": "dr1@clinic.test" })).await;
    let uri = format!("/api/doctors/{}", id);

    let (status, body) = app
        .send(
            Method::PUT,
            &uri,
            Some(Role::Admin),
            Some(json!({
                "workSchedule": { "days": ["Monday", "Wednesday"], "hours": { "start": "08:00", "end": "16:00" } },
                "fullName": "Dr One",
                "address": "1 Clinic Way"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workSchedule"]["days"], json!(["Monday", "Wednesday"]));
    assert_eq!(body["workSchedule"]["hours"]["start"], "08:00");
    assert_eq!(body["user"]["fullName"], "Dr One");
    assert_eq!(body["user"]["email"], "dr1@clinic.test");

    let user_id: Uuid = body["userId"].as_str().unwrap().parse().unwrap();
    let user = app.store.find_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.address.as_deref(), Some("1 Clinic Way"));

    let found = app.search("day=Wednesday").await;
    assert_eq!(ids(&found), vec![id]);
}

#[tokio::test]
async fn test_update_guards() {
    let app = TestApp::new();
    let id = app.create_doctor(json!({ "userName": "dr1", "skills": ["derm"] })).await;
    let uri = format!("/api/doctors/{}", id);

    let (status, _) = app
        .send(Method::PUT, &uri, Some(Role::Doctor), Some(json!({ "skills": ["ortho"] })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = format!("/api/doctors/{}", Uuid::new_v4());
    let (status, _) = app
        .send(Method::PUT, &missing, Some(Role::Admin), Some(json!({ "skills": ["ortho"] })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PUT,
            &uri,
            Some(Role::Admin),
            Some(json!({ "workSchedule": { "days": ["Monday"], "hours": { "start": "09:00" } } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.send(Method::GET, &uri, Some(Role::Admin), None).await;
    assert_eq!(body["skills"], json!(["derm"]));
}

#[tokio::test]
async fn test_delete_by_non_admin_leaves_records() {
    let app = TestApp::new();
    let id = app.create_doctor(json!({ "userName": "dr1" })).await;
    let uri = format!("/api/doctors/{}", id);

    for role in [Role::Manager, Role::Doctor] {
        let (status, _) = app.send(Method::DELETE, &uri, Some(role), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let doctor = app.store.find_doctor(id).await.unwrap().unwrap();
    assert!(app.store.find_user(doctor.doctor.user_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_missing_doctor_is_not_found() {
    let app = TestApp::new();

    let uri = format!("/api/doctors/{}", Uuid::new_v4());
    let (status, _) = app.send(Method::DELETE, &uri, Some(Role::Admin), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_matches_exact_skill() {
    let app = TestApp::new();
    let cardio = app.create_doctor(json!({ "userName": "a", "skills": ["cardiology", "derm"] })).await;
    app.create_doctor(json!({ "userName": "b", "skills": ["Cardiology"] })).await;
    app.create_doctor(json!({ "userName": "c", "skills": ["cardiology-peds"] })).await;

    let found = app.search("skill=cardiology").await;

    assert_eq!(ids(&found), vec![cardio]);
}

#[tokio::test]
async fn test_search_combines_skill_and_day() {
    let app = TestApp::new();
    let monday = json!({ "days": ["Monday"], "hours": { "start": "09:00", "end": "17:00" } });
    let friday = json!({ "days": ["Friday"], "hours": { "start": "09:00", "end": "17:00" } });

    let derm_monday = app.create_doctor(json!({ "userName": "a", "skills": ["derm"], "workSchedule": monday.clone() })).await;
    let derm_friday = app.create_doctor(json!({ "userName": "b", "skills": ["derm"], "workSchedule": friday })).await;
    let ortho_monday = app.create_doctor(json!({ "userName": "c", "skills": ["ortho"], "workSchedule": monday })).await;

    assert_eq!(ids(&app.search("skill=derm&day=Monday").await), vec![derm_monday]);
    assert_eq!(ids(&app.search("skill=derm").await), vec![derm_monday, derm_friday]);
    assert_eq!(ids(&app.search("day=Monday").await), vec![derm_monday, ortho_monday]);
    assert_eq!(app.search("skill=&day=").await.len(), 3);
    assert!(app.search("skill=derm&day=Sunday").await.is_empty());
}

#[tokio::test]
async fn test_doctor_lifecycle() {
    let app = TestApp::new();

    let (status, _) = app.create(Role::Admin, json!({ "userName": "dr1", "skills": ["derm"] })).await;
    assert_eq!(status, StatusCode::CREATED);

    let doctors = app.list().await;
    assert_eq!(doctors.len(), 1);
    let id: Uuid = doctors[0]["id"].as_str().unwrap().parse().unwrap();
    let user_id: Uuid = doctors[0]["userId"].as_str().unwrap().parse().unwrap();
    let uri = format!("/api/doctors/{}", id);

    let (status, body) = app.send(Method::GET, &uri, Some(Role::Patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skills"], json!(["derm"]));

    assert_eq!(ids(&app.search("skill=derm").await), vec![id]);

    let (status, body) = app.send(Method::DELETE, &uri, Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Doctor deleted successfully");

    assert!(app.store.find_doctor(id).await.unwrap().is_none());
    assert!(app.store.find_user(user_id).await.unwrap().is_none());

    let (status, _) = app.send(Method::GET, &uri, Some(Role::Admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/doctors/{id}").is_some());
}

#[tokio::test]
async fn test_inbound_request_id_is_echoed() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "upstream-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "upstream-42");
}

#[tokio::test]
async fn test_forbidden_comes_before_body_and_id_checks() {
    let app = TestApp::new();
    let id = app.create_doctor(json!({ "userName": "dr1", "skills": ["derm"] })).await;

    let (status, body) = app.create(Role::Doctor, json!({ "userName": 5 })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].is_string());

    // No body and no content type at all
    let (status, _) = app.send(Method::POST, "/api/doctors", Some(Role::Patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/doctors/{}", id);
    let (status, _) = app
        .send(Method::PUT, &uri, Some(Role::Staff), Some(json!({ "skills": "derm" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::PUT, "/api/doctors/not-a-uuid", Some(Role::Doctor), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::DELETE, "/api/doctors/not-a-uuid", Some(Role::Manager), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    assert_eq!(app.list().await.len(), 1);
}

#[tokio::test]
async fn test_malformed_input_from_allowed_caller_is_bad_request_json() {
    let app = TestApp::new();
    let id = app.create_doctor(json!({ "userName": "dr1" })).await;

    let (status, body) = app.create(Role::Admin, json!({ "userName": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app.send(Method::POST, "/api/doctors", Some(Role::Manager), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = app
        .send(Method::DELETE, "/api/doctors/not-a-uuid", Some(Role::Admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid doctor id"));

    let uri = format!("/api/doctors/{}", id);
    let (status, body) = app
        .send(Method::PUT, &uri, Some(Role::Admin), Some(json!({ "skills": "derm" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_rejects_malformed_email() {
    let app = TestApp::new();
    let id = app.create_doctor(json!({ "userName": "dr1", "email": "dr1@clinic.test" })).await;
    let uri = format!("/api/doctors/{}", id);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(Role::Admin), Some(json!({ "email": "not-an-email" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid email"));

    let doctor = app.store.find_doctor(id).await.unwrap().unwrap();
    assert_eq!(doctor.user.email.as_deref(), Some("dr1@clinic.test"));
}

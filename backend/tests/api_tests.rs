//! Integration tests for the back office REST API
//!
//! Drives the full router (auth middleware, handlers, services, SQLite and
//! the web root) with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use clap::Parser;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use church_admin_backend::domain::auth::JwtValidator;
use church_admin_backend::domain::FixedClock;
use church_admin_backend::storage::{DbConnection, FileStore};
use church_admin_backend::{create_router, AppState, Config};

const ADMIN_EMAIL: &str = "admin@igreja.com";
const ADMIN_PASSWORD: &str = "Admin@123";

struct TestApp {
    router: Router,
    web_root: TempDir,
}

async fn setup_test_app() -> TestApp {
    let web_root = tempfile::tempdir().unwrap();
    let config = Config::parse_from([
        "church-admin",
        "--dev-mode",
        "--web-root",
        web_root.path().to_str().unwrap(),
    ]);

    let db = DbConnection::in_memory().await.unwrap();
    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
    let jwt = JwtValidator::new_dev(config.jwt_issuer.clone(), config.jwt_audience.clone());
    let state = AppState::new(db, FileStore::new(web_root.path()), jwt, clock);
    state
        .auth_service
        .ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .unwrap();

    TestApp {
        router: create_router(state, &config),
        web_root,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json_body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json_body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}

fn member_body(name: &str, email: &str) -> Value {
    json!({
        "fullName": name,
        "email": email,
        "phone": "(11) 99999-0000",
        "gender": "Feminino",
        "birthDate": "1990-03-10"
    })
}

fn presentation_body() -> Value {
    json!({
        "childName": "João Pedro",
        "birthDate": "2023-11-02",
        "gender": "Masculino",
        "fatherName": "Carlos Souza",
        "motherName": "Ana Souza",
        "presentationDate": "2024-05-12",
        "pastor": "Pr. Marcos",
        "churchName": "Igreja Central"
    })
}

#[tokio::test]
async fn test_login_and_validate_token() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, body) = app.send(Method::GET, "/api/auth/validate", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role"], "Admin");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = setup_test_app().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "errada" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Email ou senha inválidos");
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = setup_test_app().await;

    let (status, _) = app.send(Method::GET, "/api/members", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/dashboard/stats", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_member_crud_and_duplicate_email() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/members",
            Some(&token),
            Some(member_body("Maria Silva", "maria@igreja.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/members",
            Some(&token),
            Some(member_body("Outra Maria", "MARIA@igreja.com")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("email"));

    let (_, list) = app.send(Method::GET, "/api/members", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/members/{}", id),
            Some(&token),
            Some(member_body("Maria Silva Santos", "maria@igreja.com")),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, fetched) = app
        .send(Method::GET, &format!("/api/members/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["fullName"], "Maria Silva Santos");
    assert_eq!(fetched["familyMembers"], json!([]));

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/members/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, active) = app.send(Method::GET, "/api/members", Some(&token), None).await;
    assert!(active.as_array().unwrap().is_empty());
    let (_, all) = app
        .send(Method::GET, "/api/members?includeInactive=true", Some(&token), None)
        .await;
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_member_validation_lists_field_errors() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/members",
            Some(&token),
            Some(json!({ "fullName": "", "email": "sem-arroba", "phone": "1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"fullName"));
    assert!(fields.contains(&"email"));
}

#[tokio::test]
async fn test_member_photo_upload() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;
    let (_, created) = app
        .send(
            Method::POST,
            "/api/members",
            Some(&token),
            Some(member_body("Maria Silva", "maria@igreja.com")),
        )
        .await;
    let id = created["id"].as_i64().unwrap();

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"perfil.png\"\r\n\
         Content-Type: image/png\r\n\r\nfake-png-bytes\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/members/{}/photo", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let uploaded: Value = serde_json::from_slice(&bytes).unwrap();
    let photo_path = uploaded["photoPath"].as_str().unwrap();

    assert!(photo_path.starts_with(&format!("/uploads/members/{}_", id)));
    assert!(photo_path.ends_with(".png"));
    let on_disk = app.web_root.path().join(photo_path.trim_start_matches('/'));
    assert_eq!(std::fs::read(on_disk).unwrap(), b"fake-png-bytes");
}

#[tokio::test]
async fn test_public_pre_registration_and_conversion() {
    let app = setup_test_app().await;

    let (status, options) = app
        .send(Method::GET, "/api/preregistration/music-school/instruments", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!options["instruments"].as_array().unwrap().is_empty());

    let (status, created) = app
        .send(
            Method::POST,
            "/api/preregistration/music-school",
            None,
            Some(json!({
                "name": "Lucas Lima",
                "email": "lucas@exemplo.com",
                "phone": "(11) 98888-7777",
                "instrument": "Violão",
                "preferredSchedule": "Sábado 10h"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["data"]["status"], "Pendente");
    let id = created["data"]["id"].as_i64().unwrap();

    let token = app.admin_token().await;
    let (_, dashboard) = app.send(Method::GET, "/api/dashboard/stats", Some(&token), None).await;
    assert_eq!(dashboard["pendingPreRegistrations"], 1);

    let (status, student) = app
        .send(
            Method::POST,
            &format!("/api/musicschool/pre-registrations/{}/convert", id),
            Some(&token),
            Some(json!({ "teacher": "Prof. Rita", "monthlyFee": 150.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(student["email"], "lucas@exemplo.com");
    assert_eq!(student["classSchedule"], "Sábado 10h");

    let (_, pre_registrations) = app
        .send(Method::GET, "/api/musicschool/pre-registrations", Some(&token), None)
        .await;
    assert_eq!(pre_registrations[0]["status"], "Matriculado");

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/musicschool/pre-registrations/{}/convert", id),
            Some(&token),
            Some(json!({ "monthlyFee": 150.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_jiu_jitsu_bulk_attendance_is_all_or_nothing() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;
    let (status, student) = app
        .send(
            Method::POST,
            "/api/jiujitsu",
            Some(&token),
            Some(json!({ "name": "Rafael", "email": "rafael@exemplo.com", "phone": "1199" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = student["id"].as_i64().unwrap();

    let (status, _) = app
        .send(
            Method::POST,
            "/api/jiujitsu/attendances/bulk",
            Some(&token),
            Some(json!({
                "date": "2024-06-10",
                "students": [
                    { "studentId": id, "isPresent": true },
                    { "studentId": 9999, "isPresent": true }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = app
        .send(Method::GET, &format!("/api/jiujitsu/{}", id), Some(&token), None)
        .await;
    assert!(detail["recentAttendances"].as_array().unwrap().is_empty());

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/jiujitsu/{}/graduations", id),
            Some(&token),
            Some(json!({ "toBelt": "Azul", "toStripes": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = app
        .send(Method::GET, &format!("/api/jiujitsu/{}", id), Some(&token), None)
        .await;
    assert_eq!(detail["belt"], "Azul");
    assert_eq!(detail["stripes"], 1);
}

#[tokio::test]
async fn test_certificate_generation_and_download() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    let (status, created) = app
        .send(Method::POST, "/api/childpresentation", Some(&token), Some(presentation_body()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["certificateGenerated"], false);
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/childpresentation/{}/certificate/download", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Certificado não foi gerado ainda");

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/childpresentation/{}/certificate", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, fetched) = app
        .send(Method::GET, &format!("/api/childpresentation/{}", id), Some(&token), None)
        .await;
    assert_eq!(fetched["certificateGenerated"], true);
    let path = fetched["certificatePath"].as_str().unwrap();
    assert!(path.starts_with("uploads/certificates/"));
    assert!(path.ends_with(".pdf"));

    let request = Request::builder()
        .uri(format!("/api/childpresentation/{}/certificate/download", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"Certificado_Jo_o_Pedro.pdf\""));
    assert!(disposition.contains("filename*=UTF-8''Certificado_Jo%C3%A3o_Pedro.pdf"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    let stored = std::fs::read(app.web_root.path().join(path)).unwrap();
    assert_eq!(bytes.as_ref(), stored.as_slice());
}

#[tokio::test]
async fn test_certificate_overrides_apply_to_one_render_only() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;
    let (_, created) = app
        .send(Method::POST, "/api/childpresentation", Some(&token), Some(presentation_body()))
        .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = app
        .send(
            Method::POST,
            &format!("/api/childpresentation/{}/certificate", id),
            Some(&token),
            Some(json!({ "customChurchName": "Igreja Nova Vida", "customPastor": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Certificado gerado com sucesso");

    let (_, fetched) = app
        .send(Method::GET, &format!("/api/childpresentation/{}", id), Some(&token), None)
        .await;
    assert_eq!(fetched["churchName"], "Igreja Central");
    assert_eq!(fetched["pastor"], "Pr. Marcos");
}

#[tokio::test]
async fn test_malformed_certificate_overrides_are_rejected() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;
    let (_, created) = app
        .send(Method::POST, "/api/childpresentation", Some(&token), Some(presentation_body()))
        .await;
    let id = created["id"].as_i64().unwrap();

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/childpresentation/{}/certificate", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"customChurchName": "Igreja Nova""#))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, fetched) = app
        .send(Method::GET, &format!("/api/childpresentation/{}", id), Some(&token), None)
        .await;
    assert_eq!(fetched["certificateGenerated"], false);
    assert!(fetched["certificatePath"].is_null());
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let app = setup_test_app().await;
    let admin = app.admin_token().await;

    let (status, _) = app
        .send(
            Method::POST,
            "/api/users",
            Some(&admin),
            Some(json!({
                "name": "Secretaria",
                "email": "secretaria@igreja.com",
                "password": "segredo123",
                "role": "User"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let user = app.login("secretaria@igreja.com", "segredo123").await;
    let (status, _) = app.send(Method::GET, "/api/users", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, "/api/members", Some(&user), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, users) = app.send(Method::GET, "/api/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
    assert!(users[0].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_unknown_record_is_not_found() {
    let app = setup_test_app().await;
    let token = app.admin_token().await;

    for path in [
        "/api/members/404",
        "/api/musicschool/404",
        "/api/jiujitsu/404",
        "/api/mensgroup/404",
        "/api/childpresentation/404",
        "/api/users/404",
    ] {
        let (status, body) = app.send(Method::GET, path, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert!(body["message"].is_string());
    }
}

//! End-to-end checks of the HTTP transport against a local axum server.

use axum::extract::Multipart;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use hms_client::download::DirectorySink;
use hms_client::error::{MAINTENANCE, SESSION_EXPIRED};
use hms_client::services::{Credentials, FileUpload, UploadOptions};
use hms_client::{ApiClient, ClientConfig, ClientError, ErrorKind, Session};
use hms_core::models::{PrescriptionStatus, Priority};
use hms_core::Role;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn header(headers: &HeaderMap, name: &str) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| Value::String(v.to_owned()))
        .unwrap_or(Value::Null)
}

async fn echo_headers(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "authorization": header(&headers, "authorization"),
        "socketId": header(&headers, "x-socket-id"),
    }))
}

async fn login(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    if body["password"] == "wrong" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Bad password" }))).into_response();
    }
    let user = json!({ "id": 3, "email": body["email"], "role": "PHARMACIST" });
    if body["password"] == "tokenless" {
        return Json(json!({ "user": user })).into_response();
    }
    Json(json!({
        "authorization": header(&headers, "authorization"),
        "token": "fresh",
        "user": user,
    }))
    .into_response()
}

async fn refresh() -> Json<Value> {
    Json(json!({ "token": "renewed" }))
}

async fn profile(headers: HeaderMap) -> Json<Value> {
    Json(json!({
        "id": 3,
        "email": "jane@example.org",
        "firstName": "Jane",
        "lastName": "Doe",
        "role": "PHARMACIST",
        "seenToken": header(&headers, "authorization"),
    }))
}

async fn expired() -> impl IntoResponse {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "jwt expired" })))
}

async fn invalid() -> impl IntoResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "Patient data invalid",
            "errors": [{ "field": "email", "message": "Email already registered" }]
        })),
    )
}

async fn maintenance() -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "down")
}

async fn missing() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Prescription 42 not found" })),
    )
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn enveloped() -> Json<Value> {
    Json(json!({ "success": true, "data": { "pendingPrescriptions": 7 } }))
}

async fn queue() -> Json<Value> {
    Json(json!([
        {
            "id": 11,
            "prescriptionNumber": "RX-0011",
            "patientName": "Ada Obi",
            "patientId": "MRN-7",
            "medications": [{ "name": "Amoxicillin", "quantity": 21 }],
            "priority": "URGENT",
            "status": "PENDING",
            "prescribedDate": "2026-10-18T09:30:00",
            "estimatedTime": 15
        }
    ]))
}

async fn export() -> impl IntoResponse {
    ([("content-type", "application/pdf")], b"%PDF-1.7".to_vec())
}

async fn upload(mut multipart: Multipart) -> Json<Value> {
    let mut fields = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        let value = match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                let len = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                json!({ "fileName": file_name, "len": len })
            }
            None => Value::String(field.text().await.unwrap_or_default()),
        };
        fields.insert(name, value);
    }
    Json(Value::Object(fields))
}

async fn serve() -> String {
    let app = Router::new()
        .route("/echo", get(echo_headers))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(no_content))
        .route("/auth/refresh-token", post(refresh))
        .route("/auth/profile", get(profile))
        .route("/expired", get(expired))
        .route("/invalid", post(invalid))
        .route("/maintenance-mode", get(maintenance))
        .route("/missing", get(missing))
        .route("/empty", post(no_content))
        .route("/dashboard/stats", get(enveloped))
        .route("/prescriptions/queue", get(queue))
        .route("/reports/:id/export", get(export))
        .route("/files/upload", post(upload));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base: &str) -> (ApiClient, Arc<Mutex<Vec<String>>>) {
    let redirects = Arc::new(Mutex::new(Vec::new()));
    let seen = redirects.clone();
    let api = ApiClient::new(ClientConfig::new(base).unwrap(), Session::in_memory())
        .unwrap()
        .with_redirect_hook(Arc::new(move |route: &str| {
            seen.lock().unwrap().push(route.to_owned());
        }));
    (api, redirects)
}

#[tokio::test]
async fn test_bearer_and_socket_headers_are_attached() {
    let base = serve().await;
    let (api, _) = client(&base);
    api.session().set_auth_token("tok-1", Utc::now()).unwrap();
    api.session().set_socket_id("sock-9").unwrap();

    let body: Value = api.get("/echo").await.unwrap();
    assert_eq!(body["authorization"], "Bearer tok-1");
    assert_eq!(body["socketId"], "sock-9");
}

#[tokio::test]
async fn test_auth_endpoints_skip_bearer() {
    let base = serve().await;
    let (api, _) = client(&base);
    api.session().set_auth_token("stale", Utc::now()).unwrap();

    let body: Value = api
        .post("/auth/login", &json!({ "email": "a@b.co", "password": "x" }))
        .await
        .unwrap();
    assert_eq!(body["authorization"], Value::Null);
    assert_eq!(body["token"], "fresh");
}

#[tokio::test]
async fn test_401_expires_session_and_redirects_to_login() {
    let base = serve().await;
    let (api, redirects) = client(&base);
    api.session().set_auth_token("tok-1", Utc::now()).unwrap();
    api.session().set_user(&json!({ "id": 1 })).unwrap();

    let err = api.get::<Value>("/expired").await.unwrap_err();
    let api_err = err.api().unwrap();
    assert_eq!(api_err.kind, ErrorKind::Authentication);
    assert_eq!(api_err.message, SESSION_EXPIRED);
    assert_eq!(api.session().auth_token().unwrap(), None);
    assert_eq!(api.session().user::<Value>().unwrap(), None);
    assert_eq!(*redirects.lock().unwrap(), vec!["/login".to_owned()]);
}

#[tokio::test]
async fn test_401_on_login_keeps_session_and_uses_server_error() {
    let base = serve().await;
    let (api, redirects) = client(&base);
    api.session().set_theme("dark").unwrap();

    let err = api
        .post::<Value, _>("/auth/login", &json!({ "email": "a@b.co", "password": "wrong" }))
        .await
        .unwrap_err();
    assert_eq!(err.api().unwrap().message, "Bad password");
    assert_eq!(api.session().theme().unwrap(), "dark");
    assert!(redirects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_422_carries_field_errors() {
    let base = serve().await;
    let (api, _) = client(&base);

    let err = api
        .post::<Value, _>("/invalid", &json!({ "email": "dup@x.org" }))
        .await
        .unwrap_err();
    let api_err = err.api().unwrap();
    assert!(api_err.is_validation());
    assert_eq!(api_err.status, Some(422));
    assert_eq!(api_err.message, "Patient data invalid");
    assert_eq!(
        api_err.validation_errors()["email"],
        "Email already registered"
    );
}

#[tokio::test]
async fn test_503_redirects_to_maintenance() {
    let base = serve().await;
    let (api, redirects) = client(&base);

    let err = api.get::<Value>("/maintenance-mode").await.unwrap_err();
    assert_eq!(err.api().unwrap().message, MAINTENANCE);
    assert_eq!(*redirects.lock().unwrap(), vec!["/maintenance".to_owned()]);
}

#[tokio::test]
async fn test_404_prefers_server_message() {
    let base = serve().await;
    let (api, _) = client(&base);

    let err = api.get::<Value>("/missing").await.unwrap_err();
    let api_err = err.api().unwrap();
    assert_eq!(api_err.kind, ErrorKind::NotFound);
    assert_eq!(api_err.message, "Prescription 42 not found");
}

#[tokio::test]
async fn test_empty_body_decodes_as_null() {
    let base = serve().await;
    let (api, _) = client(&base);

    let body: Value = api.post_empty("/empty").await.unwrap();
    assert_eq!(body, Value::Null);
    let unit: Option<Value> = api.post_empty("/empty").await.unwrap();
    assert!(unit.is_none());
}

#[tokio::test]
async fn test_dashboard_unwraps_data_envelope() {
    let base = serve().await;
    let (api, _) = client(&base);

    let stats = api.dashboard().stats().await.unwrap();
    assert_eq!(stats, json!({ "pendingPrescriptions": 7 }));
}

#[tokio::test]
async fn test_pharmacy_queue_decodes_entries() {
    let base = serve().await;
    let (api, _) = client(&base);

    let entries = api.prescriptions().pharmacy_queue(&[]).await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.prescription_number, "RX-0011");
    assert_eq!(entry.priority, Priority::Urgent);
    assert_eq!(entry.status, PrescriptionStatus::Pending);
    assert_eq!(entry.estimated_minutes, Some(15));
    assert!(!entry.has_stock_shortage());
}

#[tokio::test]
async fn test_report_export_is_saved_to_download_dir() {
    let base = serve().await;
    let dir = tempfile::tempdir().unwrap();
    let (api, _) = client(&base);
    let api = api.with_download_sink(Arc::new(DirectorySink::new(dir.path())));

    let path = api.reports().export("r-5", None).await.unwrap();
    assert_eq!(path, dir.path().join("report_r-5.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
}

#[tokio::test]
async fn test_upload_sends_file_and_metadata_parts() {
    let base = serve().await;
    let (api, _) = client(&base);

    let file = FileUpload::new("scan.pdf", "application/pdf", vec![1, 2, 3, 4]);
    let options = UploadOptions {
        category: Some("lab".into()),
        description: None,
        tags: vec!["blood".into(), "2026".into()],
    };
    let echoed = api.files().upload(file, options).await.unwrap();
    assert_eq!(echoed["file"], json!({ "fileName": "scan.pdf", "len": 4 }));
    assert_eq!(echoed["category"], "lab");
    assert_eq!(echoed["tags"], r#"["blood","2026"]"#);
    assert!(echoed.get("description").is_none());
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (api, redirects) = client(&format!("http://{addr}"));
    let err = api.get::<Value>("/echo").await.unwrap_err();
    assert!(matches!(&err, ClientError::Api(e) if e.kind == ErrorKind::Network));
    assert_eq!(err.api().unwrap().status, None);
    assert!(redirects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_stores_token_user_and_login_time() {
    let base = serve().await;
    let (api, _) = client(&base);
    let before = Utc::now();

    let user = api
        .auth()
        .login(&Credentials::new("jane@example.org", "secret"))
        .await
        .unwrap();
    assert_eq!(user.email, "jane@example.org");
    assert_eq!(user.role(), Some(Role::Pharmacist));
    assert_eq!(api.session().auth_token().unwrap().as_deref(), Some("fresh"));
    assert!(api.session().login_time().unwrap().unwrap() >= before);
    assert_eq!(api.auth().stored_user().unwrap(), Some(user));
    assert!(api.auth().is_authenticated().unwrap());
    assert!(!api.auth().is_session_expired_at(Utc::now()).unwrap());
}

#[tokio::test]
async fn test_login_without_token_stores_nothing() {
    let base = serve().await;
    let (api, _) = client(&base);

    let err = api
        .auth()
        .login(&Credentials::new("jane@example.org", "tokenless"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Auth(m) if m == "No token in response"));
    assert_eq!(api.session().auth_token().unwrap(), None);
    assert_eq!(api.session().user::<Value>().unwrap(), None);
    assert_eq!(api.session().login_time().unwrap(), None);
}

#[tokio::test]
async fn test_rejected_login_surfaces_server_message() {
    let base = serve().await;
    let (api, redirects) = client(&base);

    let err = api
        .auth()
        .login(&Credentials::new("jane@example.org", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.api().unwrap().message, "Bad password");
    assert!(redirects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_clears_session_but_keeps_theme() {
    let base = serve().await;
    let (api, _) = client(&base);
    api.session().set_theme("dark").unwrap();
    api.auth()
        .login(&Credentials::new("jane@example.org", "secret"))
        .await
        .unwrap();

    api.auth().logout().await.unwrap();
    assert_eq!(api.session().auth_token().unwrap(), None);
    assert_eq!(api.session().login_time().unwrap(), None);
    assert!(api.auth().stored_user().unwrap().is_none());
    assert_eq!(api.session().theme().unwrap(), "dark");
}

#[tokio::test]
async fn test_logout_clears_session_when_server_is_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (api, _) = client(&format!("http://{addr}"));
    api.session().set_auth_token("tok-1", Utc::now()).unwrap();
    api.auth().logout().await.unwrap();
    assert_eq!(api.session().auth_token().unwrap(), None);
}

#[tokio::test]
async fn test_refresh_token_replaces_token_and_keeps_login_time() {
    let base = serve().await;
    let (api, _) = client(&base);
    api.auth()
        .login(&Credentials::new("jane@example.org", "secret"))
        .await
        .unwrap();
    let logged_in_at = api.session().login_time().unwrap();

    let token = api.auth().refresh_token().await.unwrap();
    assert_eq!(token, "renewed");
    assert_eq!(api.session().auth_token().unwrap().as_deref(), Some("renewed"));
    assert_eq!(api.session().login_time().unwrap(), logged_in_at);
}

#[tokio::test]
async fn test_current_user_refreshes_stored_profile() {
    let base = serve().await;
    let (api, _) = client(&base);
    api.auth()
        .login(&Credentials::new("jane@example.org", "secret"))
        .await
        .unwrap();

    let user = api.auth().current_user().await.unwrap();
    assert_eq!(user.display_name(), "Jane Doe");
    let stored = api.auth().stored_user().unwrap().unwrap();
    assert_eq!(stored.first_name.as_deref(), Some("Jane"));
}

//! Shared harness for the integration tests: an in-memory application plus
//! helpers to register tenants and drive the JSON API.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use procurement_backend::config::AppConfig;
use procurement_backend::database::Database;
use procurement_backend::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub router: Router,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().expect("upload dir");
        let db = Database::in_memory().expect("database");
        db.migrate().await.expect("migrate");
        let config = AppConfig::for_tests(uploads.path());
        let router = build_router(AppState::new(config, db));
        Self { router, uploads }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    /// Sends a JSON request and returns the status with the decoded body
    /// (`Value::Null` for empty bodies).
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.send(request).await;
        let status = response.status();
        (status, json_body(response).await)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn login(&self, slug: &str, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "company_slug": slug, "email": email, "password": password })),
        )
        .await
    }

    /// Registers a company and returns the admin's session token.
    pub async fn register(&self, slug: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({
                    "company_name": format!("{slug} Ltd."),
                    "slug": slug,
                    "admin_name": "Admin",
                    "email": format!("admin@{slug}.test"),
                    "password": PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        token_of(&body)
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}

pub fn token_of(session: &Value) -> String {
    session["token"].as_str().expect("token in session").to_string()
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id")
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

/// A company with one department and one signed-in user per role.
pub struct Tenant {
    pub slug: String,
    pub department_id: i64,
    pub admin: String,
    pub manager: String,
    pub requester: String,
    pub it: String,
    pub finance: String,
    pub purchasing: String,
    pub manager_id: i64,
    pub requester_id: i64,
}

impl Tenant {
    pub async fn create(app: &TestApp, slug: &str) -> Self {
        let admin = app.register(slug).await;

        let (status, department) = app
            .post("/api/departments", &admin, json!({ "name": "Operations" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{department}");
        let department_id = id_of(&department);

        let mut tokens = Vec::new();
        let mut ids = Vec::new();
        for (local, role, in_department) in [
            ("manager", "MANAGER", true),
            ("requester", "USER", true),
            ("it", "IT", false),
            ("finance", "FINANCE", false),
            ("purchasing", "PURCHASING", false),
        ] {
            let email = format!("{local}@{slug}.test");
            let (status, user) = app
                .post(
                    "/api/users",
                    &admin,
                    json!({
                        "email": email,
                        "full_name": local,
                        "password": PASSWORD,
                        "role": role,
                        "department_id": in_department.then_some(department_id),
                    }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{user}");
            ids.push(id_of(&user));

            let (status, session) = app.login(slug, &email, PASSWORD).await;
            assert_eq!(status, StatusCode::OK, "{session}");
            tokens.push(token_of(&session));
        }

        let (status, body) = app
            .patch(
                &format!("/api/departments/{department_id}"),
                &admin,
                json!({ "manager_id": ids[0] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let mut tokens = tokens.into_iter();
        let mut next = || tokens.next().expect("token");
        Self {
            slug: slug.to_string(),
            department_id,
            admin,
            manager: next(),
            requester: next(),
            it: next(),
            finance: next(),
            purchasing: next(),
            manager_id: ids[0],
            requester_id: ids[1],
        }
    }

    /// Files a two-line request as the plain user and returns its id.
    pub async fn file_request(&self, app: &TestApp, title: &str) -> i64 {
        let (status, body) = app
            .post(
                "/api/requests",
                &self.requester,
                json!({
                    "title": title,
                    "justification": "team growth",
                    "priority": "HIGH",
                    "items": [
                        { "description": "Laptop", "quantity": 2, "unit_price_cents": 150000 },
                        { "description": "Dock", "quantity": 1, "unit_price_cents": 20000 }
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }
}

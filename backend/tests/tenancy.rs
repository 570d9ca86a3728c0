mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::{TestApp, Tenant, PASSWORD};

#[tokio::test]
async fn companies_cannot_see_each_others_data() {
    let app = TestApp::new().await;
    let acme = Tenant::create(&app, "acme").await;
    let globex = Tenant::create(&app, "globex").await;
    let id = acme.file_request(&app, "Acme only").await;

    let (status, _) = app.get(&format!("/api/requests/{id}"), &globex.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, page) = app.get("/api/requests", &globex.admin).await;
    assert_eq!(page["total"], 0);

    let (status, _) = app
        .call(Method::POST, &format!("/api/requests/{id}/approve"), Some(globex.admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .get(&format!("/api/users/{}", acme.requester_id), &globex.admin)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .patch(
            &format!("/api/departments/{}", acme.department_id),
            &globex.admin,
            json!({ "name": "Hijacked" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, departments) = app.get("/api/departments", &globex.requester).await;
    let names: Vec<&str> = departments
        .as_array()
        .expect("departments")
        .iter()
        .map(|d| d["name"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["Operations"]);
    assert_ne!(departments[0]["id"], acme.department_id);
}

#[tokio::test]
async fn foreign_managers_cannot_be_assigned() {
    let app = TestApp::new().await;
    let acme = Tenant::create(&app, "acme").await;
    let globex = Tenant::create(&app, "globex").await;

    let (status, _) = app
        .patch(
            &format!("/api/departments/{}", globex.department_id),
            &globex.admin,
            json!({ "manager_id": acme.manager_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn the_same_email_may_exist_in_two_companies() {
    let app = TestApp::new().await;
    let acme = app.register("acme").await;
    let globex = app.register("globex").await;

    for token in [&acme, &globex] {
        let (status, body) = app
            .post(
                "/api/users",
                token,
                json!({ "email": "shared@example.test", "full_name": "Shared", "password": PASSWORD, "role": "USER" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (_, a) = app.login("acme", "shared@example.test", PASSWORD).await;
    let (_, b) = app.login("globex", "shared@example.test", PASSWORD).await;
    assert_eq!(a["company"]["slug"], "acme");
    assert_eq!(b["company"]["slug"], "globex");
    assert_ne!(a["user"]["id"], b["user"]["id"]);
}

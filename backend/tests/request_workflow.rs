mod support;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use support::{error_code, json_body, TestApp, Tenant};

fn kinds(notifications: &Value) -> Vec<String> {
    notifications
        .as_array()
        .expect("notification list")
        .iter()
        .map(|n| n["kind"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn request_moves_through_the_whole_chain() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let id = tenant.file_request(&app, "Laptops for new hires").await;

    let (status, detail) = app.get(&format!("/api/requests/{id}"), &tenant.requester).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "BEKLEMEDE");
    assert_eq!(detail["current_step"], "DEPARTMENT_MANAGER");
    assert_eq!(detail["total_cents"], 320000);
    assert_eq!(detail["currency"], "TRY");
    assert_eq!(detail["items"].as_array().map(Vec::len), Some(2));

    let (_, inbox) = app.get("/api/notifications", &tenant.manager).await;
    assert_eq!(kinds(&inbox), vec!["APPROVAL_REQUIRED"]);

    let steps = [
        (&tenant.manager, "approve", "BEKLEMEDE", json!("IT")),
        (&tenant.it, "approve", "BEKLEMEDE", json!("FINANCE")),
        (&tenant.finance, "approve", "ONAYLANDI", json!("PURCHASING")),
        (&tenant.purchasing, "start-purchase", "SATINALMA_SURECINDE", json!("PURCHASING")),
        (&tenant.purchasing, "complete", "TAMAMLANDI", Value::Null),
    ];
    for (token, action, status_text, step) in steps {
        let (status, body) = app
            .call(Method::POST, &format!("/api/requests/{id}/{action}"), Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::OK, "{action}: {body}");
        assert_eq!(body["status"], status_text, "{action}");
        assert_eq!(body["current_step"], step, "{action}");
    }

    let (_, detail) = app.get(&format!("/api/requests/{id}"), &tenant.admin).await;
    let decisions: Vec<&str> = detail["approvals"]
        .as_array()
        .expect("approvals")
        .iter()
        .map(|a| a["decision"].as_str().unwrap_or_default())
        .collect();
    assert_eq!(
        decisions,
        vec!["APPROVED", "APPROVED", "APPROVED", "PURCHASE_STARTED", "COMPLETED"]
    );

    let (_, inbox) = app.get("/api/notifications", &tenant.requester).await;
    let mut received = kinds(&inbox);
    received.sort();
    assert_eq!(
        received,
        vec![
            "PURCHASE_STARTED",
            "REQUEST_ADVANCED",
            "REQUEST_ADVANCED",
            "REQUEST_APPROVED",
            "REQUEST_COMPLETED"
        ]
    );
    let (_, inbox) = app.get("/api/notifications", &tenant.purchasing).await;
    assert_eq!(kinds(&inbox), vec!["APPROVAL_REQUIRED"]);

    let (status, body) = app
        .call(Method::POST, &format!("/api/requests/{id}/complete"), Some(tenant.purchasing.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "invalid_transition");
}

#[tokio::test]
async fn only_the_step_owner_may_decide() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let id = tenant.file_request(&app, "Monitors").await;
    let approve = format!("/api/requests/{id}/approve");

    let (status, body) = app.call(Method::POST, &approve, Some(tenant.it.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "wrong_role");

    let (status, body) = app.call(Method::POST, &approve, Some(tenant.requester.as_str()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "self_decision");

    let (status, body) = app.call(Method::POST, &approve, Some(tenant.admin.as_str()), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["current_step"], "IT");
}

#[tokio::test]
async fn managers_of_other_departments_cannot_approve() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;

    let (_, other) = app
        .post("/api/departments", &tenant.admin, json!({ "name": "Finance Ops" }))
        .await;
    let (status, _) = app
        .post(
            "/api/users",
            &tenant.admin,
            json!({
                "email": "other-manager@acme.test",
                "full_name": "Other",
                "password": support::PASSWORD,
                "role": "MANAGER",
                "department_id": support::id_of(&other),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, session) = app
        .login("acme", "other-manager@acme.test", support::PASSWORD)
        .await;
    let other_manager = support::token_of(&session);

    let id = tenant.file_request(&app, "Chairs").await;
    let (status, _) = app
        .call(Method::POST, &format!("/api/requests/{id}/approve"), Some(other_manager.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejection_needs_a_comment_and_is_final() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let id = tenant.file_request(&app, "Desk lamps").await;
    let reject = format!("/api/requests/{id}/reject");

    let (status, body) = app.post(&reject, &tenant.manager, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "validation_failed");

    let (status, body) = app
        .post(&reject, &tenant.manager, json!({ "comment": "Not in this quarter's budget" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "REDDEDILDI");
    assert_eq!(body["current_step"], Value::Null);
    assert_eq!(body["approvals"][0]["comment"], "Not in this quarter's budget");

    let (status, body) = app
        .call(Method::POST, &format!("/api/requests/{id}/approve"), Some(tenant.admin.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "invalid_transition");

    let (_, inbox) = app.get("/api/notifications?unread_only=true", &tenant.requester).await;
    assert_eq!(kinds(&inbox), vec!["REQUEST_REJECTED"]);
}

#[tokio::test]
async fn malformed_decision_body_is_not_read_as_a_missing_comment() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let id = tenant.file_request(&app, "Chairs").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/requests/{id}/reject"))
        .header(header::AUTHORIZATION, format!("Bearer {}", tenant.manager))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"comment": "Too expensive""#))
        .expect("request");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(error_code(&body), "validation_failed");
    let message = body["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("invalid decision body"), "{message}");

    let (_, detail) = app.get(&format!("/api/requests/{id}"), &tenant.manager).await;
    assert_eq!(detail["status"], "BEKLEMEDE");
    assert_eq!(detail["current_step"], "DEPARTMENT_MANAGER");
}

#[tokio::test]
async fn purchasing_may_reject_an_approved_request() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let id = tenant.file_request(&app, "Servers").await;
    for token in [&tenant.manager, &tenant.it, &tenant.finance] {
        let (status, _) = app
            .call(Method::POST, &format!("/api/requests/{id}/approve"), Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .call(Method::POST, &format!("/api/requests/{id}/start-purchase"), Some(tenant.finance.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "wrong_role");

    let (status, body) = app
        .post(
            &format!("/api/requests/{id}/reject"),
            &tenant.purchasing,
            json!({ "comment": "Vendor discontinued the model" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REDDEDILDI");
}

#[tokio::test]
async fn listing_respects_visibility_and_scopes() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let first = tenant.file_request(&app, "First").await;
    tenant.file_request(&app, "Second").await;

    let (status, body) = app
        .post(
            "/api/requests",
            &tenant.it,
            json!({
                "title": "IT's own",
                "department_id": tenant.department_id,
                "items": [{ "description": "Cable", "quantity": 3, "unit_price_cents": 500 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, page) = app.get("/api/requests", &tenant.requester).await;
    assert_eq!(page["total"], 2);

    let (_, page) = app.get("/api/requests?scope=mine", &tenant.it).await;
    assert_eq!(page["total"], 1);

    let (_, page) = app.get("/api/requests", &tenant.finance).await;
    assert_eq!(page["total"], 3);

    let (_, page) = app.get("/api/requests?scope=awaiting_me", &tenant.manager).await;
    assert_eq!(page["total"], 3);
    let (_, page) = app.get("/api/requests?scope=awaiting_me", &tenant.it).await;
    assert_eq!(page["total"], 0);

    app.call(Method::POST, &format!("/api/requests/{first}/approve"), Some(tenant.manager.as_str()), None)
        .await;
    let (_, page) = app.get("/api/requests?scope=awaiting_me", &tenant.it).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], first);

    let (_, page) = app.get("/api/requests?limit=1&offset=1", &tenant.admin).await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["limit"], 1);

    let (_, page) = app.get("/api/requests?status=BEKLEMEDE", &tenant.admin).await;
    assert_eq!(page["total"], 3);
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;

    let cases = [
        json!({ "title": "", "items": [{ "description": "x", "quantity": 1, "unit_price_cents": 1 }] }),
        json!({ "title": "No items", "items": [] }),
        json!({ "title": "Zero", "items": [{ "description": "x", "quantity": 0, "unit_price_cents": 1 }] }),
        json!({ "title": "Negative", "items": [{ "description": "x", "quantity": 1, "unit_price_cents": -5 }] }),
        json!({ "title": "No price", "items": [{ "description": "x", "quantity": 1 }] }),
        json!({ "title": "Bad product", "items": [{ "product_id": 999, "quantity": 1 }] }),
    ];
    for case in cases {
        let (status, body) = app.post("/api/requests", &tenant.requester, case.clone()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case} -> {body}");
    }

    let (status, _) = app
        .post(
            "/api/requests",
            &tenant.admin,
            json!({ "title": "Admin has no department", "items": [{ "description": "x", "quantity": 1, "unit_price_cents": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn catalogue_products_fill_in_price_and_currency() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let (status, eur) = app
        .post(
            "/api/products",
            &tenant.purchasing,
            json!({ "name": "Docking station", "category": "hardware", "unit_price_cents": 12000, "currency": "eur" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{eur}");
    let (_, usd) = app
        .post(
            "/api/products",
            &tenant.admin,
            json!({ "name": "Headset", "category": "peripherals", "unit_price_cents": 5000, "currency": "USD" }),
        )
        .await;

    let (status, body) = app
        .post(
            "/api/requests",
            &tenant.requester,
            json!({ "title": "Desk setup", "items": [{ "product_id": support::id_of(&eur), "quantity": 3 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["total_cents"], 36000);
    assert_eq!(body["items"][0]["description"], "Docking station");

    let (status, body) = app
        .post(
            "/api/requests",
            &tenant.requester,
            json!({
                "title": "Mixed",
                "items": [
                    { "product_id": support::id_of(&eur), "quantity": 1 },
                    { "product_id": support::id_of(&usd), "quantity": 1 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn requester_can_withdraw_untouched_requests_only() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    let untouched = tenant.file_request(&app, "Withdraw me").await;
    let decided = tenant.file_request(&app, "Keep me").await;

    let (status, _) = app.delete(&format!("/api/requests/{untouched}"), &tenant.manager).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&format!("/api/requests/{untouched}"), &tenant.requester).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/requests/{untouched}"), &tenant.requester).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.call(Method::POST, &format!("/api/requests/{decided}/approve"), Some(tenant.manager.as_str()), None)
        .await;
    let (status, body) = app.delete(&format!("/api/requests/{decided}"), &tenant.requester).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "conflict");
}

#[tokio::test]
async fn managers_own_requests_fall_back_to_admins() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;

    let (status, body) = app
        .post(
            "/api/requests",
            &tenant.manager,
            json!({
                "title": "Standing desk",
                "justification": "ergonomics",
                "items": [{ "description": "Desk", "quantity": 1, "unit_price_cents": 900000 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["current_step"], "DEPARTMENT_MANAGER");

    let (_, inbox) = app.get("/api/notifications", &tenant.admin).await;
    assert_eq!(kinds(&inbox), vec!["APPROVAL_REQUIRED"]);
    let (_, inbox) = app.get("/api/notifications", &tenant.manager).await;
    assert!(kinds(&inbox).is_empty());
}

#[tokio::test]
async fn notifications_can_be_marked_read() {
    let app = TestApp::new().await;
    let tenant = Tenant::create(&app, "acme").await;
    tenant.file_request(&app, "One").await;
    tenant.file_request(&app, "Two").await;

    let (_, count) = app.get("/api/notifications/unread-count", &tenant.manager).await;
    assert_eq!(count["unread"], 2);

    let (_, inbox) = app.get("/api/notifications", &tenant.manager).await;
    let first = inbox[0]["id"].as_i64().expect("id");
    let (status, _) = app
        .call(Method::POST, &format!("/api/notifications/{first}/read"), Some(tenant.manager.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call(Method::POST, &format!("/api/notifications/{first}/read"), Some(tenant.it.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, count) = app.get("/api/notifications/unread-count", &tenant.manager).await;
    assert_eq!(count["unread"], 1);

    let (_, marked) = app
        .call(Method::POST, "/api/notifications/read-all", Some(tenant.manager.as_str()), None)
        .await;
    assert_eq!(marked["updated"], 1);
    let (_, inbox) = app.get("/api/notifications?unread_only=true", &tenant.manager).await;
    assert_eq!(inbox.as_array().map(Vec::len), Some(0));
}

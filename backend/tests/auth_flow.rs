mod support;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use support::{error_code, id_of, json_body, TestApp, PASSWORD};

#[tokio::test]
async fn register_sets_session_cookie_and_me_works_with_it() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "company_name": "Acme",
                "slug": "acme",
                "admin_name": "Ada",
                "email": "Ada@Acme.test",
                "password": PASSWORD,
            })
            .to_string(),
        ))
        .expect("request");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie")
        .to_string();
    assert!(cookie.starts_with("procurement_session="));
    assert!(cookie.contains("HttpOnly"));

    let body = json_body(response).await;
    assert_eq!(body["user"]["role"], "ADMIN");
    assert_eq!(body["user"]["email"], "ada@acme.test");
    assert!(body["user"].get("password_hash").is_none());

    let pair = cookie.split(';').next().expect("cookie pair").to_string();
    let me = Request::builder()
        .uri("/api/auth/me")
        .header(header::COOKIE, pair)
        .body(Body::empty())
        .expect("request");
    let response = app.send(me).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["company"]["slug"], "acme");
}

#[tokio::test]
async fn duplicate_slug_is_a_conflict() {
    let app = TestApp::new().await;
    app.register("acme").await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "company_name": "Other",
                "slug": "ACME",
                "admin_name": "Bob",
                "email": "bob@other.test",
                "password": PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "conflict");
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "company_name": "Acme",
                "slug": "acme",
                "admin_name": "Ada",
                "email": "ada@acme.test",
                "password": "short",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "weak_password");
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let app = TestApp::new().await;
    app.register("acme").await;

    let (wrong_password, body_a) = app.login("acme", "admin@acme.test", "not-the-password").await;
    let (unknown_email, body_b) = app.login("acme", "ghost@acme.test", PASSWORD).await;
    let (unknown_company, body_c) = app.login("nope", "admin@acme.test", PASSWORD).await;

    for (status, body) in [(wrong_password, body_a), (unknown_email, body_b), (unknown_company, body_c)] {
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), "invalid_credentials");
    }

    let (status, _) = app.login("acme", "ADMIN@acme.test", PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "unauthenticated");

    let (status, body) = app.get("/api/auth/me", "garbage.token.value").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "invalid_session");
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .body(Body::empty())
        .expect("request");
    let response = app.send(request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("set-cookie");
    assert!(cookie.starts_with("procurement_session="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn change_password_replaces_the_old_one() {
    let app = TestApp::new().await;
    let token = app.register("acme").await;

    let (status, body) = app
        .post(
            "/api/auth/password",
            &token,
            json!({ "current_password": "wrong-password", "new_password": "new-password-123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    let (status, _) = app
        .post(
            "/api/auth/password",
            &token,
            json!({ "current_password": PASSWORD, "new_password": "new-password-123" }),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.login("acme", "admin@acme.test", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.login("acme", "admin@acme.test", "new-password-123").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deactivated_users_lose_access() {
    let app = TestApp::new().await;
    let admin = app.register("acme").await;
    let (status, user) = app
        .post(
            "/api/users",
            &admin,
            json!({ "email": "u@acme.test", "full_name": "U", "password": PASSWORD, "role": "USER" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, session) = app.login("acme", "u@acme.test", PASSWORD).await;
    let token = support::token_of(&session);

    let (status, _) = app.delete(&format!("/api/users/{}", id_of(&user)), &admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "account_disabled");

    let (status, body) = app.login("acme", "u@acme.test", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "account_disabled");
}

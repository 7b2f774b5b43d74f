//! Signup/signin/session flow through the HTTP boundary.

mod common;

use common::TestApp;
use reqwest::StatusCode;

#[tokio::test]
async fn signup_returns_the_projected_user_and_sets_a_session_cookie() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let res = app.signup(&client, "driver@example.com", "password123").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let set_cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .expect("session cookie is set")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("session="));
    assert!(set_cookie.contains("HttpOnly"));

    let body: serde_json::Value = res.json().await.unwrap();
    let obj = body.as_object().unwrap();

    // Strict whitelist: the response carries exactly id and email, never the
    // password hash.
    assert_eq!(obj.len(), 2);
    assert!(obj["id"].is_i64());
    assert_eq!(obj["email"], "driver@example.com");
}

#[tokio::test]
async fn whoami_reports_the_signed_in_user() {
    let app = TestApp::spawn().await;
    let client = app.client();

    app.signup(&client, "driver@example.com", "password123").await;

    let res = client
        .get(app.url("/auth/whoami"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "driver@example.com");
}

#[tokio::test]
async fn whoami_without_a_session_is_unauthorized() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let res = client
        .get(app.url("/auth/whoami"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let first = app.signup(&client, "driver@example.com", "password123").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.signup(&client, "driver@example.com", "otherpassword").await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn signin_with_an_unknown_email_is_not_found() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let res = app.signin(&client, "nobody@example.com", "password123").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signin_with_a_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    let client = app.client();

    app.signup(&client, "driver@example.com", "password123").await;

    let res = app.signin(&client, "driver@example.com", "notmypassword").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signin_establishes_a_session_for_a_fresh_client() {
    let app = TestApp::spawn().await;

    let signup_client = app.client();
    app.signup(&signup_client, "driver@example.com", "password123")
        .await;

    // A separate client with an empty cookie jar, as a new browser would be.
    let signin_client = app.client();
    let res = app
        .signin(&signin_client, "driver@example.com", "password123")
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = signin_client
        .get(app.url("/auth/whoami"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn signout_clears_the_session() {
    let app = TestApp::spawn().await;
    let client = app.client();

    app.signup(&client, "driver@example.com", "password123").await;

    let res = client
        .post(app.url("/auth/signout"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(app.url("/auth/whoami"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_signup_payloads_are_rejected() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let res = client
        .post(app.url("/auth/signup"))
        .json(&serde_json::json!({ "email": "not-an-email", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = client
        .post(app.url("/auth/signup"))
        .json(&serde_json::json!({ "email": "driver@example.com", "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

//! User lookup and administration through the HTTP boundary.

mod common;

use common::TestApp;
use reqwest::StatusCode;

async fn signed_up_user_id(app: &TestApp, client: &reqwest::Client, email: &str) -> i64 {
    let body: serde_json::Value = app
        .signup(client, email, "password123")
        .await
        .json()
        .await
        .unwrap();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn find_user_returns_the_projected_user() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let id = signed_up_user_id(&app, &client, "driver@example.com").await;

    let res = client
        .get(app.url(&format!("/auth/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let obj = body.as_object().unwrap();
    assert_eq!(obj["email"], "driver@example.com");
    assert_eq!(obj.len(), 2);
}

#[tokio::test]
async fn finding_an_unknown_user_is_not_found() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let res = client.get(app.url("/auth/999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_users_filters_by_email() {
    let app = TestApp::spawn().await;
    let client = app.client();

    signed_up_user_id(&app, &client, "first@example.com").await;
    signed_up_user_id(&app, &app.client(), "second@example.com").await;

    let res = client
        .get(app.url("/auth?email=first@example.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["email"], "first@example.com");

    let res = client.get(app.url("/auth")).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn updating_a_user_changes_their_email() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let id = signed_up_user_id(&app, &client, "driver@example.com").await;

    let res = client
        .patch(app.url(&format!("/auth/{}", id)))
        .json(&serde_json::json!({ "email": "renamed@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "renamed@example.com");
}

#[tokio::test]
async fn an_updated_password_signs_in_and_the_old_one_does_not() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let id = signed_up_user_id(&app, &client, "driver@example.com").await;

    let res = client
        .patch(app.url(&format!("/auth/{}", id)))
        .json(&serde_json::json!({ "password": "freshpassword" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fresh_client = app.client();
    let res = app
        .signin(&fresh_client, "driver@example.com", "freshpassword")
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .signin(&fresh_client, "driver@example.com", "password123")
        .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn a_session_for_a_removed_user_no_longer_resolves() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let id = signed_up_user_id(&app, &client, "driver@example.com").await;

    let res = client
        .delete(app.url(&format!("/auth/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // The cookie still points at a live session record, but the user behind
    // it is gone; the request is anonymous.
    let res = client.get(app.url("/auth/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn removing_a_user_returns_the_removed_record() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let id = signed_up_user_id(&app, &client, "driver@example.com").await;

    let res = client
        .delete(app.url(&format!("/auth/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["email"], "driver@example.com");

    let res = client
        .get(app.url(&format!("/auth/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

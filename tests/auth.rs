mod common;

use reqwest::header::SET_COOKIE;
use serde_json::{json, Value};

#[tokio::test]
async fn register_returns_token_and_refresh_cookie() {
    let app = common::spawn_app().await;

    let response = app.register("alice").await;
    assert_eq!(response.status().as_u16(), 201);

    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("missing cookie")
        .to_string();
    assert!(cookie.starts_with("refresh_token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/refresh"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["item"]["token_type"], "Bearer");
    assert!(body["item"]["access_token"].as_str().unwrap().len() > 20);
    assert!(body["id"].is_string());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = common::spawn_app().await;
    app.signed_up("alice").await;

    let response = app.register("alice").await;
    assert_eq!(response.status().as_u16(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "cu-101");
    assert!(body["message"].as_str().unwrap().ends_with("[cu-101]"));
}

#[tokio::test]
async fn invalid_registration_is_rejected() {
    let app = common::spawn_app().await;

    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({"username": "al", "email": "nope", "password": "short"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "cu-100");
}

#[tokio::test]
async fn login_checks_password() {
    let app = common::spawn_app().await;
    app.signed_up("bob").await;

    let ok = app
        .client
        .post(app.url("/login"))
        .json(&json!({"username": "bob", "password": "correct-horse"}))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status().as_u16(), 200);
    let session = common::session_from(ok).await;
    assert!(!session.access_token.is_empty());

    for (username, password) in [("bob", "wrong-horse"), ("nobody", "correct-horse")] {
        let response = app
            .client
            .post(app.url("/login"))
            .json(&json!({"username": username, "password": password}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "ln-202");
    }
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let app = common::spawn_app().await;
    let session = app.signed_up("carol").await;

    let response = app.refresh(&session.refresh_cookie).await;
    assert_eq!(response.status().as_u16(), 200);
    let refreshed = common::session_from(response).await;

    let models = app.get_authed("/models", &refreshed.access_token).await;
    assert_eq!(models.status().as_u16(), 200);
}

#[tokio::test]
async fn refresh_rejects_deactivated_users() {
    let app = common::spawn_app().await;
    let session = app.signed_up("erin").await;
    assert!(app.store.set_user_active("erin", false));

    let response = app.refresh(&session.refresh_cookie).await;
    assert_eq!(response.status().as_u16(), 401);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "rf-400");
}

#[tokio::test]
async fn refresh_rejects_access_tokens_and_missing_cookie() {
    let app = common::spawn_app().await;
    let session = app.signed_up("dave").await;

    let wrong_kind = app
        .refresh(&format!("refresh_token={}", session.access_token))
        .await;
    assert_eq!(wrong_kind.status().as_u16(), 401);
    let body: Value = wrong_kind.json().await.unwrap();
    assert_eq!(body["code"], "rf-400");

    let missing = app.client.post(app.url("/refresh")).send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_a_valid_access_token() {
    let app = common::spawn_app().await;
    let session = app.signed_up("erin").await;

    let missing = app.client.get(app.url("/chat-history")).send().await.unwrap();
    assert_eq!(missing.status().as_u16(), 401);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["code"], "am-300");

    let garbage = app.get_authed("/chat-history", "not-a-token").await;
    assert_eq!(garbage.status().as_u16(), 401);
    let body: Value = garbage.json().await.unwrap();
    assert_eq!(body["code"], "am-301");

    let refresh_value = session
        .refresh_cookie
        .trim_start_matches("refresh_token=")
        .to_string();
    let wrong_kind = app.get_authed("/chat-history", &refresh_value).await;
    assert_eq!(wrong_kind.status().as_u16(), 401);
}

#[tokio::test]
async fn models_lists_the_active_catalog() {
    let app = common::spawn_app().await;
    let session = app.signed_up("frank").await;

    let response = app.get_authed("/models", &session.access_token).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let versions: Vec<&str> = body["list"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["version"].as_str().unwrap())
        .collect();
    assert!(versions.contains(&"gpt-4o"));
    assert_eq!(versions.len(), 4);
}

mod common;

use common::TestApp;
use serde_json::{json, Value};

fn payload(app: &TestApp, user_id: &str, placement: &str) -> Value {
    json!({
        "userId": user_id,
        "username": "agent_smith",
        "filePath": app.dir.path().join(format!("storage/{}/wm.png", user_id)),
        "sha256": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        "placement": placement,
        "opacity": 60,
        "margin": 24
    })
}

#[tokio::test]
async fn unknown_user_returns_null() {
    let app = TestApp::spawn().await;

    let response = app.get("/watermark/42").await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn save_then_fetch_watermark() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/watermark", &payload(&app, "42", "bottom-right")).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"ok": true}));

    let body: Value = app.get("/watermark/42").await.json().await.unwrap();
    assert_eq!(body["userId"], "42");
    assert_eq!(body["placement"], "bottom-right");
    assert_eq!(body["opacity"], 60);
    assert_eq!(body["margin"], 24);
    assert!(body["updatedAt"].as_i64().unwrap() > 0);

    assert!(app.dir.path().join("storage/42").is_dir());
}

#[tokio::test]
async fn second_save_replaces_record_and_keeps_user() {
    let app = TestApp::spawn().await;

    app.post_json("/watermark", &payload(&app, "7", "top-left")).await;
    let mut second = payload(&app, "7", "center");
    second["username"] = json!("renamed");
    let response = app.post_json("/watermark", &second).await;
    assert_eq!(response.status(), 200);

    let body: Value = app.get("/watermark/7").await.json().await.unwrap();
    assert_eq!(body["placement"], "center");

    let user = app.db.get_user("7").await.unwrap().unwrap();
    assert_eq!(user.username.as_deref(), Some("agent_smith"));
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = TestApp::spawn().await;

    let mut missing_sha = payload(&app, "1", "center");
    missing_sha["sha256"] = json!("");
    let mut string_opacity = payload(&app, "1", "center");
    string_opacity["opacity"] = json!("60");
    let mut no_user = payload(&app, "1", "center");
    no_user.as_object_mut().unwrap().remove("userId");

    for body in [missing_sha, string_opacity, no_user] {
        let response = app.post_json("/watermark", &body).await;
        assert_eq!(response.status(), 400);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "Invalid payload");
    }

    let response = app
        .client
        .post(app.url("/watermark"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    assert!(app.db.get_watermark("1").await.unwrap().is_none());
}

#[tokio::test]
async fn database_failures_return_500_with_operation_name() {
    let app = TestApp::spawn().await;
    let body = payload(&app, "42", "bottom-right");
    app.db.close().await;

    let response = app.get("/watermark/42").await;
    assert_eq!(response.status(), 500);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Failed to get watermark");

    let response = app.post_json("/watermark", &body).await;
    assert_eq!(response.status(), 500);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Failed to save watermark");
}

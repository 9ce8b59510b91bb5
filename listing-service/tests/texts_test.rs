mod common;

use common::TestApp;
use serde_json::{json, Value};

fn request(n: u32) -> Value {
    json!({
        "baseFacts": {
            "structured": {"rooms": 2, "area": "54 м²", "district": "Хамовники"}
        },
        "baseDescription": "Двухкомнатная квартира в Хамовниках",
        "n": n,
        "styleHints": "спокойно"
    })
}

#[tokio::test]
async fn returns_distinct_variants_from_model() {
    let app = TestApp::spawn().await;
    app.mock_completion(
        &json!([
            "Светлая двухкомнатная квартира с видом на тихий двор",
            "Светлая двухкомнатная квартира с видом на тихий двор!",
            "Удобная планировка рядом с парком и метро для семьи"
        ])
        .to_string(),
    )
    .await;

    let response = app.post_json("/texts/generate", &request(2)).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(
        body["variants"],
        json!([
            "Светлая двухкомнатная квартира с видом на тихий двор",
            "Удобная планировка рядом с парком и метро для семьи"
        ])
    );
    assert_eq!(app.llm_calls().await, 1);
}

#[tokio::test]
async fn failing_model_falls_back_after_two_attempts() {
    let app = TestApp::spawn().await;
    app.mock_completion_status(500).await;

    let body: Value = app
        .post_json("/texts/generate", &request(3))
        .await
        .json()
        .await
        .unwrap();

    let variants = body["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 3);
    for (i, variant) in variants.iter().enumerate() {
        let expected = format!("Двухкомнатная квартира в Хамовниках\n\n[Вариант {} • ", i + 1);
        assert!(variant.as_str().unwrap().starts_with(&expected));
    }
    assert_eq!(app.llm_calls().await, 2);

    let trace: Value = app.get("/llm/last").await.json().await.unwrap();
    assert_eq!(trace["fallbackCount"], 3);
    assert_eq!(trace["attempts"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_bodies_yield_empty_list() {
    let app = TestApp::spawn().await;

    let mut zero = request(1);
    zero["n"] = json!(0);
    let mut too_many = request(1);
    too_many["n"] = json!(101);
    let mut empty_description = request(1);
    empty_description["baseDescription"] = json!("");
    let no_facts = json!({"baseDescription": "x", "n": 1});

    for body in [zero, too_many, empty_description, no_facts] {
        let response = app.post_json("/texts/generate", &body).await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"ok": true, "variants": []}));
    }
    assert_eq!(app.llm_calls().await, 0);
}

#[tokio::test]
async fn missing_key_still_returns_n_variants() {
    let app = TestApp::spawn_with_key("").await;

    let body: Value = app
        .post_json("/texts/generate", &request(2))
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["variants"].as_array().unwrap().len(), 2);
    assert_eq!(app.llm_calls().await, 0);
}

#[tokio::test]
async fn llm_debug_describes_provider() {
    let app = TestApp::spawn_with_key("").await;

    let body: Value = app.get("/llm/debug").await.json().await.unwrap();

    assert_eq!(body["provider"], "groq");
    assert_eq!(body["model"], "llama-test");
    assert_eq!(body["baseURL"], app.llm.uri());
    assert_eq!(body["hasKey"], false);
}

#[tokio::test]
async fn llm_last_is_empty_before_first_run() {
    let app = TestApp::spawn().await;

    let body: Value = app.get("/llm/last").await.json().await.unwrap();

    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn llm_test_round_trip() {
    let app = TestApp::spawn().await;
    app.mock_completion(r#"{"variants": ["ok"]}"#).await;

    let body: Value = app.get("/llm/test").await.json().await.unwrap();

    assert_eq!(body["ok"], true);
    assert_eq!(body["model"], "llama-test");
    assert_eq!(body["sample"], r#"{"variants": ["ok"]}"#);
}

#[tokio::test]
async fn llm_test_reports_rate_limit() {
    let app = TestApp::spawn().await;
    app.mock_completion_status(429).await;

    let body: Value = app.get("/llm/test").await.json().await.unwrap();

    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Rate limited");
}

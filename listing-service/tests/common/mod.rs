#![allow(dead_code)]

use listing_service::config::{DatabaseConfig, ListingConfig, LlmConfig};
use listing_service::services::metrics::init_metrics;
use listing_service::services::Database;
use listing_service::startup::Application;
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Once};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static TRACING: Once = Once::new();

fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: Arc<Database>,
    pub llm: MockServer,
    pub client: reqwest::Client,
    /// Scratch space for databases, watermark files and archives.
    pub dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_key("test-groq-key").await
    }

    /// Spawn with the given Groq key; an empty key disables the LLM.
    pub async fn spawn_with_key(api_key: &str) -> Self {
        init_test_tracing();
        init_metrics();

        let dir = TempDir::new().expect("Failed to create temp dir");
        let llm = MockServer::start().await;

        let config = ListingConfig {
            common: CoreConfig {
                host: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 0,
            },
            service_name: "listing-service-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: format!("sqlite://{}/data/db.sqlite", dir.path().display()),
                max_connections: 2,
                min_connections: 1,
            },
            llm: LlmConfig {
                api_key: Secret::new(api_key.to_string()),
                model: "llama-test".to_string(),
                base_url: llm.uri(),
                temperature: 1.5,
                top_p: 1.0,
                max_completion_tokens: 1000,
                timeout_secs: 5,
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            llm,
            client,
            dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Answer every chat completion with `content` as the model message.
    pub async fn mock_completion(&self, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(content)))
            .mount(&self.llm)
            .await;
    }

    pub async fn mock_completion_status(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.llm)
            .await;
    }

    pub async fn llm_calls(&self) -> usize {
        self.llm
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 100, "completion_tokens": 50}
    })
}

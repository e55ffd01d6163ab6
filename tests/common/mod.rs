use std::net::SocketAddr;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use ohqueue::config::{Config, ProxyConfig};
use ohqueue::state::SharedState;

/// A running test server instance with its own in-memory queues.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    #[allow(dead_code)]
    pub state: SharedState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Join the default queue, return (body, status).
    pub async fn add(&self, name: &str, section: &str, topic: &str, location: &str) -> (Value, StatusCode) {
        self.post(
            "/api/queue/add",
            &json!({ "name": name, "section": section, "topic": topic, "location": location }),
        )
        .await
    }

    /// Join the default queue and return the new id.
    #[allow(dead_code)]
    pub async fn join(&self, name: &str) -> u64 {
        let (body, status) = self.add(name, "B1", "Concepts", "IN_PERSON").await;
        assert_eq!(status, StatusCode::OK, "add failed: {body}");
        body.as_u64().expect("add should return a numeric id")
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// POST without a body, as the TA dashboard does for `clear`.
    #[allow(dead_code)]
    pub async fn post_empty(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        max_body_size: 16 * 1024,
        poll_interval_ms: 5000,
        max_courses: 8,
        proxy: None,
    }
}

/// Spawn a test app with default configuration.
pub async fn spawn_app() -> TestApp {
    spawn_with_config(test_config()).await
}

/// Spawn a test app whose `/proxy/*` routes forward to `backend_url`.
#[allow(dead_code)]
pub async fn spawn_proxy(backend_url: &str) -> TestApp {
    let mut config = test_config();
    config.proxy = Some(ProxyConfig::new(backend_url, Duration::from_secs(5)).unwrap());
    spawn_with_config(config).await
}

pub async fn spawn_with_config(config: Config) -> TestApp {
    let (app, state) = ohqueue::build_app(config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        state,
    }
}

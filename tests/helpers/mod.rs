//! Test helpers: spawn the gateway on an ephemeral port, pointed at a
//! wiremock stand-in for the platform backend.
#![allow(dead_code)] // shared between test binaries; not all use everything

use astro_admin::app_state::AppState;
use astro_admin::config::AppConfig;
use astro_admin::routes;
use astro_admin::services::backend::BackendApi;
use wiremock::MockServer;

/// Session token the tests present; the mock backend accepts anything.
pub const TEST_TOKEN: &str = "test-session-token";

pub struct TestApp {
    pub base_url: String,
    pub backend: MockServer,
    pub client: reqwest::Client,
}

/// Spawn with the debounce window disabled; most tests want previews to run
/// immediately.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_debounce(0).await
}

pub async fn spawn_app_with_debounce(debounce_ms: u64) -> TestApp {
    let backend = MockServer::start().await;

    let config = AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        backend_base_url: backend.uri(),
        backend_timeout_secs: 5,
        session_ttl_secs: 3600,
        session_cookie_secure: false,
        selection_debounce_ms: debounce_ms,
        image_base_url: None,
    };

    let api = BackendApi::new(&config).expect("Failed to build backend client");
    let state = AppState::new(api, config);
    // No Prometheus handle: a global recorder cannot be installed per test.
    let app = routes::router(state, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    // Redirects stay observable; the guard tests assert on the 307s.
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build test client");

    TestApp {
        base_url: format!("http://{addr}"),
        backend,
        client,
    }
}

/// Spawn the gateway pointed at a port nothing listens on, for testing the
/// unreachable-backend paths. Short client timeout keeps failures fast.
pub async fn spawn_app_without_backend() -> (String, reqwest::Client) {
    let config = AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        backend_base_url: "http://127.0.0.1:9".to_string(),
        backend_timeout_secs: 1,
        session_ttl_secs: 3600,
        session_cookie_secure: false,
        selection_debounce_ms: 0,
        image_base_url: None,
    };

    let api = BackendApi::new(&config).expect("Failed to build backend client");
    let state = AppState::new(api, config);
    let app = routes::router(state, None);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build test client");

    (format!("http://{addr}"), client)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET an API path with the test session token.
    pub async fn api_get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(TEST_TOKEN)
            .send()
            .await
            .expect("Request failed")
    }

    /// POST a JSON body to an API path with the test session token.
    pub async fn api_post(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(TEST_TOKEN)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }
}

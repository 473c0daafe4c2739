use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the platform backend REST API
    pub backend_base_url: String,

    /// Request timeout for backend calls, in seconds
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Session cookie lifetime, in seconds
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Whether the session cookie is marked Secure (enable behind TLS)
    #[serde(default)]
    pub session_cookie_secure: bool,

    /// Debounce window for selection preview requests, in milliseconds
    #[serde(default = "default_selection_debounce_ms")]
    pub selection_debounce_ms: u64,

    /// Optional prefix for relative puja image paths returned by the backend
    #[serde(default)]
    pub image_base_url: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_backend_timeout_secs() -> u64 {
    30
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_selection_debounce_ms() -> u64 {
    400
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}

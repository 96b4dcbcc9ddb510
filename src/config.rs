//! Application configuration loaded from environment variables.
//!
//! All Shopify credentials are required at startup; a missing variable is a
//! startup failure rather than a runtime surprise halfway through an OAuth
//! handshake.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shopify API key (public client identifier)
    pub shopify_api_key: String,
    /// Shopify API secret (shared secret for HMAC and token exchange)
    pub shopify_api_secret: String,
    /// OAuth redirect URI registered with Shopify
    pub shopify_redirect_uri: String,
    /// Public base URL of this app (webhook callback address, dashboard)
    pub app_url: String,
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            shopify_api_key: "test_api_key".to_string(),
            shopify_api_secret: "test_api_secret".to_string(),
            shopify_redirect_uri: "http://localhost:8080/api/shop/callback".to_string(),
            app_url: "http://localhost:8080".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In production the secrets are injected as environment variables by the
    /// deployment platform; for local development a `.env` file works too.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            shopify_api_key: env::var("SHOPIFY_API_KEY")
                .map_err(|_| ConfigError::Missing("SHOPIFY_API_KEY"))?,
            shopify_api_secret: env::var("SHOPIFY_API_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SHOPIFY_API_SECRET"))?,
            shopify_redirect_uri: env::var("SHOPIFY_REDIRECT_URI")
                .map_err(|_| ConfigError::Missing("SHOPIFY_REDIRECT_URI"))?,
            app_url: env::var("SHOPIFY_APP_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SHOPIFY_APP_URL"))?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

// SPDX-License-Identifier: MIT

//! Shopify API client for the OAuth token exchange and webhook registration.
//!
//! Handles:
//! - Exchanging the temporary authorization code for a permanent access token
//! - Registering the shop/update webhook subscription
//!
//! Both calls are per-shop: Shopify's OAuth and Admin endpoints live under
//! `https://{shop-domain}/admin/...`.

use crate::error::AppError;
use serde::Deserialize;
use std::time::Duration;

/// Admin API version used for webhook registration.
const SHOPIFY_API_VERSION: &str = "2021-07";

/// Timeout for every outbound call; a slow shop must not pin a request.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Shopify API client.
#[derive(Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
    /// Public base URL of this app, used to build the webhook callback address.
    app_url: String,
    /// When set, replaces the per-shop `https://{shop}` base for every call.
    /// Lets tests point the client at a local server.
    base_url_override: Option<String>,
}

impl ShopifyClient {
    /// Create a new Shopify client with OAuth credentials.
    pub fn new(api_key: String, api_secret: String, app_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            api_secret,
            app_url,
            base_url_override: None,
        }
    }

    /// Route all API calls to a fixed base URL instead of the shop's domain.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Base URL for a shop's Admin endpoints.
    fn shop_base(&self, shop: &str) -> String {
        match &self.base_url_override {
            Some(base) => base.clone(),
            None => format!("https://{}", shop),
        }
    }

    /// Exchange a temporary authorization code for a permanent access token.
    ///
    /// POST https://{shop}/admin/oauth/access_token
    pub async fn exchange_code(&self, shop: &str, code: &str) -> Result<String, AppError> {
        let url = format!("{}/admin/oauth/access_token", self.shop_base(shop));

        let body = serde_json::json!({
            "client_id": self.api_key,
            "client_secret": self.api_secret,
            "code": code,
        });

        let response = self
            .http
            .post(&url)
            .timeout(OUTBOUND_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ShopifyApi(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ShopifyApi(format!(
                "Token exchange returned HTTP {}: {}",
                status, body
            )));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ShopifyApi(format!("JSON parse error: {}", e)))?;

        Ok(token.access_token)
    }

    /// Subscribe this app to shop/update events for a shop.
    ///
    /// POST https://{shop}/admin/api/{version}/webhooks.json
    /// X-Shopify-Access-Token: {access_token}
    ///
    /// Shopify answers 201 Created on success; anything else is surfaced as a
    /// failed side effect to the caller.
    pub async fn register_webhook(&self, shop: &str, access_token: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/admin/api/{}/webhooks.json",
            self.shop_base(shop),
            SHOPIFY_API_VERSION
        );
        let callback_address = format!("{}/api/shop/webhooks/callback", self.app_url);

        let body = serde_json::json!({
            "webhook": {
                "topic": "shop/update",
                "address": callback_address,
                "format": "json",
            }
        });

        let response = self
            .http
            .post(&url)
            .timeout(OUTBOUND_TIMEOUT)
            .header("X-Shopify-Access-Token", access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::ShopifyApi(format!("Webhook registration request failed: {}", e))
            })?;

        if response.status().as_u16() != 201 {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ShopifyApi(format!(
                "Webhook registration returned HTTP {}: {}",
                status, body
            )));
        }

        tracing::info!(shop, "Webhook registered for shop/update");
        Ok(())
    }
}

/// Token exchange response from Shopify.
#[derive(Debug, Clone, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

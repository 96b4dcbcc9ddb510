// SPDX-License-Identifier: MIT

//! Webhook routes: registration with Shopify and the delivery callback.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/shop/webhooks/register", post(register))
        .route("/api/shop/webhooks/callback", post(callback))
}

/// Request body for registering the shop/update webhook.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "shop must not be empty"))]
    pub shop: String,
    #[validate(length(min = 1, message = "accessToken must not be empty"))]
    pub access_token: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

/// Register the shop/update webhook with Shopify for a shop/token pair.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .shopify
        .register_webhook(&payload.shop, &payload.access_token)
        .await?;

    Ok(Json(RegisterResponse {
        message: "Webhook registered successfully".to_string(),
    }))
}

/// Webhook delivery envelope from Shopify.
#[derive(Deserialize, Debug)]
pub struct WebhookEnvelope {
    pub topic: String,
    #[serde(default)]
    pub body: serde_json::Value,
}

/// Payload of a shop/update delivery.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ShopUpdatePayload {
    shop_id: String,
    #[serde(default)]
    shop_name: Option<String>,
    #[serde(default)]
    shop_email: Option<String>,
}

/// Handle incoming webhook deliveries (POST).
///
/// Unrecognized topics are acknowledged with 200 so Shopify does not retry.
/// Store failures answer 500, which makes Shopify's delivery system retry
/// per its own policy; there are no retries on our side.
async fn callback(
    State(state): State<Arc<AppState>>,
    Json(envelope): Json<WebhookEnvelope>,
) -> Result<StatusCode> {
    if envelope.topic != "shop/update" {
        tracing::debug!(topic = %envelope.topic, "Ignoring unhandled webhook topic");
        return Ok(StatusCode::OK);
    }

    let payload: ShopUpdatePayload = serde_json::from_value(envelope.body)
        .map_err(|e| AppError::Validation(format!("Malformed shop/update body: {}", e)))?;

    match state
        .db
        .update_shop_profile(&payload.shop_id, payload.shop_name, payload.shop_email)
        .await?
    {
        Some(record) => {
            tracing::info!(shop = %record.shop_id, "Shop profile refreshed from webhook");
        }
        None => {
            // Delivery for a shop we no longer track; acknowledge so Shopify
            // stops retrying.
            tracing::warn!(shop = %payload.shop_id, "shop/update for unknown shop");
        }
    }

    Ok(StatusCode::OK)
}

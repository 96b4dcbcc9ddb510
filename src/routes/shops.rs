// SPDX-License-Identifier: MIT

//! CRUD routes for shop records.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::models::ShopRecord;
use crate::nonce;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/shop", post(create_shop))
        .route(
            "/api/shop/{id}",
            get(get_shop).put(update_shop).delete(delete_shop),
        )
}

/// Request body for creating or updating a shop record.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShopPayload {
    #[validate(length(min = 1, message = "shopId must not be empty"))]
    pub shop_id: String,
    #[validate(length(min = 1, message = "accessToken must not be empty"))]
    pub access_token: String,
}

/// Acknowledgement for deletions.
#[derive(Serialize)]
pub struct DeleteShopResponse {
    pub message: String,
}

/// Create a new shop record.
async fn create_shop(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShopPayload>,
) -> Result<Json<ShopRecord>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // shopId is unique across the collection; a duplicate direct create is a
    // caller mistake, not an upsert.
    if state
        .db
        .find_shop_by_domain(&payload.shop_id)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(format!(
            "A record already exists for shop {}",
            payload.shop_id
        )));
    }

    let record = ShopRecord::new(
        nonce::random_hex(16)?,
        payload.shop_id,
        payload.access_token,
    );
    state.db.set_shop(&record).await?;

    tracing::info!(shop = %record.shop_id, shop_record_id = %record.id, "Shop created");

    Ok(Json(record))
}

/// Get a shop record by its store-assigned ID.
async fn get_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ShopRecord>> {
    let record = state
        .db
        .get_shop(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shop {} not found", id)))?;

    Ok(Json(record))
}

/// Replace a shop record's fields. Never creates a record.
async fn update_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ShopPayload>,
) -> Result<Json<ShopRecord>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut record = state
        .db
        .get_shop(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Shop {} not found", id)))?;

    record.shop_id = payload.shop_id;
    record.access_token = payload.access_token;
    record.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.set_shop(&record).await?;

    tracing::info!(shop = %record.shop_id, shop_record_id = %record.id, "Shop updated");

    Ok(Json(record))
}

/// Delete a shop record.
async fn delete_shop(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteShopResponse>> {
    if state.db.get_shop(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Shop {} not found", id)));
    }

    state.db.delete_shop(&id).await?;

    tracing::info!(shop_record_id = %id, "Shop deleted");

    Ok(Json(DeleteShopResponse {
        message: "Shop deleted successfully".to_string(),
    }))
}

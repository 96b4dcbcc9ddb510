//! Shop model for storage and API.

use serde::{Deserialize, Serialize};

/// Shop record stored in Firestore.
///
/// Field names are camelCase both on the wire and in storage, matching the
/// shape Shopify webhook payloads use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    /// Store-assigned identifier (also used as document ID)
    pub id: String,
    /// Shopify shop domain, e.g. "example.myshopify.com"
    pub shop_id: String,
    /// OAuth access token for the shop
    pub access_token: String,
    /// Shop display name (populated via shop/update webhooks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    /// Shop contact email (populated via shop/update webhooks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_email: Option<String>,
    /// When the record was first created
    pub created_at: String,
    /// Last modification timestamp
    pub updated_at: String,
}

impl ShopRecord {
    /// Build a fresh record with timestamps set to now.
    pub fn new(id: String, shop_id: String, access_token: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id,
            shop_id,
            access_token,
            shop_name: None,
            shop_email: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

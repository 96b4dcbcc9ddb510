// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations over shop records.
//!
//! The `shops` collection holds one document per shop. Records created via
//! the CRUD API get a random store-assigned ID; records created by the OAuth
//! flow are keyed deterministically by the shop domain, so concurrent
//! installs for the same shop always target the same document and the
//! `shopId` field stays unique.

use crate::db::collections;
use crate::error::AppError;
use crate::models::ShopRecord;

/// Document ID for records minted by the OAuth flow.
///
/// Derived from the shop domain so that two concurrent first installs for
/// the same shop write the same document instead of racing to create two.
fn oauth_doc_id(shop_domain: &str) -> String {
    format!("shop_{}", urlencoding::encode(shop_domain))
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Shop CRUD Operations ────────────────────────────────────

    /// Get a shop record by its store-assigned ID.
    pub async fn get_shop(&self, id: &str) -> Result<Option<ShopRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::SHOPS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a shop record, keyed by its ID.
    pub async fn set_shop(&self, shop: &ShopRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::SHOPS)
            .document_id(&shop.id)
            .object(shop)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a shop record by its store-assigned ID.
    pub async fn delete_shop(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::SHOPS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Look up a shop record by its Shopify shop domain.
    pub async fn find_shop_by_domain(
        &self,
        shop_domain: &str,
    ) -> Result<Option<ShopRecord>, AppError> {
        let domain = shop_domain.to_string();
        let mut matches: Vec<ShopRecord> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::SHOPS)
            .filter(move |q| q.field("shopId").eq(domain.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(matches.pop())
    }

    // ─── OAuth Token Upsert ──────────────────────────────────────

    /// Store a fresh access token for a shop, creating the record if needed.
    ///
    /// New records get a document ID derived from the shop domain, so
    /// concurrent OAuth callbacks for the same shop collide on one document
    /// and cannot create duplicates. Records that already exist (including
    /// ones created through the CRUD API under a random ID) are overwritten
    /// in place. The write commits in a transaction.
    pub async fn upsert_shop_token(
        &self,
        shop_domain: &str,
        access_token: &str,
    ) -> Result<ShopRecord, AppError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let record = match self.find_shop_by_domain(shop_domain).await? {
            Some(mut existing) => {
                // Reinstall / token refresh: overwrite the token in place
                existing.access_token = access_token.to_string();
                existing.updated_at = now;
                existing
            }
            None => ShopRecord::new(
                oauth_doc_id(shop_domain),
                shop_domain.to_string(),
                access_token.to_string(),
            ),
        };

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::SHOPS)
            .document_id(&record.id)
            .object(&record)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add shop to transaction: {}", e)))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(shop = shop_domain, shop_record_id = %record.id, "Shop token upserted");

        Ok(record)
    }

    // ─── Webhook Profile Updates ─────────────────────────────────

    /// Refresh a shop's name and email from a shop/update webhook delivery.
    ///
    /// Leaves the access token untouched, and only overwrites a profile
    /// field the delivery actually carries; fields absent from the payload
    /// keep their stored values. Returns `None` when no record exists for
    /// the domain (the delivery is then acknowledged as a no-op).
    pub async fn update_shop_profile(
        &self,
        shop_domain: &str,
        shop_name: Option<String>,
        shop_email: Option<String>,
    ) -> Result<Option<ShopRecord>, AppError> {
        let Some(mut record) = self.find_shop_by_domain(shop_domain).await? else {
            return Ok(None);
        };

        if let Some(name) = shop_name {
            record.shop_name = Some(name);
        }
        if let Some(email) = shop_email {
            record.shop_email = Some(email);
        }
        record.updated_at = chrono::Utc::now().to_rfc3339();

        self.set_shop(&record).await?;

        Ok(Some(record))
    }
}

// SPDX-License-Identifier: MIT

use shoplink::config::Config;
use shoplink::db::FirestoreDb;
use shoplink::routes::create_router;
use shoplink::services::{SessionStore, ShopifyClient};
use shoplink::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app around the given database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let shopify = ShopifyClient::new(
        config.shopify_api_key.clone(),
        config.shopify_api_secret.clone(),
        config.app_url.clone(),
    );
    create_test_app_with(db, shopify)
}

/// Create a test app with an explicit Shopify client, for tests that point
/// the client at a local stand-in server.
#[allow(dead_code)]
pub fn create_test_app_with(
    db: FirestoreDb,
    shopify: ShopifyClient,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::default(),
        db,
        sessions: SessionStore::new(),
        shopify,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with an offline mock database.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

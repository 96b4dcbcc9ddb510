// SPDX-License-Identifier: MIT

//! Firestore integration tests for the shop record store.
//!
//! These tests require the Firestore emulator to be running
//! (set FIRESTORE_EMULATOR_HOST); they skip themselves otherwise.

use shoplink::models::ShopRecord;

mod common;
use common::test_db;

/// Generate a unique shop domain for test isolation.
fn unique_shop_domain() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("it-{}.myshopify.com", nanos)
}

#[tokio::test]
async fn test_set_and_get_shop() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    let record = ShopRecord::new("doc-1".to_string() + &shop, shop.clone(), "tok".to_string());
    db.set_shop(&record).await.unwrap();

    let fetched = db.get_shop(&record.id).await.unwrap().unwrap();
    assert_eq!(fetched.shop_id, shop);
    assert_eq!(fetched.access_token, "tok");
    assert_eq!(fetched.created_at, record.created_at);
}

#[tokio::test]
async fn test_get_missing_shop_is_none() {
    require_emulator!();

    let db = test_db().await;
    assert!(db.get_shop("no-such-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_shop() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    let record = ShopRecord::new("del-".to_string() + &shop, shop, "tok".to_string());
    db.set_shop(&record).await.unwrap();
    db.delete_shop(&record.id).await.unwrap();

    assert!(db.get_shop(&record.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_shop_by_domain() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    assert!(db.find_shop_by_domain(&shop).await.unwrap().is_none());

    let record = ShopRecord::new("find-".to_string() + &shop, shop.clone(), "tok".to_string());
    db.set_shop(&record).await.unwrap();

    let found = db.find_shop_by_domain(&shop).await.unwrap().unwrap();
    assert_eq!(found.id, record.id);
}

#[tokio::test]
async fn test_upsert_creates_record_when_absent() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    let record = db.upsert_shop_token(&shop, "tok_abc").await.unwrap();

    assert_eq!(record.shop_id, shop);
    assert_eq!(record.access_token, "tok_abc");
    assert!(!record.id.is_empty());

    let fetched = db.get_shop(&record.id).await.unwrap().unwrap();
    assert_eq!(fetched.access_token, "tok_abc");
}

#[tokio::test]
async fn test_upsert_overwrites_token_keeping_identity() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    let first = db.upsert_shop_token(&shop, "tok_v1").await.unwrap();
    let second = db.upsert_shop_token(&shop, "tok_v2").await.unwrap();

    // Reinstall keeps the same record, only the token moves
    assert_eq!(second.id, first.id);
    assert_eq!(second.access_token, "tok_v2");
    assert_eq!(second.created_at, first.created_at);

    // Still exactly one record for this shop
    let fetched = db.find_shop_by_domain(&shop).await.unwrap().unwrap();
    assert_eq!(fetched.id, first.id);
    assert_eq!(fetched.access_token, "tok_v2");
}

#[tokio::test]
async fn test_concurrent_installs_share_one_record() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    // Two callbacks racing on a first install must land on the same
    // document; contention may fail one commit, but never fork the record
    let (a, b) = tokio::join!(
        db.upsert_shop_token(&shop, "tok_a"),
        db.upsert_shop_token(&shop, "tok_b"),
    );

    let committed: Vec<_> = [a, b].into_iter().filter_map(|r| r.ok()).collect();
    assert!(!committed.is_empty());
    for record in &committed {
        assert_eq!(record.id, committed[0].id);
    }

    let found = db.find_shop_by_domain(&shop).await.unwrap().unwrap();
    assert_eq!(found.id, committed[0].id);
    assert!(found.access_token == "tok_a" || found.access_token == "tok_b");
}

#[tokio::test]
async fn test_update_profile_preserves_token() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    db.upsert_shop_token(&shop, "tok_abc").await.unwrap();

    let updated = db
        .update_shop_profile(
            &shop,
            Some("Acme".to_string()),
            Some("a@acme.test".to_string()),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.shop_name.as_deref(), Some("Acme"));
    assert_eq!(updated.shop_email.as_deref(), Some("a@acme.test"));
    assert_eq!(updated.access_token, "tok_abc");
}

#[tokio::test]
async fn test_update_profile_keeps_fields_absent_from_delivery() {
    require_emulator!();

    let db = test_db().await;
    let shop = unique_shop_domain();

    db.upsert_shop_token(&shop, "tok_abc").await.unwrap();
    db.update_shop_profile(
        &shop,
        Some("Acme".to_string()),
        Some("a@acme.test".to_string()),
    )
    .await
    .unwrap()
    .unwrap();

    // A delivery that only carries the name must not blank the email
    let updated = db
        .update_shop_profile(&shop, Some("Acme Renamed".to_string()), None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.shop_name.as_deref(), Some("Acme Renamed"));
    assert_eq!(updated.shop_email.as_deref(), Some("a@acme.test"));
}

#[tokio::test]
async fn test_update_profile_for_unknown_shop_is_none() {
    require_emulator!();

    let db = test_db().await;

    let result = db
        .update_shop_profile("ghost.myshopify.com", Some("Ghost".to_string()), None)
        .await
        .unwrap();

    assert!(result.is_none());
}

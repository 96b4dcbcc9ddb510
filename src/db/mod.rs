//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Shop records (keyed by store-assigned ID, unique on shopId)
    pub const SHOPS: &str = "shops";
}

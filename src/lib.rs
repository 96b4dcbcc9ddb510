// SPDX-License-Identifier: MIT

//! Shoplink: Shopify app install backend.
//!
//! This crate provides the backend API for installing a Shopify app into
//! merchant shops and storing the per-shop API credentials the app needs
//! to call Shopify on the shop's behalf.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod nonce;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{SessionStore, ShopifyClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub sessions: SessionStore,
    pub shopify: ShopifyClient,
}

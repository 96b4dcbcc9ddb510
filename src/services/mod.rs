// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod session;
pub mod shopify;

pub use session::SessionStore;
pub use shopify::ShopifyClient;

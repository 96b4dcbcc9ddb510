// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod shop;

pub use shop::ShopRecord;

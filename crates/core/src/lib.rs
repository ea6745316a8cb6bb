//! RocketShoes Core - Shared cart and catalog types.
//!
//! This crate provides the data types shared by every RocketShoes component:
//! - `cart` - Cart state manager, inventory client, and persistence
//! - `cli` - Command-line front end for inspecting and editing the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, catalog metadata, stock, cart line items, prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

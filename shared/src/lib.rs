//! Shared types, calculations and document state for the Nutrient Management Plan builder
//!
//! This crate contains everything the browser (via WASM) and the native host agree on:
//! the NMP file document model, the agronomic calculation library, and the reducer
//! that keeps the document consistent with its derived data.

pub mod calculations;
pub mod catalog;
pub mod error;
pub mod models;
pub mod store;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;

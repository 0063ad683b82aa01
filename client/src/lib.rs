//! Native host for the Nutrient Management Plan core
//!
//! Loads configuration, persists the plan to files and reads reference tables from the
//! catalog service.

pub mod api_cache;
pub mod config;
pub mod error;
pub mod storage;

pub use api_cache::{ApiCache, ApiResponse};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use storage::FileStorage;

//! NMP file document model
//!
//! The persisted `.nmp` format is the camelCase JSON form of [`NmpFile`].

mod animal;
mod farm;
mod field;
mod manure;
mod nutrient_analysis;
mod storage;

pub use animal::*;
pub use farm::*;
pub use field::*;
pub use manure::*;
pub use nutrient_analysis::*;
pub use storage::*;
